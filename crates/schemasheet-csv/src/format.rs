//! The column-sheet CSV format
//!
//! Ten fields per row; boolean flags are written as `○` / `×`.

use schemasheet_core::Column;

/// Header row of every exported file
pub const HEADER: [&str; 10] = [
    "COLUMN_NAME",
    "COLUMN_TYPE",
    "IS_PRIMARY_KEY",
    "IS_NULLABLE",
    "IS_UNIQUE",
    "IS_INDEX",
    "IS_FOREIGN_KEY",
    "FOREIGN_KEY_TABLE",
    "FOREIGN_KEY_COLUMN",
    "COMMENT",
];

/// Flag is set
pub const PRESENT: &str = "○";

/// Flag is not set
pub const ABSENT: &str = "×";

/// Render a boolean flag
pub fn flag(set: bool) -> &'static str {
    if set {
        PRESENT
    } else {
        ABSENT
    }
}

/// One CSV record for a column, in [`HEADER`] order
///
/// `IS_INDEX` is also marked for foreign key columns; downstream sheets rely
/// on that format.
pub fn column_record(col: &Column) -> [&str; 10] {
    [
        col.name.as_str(),
        col.column_type.as_str(),
        flag(col.primary_key),
        flag(col.nullable),
        flag(col.unique),
        flag(col.indexed || col.is_foreign()),
        flag(col.is_foreign()),
        col.foreign_key_table(),
        col.foreign_key_column(),
        col.comment.as_str(),
    ]
}

/// Whether a parsed header matches [`HEADER`], ignoring case and padding
pub fn is_standard_header(header: &[String]) -> bool {
    header.len() == HEADER.len()
        && header
            .iter()
            .zip(HEADER.iter())
            .all(|(got, want)| got.trim().eq_ignore_ascii_case(want))
}
