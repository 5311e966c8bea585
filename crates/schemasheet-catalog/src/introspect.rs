//! information_schema queries and row assembly
//!
//! Each table is read with four queries (columns, unique constraints, index
//! statistics, foreign keys). The results are merged here without touching the
//! database, so the merge rules are testable on their own.

use schemasheet_core::{Column, ForeignKey};
use std::collections::{HashMap, HashSet};

/// Tables (and views) of a schema
pub const TABLES_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR) AS table_name
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

/// Column metadata in declaration order
pub const COLUMNS_QUERY: &str = r#"
    SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
           CAST(COLUMN_TYPE AS CHAR) AS column_type,
           CAST(IS_NULLABLE AS CHAR) AS is_nullable,
           CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
           CAST(COLUMN_COMMENT AS CHAR) AS column_comment,
           CAST(COLUMN_KEY AS CHAR) AS column_key
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Columns covered by a UNIQUE constraint
pub const UNIQUE_COLUMNS_QUERY: &str = r#"
    SELECT DISTINCT CAST(kcu.COLUMN_NAME AS CHAR) AS column_name
    FROM information_schema.TABLE_CONSTRAINTS AS tc
    JOIN information_schema.KEY_COLUMN_USAGE AS kcu
      ON tc.CONSTRAINT_SCHEMA = kcu.CONSTRAINT_SCHEMA
     AND tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
     AND tc.TABLE_NAME = kcu.TABLE_NAME
    WHERE tc.TABLE_SCHEMA = ? AND tc.TABLE_NAME = ?
      AND tc.CONSTRAINT_TYPE = 'UNIQUE'
"#;

/// Columns that appear in any index
pub const INDEXED_COLUMNS_QUERY: &str = r#"
    SELECT DISTINCT CAST(COLUMN_NAME AS CHAR) AS column_name
    FROM information_schema.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
"#;

/// Foreign key references of a table
pub const FOREIGN_KEYS_QUERY: &str = r#"
    SELECT CAST(COLUMN_NAME AS CHAR) AS column_name,
           CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table,
           CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column
    FROM information_schema.KEY_COLUMN_USAGE
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
      AND REFERENCED_TABLE_NAME IS NOT NULL
    ORDER BY CONSTRAINT_NAME, ORDINAL_POSITION
"#;

/// One row of [`COLUMNS_QUERY`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRow {
    pub name: String,
    pub column_type: String,
    pub is_nullable: String,
    pub default: Option<String>,
    pub comment: String,
    pub column_key: String,
}

/// One row of [`FOREIGN_KEYS_QUERY`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRow {
    pub column: String,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
}

/// Merge the four per-table result sets into columns
///
/// Column order follows `rows`. When a column is part of several foreign keys
/// the first usable row wins.
pub fn assemble_columns(
    rows: Vec<ColumnRow>,
    unique: &HashSet<String>,
    indexed: &HashSet<String>,
    foreign_keys: &[ForeignKeyRow],
) -> Vec<Column> {
    let mut targets: HashMap<&str, ForeignKey> = HashMap::new();
    for fk in foreign_keys {
        let (Some(table), Some(column)) = (&fk.referenced_table, &fk.referenced_column) else {
            continue;
        };
        if let Some(target) = ForeignKey::new(table.as_str(), column.as_str()) {
            targets.entry(fk.column.as_str()).or_insert(target);
        }
    }

    rows.into_iter()
        .map(|row| {
            let foreign_key = targets.get(row.name.as_str()).cloned();
            Column {
                nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
                primary_key: row.column_key == "PRI",
                unique: unique.contains(&row.name),
                indexed: indexed.contains(&row.name),
                foreign_key,
                name: row.name,
                column_type: row.column_type,
                default: row.default,
                comment: row.comment,
            }
        })
        .collect()
}
