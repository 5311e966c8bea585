//! Schema snapshot types
//!
//! A [`Database`] is built once per export run from `information_schema` and
//! never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Target of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table name
    pub table: String,

    /// Referenced column name
    pub column: String,
}

impl ForeignKey {
    /// Create a foreign key target
    ///
    /// Returns `None` when either side is empty, so a column can never be
    /// flagged foreign without a usable target.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Option<Self> {
        let table = table.into();
        let column = column.into();

        if table.is_empty() || column.is_empty() {
            return None;
        }

        Some(Self { table, column })
    }
}

impl std::fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A column of a table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Declared type as reported by `COLUMN_TYPE` (e.g. `varchar(255)`)
    pub column_type: String,

    /// `IS_NULLABLE = 'YES'`
    pub nullable: bool,

    /// Default value, `None` when the column has no default
    pub default: Option<String>,

    /// Column comment (empty when unset)
    pub comment: String,

    /// `COLUMN_KEY = 'PRI'`
    pub primary_key: bool,

    /// Part of a UNIQUE constraint
    pub unique: bool,

    /// Appears in `information_schema.STATISTICS`
    pub indexed: bool,

    /// Foreign key target, if any
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    /// Create a nullable column with no constraints
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            default: None,
            comment: String::new(),
            primary_key: false,
            unique: false,
            indexed: false,
            foreign_key: None,
        }
    }

    /// Mark as primary key (implies NOT NULL and indexed)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self.indexed = true;
        self
    }

    /// Mark as unique (implies indexed)
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self.indexed = true;
        self
    }

    /// Mark as indexed
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Reference another table's column
    ///
    /// An empty table or column leaves the column non-foreign.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = ForeignKey::new(table, column);
        self
    }

    /// Whether the column is a foreign key
    pub fn is_foreign(&self) -> bool {
        self.foreign_key.is_some()
    }

    /// Referenced table name, empty when not a foreign key
    pub fn foreign_key_table(&self) -> &str {
        self.foreign_key.as_ref().map(|fk| fk.table.as_str()).unwrap_or("")
    }

    /// Referenced column name, empty when not a foreign key
    pub fn foreign_key_column(&self) -> &str {
        self.foreign_key.as_ref().map(|fk| fk.column.as_str()).unwrap_or("")
    }
}

/// A table and its columns in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Columns ordered by `ORDINAL_POSITION`
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table from columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that reference other tables
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_foreign())
    }
}

/// A database schema snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    /// Schema name (`DB_DATABASE`)
    pub name: String,

    /// Tables in listing order
    pub tables: Vec<Table>,
}

impl Database {
    /// Create a database snapshot
    pub fn new(name: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Total number of columns across all tables
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}
