//! Test fixtures for schema reader integration tests
//!
//! Small schemas shaped like the ones the export is usually pointed at.

#![allow(dead_code)]

use schemasheet_core::{Column, Table};

/// `departments (id PK, name UNIQUE)`
pub fn departments_table() -> Table {
    Table::new("departments", vec![
        Column::new("id", "int").primary_key(),
        Column::new("name", "varchar(100)").unique().with_nullable(false),
    ])
}

/// `users (id PK, email UNIQUE, dept_id FK -> departments.id)`
pub fn users_table() -> Table {
    Table::new("users", vec![
        Column::new("id", "int").primary_key().with_comment("surrogate key"),
        Column::new("email", "varchar(255)").unique().with_nullable(false),
        Column::new("dept_id", "int").indexed().references("departments", "id"),
    ])
}

/// `orders` with a default value and two foreign keys
pub fn orders_table() -> Table {
    Table::new("orders", vec![
        Column::new("id", "bigint unsigned").primary_key(),
        Column::new("user_id", "int").indexed().references("users", "id").with_nullable(false),
        Column::new("status", "varchar(20)").with_default("pending").with_nullable(false),
        Column::new("note", "text").with_comment("free text, may contain \"quotes\", commas"),
    ])
}
