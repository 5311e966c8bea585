//! Run report (stable v1)
//!
//! Written by `schemasheet export --report` and `schemasheet import --report`.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Which half of the pipeline produced the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    Export,
    Import,
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Import => write!(f, "import"),
        }
    }
}

/// Outcome of a single table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Ok,
    Skipped,
}

/// Per-table line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Table name
    pub name: String,

    pub status: EntryStatus,

    /// Error text for skipped tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Columns written (export) or data rows laid out (import)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,

    /// Sheet gid (import only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
}

impl ReportEntry {
    pub fn ok(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            status: EntryStatus::Ok,
            message: None,
            rows: Some(rows),
            sheet_id: None,
        }
    }

    pub fn skipped(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: EntryStatus::Skipped,
            message: Some(message.into()),
            rows: None,
            sheet_id: None,
        }
    }

    pub fn with_sheet_id(mut self, sheet_id: i64) -> Self {
        self.sheet_id = Some(sheet_id);
        self
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub ok: usize,
    pub skipped: usize,
}

/// Run report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    pub kind: RunKind,

    /// Output directory (export) or spreadsheet id (import)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    pub summary: ReportSummary,

    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new empty report
    pub fn new(kind: RunKind) -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind,
            target: None,
            summary: ReportSummary::default(),
            entries: Vec::new(),
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add an entry to the report
    pub fn add_entry(&mut self, entry: ReportEntry) {
        match entry.status {
            EntryStatus::Ok => self.summary.ok += 1,
            EntryStatus::Skipped => self.summary.skipped += 1,
        }

        self.summary.total += 1;
        self.entries.push(entry);
    }

    /// Check if any table was skipped
    pub fn has_failures(&self) -> bool {
        self.summary.skipped > 0
    }

    /// Entries that were skipped
    pub fn skipped(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.status == EntryStatus::Skipped)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
