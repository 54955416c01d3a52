use std::path::PathBuf;

use serde::Serialize;

/// One remote archive and the two directories its acquisition owns.
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    pub url: String,
    pub staging_dir: PathBuf,
    pub extract_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

/// Ordered column layout for a typed delimited load.
///
/// Raw fields equal to `null_sentinel` bind as NULL instead of the literal
/// string; everything else is coerced to the declared column type.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Fully qualified target table, e.g. `diabetes.patient_records`.
    pub table: &'static str,
    pub columns: &'static [(&'static str, ColumnType)],
    pub null_sentinel: &'static str,
}

/// One row of the denormalized mappings table produced by the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub mapping_name: String,
    pub id: i64,
    pub description: String,
}

/// One diagnosis code parsed from a fixed-width line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisRecord {
    pub code: String,
    pub description: String,
}

/// What one acquisition run produced, written beside the lakehouse tree.
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub archives: Vec<AcquiredArchive>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcquiredArchive {
    pub dataset: String,
    pub url: String,
    pub staged_file: String,
    pub extracted_files: Vec<String>,
}

/// Terminal state of one registration attempt. Reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { notebook_id: String, name: String },
    Skipped { name: String },
}
