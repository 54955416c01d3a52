use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while downloading and unpacking a source archive.
///
/// Always fatal to that acquisition call; re-invoking `acquire` is the retry
/// path, which is safe because every run re-clears its staging and
/// extraction state first.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("invalid archive source: {0}")]
    InvalidSource(String),

    #[error("http request failed for {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("filesystem operation failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract archive {path}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Errors raised while materializing staged raw files into catalog tables.
///
/// Fatal to the bootstrap run. Tables created before the failure persist;
/// every sub-operation is guarded by an existence check, so re-running is
/// safe and never duplicates rows.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("staged input file missing: {0}")]
    MissingInput(PathBuf),

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse delimited file")]
    Csv(#[from] csv::Error),

    #[error("record {record} has {found} fields, schema {table} expects {expected}")]
    RowShape {
        table: String,
        record: u64,
        expected: usize,
        found: usize,
    },

    #[error("cannot coerce {value:?} to {column} ({ty}) in {table}")]
    Coercion {
        table: String,
        column: String,
        ty: &'static str,
        value: String,
    },

    #[error("catalog statement failed")]
    Catalog(#[from] rusqlite::Error),
}

/// Errors raised while registering the notebook artifact.
///
/// `Skipped` is an outcome, not an error; only genuine failures land here.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("notebook store not ready after {attempts} attempts")]
    NotReady {
        attempts: u32,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to load notebook artifact {path}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notebook artifact {path} is not valid JSON")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog statement failed")]
    Catalog(#[from] rusqlite::Error),
}
