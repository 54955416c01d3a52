//! Catalog access: the metadata database plus the per-schema data files it
//! attaches. Attach paths are always bound as parameters, never spliced
//! into statement text.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::datasets::{
    DIABETES_DATASET, DIABETIC_DATA_FILE, ICD9_DATASET, ICD9_DESC_FILE, IDS_MAPPING_FILE,
};

/// Resolved locations of everything under `<base>/lakehouse/`.
#[derive(Debug, Clone)]
pub struct LakehousePaths {
    base: PathBuf,
}

impl LakehousePaths {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base: base_dir.to_path_buf(),
        }
    }

    pub fn lakehouse(&self) -> PathBuf {
        self.base.join("lakehouse")
    }

    pub fn metadata_db(&self) -> PathBuf {
        self.lakehouse().join("metadata.sqlite")
    }

    /// Directory holding the attached per-schema data files.
    pub fn data_dir(&self) -> PathBuf {
        self.lakehouse().join("ducklake")
    }

    pub fn schema_db(&self, schema: &str) -> PathBuf {
        self.data_dir().join(format!("{schema}.sqlite"))
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.lakehouse().join("manifests")
    }

    /// The notebook store. Created and owned by the exploration UI service,
    /// not by this tool.
    pub fn notebook_store(&self) -> PathBuf {
        self.lakehouse().join("ui.sqlite")
    }

    pub fn staging_dir(&self, dataset: &str) -> PathBuf {
        self.lakehouse().join(dataset).join("raw")
    }

    pub fn extract_dir(&self, dataset: &str) -> PathBuf {
        self.lakehouse().join(dataset).join("unzipped")
    }

    pub fn diabetic_csv(&self) -> PathBuf {
        self.extract_dir(DIABETES_DATASET).join(DIABETIC_DATA_FILE)
    }

    pub fn ids_mapping_csv(&self) -> PathBuf {
        self.extract_dir(DIABETES_DATASET).join(IDS_MAPPING_FILE)
    }

    pub fn icd9_descriptions(&self) -> PathBuf {
        self.extract_dir(ICD9_DATASET).join(ICD9_DESC_FILE)
    }
}

/// Open the catalog: the metadata database with the `diabetes` and `icd_9`
/// schema files attached. The data directory must already exist.
pub fn open(paths: &LakehousePaths) -> rusqlite::Result<Connection> {
    let conn = Connection::open(paths.metadata_db())?;
    configure(&conn)?;
    attach_schema(&conn, &paths.schema_db(DIABETES_DATASET), DIABETES_DATASET)?;
    attach_schema(&conn, &paths.schema_db(ICD9_DATASET), ICD9_DATASET)?;
    Ok(conn)
}

/// Open the notebook store read-write without creating it: an absent file
/// means the owning service has not initialized yet.
pub fn open_notebook_store(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
}

fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}

fn attach_schema(conn: &Connection, db_path: &Path, schema: &str) -> rusqlite::Result<()> {
    // Schema names come from compiled-in constants; only the path is bound.
    let sql = format!("ATTACH DATABASE ?1 AS {schema}");
    conn.execute(&sql, [db_path.to_string_lossy()])?;
    Ok(())
}

/// True when `schema.table` already exists, which marks the sub-operation
/// as complete from a prior run.
pub fn table_exists(conn: &Connection, schema: &str, table: &str) -> rusqlite::Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {schema}.sqlite_master WHERE type = 'table' AND name = ?1");
    let count: i64 = conn.query_row(&sql, [table], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ensure_directory;

    #[test]
    fn open_attaches_both_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let paths = LakehousePaths::new(dir.path());
        ensure_directory(&paths.data_dir()).unwrap();

        let conn = open(&paths).unwrap();
        conn.execute_batch("CREATE TABLE diabetes.t (x INTEGER); CREATE TABLE icd_9.u (y TEXT);")
            .unwrap();

        assert!(table_exists(&conn, "diabetes", "t").unwrap());
        assert!(table_exists(&conn, "icd_9", "u").unwrap());
        assert!(!table_exists(&conn, "diabetes", "u").unwrap());
    }

    #[test]
    fn notebook_store_open_fails_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_notebook_store(&dir.path().join("ui.sqlite"));
        assert!(result.is_err());
    }
}
