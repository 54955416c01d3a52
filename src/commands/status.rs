use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::catalog::{self, LakehousePaths, table_exists};
use crate::cli::StatusArgs;
use crate::datasets::{DIABETES_DATASET, ICD9_DATASET};

pub fn run(args: StatusArgs) -> Result<()> {
    let paths = LakehousePaths::new(&args.base_dir);

    info!(base_dir = %args.base_dir.display(), "status requested");

    for (dataset, staged) in [
        (DIABETES_DATASET, paths.diabetic_csv()),
        (DIABETES_DATASET, paths.ids_mapping_csv()),
        (ICD9_DATASET, paths.icd9_descriptions()),
    ] {
        if staged.exists() {
            info!(dataset, path = %staged.display(), "staged file present");
        } else {
            warn!(dataset, path = %staged.display(), "staged file missing");
        }
    }

    if !paths.metadata_db().exists() || !paths.data_dir().exists() {
        warn!(path = %paths.metadata_db().display(), "catalog not initialized, run bootstrap first");
        return Ok(());
    }

    let conn = catalog::open(&paths)
        .with_context(|| format!("failed to open catalog at {}", paths.metadata_db().display()))?;

    report_table(&conn, "diabetes", "patient_records")?;
    report_table(&conn, "diabetes", "mappings")?;
    report_table(&conn, "icd_9", "diagnosis")?;

    if paths.notebook_store().exists() {
        info!(path = %paths.notebook_store().display(), "notebook store present");
    } else {
        warn!(path = %paths.notebook_store().display(), "notebook store missing");
    }

    Ok(())
}

fn report_table(conn: &Connection, schema: &str, table: &str) -> Result<()> {
    if !table_exists(conn, schema, table)? {
        warn!(table = %format!("{schema}.{table}"), "table not yet created");
        return Ok(());
    }

    let sql = format!("SELECT COUNT(*) FROM {schema}.{table}");
    let rows: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    info!(table = %format!("{schema}.{table}"), rows, "table status");

    Ok(())
}
