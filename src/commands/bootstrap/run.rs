use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{self, LakehousePaths};
use crate::cli::BootstrapArgs;
use crate::util::ensure_directory;

use super::{diagnosis, mappings, patient_records};

pub fn run(args: BootstrapArgs) -> Result<()> {
    let paths = LakehousePaths::new(&args.base_dir);
    ensure_directory(&paths.data_dir())?;

    info!(metadata = %paths.metadata_db().display(), "opening catalog");
    let mut conn = catalog::open(&paths)
        .with_context(|| format!("failed to open catalog at {}", paths.metadata_db().display()))?;

    let records = patient_records::load(&mut conn, &paths.diabetic_csv())
        .context("failed to load patient records")?;
    info!(rows = records, table = "diabetes.patient_records", "table ready");

    let entries = mappings::load(&mut conn, &paths.ids_mapping_csv())
        .context("failed to load id mappings")?;
    info!(rows = entries, table = "diabetes.mappings", "table ready");

    let codes = diagnosis::load(&mut conn, &paths.icd9_descriptions())
        .context("failed to load diagnosis codes")?;
    info!(rows = codes, table = "icd_9.diagnosis", "table ready");

    info!(
        catalog = %paths.metadata_db().display(),
        data = %paths.data_dir().display(),
        "catalog bootstrap completed"
    );

    Ok(())
}
