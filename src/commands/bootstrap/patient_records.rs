//! Typed delimited load of the patient records extract.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use tracing::info;

use crate::catalog::table_exists;
use crate::datasets::patient_records_schema;
use crate::errors::BootstrapError;
use crate::model::{ColumnType, TableSchema};

pub fn load(conn: &mut Connection, csv_path: &Path) -> Result<usize, BootstrapError> {
    load_csv(conn, &patient_records_schema(), csv_path)
}

/// Load a delimited file into `schema.table`, coercing every field to the
/// declared column type and binding the null sentinel as NULL. A table left
/// behind by a prior run makes this a no-op.
pub fn load_csv(
    conn: &mut Connection,
    schema: &TableSchema,
    csv_path: &Path,
) -> Result<usize, BootstrapError> {
    let (schema_name, table_name) = split_qualified(schema.table);
    if table_exists(conn, schema_name, table_name)? {
        info!(table = schema.table, "table already present, skipping load");
        return Ok(0);
    }

    if !csv_path.exists() {
        return Err(BootstrapError::MissingInput(csv_path.to_path_buf()));
    }

    conn.execute(&create_table_sql(schema), [])?;

    let mut reader = csv::Reader::from_path(csv_path)?;
    let tx = conn.transaction()?;
    let mut inserted = 0;

    {
        let mut stmt = tx.prepare(&insert_sql(schema))?;

        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != schema.columns.len() {
                return Err(BootstrapError::RowShape {
                    table: schema.table.to_string(),
                    record: index as u64 + 1,
                    expected: schema.columns.len(),
                    found: record.len(),
                });
            }

            let mut row = Vec::with_capacity(schema.columns.len());
            for ((column, ty), field) in schema.columns.iter().zip(record.iter()) {
                row.push(coerce_field(schema, column, *ty, field)?);
            }

            stmt.execute(params_from_iter(row))?;
            inserted += 1;
        }
    }

    tx.commit()?;
    Ok(inserted)
}

/// Sentinel fields become NULL; everything else follows the column type.
fn coerce_field(
    schema: &TableSchema,
    column: &str,
    ty: ColumnType,
    field: &str,
) -> Result<Value, BootstrapError> {
    if field == schema.null_sentinel {
        return Ok(Value::Null);
    }

    match ty {
        ColumnType::Integer => field
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| BootstrapError::Coercion {
                table: schema.table.to_string(),
                column: column.to_string(),
                ty: ty.sql(),
                value: field.to_string(),
            }),
        ColumnType::Text => Ok(Value::Text(field.to_string())),
    }
}

fn create_table_sql(schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|(name, ty)| format!("\"{name}\" {}", ty.sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({columns})", schema.table)
}

fn insert_sql(schema: &TableSchema) -> String {
    let placeholders = (1..=schema.columns.len())
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} VALUES ({placeholders})", schema.table)
}

fn split_qualified(table: &str) -> (&str, &str) {
    table.split_once('.').unwrap_or(("main", table))
}
