//! Fixed-width ICD-9 description parser. The source file predates
//! Unicode-safe encodings and is read as latin-1.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, params};
use tracing::info;

use crate::catalog::table_exists;
use crate::datasets::ICD9_CODE_WIDTH;
use crate::errors::BootstrapError;
use crate::model::DiagnosisRecord;

pub fn load(conn: &mut Connection, txt_path: &Path) -> Result<usize, BootstrapError> {
    if table_exists(conn, "icd_9", "diagnosis")? {
        info!(table = "icd_9.diagnosis", "table already present, skipping load");
        return Ok(0);
    }

    if !txt_path.exists() {
        return Err(BootstrapError::MissingInput(txt_path.to_path_buf()));
    }

    let bytes = fs::read(txt_path).map_err(|source| BootstrapError::Io {
        path: txt_path.to_path_buf(),
        source,
    })?;
    let text = decode_latin1(&bytes);

    conn.execute(
        "CREATE TABLE IF NOT EXISTS icd_9.diagnosis (
           diagnosis_id TEXT NOT NULL,
           diagnosis_name TEXT
         )",
        [],
    )?;

    let tx = conn.transaction()?;
    let mut inserted = 0;
    {
        let mut stmt =
            tx.prepare("INSERT INTO icd_9.diagnosis (diagnosis_id, diagnosis_name) VALUES (?1, ?2)")?;
        for line in text.lines() {
            let Some(record) = parse_line(line) else {
                continue;
            };
            stmt.execute(params![record.code, record.description])?;
            inserted += 1;
        }
    }
    tx.commit()?;

    Ok(inserted)
}

/// Latin-1 maps every byte to the identical Unicode code point, so decoding
/// is a plain widening; no byte sequence is invalid.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// Positional split at the fixed code width, both halves trimmed. Blank
/// lines carry no record. The code is not validated in any way.
pub fn parse_line(line: &str) -> Option<DiagnosisRecord> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }

    let split_at = line
        .char_indices()
        .nth(ICD9_CODE_WIDTH)
        .map(|(offset, _)| offset)
        .unwrap_or(line.len());
    let (code, description) = line.split_at(split_at);

    Some(DiagnosisRecord {
        code: code.trim().to_string(),
        description: description.trim().to_string(),
    })
}
