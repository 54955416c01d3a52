//! Mapping-table splitter: decompose the flat reference file, in which
//! several `code,description` lookup tables are concatenated behind sentinel
//! header rows, into one queryable table of (mapping_name, id, description).

use std::fs;
use std::path::Path;

use regex::Regex;
use rusqlite::{Connection, params};
use tracing::info;

use crate::catalog::table_exists;
use crate::datasets::MAPPING_HEADERS;
use crate::errors::BootstrapError;
use crate::model::MappingEntry;

pub fn load(conn: &mut Connection, mapping_path: &Path) -> Result<usize, BootstrapError> {
    if table_exists(conn, "diabetes", "mappings")? {
        info!(table = "diabetes.mappings", "table already present, skipping load");
        return Ok(0);
    }

    if !mapping_path.exists() {
        return Err(BootstrapError::MissingInput(mapping_path.to_path_buf()));
    }

    let raw = fs::read_to_string(mapping_path).map_err(|source| BootstrapError::Io {
        path: mapping_path.to_path_buf(),
        source,
    })?;

    let entries = split_mapping_lines(raw.lines());

    conn.execute(
        "CREATE TABLE IF NOT EXISTS diabetes.mappings (
           mapping_name TEXT NOT NULL,
           id INTEGER NOT NULL,
           description TEXT
         )",
        [],
    )?;

    let tx = conn.transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO diabetes.mappings (mapping_name, id, description) VALUES (?1, ?2, ?3)")?;
        for entry in &entries {
            stmt.execute(params![entry.mapping_name, entry.id, entry.description])?;
        }
    }
    tx.commit()?;

    Ok(entries.len())
}

/// Single ordered pass over the file lines. Each line inherits the nearest
/// preceding header token as its owning block; header lines themselves and
/// lines before the first header are dropped, as is anything whose first
/// field is not a bare numeric id.
///
/// A header token appearing mid-block always opens a new block. The source
/// format gives no way to tell a coincidental match from a real boundary,
/// so no lookahead is attempted.
pub fn split_mapping_lines<'a, I>(lines: I) -> Vec<MappingEntry>
where
    I: IntoIterator<Item = &'a str>,
{
    let numeric_id = Regex::new(r"^[0-9]+$").expect("numeric id pattern is valid");

    let mut current_block: Option<String> = None;
    let mut entries = Vec::new();

    for line in lines {
        let line = line.trim_end_matches('\r');
        let mut fields = line.splitn(3, ',');
        let first = fields.next().unwrap_or_default();
        let second = fields.next().unwrap_or_default();

        if MAPPING_HEADERS.contains(&first) {
            current_block = Some(first.to_string());
            continue;
        }

        let Some(block) = &current_block else {
            // Orphaned line before the first header: no owning block.
            continue;
        };

        if !numeric_id.is_match(first) {
            continue;
        }
        let Ok(id) = first.parse::<i64>() else {
            continue;
        };

        entries.push(MappingEntry {
            mapping_name: block.clone(),
            id,
            description: second.to_string(),
        });
    }

    entries
}
