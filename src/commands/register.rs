//! Notebook registrar: check-then-transact registration of the exploration
//! artifact into the shared notebook store, tolerating a store whose owning
//! service is still starting up.

use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{self, LakehousePaths};
use crate::cli::RegisterArgs;
use crate::errors::RegistrationError;
use crate::model::RegistrationOutcome;
use crate::retry::RetryPolicy;

pub fn run(args: RegisterArgs) -> Result<()> {
    let paths = LakehousePaths::new(&args.base_dir);
    let name = format!(
        "medical-analysis-{}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    let outcome = register_notebook(
        &paths.notebook_store(),
        &args.artifact,
        &name,
        &RetryPolicy::default(),
    )?;

    match outcome {
        RegistrationOutcome::Registered { notebook_id, name } => {
            info!(notebook_id = %notebook_id, name = %name, "notebook registered");
        }
        RegistrationOutcome::Skipped { name } => {
            info!(name = %name, "notebook already present, nothing done");
        }
    }

    Ok(())
}

/// Register `artifact` under `name` unless a non-expired version with that
/// title already exists. The existence check runs under the retry policy;
/// the two inserts share one transaction and land together or not at all.
pub fn register_notebook(
    store_path: &Path,
    artifact: &Path,
    name: &str,
    policy: &RetryPolicy,
) -> Result<RegistrationOutcome, RegistrationError> {
    let (mut conn, already_there) = policy
        .run("notebook store existence check", || {
            let conn = catalog::open_notebook_store(store_path)?;
            let exists = version_exists(&conn, name)?;
            Ok::<_, rusqlite::Error>((conn, exists))
        })
        .map_err(|source| RegistrationError::NotReady {
            attempts: policy.max_attempts,
            source,
        })?;

    if already_there {
        return Ok(RegistrationOutcome::Skipped {
            name: name.to_string(),
        });
    }

    let payload = load_artifact(artifact)?;
    let notebook_id = Uuid::new_v4().to_string();
    let created = Utc::now();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO notebooks (id, name, created) VALUES (?1, ?2, ?3)",
        params![notebook_id, format!("notebook_{notebook_id}"), created],
    )?;
    tx.execute(
        "INSERT INTO notebook_versions (notebook_id, version, title, json, created, expires)
         VALUES (?1, 1, ?2, ?3, ?4, NULL)",
        params![notebook_id, name, payload, created],
    )?;
    tx.commit()?;

    Ok(RegistrationOutcome::Registered {
        notebook_id,
        name: name.to_string(),
    })
}

fn version_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM notebook_versions
             WHERE title LIKE '%' || ?1 || '%' AND expires IS NULL
             LIMIT 1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Read the artifact and verify it is well-formed JSON before anything is
/// written to the store.
fn load_artifact(path: &Path) -> Result<String, RegistrationError> {
    let payload = fs::read_to_string(path).map_err(|source| RegistrationError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str::<serde_json::Value>(&payload).map_err(|source| {
        RegistrationError::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn instant_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
            grace: Duration::ZERO,
        }
    }

    fn init_store(path: &Path, version_check: &str) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE notebooks (
               id TEXT PRIMARY KEY,
               name TEXT NOT NULL,
               created TEXT NOT NULL
             );
             CREATE TABLE notebook_versions (
               notebook_id TEXT NOT NULL,
               version INTEGER NOT NULL {version_check},
               title TEXT NOT NULL,
               json TEXT NOT NULL,
               created TEXT NOT NULL,
               expires TEXT
             );"
        ))
        .unwrap();
    }

    fn write_artifact(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("ntb_exploration.json");
        fs::write(&path, r#"{"cells": []}"#).unwrap();
        path
    }

    #[test]
    fn registers_once_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ui.sqlite");
        init_store(&store, "");
        let artifact = write_artifact(dir.path());

        let first =
            register_notebook(&store, &artifact, "medical-analysis-t0", &instant_policy()).unwrap();
        assert!(matches!(first, RegistrationOutcome::Registered { .. }));

        let second =
            register_notebook(&store, &artifact, "medical-analysis-t0", &instant_policy()).unwrap();
        assert!(matches!(second, RegistrationOutcome::Skipped { .. }));

        let conn = Connection::open(&store).unwrap();
        let versions: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM notebook_versions WHERE expires IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn failed_second_insert_leaves_no_partial_notebook_row() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ui.sqlite");
        // Constraint rejects version 1, so the versions insert always fails.
        init_store(&store, "CHECK (version > 1)");
        let artifact = write_artifact(dir.path());

        let result =
            register_notebook(&store, &artifact, "medical-analysis-t0", &instant_policy());
        assert!(matches!(result, Err(RegistrationError::Catalog(_))));

        let conn = Connection::open(&store).unwrap();
        let notebooks: i64 = conn
            .query_row("SELECT COUNT(*) FROM notebooks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(notebooks, 0);
    }

    #[test]
    fn retry_exhaustion_surfaces_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        // Store file never appears: the dependent service never came up.
        let store = dir.path().join("ui.sqlite");
        let artifact = write_artifact(dir.path());

        let result =
            register_notebook(&store, &artifact, "medical-analysis-t0", &instant_policy());
        assert!(matches!(
            result,
            Err(RegistrationError::NotReady { attempts: 3, .. })
        ));
        assert!(!store.exists());
    }

    #[test]
    fn store_becoming_ready_mid_retry_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ui.sqlite");
        let artifact = write_artifact(dir.path());

        let policy = RetryPolicy {
            max_attempts: 10,
            delay: Duration::from_millis(50),
            grace: Duration::ZERO,
        };

        // Simulate a slow-starting service that initializes the store while
        // the registrar is already retrying its existence check.
        let late_store = store.clone();
        let initializer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(120));
            init_store(&late_store, "");
        });

        let outcome =
            register_notebook(&store, &artifact, "medical-analysis-t1", &policy).unwrap();
        initializer.join().unwrap();
        assert!(matches!(outcome, RegistrationOutcome::Registered { .. }));
    }

    #[test]
    fn invalid_artifact_json_is_rejected_before_any_insert() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ui.sqlite");
        init_store(&store, "");
        let artifact = dir.path().join("broken.json");
        fs::write(&artifact, "{not json").unwrap();

        let result =
            register_notebook(&store, &artifact, "medical-analysis-t0", &instant_policy());
        assert!(matches!(result, Err(RegistrationError::ArtifactFormat { .. })));

        let conn = Connection::open(&store).unwrap();
        let notebooks: i64 = conn
            .query_row("SELECT COUNT(*) FROM notebooks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(notebooks, 0);
    }
}
