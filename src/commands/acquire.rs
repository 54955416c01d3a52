use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::catalog::LakehousePaths;
use crate::cli::AcquireArgs;
use crate::datasets::{DIABETES_DATASET, DIABETES_URL, ICD9_DATASET, ICD9_URL};
use crate::errors::AcquisitionError;
use crate::model::{AcquiredArchive, AcquisitionManifest, ArchiveSource};
use crate::util::{clear_directory, now_utc_string, write_json_pretty};

pub fn run(args: AcquireArgs) -> Result<()> {
    let paths = LakehousePaths::new(&args.base_dir);
    let mut archives = Vec::new();

    for (dataset, url) in [(DIABETES_DATASET, DIABETES_URL), (ICD9_DATASET, ICD9_URL)] {
        let source = ArchiveSource {
            url: url.to_string(),
            staging_dir: paths.staging_dir(dataset),
            extract_dir: paths.extract_dir(dataset),
        };

        info!(dataset, url = %source.url, "acquiring archive");
        let staged_file = fetch_archive(&source)?;
        let extracted_files = list_extracted(&source.extract_dir)?;
        info!(
            dataset,
            files = extracted_files.len(),
            extract_dir = %source.extract_dir.display(),
            "archive unpacked"
        );

        archives.push(AcquiredArchive {
            dataset: dataset.to_string(),
            url: source.url,
            staged_file,
            extracted_files,
        });
    }

    let manifest = AcquisitionManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        archives,
    };
    let manifest_path = paths.manifest_dir().join("acquisition.json");
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote acquisition manifest");

    Ok(())
}

fn list_extracted(extract_dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(extract_dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

/// Download the archive into staging and unpack it into the extraction
/// directory. Both locations are cleared of prior-run residue first, so the
/// call is safe to repeat after any failure. Returns the staged file name.
pub fn fetch_archive(source: &ArchiveSource) -> Result<String, AcquisitionError> {
    let filename = archive_filename(source)?;
    let staged = source.staging_dir.join(filename);

    prepare_directories(source, &staged)?;
    download(&source.url, &staged)?;
    extract_zip(&staged, &source.extract_dir)?;

    Ok(filename.to_string())
}

/// The staged file is named after the last path segment of the URL.
fn archive_filename(source: &ArchiveSource) -> Result<&str, AcquisitionError> {
    if source.url.is_empty() {
        return Err(AcquisitionError::InvalidSource("empty url".to_string()));
    }
    if source.staging_dir.as_os_str().is_empty() || source.extract_dir.as_os_str().is_empty() {
        return Err(AcquisitionError::InvalidSource(
            "staging and extraction directories must be non-empty".to_string(),
        ));
    }

    let filename = source.url.rsplit('/').next().unwrap_or_default();

    if filename.is_empty() {
        return Err(AcquisitionError::InvalidSource(format!(
            "url has no file name component: {}",
            source.url
        )));
    }

    Ok(filename)
}

/// Create both directories, drop any previously staged archive, and empty
/// the extraction directory so nothing from an older archive survives.
fn prepare_directories(source: &ArchiveSource, staged: &Path) -> Result<(), AcquisitionError> {
    fs::create_dir_all(&source.staging_dir).map_err(|source_err| AcquisitionError::Io {
        path: source.staging_dir.clone(),
        source: source_err,
    })?;
    fs::create_dir_all(&source.extract_dir).map_err(|source_err| AcquisitionError::Io {
        path: source.extract_dir.clone(),
        source: source_err,
    })?;

    if staged.exists() {
        fs::remove_file(staged).map_err(|source_err| AcquisitionError::Io {
            path: staged.to_path_buf(),
            source: source_err,
        })?;
    }

    clear_directory(&source.extract_dir).map_err(|source_err| AcquisitionError::Io {
        path: source.extract_dir.clone(),
        source: source_err,
    })?;

    Ok(())
}

/// Stream the response body straight to the staging file.
fn download(url: &str, staged: &Path) -> Result<(), AcquisitionError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|source| AcquisitionError::Transport {
            url: url.to_string(),
            source,
        })?;

    let mut file = File::create(staged).map_err(|source| AcquisitionError::Io {
        path: staged.to_path_buf(),
        source,
    })?;

    io::copy(&mut response, &mut file).map_err(|source| AcquisitionError::Io {
        path: staged.to_path_buf(),
        source,
    })?;

    Ok(())
}

fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<(), AcquisitionError> {
    let file = File::open(archive_path).map_err(|source| AcquisitionError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;

    let mut archive =
        zip::ZipArchive::new(file).map_err(|source| AcquisitionError::Archive {
            path: archive_path.to_path_buf(),
            source,
        })?;

    archive
        .extract(extract_dir)
        .map_err(|source| AcquisitionError::Archive {
            path: archive_path.to_path_buf(),
            source,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;

    fn source_for(dir: &Path, url: &str) -> ArchiveSource {
        ArchiveSource {
            url: url.to_string(),
            staging_dir: dir.join("raw"),
            extract_dir: dir.join("unzipped"),
        }
    }

    fn write_test_zip(path: &Path, members: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn list_names(dir: &Path) -> BTreeSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn archive_filename_uses_last_path_segment() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_for(dir.path(), "https://example.com/data/archive.zip");
        assert_eq!(archive_filename(&source).unwrap(), "archive.zip");
    }

    #[test]
    fn archive_filename_rejects_empty_segment() {
        let dir = tempfile::tempdir().unwrap();
        for url in ["", "https://example.com/"] {
            let source = source_for(dir.path(), url);
            assert!(matches!(
                archive_filename(&source),
                Err(AcquisitionError::InvalidSource(_))
            ));
        }
    }

    #[test]
    fn prepare_clears_stale_staging_and_extraction_state() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_for(dir.path(), "https://example.com/archive.zip");
        fs::create_dir_all(&source.staging_dir).unwrap();
        fs::create_dir_all(source.extract_dir.join("old-subdir")).unwrap();
        let staged = source.staging_dir.join("archive.zip");
        fs::write(&staged, "partial download").unwrap();
        fs::write(source.extract_dir.join("stale.csv"), "stale").unwrap();

        prepare_directories(&source, &staged).unwrap();

        assert!(!staged.exists());
        assert_eq!(fs::read_dir(&source.extract_dir).unwrap().count(), 0);
    }

    #[test]
    fn extraction_is_idempotent_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_for(dir.path(), "https://example.com/archive.zip");
        fs::create_dir_all(&source.staging_dir).unwrap();
        fs::create_dir_all(&source.extract_dir).unwrap();

        // First run unpacks an older revision of the archive.
        let staged = source.staging_dir.join("archive.zip");
        write_test_zip(&staged, &[("a.csv", "1"), ("removed-later.csv", "x")]);
        extract_zip(&staged, &source.extract_dir).unwrap();

        // Second run: new archive contents, pre-cleared destination.
        prepare_directories(&source, &staged).unwrap();
        write_test_zip(&staged, &[("a.csv", "2"), ("b.csv", "3")]);
        extract_zip(&staged, &source.extract_dir).unwrap();

        let names = list_names(&source.extract_dir);
        let expected: BTreeSet<String> = ["a.csv", "b.csv"]
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, expected);
        assert_eq!(fs::read_to_string(source.extract_dir.join("a.csv")).unwrap(), "2");
    }

    #[test]
    fn corrupt_archive_reports_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = source_for(dir.path(), "https://example.com/archive.zip");
        fs::create_dir_all(&source.staging_dir).unwrap();
        fs::create_dir_all(&source.extract_dir).unwrap();
        let staged = source.staging_dir.join("archive.zip");
        fs::write(&staged, "this is not a zip file").unwrap();

        let result = extract_zip(&staged, &source.extract_dir);
        assert!(matches!(result, Err(AcquisitionError::Archive { .. })));
    }
}
