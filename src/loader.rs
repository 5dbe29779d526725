//! Result file discovery, parsing and writing
//!
//! A base or diff path is either a directory (searched recursively) or a single
//! file; in both cases only files whose name ends with the configured input
//! suffix are considered.

use crate::error::{RescaleError, Result};
use crate::result_set::{ResultSet, SCHEMA_VERSION};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find every result file under `path`
///
/// Directory results are sorted so runs are reproducible regardless of the
/// order the filesystem returns entries in.
pub fn discover(path: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files = Vec::new();
        for entry in WalkDir::new(path).follow_links(true) {
            let entry = entry.map_err(|e| RescaleError::Io(e.into()))?;
            if entry.file_type().is_file() && has_suffix(entry.path(), suffix) {
                files.push(entry.into_path());
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(RescaleError::NoInputFiles {
                path: path.to_path_buf(),
                suffix: suffix.to_string(),
            });
        }

        tracing::debug!("Discovered {} result files under {}", files.len(), path.display());
        return Ok(files);
    }

    if path.is_file() && has_suffix(path, suffix) {
        return Ok(vec![path.to_path_buf()]);
    }

    Err(RescaleError::PathNotFound {
        path: path.to_path_buf(),
        suffix: suffix.to_string(),
    })
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

/// Parse and validate a result set document
///
/// `path` is only used to label errors and as the set's `source_id`.
pub fn parse(text: &str, path: &Path) -> Result<ResultSet> {
    let mut set: ResultSet =
        serde_json::from_str(text).map_err(|source| RescaleError::MalformedResultFile {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(found) = set.schema_version.filter(|v| *v != SCHEMA_VERSION) {
        return Err(RescaleError::UnsupportedSchema {
            path: path.to_path_buf(),
            expected: SCHEMA_VERSION,
            found,
        });
    }

    set.validate()
        .map_err(|reason| RescaleError::InvalidResultFile {
            path: path.to_path_buf(),
            reason,
        })?;

    set.source_id = path.display().to_string();
    Ok(set)
}

/// Read one result file from disk
pub fn load(path: &Path) -> Result<ResultSet> {
    let set = fs::read_to_string(path)
        .map_err(|source| RescaleError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|text| parse(&text, path))
        .inspect_err(|e| {
            tracing::error!("Failed to read result file {}: {}", path.display(), e);
        })?;

    tracing::debug!(
        "Loaded {} benchmarks from {}",
        set.benchmarks.len(),
        path.display()
    );
    Ok(set)
}

/// Load every file, failing on the first malformed one
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<ResultSet>> {
    paths.iter().map(|p| load(p)).collect()
}

/// Render a result set in the same schema it was read with
pub fn serialize(set: &ResultSet) -> Result<String> {
    serde_json::to_string_pretty(set).map_err(|source| RescaleError::MalformedResultFile {
        path: PathBuf::from(&set.source_id),
        source,
    })
}

/// Write a result set, creating parent directories as needed
pub fn write(set: &ResultSet, path: &Path) -> Result<()> {
    let text = serialize(set)?;

    let written = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
    .and_then(|()| fs::write(path, text));

    written.map_err(|source| {
        tracing::error!(
            "Failed to write rescaled results to {}: {}",
            path.display(),
            source
        );
        RescaleError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Where the rescaled copy of `input` goes
///
/// With an output directory the file keeps its path relative to `input_root`
/// (the directory it was discovered under), so equally named files from
/// different subdirectories stay apart. Otherwise it stays next to the input
/// with `input_suffix` swapped for `output_suffix`.
pub fn output_path(
    input: &Path,
    input_root: &Path,
    output_dir: Option<&Path>,
    input_suffix: &str,
    output_suffix: &str,
) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match output_dir {
        Some(dir) => {
            let relative = input
                .strip_prefix(input_root)
                .ok()
                .filter(|r| !r.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from(&file_name), Path::to_path_buf);
            dir.join(relative)
        }
        None => {
            let stem = file_name
                .strip_suffix(input_suffix)
                .unwrap_or(file_name.as_str());
            input.with_file_name(format!("{}{}", stem, output_suffix))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = r#"{ "Title": "t", "Benchmarks": [ { "FullName": "A.B.C", "Statistics": { "N": 3, "Mean": 1.0, "Median": 1.0 } } ] }"#;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_directory_recursive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "b-report-full.json", DOC);
        write_file(tmp.path(), "nested/a-report-full.json", DOC);
        write_file(tmp.path(), "ignored.json", DOC);

        let files = discover(tmp.path(), "full.json").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
        assert!(files.iter().all(|f| has_suffix(f, "full.json")));
    }

    #[test]
    fn test_discover_single_file() {
        let tmp = TempDir::new().unwrap();
        let file = write_file(tmp.path(), "x-report-full.json", DOC);
        assert_eq!(discover(&file, "full.json").unwrap(), vec![file]);
    }

    #[test]
    fn test_discover_file_with_wrong_suffix() {
        let tmp = TempDir::new().unwrap();
        let file = write_file(tmp.path(), "x-report.csv", DOC);
        assert!(matches!(
            discover(&file, "full.json"),
            Err(RescaleError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_discover_missing_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            discover(&missing, "full.json"),
            Err(RescaleError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_discover_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            discover(tmp.path(), "full.json"),
            Err(RescaleError::NoInputFiles { .. })
        ));
    }

    #[test]
    fn test_load_sets_source_id() {
        let tmp = TempDir::new().unwrap();
        let file = write_file(tmp.path(), "x-report-full.json", DOC);
        let set = load(&file).unwrap();
        assert_eq!(set.source_id, file.display().to_string());
        assert_eq!(set.benchmarks.len(), 1);
    }

    #[test]
    fn test_load_invalid_utf8_reports_path() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad-full.json");
        fs::write(&file, [0xff, 0xfe, b'{']).unwrap();

        let err = load(&file).unwrap_err();
        assert!(err.to_string().contains("bad-full.json"));
        match err {
            RescaleError::ReadFailed { path, source } => {
                assert_eq!(path, file);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("Expected ReadFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_reports_path() {
        let err = parse("{ not json", Path::new("broken-full.json")).unwrap_err();
        match err {
            RescaleError::MalformedResultFile { path, .. } => {
                assert_eq!(path, PathBuf::from("broken-full.json"));
            }
            other => panic!("Expected MalformedResultFile, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_future_schema() {
        let doc = r#"{ "SchemaVersion": 7, "Benchmarks": [] }"#;
        assert!(matches!(
            parse(doc, Path::new("v7-full.json")),
            Err(RescaleError::UnsupportedSchema { found: 7, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty_full_name() {
        let doc = r#"{ "Benchmarks": [ { "FullName": "" } ] }"#;
        assert!(matches!(
            parse(doc, Path::new("empty-full.json")),
            Err(RescaleError::InvalidResultFile { .. })
        ));
    }

    #[test]
    fn test_write_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let set = parse(DOC, Path::new("in-full.json")).unwrap();
        let out = tmp.path().join("deep/dir/out-full.json");

        write(&set, &out).unwrap();
        let back = load(&out).unwrap();
        assert_eq!(back.benchmarks, set.benchmarks);
    }

    #[test]
    fn test_output_path_next_to_input() {
        let out = output_path(
            Path::new("/results/unix/System.Tests-report-full.json"),
            Path::new("/results/unix"),
            None,
            "full.json",
            "rescaled.json",
        );
        assert_eq!(
            out,
            PathBuf::from("/results/unix/System.Tests-report-rescaled.json")
        );
    }

    #[test]
    fn test_output_path_into_directory() {
        let out = output_path(
            Path::new("/results/unix/System.Tests-report-full.json"),
            Path::new("/results/unix"),
            Some(Path::new("/results/rescaled")),
            "full.json",
            "rescaled.json",
        );
        assert_eq!(
            out,
            PathBuf::from("/results/rescaled/System.Tests-report-full.json")
        );
    }

    #[test]
    fn test_output_path_keeps_subdirectories_apart() {
        let root = Path::new("/results/unix");
        let out = Some(Path::new("/results/rescaled"));
        let x = output_path(&root.join("x/a-full.json"), root, out, "full.json", "rescaled.json");
        let y = output_path(&root.join("y/a-full.json"), root, out, "full.json", "rescaled.json");

        assert_eq!(x, PathBuf::from("/results/rescaled/x/a-full.json"));
        assert_eq!(y, PathBuf::from("/results/rescaled/y/a-full.json"));
    }

    #[test]
    fn test_output_path_for_single_file_input() {
        let file = Path::new("/results/unix/a-full.json");
        let out = output_path(
            file,
            file,
            Some(Path::new("/out")),
            "full.json",
            "rescaled.json",
        );
        assert_eq!(out, PathBuf::from("/out/a-full.json"));
    }
}
