//! Bulk extraction over archive dumps.
//!
//! Every page is parsed independently, so a batch is a parallel map; one bad
//! page is recorded as a [`BatchFailure`] and never stops the rest.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use tracing::info;
use walkdir::WalkDir;

use crate::episode::{ExtractConfig, extract_episode_with_config};
use crate::metadata::EpisodeRecord;

static EPISODE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.html$").expect("filename pattern is valid"));

/// A page that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of [`extract_batch`]
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Records in input order
    pub records: Vec<EpisodeRecord>,
    /// Failures in input order
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of pages handled, successful or not
    pub fn processed(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Whether `path` is named like an episode page (`<digits>.html`)
pub fn is_episode_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| EPISODE_FILENAME_RE.is_match(name))
}

/// Expand a mix of files and directories into the pages to process.
///
/// Files are kept as given. Directories are walked recursively and
/// contribute every `<digits>.html` file, sorted by path.
pub fn collect_episode_paths<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if !input.is_dir() {
            paths.push(input.to_path_buf());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file() && is_episode_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        paths.extend(found);
    }

    paths
}

/// Extract every page in `paths` in parallel.
pub fn extract_batch(paths: &[PathBuf], config: &ExtractConfig) -> BatchReport {
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| {
            info!(path = %path.display(), "Processing file");
            (path, extract_episode_with_config(path, config.clone()))
        })
        .collect();

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(record) => report.records.push(record),
            Err(e) => report.failures.push(BatchFailure { path: path.clone(), message: e.to_string() }),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn page(id: u64, parent: &str) -> String {
        format!(
            "<html><body><h1>Title {id} [Episode {id}]</h1><h3>by Author</h3><a href=\"{parent}\">Back to episode {parent}</a></body></html>"
        )
    }

    #[test]
    fn test_is_episode_file() {
        assert!(is_episode_file(Path::new("dump/12.html")));
        assert!(!is_episode_file(Path::new("dump/index.html")));
        assert!(!is_episode_file(Path::new("dump/12.htm")));
        assert!(!is_episode_file(Path::new("dump/12.html.bak")));
    }

    #[test]
    fn test_collect_walks_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("0")).unwrap();
        fs::write(tmp.path().join("0/2.html"), "").unwrap();
        fs::write(tmp.path().join("1.html"), "").unwrap();
        fs::write(tmp.path().join("index.html"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let explicit = tmp.path().join("index.html");
        let paths = collect_episode_paths(&[tmp.path().to_path_buf(), explicit.clone()]);

        assert_eq!(paths, vec![tmp.path().join("0/2.html"), tmp.path().join("1.html"), explicit]);
    }

    #[test]
    fn test_extract_batch_keeps_going() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("1.html"), page(1, "index.html")).unwrap();
        fs::write(tmp.path().join("2.html"), page(2, "1.html")).unwrap();
        fs::write(tmp.path().join("3.html"), page(4, "2.html")).unwrap();

        let paths = collect_episode_paths(&[tmp.path()]);
        let report = extract_batch(&paths, &ExtractConfig::default());

        assert_eq!(report.processed(), 3);
        assert_eq!(report.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(report.records[0].parent_id, None);
        assert_eq!(report.records[1].parent_id, Some(1));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, tmp.path().join("3.html"));
        assert!(report.failures[0].message.contains("id cross-check"));
    }
}
