//! Line-list loading for the list-backed checkers
//!
//! List files are UTF-8 text with one item per line. Blank lines are
//! skipped, `#` introduces a full-line or trailing comment, and every
//! surviving item is trimmed and lowercased.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Failure while loading a list file, with the offending path attached.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to open file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error reading file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("loader task failed: {0}")]
    Task(String),
}

/// Loads item lists from files or strings.
#[derive(Debug, Default, Clone)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load items from a text file.
    ///
    /// Order is preserved and duplicates are kept; downstream sets dedupe.
    ///
    /// # Arguments
    /// * `path` - File to read
    ///
    /// # Returns
    /// * `Ok(items)` with the cleaned, lowercased entries
    /// * `Err(LoadError)` if the file is missing or unreadable
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut items = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if let Some(item) = clean_line(&line) {
                items.push(item);
            }
        }

        debug!("Loaded {} items from {}", items.len(), path.display());
        Ok(items)
    }

    /// Load items from multiple files, removing duplicates by first
    /// occurrence.
    pub fn load_from_files(
        &self,
        paths: &[impl AsRef<Path>],
    ) -> Result<Vec<String>, LoadError> {
        let mut all_items = Vec::new();
        for path in paths {
            all_items.extend(self.load_from_file(path)?);
        }
        Ok(remove_duplicates(all_items))
    }

    /// Load items from string content, using the same line discipline as
    /// [`load_from_file`](Self::load_from_file).
    pub fn load_from_string(&self, content: &str) -> Vec<String> {
        content.lines().filter_map(clean_line).collect()
    }
}

/// Loads many list files concurrently, bounded by a worker cap.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    loader: FileLoader,
    max_workers: usize,
}

impl BatchLoader {
    pub fn new(max_workers: usize) -> Self {
        Self {
            loader: FileLoader::new(),
            max_workers: max_workers.max(1),
        }
    }

    /// Load items from multiple files with up to `max_workers` concurrent
    /// reads. On any failure the first error observed is returned and the
    /// remaining results are discarded. The merged output is deduplicated by
    /// first occurrence.
    pub async fn load_parallel(
        &self,
        paths: &[impl AsRef<Path>],
    ) -> Result<Vec<String>, LoadError> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for (index, path) in paths.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let loader = self.loader.clone();
            let path = path.as_ref().to_path_buf();
            tasks.spawn(async move {
                // Acquire never fails: the semaphore is not closed.
                let _permit = semaphore.acquire_owned().await.ok();
                let loaded = tokio::task::spawn_blocking(move || loader.load_from_file(&path))
                    .await
                    .map_err(|e| LoadError::Task(e.to_string()))?;
                loaded.map(|items| (index, items))
            });
        }

        let mut per_file: Vec<Option<Vec<String>>> = vec![None; paths.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, items) = joined.map_err(|e| LoadError::Task(e.to_string()))??;
            per_file[index] = Some(items);
        }

        let all_items = per_file.into_iter().flatten().flatten().collect();
        Ok(remove_duplicates(all_items))
    }
}

/// Trim, drop comments, lowercase. Returns `None` when nothing survives.
fn clean_line(line: &str) -> Option<String> {
    let mut line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Some(comment_index) = line.find('#') {
        line = line[..comment_index].trim_end();
    }
    if line.is_empty() {
        None
    } else {
        Some(line.to_lowercase())
    }
}

/// Remove duplicates preserving the order of first occurrences.
fn remove_duplicates(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
