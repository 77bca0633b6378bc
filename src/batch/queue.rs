use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::error::{Result, MangaBatchError};

/// One image queued for the external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
    pub index: usize,
}

/// Ordered images for a single batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQueue {
    items: Vec<WorkItem>,
}

impl JobQueue {
    fn from_paths(paths: Vec<PathBuf>) -> Self {
        let items = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| WorkItem { path, index })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorkItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.items.iter().map(|item| item.path.as_path()).collect()
    }
}

impl<'a> IntoIterator for &'a JobQueue {
    type Item = &'a WorkItem;
    type IntoIter = std::slice::Iter<'a, WorkItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// File name rule deciding which entries are queued
#[derive(Debug, Clone)]
pub struct ImageFilter {
    image_suffix: String,
    translated_marker: String,
}

impl ImageFilter {
    pub fn new<S1: Into<String>, S2: Into<String>>(image_suffix: S1, translated_marker: S2) -> Self {
        Self {
            image_suffix: image_suffix.into(),
            translated_marker: translated_marker.into(),
        }
    }

    /// Case-sensitive suffix match on the bare file name
    pub fn accepts(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.image_suffix) && !file_name.ends_with(&self.translated_marker)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for ImageFilter {
    fn from(config: &ScanConfig) -> Self {
        Self::new(&config.image_suffix, &config.translated_marker)
    }
}

/// Build the processing queue for `root`.
///
/// The root's direct entries are sorted by name and, when `start` is given,
/// everything before the entry named like `start` is skipped. Directories are
/// walked top-down with files before subdirectories, each sorted by name;
/// qualifying files at the root are taken as they come. Finally every
/// qualifying file directly under the root is appended again in directory
/// listing order, so root files that were already collected appear twice.
pub fn enumerate_work_items(
    root: &Path,
    start: Option<&Path>,
    filter: &ImageFilter,
) -> Result<JobQueue> {
    if !root.is_dir() {
        return Err(MangaBatchError::PathNotFound(root.to_path_buf()));
    }
    let root = std::path::absolute(root)?;

    let mut entries = list_names(&root)?;
    entries.sort();

    let start_index = match start {
        Some(start) => start_position(&root, start, &entries)?,
        None => 0,
    };

    let mut files = Vec::new();
    for name in &entries[start_index..] {
        let path = root.join(name);
        if path.is_dir() {
            collect_tree(&path, filter, &mut files);
        } else if filter.accepts(&name.to_string_lossy()) {
            files.push(path);
        }
    }

    for name in list_names(&root)? {
        let path = root.join(&name);
        if !path.is_dir() && filter.accepts(&name.to_string_lossy()) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(MangaBatchError::EmptyQueue(root));
    }

    info!("Found {} files to process under {}", files.len(), root.display());
    Ok(JobQueue::from_paths(files))
}

fn list_names(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name());
    }
    Ok(names)
}

fn start_position(root: &Path, start: &Path, entries: &[OsString]) -> Result<usize> {
    if !start.exists() && !root.join(start).exists() {
        return Err(MangaBatchError::PathNotFound(start.to_path_buf()));
    }

    let not_found = || MangaBatchError::StartPointNotFound {
        root: root.to_path_buf(),
        name: start.display().to_string(),
    };

    let name = start.file_name().ok_or_else(not_found)?;
    let index = entries.iter().position(|entry| entry == name).ok_or_else(not_found)?;
    debug!("Starting from entry {} ({:?})", index, name);
    Ok(index)
}

// Files of a directory come before its subdirectories; both sorted by name.
fn walk_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn collect_tree(dir: &Path, filter: &ImageFilter, files: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(dir).min_depth(1).sort_by(walk_order);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.path().is_file() && filter.accepts(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
}
