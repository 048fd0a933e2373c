//! Read-only access to bingo records. [`DirectoryStore`] reads one JSON record per file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{BingoError, BingoResult};
use crate::live::BingoRecord;

pub trait BingoStore: Send + Sync {
    /// The active record whose slug, or failing that id, is `slug_or_id`.
    fn find_active(&self, slug_or_id: &str) -> BingoResult<BingoRecord>;
}

/// Slug matches win over id matches; inactive records never match.
fn select<'a, I>(records: I, slug_or_id: &str) -> Option<&'a BingoRecord>
where
    I: IntoIterator<Item = &'a BingoRecord>,
    I::IntoIter: Clone,
{
    let active = records.into_iter().filter(|r| r.active);
    active
        .clone()
        .find(|r| r.slug.as_deref() == Some(slug_or_id))
        .or_else(|| active.clone().find(|r| r.id == slug_or_id))
}

pub fn read_record(path: &Path) -> BingoResult<BingoRecord> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| BingoError::InvalidRecord(format!("{}: {e}", path.display())))
}

/// Records stored as `*.json` files anywhere under a directory, rescanned on every lookup.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn open(root: impl Into<PathBuf>) -> BingoResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(BingoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", root.display()),
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every readable record; unreadable files are logged and skipped.
    pub fn records(&self) -> Vec<BingoRecord> {
        let mut records = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if !is_json {
                continue;
            }
            match read_record(path) {
                Ok(record) => records.push(record),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable bingo record"),
            }
        }
        debug!(root = %self.root.display(), count = records.len(), "scanned bingo records");
        records
    }
}

impl BingoStore for DirectoryStore {
    fn find_active(&self, slug_or_id: &str) -> BingoResult<BingoRecord> {
        let records = self.records();
        select(&records, slug_or_id)
            .cloned()
            .ok_or_else(|| BingoError::NotFound(slug_or_id.to_owned()))
    }
}

/// Fixed set of records, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<BingoRecord>,
}

impl InMemoryStore {
    pub fn new(records: Vec<BingoRecord>) -> Self {
        Self { records }
    }
}

impl BingoStore for InMemoryStore {
    fn find_active(&self, slug_or_id: &str) -> BingoResult<BingoRecord> {
        select(&self.records, slug_or_id)
            .cloned()
            .ok_or_else(|| BingoError::NotFound(slug_or_id.to_owned()))
    }
}
