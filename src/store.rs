//! Durable record of already-relayed entry ids.
//!
//! The on-disk format is a single JSON array of strings, e.g.
//! `["101","103"]`.  A missing file means "nothing sent yet".  Every save
//! replaces the whole file: the new contents go to a sibling temp file which
//! is then renamed over the target, so a crash mid-write leaves either the
//! old or the new array on disk, never half of one.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{RelayError, Result};

/// Ordered, append-only set of ids that have been delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentIds {
    /// Insertion order, as persisted.
    ids: Vec<String>,
    /// Fast membership lookup.
    seen: HashSet<String>,
}

impl SentIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has already been relayed.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Append `id`.  Returns `false` (and changes nothing) if it was already
    /// present.
    pub fn push(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if !self.seen.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl FromIterator<String> for SentIds {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SentIds::new();
        for id in iter {
            set.push(id);
        }
        set
    }
}

/// Persistence for [`SentIds`].
///
/// Single process, single writer: implementations need no locking.
pub trait IdStore {
    /// Read the persisted set.  Absent storage yields an empty set.
    fn load(&self) -> Result<SentIds>;

    /// Replace the persisted set with `ids`.
    fn save(&self, ids: &SentIds) -> Result<()>;
}

/// [`IdStore`] backed by one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_err(&self, source: io::Error) -> RelayError {
        RelayError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl IdStore for JsonFileStore {
    fn load(&self) -> Result<SentIds> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SentIds::new()),
            Err(source) => {
                return Err(RelayError::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let ids: Vec<String> =
            serde_json::from_str(&content).map_err(|source| RelayError::CorruptStore {
                path: self.path.clone(),
                source,
            })?;

        Ok(ids.into_iter().collect())
    }

    fn save(&self, ids: &SentIds) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
            }
        }

        let json = serde_json::to_vec(ids.as_slice()).map_err(|e| self.write_err(e.into()))?;

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).map_err(|e| self.write_err(e))?;
        file.write_all(&json).map_err(|e| self.write_err(e))?;
        file.sync_all().map_err(|e| self.write_err(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.write_err(e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
