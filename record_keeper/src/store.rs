//! Generic JSON-file backed record store.
//!
//! The whole collection lives in memory in insertion order and is written back
//! as a single JSON array. Writes go to a temporary file in the target's
//! directory which is then renamed over the target; an interrupted write
//! leaves the previous file intact.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StoreError};

/// A flat record that can be kept in a [`RecordStore`].
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Stable identifier of the record.
    fn id(&self) -> &str;
}

/// When mutations reach the backing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistPolicy {
    /// Every successful mutation is written before it returns.
    #[default]
    Immediate,
    /// Mutations only mark the store dirty; the caller decides when to
    /// [`RecordStore::persist`].
    Deferred,
}

/// In-memory collection of records plus its backing file.
#[derive(Debug)]
pub struct RecordStore<R> {
    path: PathBuf,
    records: Vec<R>,
    policy: PersistPolicy,
    dirty: bool,
}

impl<R: Record> RecordStore<R> {
    /// Loads the backing file. A missing file yields an empty store.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, policy: PersistPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = dedupe_by_id(load_records(&path)?);
        debug!(count = records.len(), ?policy, "record store opened");

        Ok(Self {
            path,
            records,
            policy,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> PersistPolicy {
        self.policy
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the in-memory collection differs from the last write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Index of the first record matching `pred`.
    pub fn position(&self, pred: impl Fn(&R) -> bool) -> Option<usize> {
        self.records.iter().position(pred)
    }

    /// Appends a record.
    pub fn insert(&mut self, record: R) -> Result<()> {
        debug!(id = record.id(), "inserting record");
        self.records.push(record);
        self.commit_or_undo(|records| {
            records.pop();
        })
    }

    /// Replaces the first record matching `pred`. Returns `false` and leaves
    /// the store untouched when nothing matches.
    pub fn replace_first(&mut self, pred: impl Fn(&R) -> bool, record: R) -> Result<bool> {
        let Some(index) = self.position(pred) else {
            return Ok(false);
        };
        let previous = std::mem::replace(&mut self.records[index], record);
        self.commit_or_undo(|records| records[index] = previous)?;
        Ok(true)
    }

    /// Mutates the record with the given id in place.
    pub fn modify(&mut self, id: &str, f: impl FnOnce(&mut R)) -> Result<bool> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let previous = self.records[index].clone();
        f(&mut self.records[index]);
        self.commit_or_undo(|records| records[index] = previous)?;
        Ok(true)
    }

    /// Removes every record matching `pred` and returns how many went away.
    /// Nothing is written when nothing matched.
    pub fn remove_where(&mut self, pred: impl Fn(&R) -> bool) -> Result<usize> {
        if !self.records.iter().any(&pred) {
            return Ok(0);
        }
        let snapshot = self.records.clone();
        self.records.retain(|r| !pred(r));
        let removed = snapshot.len() - self.records.len();
        self.commit_or_undo(|records| *records = snapshot)?;
        Ok(removed)
    }

    /// Marks the collection changed and writes it under the immediate policy.
    /// A failed write leaves the dirty flag as it was.
    pub fn commit(&mut self) -> Result<()> {
        let was_dirty = self.dirty;
        self.dirty = true;
        match self.policy {
            PersistPolicy::Immediate => self.persist().inspect_err(|_| self.dirty = was_dirty),
            PersistPolicy::Deferred => Ok(()),
        }
    }

    /// Commits, reverting the in-memory change with `undo` if the write fails.
    fn commit_or_undo(&mut self, undo: impl FnOnce(&mut Vec<R>)) -> Result<()> {
        self.commit().inspect_err(|err| {
            warn!(%err, "write failed, change rolled back");
            undo(&mut self.records);
        })
    }

    /// Writes the whole collection to the backing file, replacing it.
    #[instrument(skip(self), fields(path = %self.path.display(), count = self.records.len()))]
    pub fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.records).map_err(StoreError::Serialize)?;
        write_atomic(&self.path, &bytes).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        info!("records persisted");
        Ok(())
    }

    /// Persists only when something changed since the last write.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()
        } else {
            Ok(())
        }
    }
}

fn load_records<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("no record file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Keeps one record per id. A later duplicate replaces the earlier one in
/// the earlier one's position.
fn dedupe_by_id<R: Record>(records: Vec<R>) -> Vec<R> {
    let mut out: Vec<R> = Vec::with_capacity(records.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        match index.get(record.id()) {
            Some(&i) => {
                warn!(id = record.id(), "duplicate id in record file, keeping the last entry");
                out[i] = record;
            }
            None => {
                index.insert(record.id().to_string(), out.len());
                out.push(record);
            }
        }
    }
    out
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
