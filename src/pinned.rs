//! Persisted order of pinned launchers.
//!
//! The dock file is a JSON object with at least a `pinned_apps` array:
//!
//! ```json
//! { "pinned_apps": ["firefox", "kitty", "org.gnome.Nautilus"] }
//! ```
//!
//! Other keys are carried through untouched.  Writes go to a temporary file
//! in the same directory which is then renamed over the original, so a
//! concurrent reader sees either the old or the new list, never a mix.

use crate::command::identity_key;
use crate::launcher::LauncherEntry;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Failure to read or write the dock file.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dock file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// A drag referred to an entry that does not exist.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("reorder index {index} out of range (have {len} entries)")]
pub struct ReorderError {
    pub index: usize,
    pub len: usize,
}

/// On-disk layout of the dock file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DockFile {
    #[serde(default)]
    pinned_apps: Vec<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Owner of the pinned order and its backing file.
#[derive(Debug)]
pub struct PinnedStore {
    path: PathBuf,
    file: DockFile,
}

impl PinnedStore {
    /// Load the dock file at `path`.
    ///
    /// A missing file means nothing is pinned.  Duplicate identities
    /// (compared case-insensitively) are dropped, keeping the first.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let mut file: DockFile = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| {
                PersistenceError::Json {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no dock file at {}, nothing pinned", path.display());
                DockFile::default()
            }
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        let before = file.pinned_apps.len();
        file.pinned_apps = dedup_identities(file.pinned_apps);
        if file.pinned_apps.len() != before {
            warn!("dropped {} duplicate pinned app(s)", before - file.pinned_apps.len());
        }
        Ok(Self { path, file })
    }

    /// An empty store that will write to `path` on the first persist.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: DockFile::default(),
        }
    }

    /// The current pinned order.
    pub fn order(&self) -> &[String] {
        &self.file.pinned_apps
    }

    /// Replace the pinned order on disk, then in memory.
    ///
    /// On failure the in-memory order is left as it was, so the next
    /// successful persist writes a consistent list.
    pub fn persist(&mut self, order: Vec<String>) -> Result<(), PersistenceError> {
        let order = dedup_identities(order);
        let record = DockFile {
            pinned_apps: order,
            extra: self.file.extra.clone(),
        };
        write_atomically(&self.path, &record)?;
        debug!("wrote {} pinned app(s) to {}", record.pinned_apps.len(), self.path.display());
        self.file = record;
        Ok(())
    }
}

/// Move the entry at `source` to position `target`.
pub fn reorder(
    source: usize,
    target: usize,
    entries: &[LauncherEntry],
) -> Result<Vec<LauncherEntry>, ReorderError> {
    let len = entries.len();
    for index in [source, target] {
        if index >= len {
            return Err(ReorderError { index, len });
        }
    }
    let mut entries = entries.to_vec();
    if source != target {
        let moved = entries.remove(source);
        entries.insert(target, moved);
    }
    Ok(entries)
}

/// Identities of the pinned entries, in list order.
pub fn pinned_order(entries: &[LauncherEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|e| e.pinned)
        .map(|e| e.app_identity.clone())
        .collect()
}

fn dedup_identities(order: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(order.len());
    order
        .into_iter()
        .filter(|app| {
            let key = identity_key(app);
            if key.is_empty() || seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        })
        .collect()
}

fn write_atomically(path: &Path, record: &DockFile) -> Result<(), PersistenceError> {
    let io_err = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    serde_json::to_writer_pretty(&mut tmp, record).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(b"\n").map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|source| PersistenceError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
