//! The hash store: source path to last-compiled content digest.
//!
//! The store is stored as a flat JSON object (`{"src/main.cpp": "<hex>"}`)
//! inside the build directory. It is restored once at the start of a run,
//! mutated in place while planning, and written back exactly once at the end.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kiln_common::ContentHash;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CacheError;

/// Mapping from source path to the content hash it had when last compiled.
///
/// Keys are the source paths exactly as the scanner produced them, so the
/// same tree scanned from the same root always yields the same keys. Entries
/// for sources that no longer exist are kept.
///
/// The document is JSON, so only keys that are valid UTF-8 are written out.
/// A source whose path is not is hashed and compiled like any other, but its
/// entry never survives the run and it is recompiled every time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct HashStore {
    entries: BTreeMap<PathBuf, ContentHash>,
}

impl HashStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the store at `path`.
    ///
    /// Distinguishes a missing document ([`CacheError::Missing`]) from one that
    /// could not be read ([`CacheError::Io`]) or parsed
    /// ([`CacheError::ManifestParse`]).
    pub fn try_load(path: &Path) -> Result<Self, CacheError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CacheError::Missing {
                path: path.to_path_buf(),
            },
            _ => CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        serde_json::from_str(&content).map_err(|e| CacheError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads the store at `path`, falling back to an empty store on any error.
    ///
    /// Every failure leads to a full rebuild. A missing document is the normal
    /// first-run case and is logged at info level; an unreadable or corrupt one
    /// is logged as a warning so repeated corruption is visible.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(store) => {
                tracing::debug!(
                    path = %path.display(),
                    entries = store.len(),
                    "loaded hash cache"
                );
                store
            }
            Err(e) if e.is_missing() => {
                tracing::info!(
                    path = %path.display(),
                    "no hash cache found, rebuilding everything"
                );
                Self::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unusable hash cache, rebuilding everything");
                Self::new()
            }
        }
    }

    /// Returns the recorded hash for `source`, if any.
    pub fn get(&self, source: &Path) -> Option<&ContentHash> {
        self.entries.get(source)
    }

    /// Records `hash` for `source`, returning the previous entry.
    pub fn insert(&mut self, source: PathBuf, hash: ContentHash) -> Option<ContentHash> {
        self.entries.insert(source, hash)
    }

    /// Puts back an entry as it was before an [`insert`](Self::insert).
    ///
    /// `previous` is the value `insert` returned: `Some` rewrites the old hash,
    /// `None` removes the entry entirely.
    pub fn restore(&mut self, source: &Path, previous: Option<ContentHash>) {
        match previous {
            Some(hash) => {
                self.entries.insert(source.to_path_buf(), hash);
            }
            None => {
                self.entries.remove(source);
            }
        }
    }

    /// Returns `true` if `source` has a recorded hash.
    pub fn contains(&self, source: &Path) -> bool {
        self.entries.contains_key(source)
    }

    /// Returns the number of recorded sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no source has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ContentHash)> {
        self.entries.iter().map(|(p, h)| (p.as_path(), h))
    }

    /// Writes the store to `path` as indented JSON, replacing any prior content.
    ///
    /// Creates the parent directory if it doesn't exist. Entries whose path is
    /// not valid UTF-8 are left out with a warning.
    pub fn persist(&self, path: &Path) -> Result<(), CacheError> {
        for source in self.entries.keys().filter(|p| p.to_str().is_none()) {
            tracing::warn!(
                source = %source.display(),
                "source path is not valid UTF-8, it will be recompiled every run"
            );
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl Serialize for HashStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.entries
                .iter()
                .filter_map(|(source, hash)| source.to_str().map(|key| (key, hash))),
        )
    }
}
