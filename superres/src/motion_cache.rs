//! Persisted motions keyed by frame name.
//!
//! The file is a JSON object mapping each frame identifier, exactly as the caller
//! supplied it, to `{"X": dx, "Y": dy, "Diff": diff}`. Two spellings of the same
//! path are distinct entries.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::motion::Motion;

/// In-memory motion cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MotionCache {
    entries: BTreeMap<String, Motion>,
}

impl MotionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the cache at `path`. A missing file yields an empty cache.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No motion cache at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(Error::ReadMotionCache {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let cache: Self =
            serde_json::from_slice(&bytes).map_err(|source| Error::MalformedMotionCache {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Loaded {} cached motions from {}",
            cache.len(),
            path.display()
        );
        Ok(cache)
    }

    /// Replaces the file at `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let write_error = |source| Error::WriteMotionCache {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_vec_pretty(self).map_err(|e| write_error(io::Error::from(e)))?;
        common::file_utils::write_atomic(path, &json).map_err(write_error)?;

        tracing::debug!("Saved {} motions to {}", self.len(), path.display());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Motion> {
        self.entries.get(name).copied()
    }

    /// Inserts or replaces the motion of `name`.
    pub fn insert(&mut self, name: impl Into<String>, motion: Motion) {
        self.entries.insert(name.into(), motion);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Motion)> {
        self.entries.iter().map(|(name, motion)| (name.as_str(), *motion))
    }
}
