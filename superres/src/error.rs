//! Error types for alignment and merging.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors of the alignment and merge engine.
///
/// Recoverable conditions (out-of-gamut colors, undefined distances, offsets
/// without overlap, a motion cache that cannot be written) are logged and
/// handled in place instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No frames provided for stacking")]
    NoFrames,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read motion cache '{path}': {source}")]
    ReadMotionCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed motion cache '{path}': {source}")]
    MalformedMotionCache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write motion cache '{path}': {source}")]
    WriteMotionCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
