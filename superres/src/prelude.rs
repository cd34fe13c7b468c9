//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use superres::prelude::*;
//! ```

pub use crate::{
    CancelToken, Color, Error, Frame, MergeMethod, MergedImage, Motion, NamedFrame,
    OutlierPolicy, SamplerKind, StackConfig, StackResult, Stacker,
};
