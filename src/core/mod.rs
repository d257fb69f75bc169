//! Core module
//!
//! This module contains the boundary contract with the metadata access
//! layer: the error type, the raw primitive model, fully-qualified tag
//! names, and merge-outcome reporting.

pub mod error;
pub mod merge;
pub mod raw;
pub mod tag;

pub use error::{MetaError, MetaResult};
pub use merge::MergeOutcome;
pub use raw::Raw;
pub use tag::{Family, Tag};
