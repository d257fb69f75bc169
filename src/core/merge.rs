//! Merge outcome classification and reporting
//!
//! Merging two readings of the same logical field always succeeds; the only
//! observable difference between branches is the outcome class, emitted as a
//! `tracing` event for the caller to surface. The `info` label is an opaque
//! caller-supplied identifier (typically a file name) and has no effect on
//! merge results.

use std::fmt::Display;

use crate::core::tag::Tag;

/// What a merge did with the incoming value
///
/// Purely informational; no merge behavior depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeOutcome {
    /// The two values were combined into a new one
    Merged,
    /// The incoming value conflicted and was dropped
    Ignored,
    /// The incoming value superseded the existing one
    Replaced,
}

pub(crate) fn log_merged(info: &str, tag: &Tag) {
    tracing::info!("{}: merged {}", info, tag);
}

pub(crate) fn log_ignored(info: &str, tag: &Tag, value: &dyn Display, quiet: bool) {
    if quiet {
        tracing::info!("{}: ignored {} {:?}", info, tag, value.to_string());
    } else {
        tracing::warn!("{}: ignored {} {:?}", info, tag, value.to_string());
    }
}

pub(crate) fn log_replaced(
    info: &str,
    tag: &Tag,
    old: &dyn Display,
    new: &dyn Display,
    quiet: bool,
) {
    if quiet {
        tracing::info!(
            "{}: {:?} replaced by {} {:?}",
            info,
            old.to_string(),
            tag,
            new.to_string()
        );
    } else {
        tracing::warn!(
            "{}: {:?} replaced by {} {:?}",
            info,
            old.to_string(),
            tag,
            new.to_string()
        );
    }
}

/// Emit the event matching a merge outcome
pub(crate) fn log_outcome(
    outcome: Option<MergeOutcome>,
    info: &str,
    tag: &Tag,
    old: &dyn Display,
    new: &dyn Display,
    quiet: bool,
) {
    match outcome {
        None => {}
        Some(MergeOutcome::Merged) => log_merged(info, tag),
        Some(MergeOutcome::Ignored) => log_ignored(info, tag, new, quiet),
        Some(MergeOutcome::Replaced) => log_replaced(info, tag, old, new, quiet),
    }
}
