//! Shared machinery for repeatable groups
//!
//! A repeatable group is an ordered sequence of structured items of one
//! element type (locations, image regions). Merging inserts or updates by
//! an identity function specific to the element type: exact equality by
//! default, overridable for one-and-only slots or external-identifier
//! matches.

use crate::core::merge;
use crate::core::tag::Tag;
use crate::types::value::MetaValue;

/// Drop duplicates and trailing empty items
pub(crate) fn normalize<T: MetaValue>(items: Vec<T>) -> Vec<T> {
    let mut result: Vec<T> = Vec::new();
    for item in items {
        if !result.contains(&item) {
            result.push(item);
        }
    }
    while result.last().map(|item| !item.has_content()).unwrap_or(false) {
        result.pop();
    }
    result
}

/// Merge `incoming` into `existing` item by item
///
/// `index` locates the slot an incoming item belongs to; an index past the
/// end means "new item, append".
pub(crate) fn merge_into<T, F>(
    existing: &[T],
    incoming: &[T],
    info: &str,
    tag: &Tag,
    index: F,
) -> Vec<T>
where
    T: MetaValue,
    F: Fn(&[T], &T) -> usize,
{
    let mut result = existing.to_vec();
    for item in incoming {
        let idx = index(&result, item);
        if idx < result.len() {
            let merged = result[idx].merge(info, tag, item);
            result[idx] = merged;
        } else {
            merge::log_outcome(
                Some(crate::core::merge::MergeOutcome::Merged),
                info,
                tag,
                item,
                item,
                T::QUIET,
            );
            result.push(item.clone());
        }
        result = normalize(result);
    }
    result
}
