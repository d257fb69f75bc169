//! The canonical value contract
//!
//! Every canonical value type implements [`MetaValue`]: construction from a
//! raw primitive plus its originating tag, serialization back to each of the
//! three wire formats, a total merge operation, and a "has content" test
//! that is distinct from emptiness of the underlying primitive (a float of
//! zero is present, not empty).

use std::fmt;

use crate::core::error::MetaResult;
use crate::core::merge::{self, MergeOutcome};
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};

/// Capability set shared by all canonical metadata values
///
/// Values are immutable after construction. Parsing returns `Ok(None)` for
/// absent or degenerate input; only the date/time parser can fail, and that
/// failure is surfaced to the immediate caller of the field parser.
pub trait MetaValue: Clone + PartialEq + fmt::Display + Sized {
    /// Suppress conflict warnings for types where disagreement between
    /// sources is routine (lens specs, thumbnails, timezones)
    const QUIET: bool = false;

    /// Build a canonical value from one decoded tag value
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>>;

    /// Build a canonical value from a video-stream prober string
    ///
    /// Defaults to the generic text parse; types with their own stream
    /// packing (rotation angles, ISO 6709 position strings) override it.
    fn from_video(value: &str, tag: &Tag) -> MetaResult<Option<Self>> {
        Self::from_raw(&Raw::Text(value.to_string()), tag)
    }

    /// Serialize for writing through the Exif adapter
    fn to_exif(&self) -> Raw;

    /// Serialize for writing through the IPTC adapter
    fn to_iptc(&self) -> Raw {
        self.to_exif()
    }

    /// Serialize for writing through the XMP adapter
    fn to_xmp(&self) -> Raw;

    /// Serialize for the adapter selected by the tag's family
    fn to_raw(&self, tag: &Tag) -> Raw {
        match tag.family() {
            Family::Exif => self.to_exif(),
            Family::Iptc => self.to_iptc(),
            Family::Xmp => self.to_xmp(),
        }
    }

    /// True when the value carries meaningful content
    fn has_content(&self) -> bool;

    /// Containment test: does `self` already subsume `other`?
    ///
    /// Default is equality. Strings override with a substring test, numeric
    /// types with a tolerance band.
    fn contains(&self, other: &Self) -> bool {
        self == other
    }

    /// Concatenation policy invoked when neither side contains the other
    ///
    /// Default keeps `self` and classifies the incoming value as ignored.
    /// Strings concatenate with a separator, multi-valued collections append
    /// distinct items.
    fn concat(&self, _other: &Self) -> (Self, MergeOutcome) {
        (self.clone(), MergeOutcome::Ignored)
    }

    /// One merge step: containment keep, containment replace, or the type's
    /// concatenation policy
    ///
    /// `None` means the incoming value added nothing and no event is worth
    /// reporting.
    fn merge_item(&self, other: &Self) -> (Self, Option<MergeOutcome>) {
        if self.contains(other) {
            return (self.clone(), None);
        }
        if other.contains(self) {
            return (other.clone(), Some(MergeOutcome::Replaced));
        }
        let (result, outcome) = self.concat(other);
        (result, Some(outcome))
    }

    /// Merge a second reading of the same logical field into this value
    ///
    /// Never fails; every branch is total. `info` is an opaque label used
    /// only to annotate the outcome report.
    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        let (result, outcome) = self.merge_item(other);
        merge::log_outcome(outcome, info, tag, self, other, Self::QUIET);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // minimal value type exercising the default merge algorithm
    #[derive(Debug, Clone, PartialEq)]
    struct Word(String);

    impl fmt::Display for Word {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl MetaValue for Word {
        fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
            Ok(raw.as_str().map(|s| Word(s.to_string())))
        }

        fn to_exif(&self) -> Raw {
            Raw::Text(self.0.clone())
        }

        fn to_xmp(&self) -> Raw {
            Raw::Text(self.0.clone())
        }

        fn has_content(&self) -> bool {
            !self.0.is_empty()
        }

        fn contains(&self, other: &Self) -> bool {
            self.0.contains(&other.0)
        }
    }

    fn tag() -> Tag {
        Tag::parse("Xmp.dc.title").unwrap()
    }

    #[test]
    fn merge_keeps_superset() {
        let a = Word("metadata editor".to_string());
        let b = Word("editor".to_string());
        assert_eq!(a.merge("test", &tag(), &b), a);
    }

    #[test]
    fn merge_replaces_with_superset() {
        let a = Word("editor".to_string());
        let b = Word("metadata editor".to_string());
        assert_eq!(a.merge("test", &tag(), &b), b);
    }

    #[test]
    fn merge_conflict_keeps_self() {
        let a = Word("alpha".to_string());
        let b = Word("beta".to_string());
        assert_eq!(a.merge("test", &tag(), &b), a);
    }

    #[test]
    fn merge_is_idempotent() {
        let a = Word("alpha".to_string());
        assert_eq!(a.merge("test", &tag(), &a.clone()), a);
    }

    #[test]
    fn to_raw_dispatches_by_family() {
        let a = Word("alpha".to_string());
        let tag = Tag::parse("Exif.Image.Make").unwrap();
        assert_eq!(a.to_raw(&tag), Raw::Text("alpha".to_string()));
    }
}
