//! Fully-qualified tag names
//!
//! Tags arrive from the access layer as `"<Standard>.<group>.<field>"`
//! strings, e.g. `Exif.GPSInfo.GPSLatitude` or `Xmp.dc.description`. The
//! leading component selects which of the three format adapters a value type
//! uses when parsing or serializing.

use std::fmt;
use std::str::FromStr;

use crate::core::error::{MetaError, MetaResult};

/// The metadata standard a tag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Family {
    /// Exif tags, including MakerNote sub-groups
    Exif,
    /// IPTC-IIM datasets and IPTC extension schema tags
    Iptc,
    /// XMP properties, including embedded-video pseudo-tags
    Xmp,
}

/// A fully-qualified tag name with its format family
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    name: String,
    family: Family,
}

impl Tag {
    /// Parse a fully-qualified tag name
    ///
    /// The family is taken from the leading dot-separated component by
    /// prefix, so `Iptc4xmpExt.LocationName` is IPTC-family and
    /// `Xmp.video.DateUTC` is XMP-family.
    ///
    /// # Example
    ///
    /// ```rust
    /// use metakit::{Family, Tag};
    ///
    /// let tag = Tag::parse("Exif.GPSInfo.GPSLatitude").unwrap();
    /// assert_eq!(tag.family(), Family::Exif);
    /// assert_eq!(tag.leaf(), "GPSLatitude");
    /// ```
    pub fn parse(name: &str) -> MetaResult<Self> {
        let leading = name.split('.').next().unwrap_or("");
        let family = if leading.starts_with("Exif") {
            Family::Exif
        } else if leading.starts_with("Iptc") {
            Family::Iptc
        } else if leading.starts_with("Xmp") {
            Family::Xmp
        } else {
            return Err(MetaError::UnknownFamily(name.to_string()));
        };
        Ok(Self {
            name: name.to_string(),
            family,
        })
    }

    /// The format family selected by the tag's leading component
    pub fn family(&self) -> Family {
        self.family
    }

    /// The full tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The final dot-separated component
    pub fn leaf(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// True for timestamps and other values embedded in video streams,
    /// which use their own packing rules (epoch seconds, ISO 6709 strings)
    pub fn is_video(&self) -> bool {
        self.name.starts_with("Xmp.video")
    }
}

impl FromStr for Tag {
    type Err = MetaError;

    fn from_str(s: &str) -> MetaResult<Self> {
        Tag::parse(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
