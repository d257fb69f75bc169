//! Integer and float values
//!
//! Truthiness is redefined as "is present": an orientation of 0 or a rating
//! of 0.0 still counts as content. Exif wants integers written as integers;
//! IPTC and XMP take the decimal rendering.

use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::value::MetaValue;

/// A plain integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Integer(i64);

impl Integer {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaValue for Integer {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(raw.coerce_int().map(Integer))
    }

    fn to_exif(&self) -> Raw {
        Raw::Int(self.0)
    }

    fn to_iptc(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// A plain float value
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Float(f64);

impl Float {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaValue for Float {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(raw.coerce_float().map(Float))
    }

    fn to_exif(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// Exif orientation, 1..=8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orientation(i64);

impl Orientation {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaValue for Orientation {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(raw.coerce_int().map(Orientation))
    }

    // video streams report a rotation angle instead of an Exif orientation
    fn from_video(value: &str, _tag: &Tag) -> MetaResult<Option<Self>> {
        let orientation = match value.trim() {
            "0" => 1,
            "90" => 6,
            "180" => 3,
            "-90" => 8,
            other => {
                tracing::warn!("unrecognised orientation {:?}", other);
                return Ok(None);
            }
        };
        Ok(Some(Orientation(orientation)))
    }

    fn to_exif(&self) -> Raw {
        Raw::Int(self.0)
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// Timezone offset in minutes east of UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimezoneOffset(i64);

impl TimezoneOffset {
    pub fn new(minutes: i64) -> Self {
        Self(minutes)
    }

    pub fn minutes(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TimezoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaValue for TimezoneOffset {
    const QUIET: bool = true;

    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw.coerce_int() {
            Some(value) => value,
            None => return Ok(None),
        };
        // this tag stores whole hours
        let minutes = if tag.name() == "Exif.Image.TimeZoneOffset" {
            value * 60
        } else {
            value
        };
        Ok(Some(TimezoneOffset(minutes)))
    }

    fn to_exif(&self) -> Raw {
        Raw::Int(self.0)
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// Star rating, -1.0 (rejected) to 5.0
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rating(f64);

impl Rating {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(-1.0, 5.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MetaValue for Rating {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        if raw.is_empty() || matches!(raw, Raw::Int(0)) {
            return Ok(None);
        }
        let value = match raw.coerce_float() {
            Some(value) => value,
            None => return Ok(None),
        };
        // Microsoft tags rate on a percent scale
        let rating = if matches!(
            tag.name(),
            "Exif.Image.RatingPercent" | "Xmp.MicrosoftPhoto.Rating"
        ) {
            1.0 + value / 25.0
        } else {
            value.clamp(-1.0, 5.0)
        };
        Ok(Some(Rating(rating)))
    }

    fn to_exif(&self) -> Raw {
        Raw::Text((((self.0 + 1.5).floor() as i64) - 1).to_string())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.to_string())
    }

    fn has_content(&self) -> bool {
        true
    }
}
