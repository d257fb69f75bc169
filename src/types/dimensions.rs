//! Image and video dimensions

use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::numeric::Integer;
use crate::types::rational::FrameRate;
use crate::types::value::MetaValue;

/// Pixel dimensions, plus frame count and rate for video
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    width: Option<Integer>,
    height: Option<Integer>,
    frames: Option<Integer>,
    frame_rate: Option<FrameRate>,
}

impl Dimensions {
    pub fn new(
        width: Option<Integer>,
        height: Option<Integer>,
        frames: Option<Integer>,
        frame_rate: Option<FrameRate>,
    ) -> Self {
        Self {
            width,
            height,
            frames,
            frame_rate,
        }
    }

    pub fn width(&self) -> Option<i64> {
        self.width.map(|w| w.value())
    }

    pub fn height(&self) -> Option<i64> {
        self.height.map(|h| h.value())
    }

    pub fn frames(&self) -> Option<i64> {
        self.frames.map(|f| f.value())
    }

    pub fn frame_rate(&self) -> Option<&FrameRate> {
        self.frame_rate.as_ref()
    }

    /// Video duration in seconds, zero when unknown
    pub fn duration(&self) -> f64 {
        match (&self.frames, &self.frame_rate) {
            (Some(frames), Some(rate)) if rate.to_f64() != 0.0 => {
                frames.value() as f64 / rate.to_f64()
            }
            _ => 0.0,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let (Some(width), Some(height)) = (&self.width, &self.height) {
            lines.push(format!("{}x{}", width, height));
        }
        if let Some(frames) = &self.frames {
            lines.push(format!("frames: {}", frames));
        }
        if let Some(rate) = &self.frame_rate {
            lines.push(format!("frame rate: {}", rate));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for Dimensions {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            Raw::List(items) => {
                let int_field = |idx: usize| {
                    items
                        .get(idx)
                        .filter(|raw| !raw.is_empty())
                        .and_then(|raw| Integer::from_raw(raw, tag).ok().flatten())
                };
                let frame_rate = items
                    .get(3)
                    .filter(|raw| !raw.is_empty())
                    .and_then(|raw| FrameRate::from_raw(raw, tag).ok().flatten());
                Self::new(int_field(0), int_field(1), int_field(2), frame_rate)
            }
            Raw::Map(map) => {
                let int_field = |key: &str| {
                    map.get(key)
                        .and_then(|raw| Integer::from_raw(raw, tag).ok().flatten())
                };
                let frame_rate = map
                    .get("frame_rate")
                    .and_then(|raw| FrameRate::from_raw(raw, tag).ok().flatten());
                Self::new(
                    int_field("width"),
                    int_field("height"),
                    int_field("frames"),
                    frame_rate,
                )
            }
            _ => return Ok(None),
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(vec![
            self.width.as_ref().map(MetaValue::to_exif).into(),
            self.height.as_ref().map(MetaValue::to_exif).into(),
            self.frames.as_ref().map(MetaValue::to_exif).into(),
            self.frame_rate.as_ref().map(MetaValue::to_exif).into(),
        ])
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(vec![
            self.width.as_ref().map(MetaValue::to_xmp).into(),
            self.height.as_ref().map(MetaValue::to_xmp).into(),
            self.frames.as_ref().map(MetaValue::to_xmp).into(),
            self.frame_rate.as_ref().map(MetaValue::to_xmp).into(),
        ])
    }

    fn has_content(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.frames.is_some()
            || self.frame_rate.is_some()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag; width, height, frames, frame_rate)
    }
}
