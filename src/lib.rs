//! # metakit
//!
//! A canonical value model for photographic metadata.
//!
//! Photo and video files carry the same logical information in up to three
//! incompatible standards: Exif, IPTC-IIM and XMP. This crate normalizes
//! already-decoded per-tag primitives from any of the three into one
//! semantically-typed in-memory value, and reconciles conflicting readings
//! of the same logical field deterministically.
//!
//! It deliberately does *not* parse file containers; an external metadata
//! access layer decodes raw bytes into [`Raw`] primitives and picks which
//! tags exist. This crate owns what happens after that:
//!
//! - every value type parses itself from a `(tag, raw)` pair and
//!   serializes itself back to each format ([`MetaValue`]),
//! - two readings of the same field merge into one, never failing, with
//!   the outcome classified as merged, ignored or replaced,
//! - dozens of format edge cases (truncated IPTC dates, Apple 1904 epoch
//!   timestamps, GPS sign conventions, lens "n/a" sentinels) are absorbed
//!   behind that one contract.
//!
//! ## Example
//!
//! ```rust
//! use metakit::{MetaValue, Raw, Tag, Text};
//!
//! let tag: Tag = "Xmp.dc.title".parse()?;
//! let short = Text::from_raw(&Raw::Text("Sunset".into()), &tag)?.unwrap();
//! let long = Text::from_raw(&Raw::Text("Sunset over the bay".into()), &tag)?.unwrap();
//!
//! // the longer reading subsumes the shorter one
//! let merged = short.merge("IMG_0001.jpg", &tag, &long);
//! assert_eq!(merged.as_str(), "Sunset over the bay");
//! # Ok::<(), metakit::MetaError>(())
//! ```

pub mod core;
pub mod types;
pub mod utils;

pub use crate::core::{Family, MergeOutcome, MetaError, MetaResult, Raw, Tag};
pub use crate::types::{
    Altitude, Aperture, CameraModel, ContactInfo, CvEntry, CvTerm, DateTime, Dimensions, Float,
    FrameRate, GpsInfo, ImageRegions, Integer, Keywords, Label, LangAlt, LensModel, LensSpec,
    Latitude, Location, Longitude, MetaValue, MultiLocation, MultiString, Orientation, Rating,
    Rational, RegionBoundary, RegionItem, RegionShape, RegionUnit, Rights, SingleLocation,
    Software, Text, TimezoneOffset, Vertex,
};
