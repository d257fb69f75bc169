//! Canonical value types
//!
//! Everything a metadata field can hold, from plain strings up to image
//! regions, each implementing the [`MetaValue`](value::MetaValue) contract:
//! parse from any of the three formats, serialize back to each, merge with
//! a second reading of the same field.

#[macro_use]
mod macros;

pub mod camera;
pub mod contact;
pub mod datetime;
pub mod dimensions;
pub mod gps;
mod group;
pub mod lang_alt;
pub mod location;
pub mod numeric;
pub mod rational;
pub mod region;
pub mod rights;
pub mod strings;
pub mod value;

pub use camera::{CameraModel, LensModel, LensSpec};
pub use contact::ContactInfo;
pub use datetime::DateTime;
pub use dimensions::Dimensions;
pub use gps::{Altitude, GpsInfo, Latitude, Longitude};
pub use lang_alt::LangAlt;
pub use location::{Location, MultiLocation, SingleLocation};
pub use numeric::{Float, Integer, Orientation, Rating, TimezoneOffset};
pub use rational::{Aperture, FrameRate, Rational};
pub use region::{
    CvEntry, CvTerm, ImageRegions, RegionBoundary, RegionItem, RegionShape, RegionUnit, Vertex,
    REGION_ROLES, REGION_TYPES,
};
pub use rights::Rights;
pub use strings::{Keywords, Label, MultiString, Software, Text};
pub use value::MetaValue;
