//! GPS coordinates, altitude, and the bundled GPS record
//!
//! Exif stores a coordinate as three degree/minute/second fractions plus a
//! hemisphere letter in a separate tag; XMP packs the same thing into a
//! `"D,M[,S]H"` string with the hemisphere letter appended. Altitude is a
//! magnitude with a separate below-sea-level flag. Signs are folded into the
//! canonical value on parse and split back out on serialization.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::core::error::MetaResult;
use crate::core::merge::MergeOutcome;
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};
use crate::types::rational::{
    fraction_f64, fraction_from_raw, fraction_from_text, fraction_text, limit_denominator,
    ratio_raw, DENOMINATOR_LIMIT,
};
use crate::types::strings::Label;
use crate::types::value::MetaValue;

/// Coordinates closer than this (in degrees) are the same place
const SAME_PLACE: f64 = 0.000_001;

fn from_integer(value: BigInt) -> BigRational {
    BigRational::from_integer(value)
}

/// Parse the Exif representation: `[[d, m, s], reference]`
fn coord_from_exif(raw: &Raw) -> Option<BigRational> {
    let items = raw.as_list()?;
    let (value, reference) = match items {
        [value, reference] => (value, reference),
        _ => return None,
    };
    if value.is_empty() || reference.is_empty() {
        return None;
    }
    let parts = value.as_list()?;
    let mut numbers = parts.iter().map(|p| fraction_from_raw(p, false));
    let degrees = numbers.next().flatten()?;
    let minutes = numbers.next().flatten().unwrap_or_else(BigRational::zero);
    let seconds = numbers.next().flatten().unwrap_or_else(BigRational::zero);
    let mut degrees = degrees
        + minutes / from_integer(BigInt::from(60))
        + seconds / from_integer(BigInt::from(3600));
    if matches!(reference.as_str(), Some("S") | Some("W")) {
        degrees = -degrees;
    }
    Some(degrees)
}

/// Parse the XMP representation: `"D,M[,S]H"` with a trailing hemisphere
/// letter
///
/// A leading sign is non-conformant but occurs in the wild; it is honoured
/// with a warning.
fn coord_from_xmp(value: &str) -> Option<BigRational> {
    let mut value = value.trim();
    if value.is_empty() {
        return None;
    }
    let mut negative = false;
    match value.chars().last() {
        Some(reference @ ('N' | 'E' | 'S' | 'W')) => {
            negative = matches!(reference, 'S' | 'W');
            value = &value[..value.len() - 1];
        }
        _ => tracing::warn!("no direction in XMP GPSCoordinate: {}", value),
    }
    if let Some(stripped) = value.strip_prefix(['+', '-']) {
        tracing::warn!("incorrect use of signed XMP GPSCoordinate: {}", value);
        if value.starts_with('-') {
            negative = !negative;
        }
        value = stripped;
    }
    let mut parts = value.split(',');
    let mut degrees = fraction_from_text(parts.next()?, false)?;
    if let Some(minutes) = parts.next().and_then(|p| fraction_from_text(p, false)) {
        degrees += minutes / from_integer(BigInt::from(60));
    }
    if let Some(seconds) = parts.next().and_then(|p| fraction_from_text(p, false)) {
        degrees += seconds / from_integer(BigInt::from(3600));
    }
    if negative {
        degrees = -degrees;
    }
    Some(degrees)
}

/// Decompose into integer degrees and minutes plus a fractional-second
/// remainder (not mandated by Exif, but what every writer produces)
fn coord_to_exif(value: &BigRational) -> (Vec<BigRational>, bool) {
    let pstv = !value.is_negative();
    let degrees = value.abs();
    let whole_degrees = from_integer(degrees.to_integer());
    let minutes = (&degrees - &whole_degrees) * from_integer(BigInt::from(60));
    let whole_minutes = from_integer(minutes.to_integer());
    let seconds = (&minutes - &whole_minutes) * from_integer(BigInt::from(60));
    let seconds = limit_denominator(&seconds, DENOMINATOR_LIMIT);
    (vec![whole_degrees, whole_minutes, seconds], pstv)
}

fn coord_to_xmp(value: &BigRational) -> (String, bool) {
    let (numbers, pstv) = coord_to_exif(value);
    if numbers.iter().all(BigRational::is_integer) {
        let rendered = numbers
            .iter()
            .map(|n| n.to_integer().to_string())
            .collect::<Vec<_>>()
            .join(",");
        return (rendered, pstv);
    }
    let degrees = numbers[0].to_integer();
    let minutes = fraction_f64(&numbers[1]) + fraction_f64(&numbers[2]) / 60.0;
    (format!("{},{:.8}", degrees, minutes), pstv)
}

fn coord_from_raw(raw: &Raw, tag: &Tag) -> Option<BigRational> {
    match tag.family() {
        Family::Exif => coord_from_exif(raw),
        _ => coord_from_xmp(raw.as_str()?),
    }
}

macro_rules! coordinate_type {
    ($name:ident, $negative:literal, $positive:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(BigRational);

        impl $name {
            pub fn new(degrees: BigRational) -> Self {
                Self(degrees)
            }

            /// Parse decimal degrees (e.g. from a map widget or a video
            /// stream position string)
            pub fn from_degrees(text: &str) -> Option<Self> {
                let value = fraction_from_text(text.trim(), true)?;
                Some(Self(value))
            }

            pub fn degrees(&self) -> &BigRational {
                &self.0
            }

            pub fn to_f64(&self) -> f64 {
                fraction_f64(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.6}", self.to_f64())
            }
        }

        impl MetaValue for $name {
            fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
                Ok(coord_from_raw(raw, tag).map(Self))
            }

            fn to_exif(&self) -> Raw {
                let (numbers, pstv) = coord_to_exif(&self.0);
                let reference = if pstv { $positive } else { $negative };
                Raw::List(vec![
                    Raw::List(numbers.iter().map(ratio_raw).collect()),
                    Raw::Text(reference.to_string()),
                ])
            }

            fn to_xmp(&self) -> Raw {
                let (rendered, pstv) = coord_to_xmp(&self.0);
                let reference = if pstv { $positive } else { $negative };
                Raw::Text(format!("{}{}", rendered, reference))
            }

            fn has_content(&self) -> bool {
                true
            }
        }
    };
}

coordinate_type!(Latitude, "S", "N");
coordinate_type!(Longitude, "W", "E");

/// Altitude in metres, negative below sea level
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Altitude(BigRational);

impl Altitude {
    pub fn new(metres: BigRational) -> Self {
        Self(metres)
    }

    pub fn metres(&self) -> &BigRational {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        fraction_f64(&self.0)
    }
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl MetaValue for Altitude {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        let items = match raw.as_list() {
            Some(items) => items,
            None => return Ok(fraction_from_raw(raw, true).map(Self)),
        };
        let null = Raw::Null;
        let (value, reference) = match items {
            [value, reference] => (value, reference),
            [value] => (value, &null),
            _ => return Ok(None),
        };
        if value.is_empty() || reference.is_empty() {
            return Ok(None);
        }
        let mut altitude = match fraction_from_raw(value, true) {
            Some(altitude) => altitude,
            None => return Ok(None),
        };
        let below_sea_level = match reference {
            Raw::Bytes(b) => b.first() == Some(&1),
            Raw::Text(s) => s == "1",
            Raw::Int(i) => *i == 1,
            _ => false,
        };
        if below_sea_level {
            altitude = -altitude;
        }
        Ok(Some(Self(altitude)))
    }

    fn to_exif(&self) -> Raw {
        let reference = if self.0.is_negative() { 1u8 } else { 0u8 };
        Raw::List(vec![ratio_raw(&self.0.abs()), Raw::Bytes(vec![reference])])
    }

    fn to_xmp(&self) -> Raw {
        let reference = if self.0.is_negative() { "1" } else { "0" };
        Raw::List(vec![
            Raw::Text(fraction_text(&self.0.abs())),
            Raw::Text(reference.to_string()),
        ])
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// The GPS bundle: version, processing method, altitude, latitude,
/// longitude
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsInfo {
    version_id: Vec<u8>,
    method: Option<Label>,
    alt: Option<Altitude>,
    lat: Option<Latitude>,
    lon: Option<Longitude>,
}

impl GpsInfo {
    pub fn new(
        method: Option<Label>,
        alt: Option<Altitude>,
        lat: Option<Latitude>,
        lon: Option<Longitude>,
    ) -> Self {
        Self {
            version_id: vec![2, 0, 0, 0],
            method,
            alt,
            lat,
            lon,
        }
    }

    pub fn method(&self) -> Option<&Label> {
        self.method.as_ref()
    }

    pub fn altitude(&self) -> Option<&Altitude> {
        self.alt.as_ref()
    }

    pub fn latitude(&self) -> Option<&Latitude> {
        self.lat.as_ref()
    }

    pub fn longitude(&self) -> Option<&Longitude> {
        self.lon.as_ref()
    }

    fn from_exif(items: &[Raw], tag: &Tag) -> Option<Self> {
        let field = |idx: usize| items.get(idx).cloned().unwrap_or(Raw::Null);
        let version_id = match field(0) {
            Raw::Bytes(b) if !b.is_empty() => b,
            _ => vec![2, 0, 0, 0],
        };
        let method = field(1)
            .as_str()
            .map(|s| s.trim_start_matches("charset=Ascii ").trim())
            .filter(|s| !s.is_empty())
            .map(Label::new);
        let alt = Altitude::from_raw(&Raw::List(vec![field(2), field(3)]), tag)
            .ok()
            .flatten();
        let lat = coord_from_exif(&Raw::List(vec![field(4), field(5)])).map(Latitude::new);
        let lon = coord_from_exif(&Raw::List(vec![field(6), field(7)])).map(Longitude::new);
        Some(Self {
            version_id,
            method,
            alt,
            lat,
            lon,
        })
    }

    fn from_xmp(items: &[Raw], tag: &Tag) -> Option<Self> {
        let field = |idx: usize| items.get(idx).cloned().unwrap_or(Raw::Null);
        let version_id = match field(0).as_str() {
            Some(text) if !text.is_empty() => text
                .split('.')
                .filter_map(|part| part.parse().ok())
                .collect(),
            _ => vec![2, 0, 0, 0],
        };
        let method = field(1).as_str().map(str::trim).filter(|s| !s.is_empty()).map(Label::new);
        let alt = Altitude::from_raw(&Raw::List(vec![field(2), field(3)]), tag)
            .ok()
            .flatten();
        let lat = field(4).as_str().and_then(coord_from_xmp).map(Latitude::new);
        let lon = field(5).as_str().and_then(coord_from_xmp).map(Longitude::new);
        Some(Self {
            version_id,
            method,
            alt,
            lat,
            lon,
        })
    }

    /// Parse an ISO 6709 position string (`"+52.0000+004.0000+012.000/"`)
    /// as written by video stream probers
    fn from_iso6709(value: &str) -> Option<Self> {
        let value = value.trim().strip_suffix('/')?;
        let mut parts: Vec<String> = Vec::new();
        for c in value.chars() {
            if (c == '+' || c == '-') || parts.is_empty() {
                parts.push(String::new());
            }
            match parts.last_mut() {
                Some(part) => part.push(c),
                None => return None,
            }
        }
        if parts.len() != 3 || parts.iter().any(|p| !p.contains('.')) {
            return None;
        }
        let lat = Latitude::from_degrees(&parts[0])?;
        let lon = Longitude::from_degrees(&parts[1])?;
        let alt = fraction_from_text(&parts[2], true).map(Altitude::new)?;
        Some(Self::new(None, Some(alt), Some(lat), Some(lon)))
    }

    fn close_enough(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }
}

impl fmt::Display for GpsInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(method) = &self.method {
            lines.push(format!("method: {}", method));
        }
        if let (Some(lat), Some(lon)) = (&self.lat, &self.lon) {
            lines.push(format!("lat, lon: {}, {}", lat, lon));
        }
        if let Some(alt) = &self.alt {
            lines.push(format!("alt: {}", alt));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for GpsInfo {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        if tag.is_video() {
            return Ok(raw.as_str().and_then(Self::from_iso6709));
        }
        let items = match raw.as_list() {
            Some(items) => items,
            None => return Ok(None),
        };
        let value = match tag.family() {
            Family::Exif => Self::from_exif(items, tag),
            _ => Self::from_xmp(items, tag),
        };
        Ok(value.filter(MetaValue::has_content))
    }

    fn from_video(value: &str, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(Self::from_iso6709(value))
    }

    fn to_exif(&self) -> Raw {
        let (altitude, alt_ref) = match &self.alt {
            Some(alt) => match alt.to_exif() {
                Raw::List(items) if items.len() == 2 => {
                    let mut items = items.into_iter();
                    (
                        items.next().unwrap_or(Raw::Null),
                        items.next().unwrap_or(Raw::Null),
                    )
                }
                _ => (Raw::Null, Raw::Null),
            },
            None => (Raw::Null, Raw::Null),
        };
        let unpack = |raw: Raw| match raw {
            Raw::List(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                (
                    items.next().unwrap_or(Raw::Null),
                    items.next().unwrap_or(Raw::Null),
                )
            }
            _ => (Raw::Null, Raw::Null),
        };
        let (lat_value, lat_ref) = match (&self.lat, &self.lon) {
            (Some(lat), Some(_)) => unpack(lat.to_exif()),
            _ => (Raw::Null, Raw::Null),
        };
        let (lon_value, lon_ref) = match (&self.lat, &self.lon) {
            (Some(_), Some(lon)) => unpack(lon.to_exif()),
            _ => (Raw::Null, Raw::Null),
        };
        let method = match &self.method {
            Some(method) => Raw::Text(format!("charset=Ascii {}", method)),
            None => Raw::Null,
        };
        Raw::List(vec![
            Raw::Bytes(self.version_id.clone()),
            method,
            altitude,
            alt_ref,
            lat_value,
            lat_ref,
            lon_value,
            lon_ref,
        ])
    }

    fn to_xmp(&self) -> Raw {
        let version_id = self
            .version_id
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(".");
        let (altitude, alt_ref) = match &self.alt {
            Some(alt) => match alt.to_xmp() {
                Raw::List(items) if items.len() == 2 => {
                    let mut items = items.into_iter();
                    (
                        items.next().unwrap_or(Raw::Null),
                        items.next().unwrap_or(Raw::Null),
                    )
                }
                _ => (Raw::Null, Raw::Null),
            },
            None => (Raw::Null, Raw::Null),
        };
        let (lat_string, lon_string) = match (&self.lat, &self.lon) {
            (Some(lat), Some(lon)) => (lat.to_xmp(), lon.to_xmp()),
            _ => (Raw::Null, Raw::Null),
        };
        let method = match &self.method {
            Some(method) => Raw::Text(method.to_string()),
            None => Raw::Null,
        };
        Raw::List(vec![
            Raw::Text(version_id),
            method,
            altitude,
            alt_ref,
            lat_string,
            lon_string,
        ])
    }

    fn has_content(&self) -> bool {
        self.lat.is_some() || self.lon.is_some() || self.alt.is_some()
    }

    // two fixes are the same place when coordinates agree to 1e-7 degrees
    // and altitudes to a millimetre
    fn contains(&self, other: &Self) -> bool {
        if self.alt.is_some() != other.alt.is_some() {
            return false;
        }
        if self.lat.is_some() != other.lat.is_some() {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.alt, &other.alt) {
            if !Self::close_enough(a.to_f64(), b.to_f64(), 0.001) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (&self.lat, &other.lat) {
            if !Self::close_enough(a.to_f64(), b.to_f64(), 0.000_000_1) {
                return false;
            }
        }
        if let (Some(a), Some(b)) = (&self.lon, &other.lon) {
            if !Self::close_enough(a.to_f64(), b.to_f64(), 0.000_000_1) {
                return false;
            }
        }
        true
    }

    // coordinate pairs beyond the same-place tolerance are an unresolved
    // conflict; prefer whichever side also carries altitude
    fn merge_item(&self, other: &Self) -> (Self, Option<MergeOutcome>) {
        let mut result = self.clone();
        let mut other = other.clone();
        let mut merged = false;
        let mut ignored = false;
        if other.lat.is_some() {
            if result.lat.is_none() {
                std::mem::swap(&mut result, &mut other);
                merged = true;
            } else {
                let lat_delta = (other.lat.as_ref().map_or(0.0, Latitude::to_f64)
                    - result.lat.as_ref().map_or(0.0, Latitude::to_f64))
                .abs();
                let lon_delta = (other.lon.as_ref().map_or(0.0, Longitude::to_f64)
                    - result.lon.as_ref().map_or(0.0, Longitude::to_f64))
                .abs();
                if lat_delta > SAME_PLACE || lon_delta > SAME_PLACE {
                    if other.alt.is_some() && result.alt.is_none() {
                        std::mem::swap(&mut result, &mut other);
                    }
                    ignored = true;
                }
            }
        }
        if other.alt.is_some() && !ignored {
            if result.alt.is_none() {
                result.alt = other.alt.clone();
                merged = true;
            } else {
                let delta = (other.alt.as_ref().map_or(0.0, Altitude::to_f64)
                    - result.alt.as_ref().map_or(0.0, Altitude::to_f64))
                .abs();
                if delta > 0.01 {
                    ignored = true;
                }
            }
        }
        let outcome = if ignored {
            Some(MergeOutcome::Ignored)
        } else if merged {
            Some(MergeOutcome::Merged)
        } else {
            None
        };
        (result, outcome)
    }
}
