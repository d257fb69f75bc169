//! Camera and lens identity
//!
//! Cameras and lenses report themselves with a grab bag of "unknown"
//! sentinels (`"unknown"`, `"n/a"`, `"(0)"`, `"65535"`, all-zero serial
//! numbers) which are filtered to absent at construction. The display name
//! prefers the model, prepends the make only when it is not already part of
//! the model, and can synthesize a name from the lens specification when no
//! model is known.

use std::fmt;

use num_rational::BigRational;
use num_traits::Zero;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::rational::{fraction_f64, fraction_from_raw, fraction_text, ratio_raw};
use crate::types::strings::Label;
use crate::types::value::MetaValue;

fn field_from_list<'a>(items: &'a [Raw], index: usize) -> Option<&'a Raw> {
    items.get(index).filter(|raw| !raw.is_empty())
}

fn label_field(items: &[Raw], index: usize, tag: &Tag) -> Option<Label> {
    Label::from_raw(field_from_list(items, index)?, tag).ok().flatten()
}

/// Lens specification: focal length range and maximum aperture at each end
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LensSpec {
    min_fl: BigRational,
    max_fl: BigRational,
    min_fl_fn: BigRational,
    max_fl_fn: BigRational,
}

impl LensSpec {
    pub fn min_focal_length(&self) -> &BigRational {
        &self.min_fl
    }

    pub fn max_focal_length(&self) -> &BigRational {
        &self.max_fl
    }

    pub fn min_focal_length_f_number(&self) -> &BigRational {
        &self.min_fl_fn
    }

    pub fn max_focal_length_f_number(&self) -> &BigRational {
        &self.max_fl_fn
    }

    fn from_fractions(mut numbers: Vec<BigRational>) -> Option<Self> {
        numbers.resize(4, BigRational::zero());
        if numbers.iter().all(Zero::is_zero) {
            return None;
        }
        let mut numbers = numbers.into_iter();
        Some(Self {
            min_fl: numbers.next().unwrap_or_else(BigRational::zero),
            max_fl: numbers.next().unwrap_or_else(BigRational::zero),
            min_fl_fn: numbers.next().unwrap_or_else(BigRational::zero),
            max_fl_fn: numbers.next().unwrap_or_else(BigRational::zero),
        })
    }

    fn fractions(&self) -> [&BigRational; 4] {
        [&self.min_fl, &self.max_fl, &self.min_fl_fn, &self.max_fl_fn]
    }
}

impl fmt::Display for LensSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .fractions()
            .iter()
            .map(|x| fraction_f64(x).to_string())
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&rendered)
    }
}

impl MetaValue for LensSpec {
    const QUIET: bool = true;

    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }
        // Canon MakerNote stores short/long focal lengths scaled by a unit
        // count, and no apertures
        if tag.name().contains("CanonCs") {
            let numbers: Vec<i64> = match raw {
                Raw::List(items) => items.iter().filter_map(Raw::coerce_int).collect(),
                Raw::Text(s) => s.split_whitespace().filter_map(|x| x.parse().ok()).collect(),
                _ => Vec::new(),
            };
            let (long_focal, short_focal, focal_units) = match numbers[..] {
                [long_focal, short_focal, focal_units] => (long_focal, short_focal, focal_units),
                _ => return Ok(None),
            };
            if focal_units == 0 {
                return Ok(None);
            }
            return Ok(Self::from_fractions(vec![
                crate::types::rational::fraction_from_parts(short_focal, focal_units, true),
                crate::types::rational::fraction_from_parts(long_focal, focal_units, true),
            ]));
        }
        let numbers: Vec<BigRational> = match raw {
            Raw::Text(s) => s
                .split_whitespace()
                .filter_map(|x| crate::types::rational::fraction_from_text(x, true))
                .collect(),
            Raw::List(items) => items
                .iter()
                .map(|item| fraction_from_raw(item, true).unwrap_or_else(BigRational::zero))
                .collect(),
            _ => return Ok(None),
        };
        Ok(Self::from_fractions(numbers))
    }

    fn to_exif(&self) -> Raw {
        Raw::List(self.fractions().iter().map(|x| ratio_raw(x)).collect())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(
            self.fractions()
                .iter()
                .map(|x| fraction_text(x))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    fn has_content(&self) -> bool {
        !self.fractions().iter().all(|x| x.is_zero())
    }
}

/// Camera body identity: make, model, serial number
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraModel {
    make: Option<Label>,
    model: Option<Label>,
    serial_no: Option<Label>,
}

/// Build the display name shared by cameras and lenses
fn build_name(
    make: Option<&Label>,
    model: Option<&Label>,
    serial_no: Option<&Label>,
    inc_serial: bool,
) -> Vec<String> {
    let mut result = Vec::new();
    if let Some(model) = model {
        result.push(model.to_string());
    }
    if let Some(make) = make {
        // only add the make if it is not already part of the model
        let first_word = make.split_whitespace().next().unwrap_or("").to_lowercase();
        let already_there = result
            .first()
            .map(|m| m.to_lowercase().contains(&first_word))
            .unwrap_or(false);
        if !already_there {
            result.insert(0, make.to_string());
        }
    }
    if inc_serial {
        if let Some(serial_no) = serial_no {
            result.push(format!("(S/N: {})", serial_no));
        }
    }
    result
}

impl CameraModel {
    pub fn new(make: Option<Label>, model: Option<Label>, serial_no: Option<Label>) -> Self {
        let model = model.filter(|m| m.as_str() != "unknown");
        Self {
            make: make.filter(|l| l.has_content()),
            model,
            serial_no: serial_no.filter(|l| l.has_content()),
        }
    }

    pub fn make(&self) -> Option<&Label> {
        self.make.as_ref()
    }

    pub fn model(&self) -> Option<&Label> {
        self.model.as_ref()
    }

    pub fn serial_no(&self) -> Option<&Label> {
        self.serial_no.as_ref()
    }

    /// Display name; include the serial number when a unique name is
    /// needed
    pub fn get_name(&self, inc_serial: bool) -> String {
        build_name(
            self.make.as_ref(),
            self.model.as_ref(),
            self.serial_no.as_ref(),
            inc_serial,
        )
        .join(" ")
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (key, value) in [
            ("make", &self.make),
            ("model", &self.model),
            ("serial_no", &self.serial_no),
        ] {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key, value));
            }
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for CameraModel {
    const QUIET: bool = true;

    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            Raw::List(items) => Self::new(
                label_field(items, 0, tag),
                label_field(items, 1, tag),
                label_field(items, 2, tag),
            ),
            Raw::Map(map) => {
                let get = |key: &str| {
                    map.get(key)
                        .and_then(|raw| Label::from_raw(raw, tag).ok().flatten())
                };
                Self::new(get("make"), get("model"), get("serial_no"))
            }
            _ => return Ok(None),
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(vec![
            self.make.as_ref().map(MetaValue::to_exif).into(),
            self.model.as_ref().map(MetaValue::to_exif).into(),
            self.serial_no.as_ref().map(MetaValue::to_exif).into(),
        ])
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(vec![
            self.make.as_ref().map(MetaValue::to_xmp).into(),
            self.model.as_ref().map(MetaValue::to_xmp).into(),
            self.serial_no.as_ref().map(MetaValue::to_xmp).into(),
        ])
    }

    fn has_content(&self) -> bool {
        self.make.is_some() || self.model.is_some() || self.serial_no.is_some()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag; make, model, serial_no)
    }
}

/// Lens identity: make, model, serial number, specification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LensModel {
    make: Option<Label>,
    model: Option<Label>,
    serial_no: Option<Label>,
    spec: Option<LensSpec>,
}

impl LensModel {
    pub fn new(
        make: Option<Label>,
        model: Option<Label>,
        serial_no: Option<Label>,
        spec: Option<LensSpec>,
    ) -> Self {
        let model = model.filter(|m| !matches!(m.as_str(), "n/a" | "(0)" | "65535"));
        let serial_no = serial_no.filter(|s| s.as_str() != "0000000000");
        Self {
            make: make.filter(|l| l.has_content()),
            model,
            serial_no: serial_no.filter(|l| l.has_content()),
            spec,
        }
    }

    pub fn make(&self) -> Option<&Label> {
        self.make.as_ref()
    }

    pub fn model(&self) -> Option<&Label> {
        self.model.as_ref()
    }

    pub fn serial_no(&self) -> Option<&Label> {
        self.serial_no.as_ref()
    }

    pub fn spec(&self) -> Option<&LensSpec> {
        self.spec.as_ref()
    }

    /// Display name, synthesized from the specification when no model is
    /// known (e.g. "18–55 mm ƒ/3.5–5.6")
    pub fn get_name(&self, inc_serial: bool) -> String {
        let mut result = build_name(
            self.make.as_ref(),
            self.model.as_ref(),
            self.serial_no.as_ref(),
            inc_serial,
        );
        if result.is_empty() {
            if let Some(spec) = &self.spec {
                let join_range = |lo: &BigRational, hi: &BigRational| {
                    let mut parts = Vec::new();
                    for value in [lo, hi] {
                        if !value.is_zero() {
                            let rendered = fraction_f64(value).to_string();
                            if parts.last() != Some(&rendered) {
                                parts.push(rendered);
                            }
                        }
                    }
                    parts.join("\u{2013}")
                };
                let fl = join_range(&spec.min_fl, &spec.max_fl);
                let fn_ = join_range(&spec.min_fl_fn, &spec.max_fl_fn);
                if !fl.is_empty() {
                    let mut model = format!("{} mm", fl);
                    if !fn_.is_empty() {
                        model.push_str(&format!(" \u{0192}/{}", fn_));
                    }
                    result.push(model);
                }
            }
        }
        result.join(" ")
    }
}

impl fmt::Display for LensModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (key, value) in [
            ("make", &self.make),
            ("model", &self.model),
            ("serial_no", &self.serial_no),
        ] {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key, value));
            }
        }
        if let Some(spec) = &self.spec {
            lines.push(format!("spec: {}", spec));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for LensModel {
    const QUIET: bool = true;

    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            Raw::List(items) => {
                let spec = match field_from_list(items, 3) {
                    Some(raw) => LensSpec::from_raw(raw, tag)?,
                    None => None,
                };
                Self::new(
                    label_field(items, 0, tag),
                    label_field(items, 1, tag),
                    label_field(items, 2, tag),
                    spec,
                )
            }
            Raw::Map(map) => {
                let get = |key: &str| {
                    map.get(key)
                        .and_then(|raw| Label::from_raw(raw, tag).ok().flatten())
                };
                let spec = match map.get("spec") {
                    Some(raw) => LensSpec::from_raw(raw, tag)?,
                    None => None,
                };
                Self::new(get("make"), get("model"), get("serial_no"), spec)
            }
            _ => return Ok(None),
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(vec![
            self.make.as_ref().map(MetaValue::to_exif).into(),
            self.model.as_ref().map(MetaValue::to_exif).into(),
            self.serial_no.as_ref().map(MetaValue::to_exif).into(),
            self.spec.as_ref().map(MetaValue::to_exif).into(),
        ])
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(vec![
            self.make.as_ref().map(MetaValue::to_xmp).into(),
            self.model.as_ref().map(MetaValue::to_xmp).into(),
            self.serial_no.as_ref().map(MetaValue::to_xmp).into(),
            self.spec.as_ref().map(MetaValue::to_xmp).into(),
        ])
    }

    fn has_content(&self) -> bool {
        self.make.is_some() || self.model.is_some() || self.serial_no.is_some() || self.spec.is_some()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag; make, model, serial_no, spec)
    }
}
