//! Guarded fraction arithmetic
//!
//! Exif stores many values as rational pairs and uses `0/0` for zero; XMP
//! stores the same values as `numerator/denominator` text. All numeric value
//! types funnel through the constructors here, which never divide by zero
//! and cap runaway denominators with continued-fraction reduction. Backed by
//! [`BigRational`] because some encodings overflow fixed-width integers.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::value::MetaValue;

pub(crate) const DENOMINATOR_LIMIT: u64 = 1_000_000;

/// Closest fraction to `value` with a denominator of at most
/// `max_denominator`, found by walking the continued-fraction expansion
pub(crate) fn limit_denominator(value: &BigRational, max_denominator: u64) -> BigRational {
    let max_d = BigInt::from(max_denominator);
    if *value.denom() <= max_d {
        return value.clone();
    }
    let negative = value.is_negative();
    let v = value.abs();
    let (mut p0, mut q0, mut p1, mut q1) =
        (BigInt::zero(), BigInt::one(), BigInt::one(), BigInt::zero());
    let (mut n, mut d) = (v.numer().clone(), v.denom().clone());
    loop {
        let a = &n / &d;
        let q2 = &q0 + &a * &q1;
        if q2 > max_d {
            break;
        }
        let next_p1 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, next_p1);
        q0 = std::mem::replace(&mut q1, q2);
        let next_d = &n - &a * &d;
        n = std::mem::replace(&mut d, next_d);
    }
    let k = (&max_d - &q0) / &q1;
    let bound1 = BigRational::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let bound2 = BigRational::new(p1, q1);
    let result = if (&bound2 - &v).abs() <= (&bound1 - &v).abs() {
        bound2
    } else {
        bound1
    };
    if negative {
        -result
    } else {
        result
    }
}

/// Build a fraction from a numerator/denominator pair, mapping the Exif
/// `0/0` zero convention to zero instead of failing
pub(crate) fn fraction_from_parts(numer: i64, denom: i64, limit: bool) -> BigRational {
    if denom == 0 {
        return BigRational::zero();
    }
    let value = BigRational::new(BigInt::from(numer), BigInt::from(denom));
    if limit {
        limit_denominator(&value, DENOMINATOR_LIMIT)
    } else {
        value
    }
}

/// Parse `n/d` or decimal text into a fraction
///
/// Decimal text converts exactly (`"50.5"` is 101/2, not the nearest
/// float).
pub(crate) fn fraction_from_text(text: &str, limit: bool) -> Option<BigRational> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some((numer, denom)) = text.split_once('/') {
        let numer: BigInt = numer.trim().parse().ok()?;
        let denom: BigInt = denom.trim().parse().ok()?;
        if denom.is_zero() {
            return Some(BigRational::zero());
        }
        let value = BigRational::new(numer, denom);
        return Some(if limit {
            limit_denominator(&value, DENOMINATOR_LIMIT)
        } else {
            value
        });
    }
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if !frac_part.is_empty() && !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = format!("{}{}", int_part, frac_part);
    let numer: BigInt = digits.parse().ok()?;
    let denom = BigInt::from(10u32).pow(frac_part.len() as u32);
    let value = BigRational::new(numer, denom);
    Some(if limit {
        limit_denominator(&value, DENOMINATOR_LIMIT)
    } else {
        value
    })
}

/// Convert any numeric raw shape into a fraction
pub(crate) fn fraction_from_raw(raw: &Raw, limit: bool) -> Option<BigRational> {
    let value = match raw {
        Raw::Ratio(n, d) => return Some(fraction_from_parts(*n, *d, limit)),
        Raw::Int(i) => BigRational::from_integer(BigInt::from(*i)),
        Raw::Float(f) => BigRational::from_float(*f)?,
        Raw::Text(s) => return fraction_from_text(s, limit),
        Raw::List(items) => match items[..] {
            [ref n, ref d] => {
                return Some(fraction_from_parts(n.coerce_int()?, d.coerce_int()?, limit))
            }
            [ref single] => return fraction_from_raw(single, limit),
            _ => return None,
        },
        _ => return None,
    };
    Some(if limit {
        limit_denominator(&value, DENOMINATOR_LIMIT)
    } else {
        value
    })
}

/// A fraction as a raw value: a rational pair where it fits, `n/d` text
/// where it does not
pub(crate) fn ratio_raw(value: &BigRational) -> Raw {
    match (value.numer().to_i64(), value.denom().to_i64()) {
        (Some(n), Some(d)) => Raw::Ratio(n, d),
        _ => Raw::Text(fraction_text(value)),
    }
}

pub(crate) fn fraction_text(value: &BigRational) -> String {
    format!("{}/{}", value.numer(), value.denom())
}

pub(crate) fn fraction_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// An arbitrary-precision rational value
///
/// Truthiness is "has a value": zero is present, not empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rational(BigRational);

impl Rational {
    pub fn new(value: BigRational) -> Self {
        Self(value)
    }

    /// Guarded construction from a numerator/denominator pair
    pub fn from_ratio(numer: i64, denom: i64) -> Self {
        Self(fraction_from_parts(numer, denom, true))
    }

    pub fn value(&self) -> &BigRational {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        fraction_f64(&self.0)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl MetaValue for Rational {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(fraction_from_raw(raw, true).map(Self))
    }

    fn to_exif(&self) -> Raw {
        ratio_raw(&self.0)
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(fraction_text(&self.0))
    }

    fn has_content(&self) -> bool {
        true
    }
}

/// Aperture stored as FNumber plus the APEX value, either computed from the
/// other when missing
///
/// Only the FNumber is presented to users; the APEX value rides along so
/// writing back does not lose the original encoding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aperture {
    f_number: BigRational,
    apex: Option<BigRational>,
}

impl Aperture {
    pub fn f_number(&self) -> &BigRational {
        &self.f_number
    }

    pub fn to_f64(&self) -> f64 {
        fraction_f64(&self.f_number)
    }
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl MetaValue for Aperture {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        let null = Raw::Null;
        let (f_number_raw, apex_raw) = match raw.as_list() {
            Some([f, a]) => (f, a),
            Some([f]) => (f, &null),
            _ => (raw, &null),
        };
        let apex = fraction_from_raw(apex_raw, true);
        let f_number = match fraction_from_raw(f_number_raw, true) {
            Some(f) => f,
            None => match &apex {
                Some(apex) => {
                    let f = 2f64.powf(fraction_f64(apex) / 2.0);
                    match BigRational::from_float(f) {
                        Some(value) => limit_denominator(&value, DENOMINATOR_LIMIT),
                        None => return Ok(None),
                    }
                }
                None => return Ok(None),
            },
        };
        Ok(Some(Self { f_number, apex }))
    }

    fn to_exif(&self) -> Raw {
        let mut items = vec![ratio_raw(&self.f_number)];
        if !self.f_number.is_zero() {
            let apex = self.apex.clone().unwrap_or_else(|| {
                let apex = fraction_f64(&self.f_number).log2() * 2.0;
                BigRational::from_float(apex)
                    .map(|v| limit_denominator(&v, DENOMINATOR_LIMIT))
                    .unwrap_or_else(BigRational::zero)
            });
            items.push(ratio_raw(&apex));
        }
        Raw::List(items)
    }

    fn to_xmp(&self) -> Raw {
        let items = match self.to_exif() {
            Raw::List(items) => items,
            other => vec![other],
        };
        Raw::List(
            items
                .into_iter()
                .map(|item| match item {
                    Raw::Ratio(n, d) => Raw::Text(format!("{}/{}", n, d)),
                    other => other,
                })
                .collect(),
        )
    }

    fn has_content(&self) -> bool {
        true
    }

    // format rounding differs between sources, so apertures within 5% are
    // the same aperture
    fn contains(&self, other: &Self) -> bool {
        let (a, b) = (self.to_f64(), other.to_f64());
        a.min(b) > a.max(b) * 0.95
    }
}

/// Video frame rate; some sources round 30000/1001 to 29.97
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameRate(BigRational);

impl FrameRate {
    pub fn new(value: BigRational) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &BigRational {
        &self.0
    }

    pub fn to_f64(&self) -> f64 {
        fraction_f64(&self.0)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl MetaValue for FrameRate {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(fraction_from_raw(raw, true).map(Self))
    }

    fn to_exif(&self) -> Raw {
        ratio_raw(&self.0)
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(fraction_text(&self.0))
    }

    fn has_content(&self) -> bool {
        true
    }

    fn contains(&self, other: &Self) -> bool {
        let (a, b) = (self.to_f64(), other.to_f64());
        a.min(b) > a.max(b) * 0.9999
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> Tag {
        Tag::parse("Exif.Photo.FNumber").unwrap()
    }

    #[test]
    fn zero_denominator_is_zero() {
        let value = Rational::from_ratio(0, 0);
        assert!(value.value().is_zero());

        let value = Rational::from_raw(&Raw::Text("0/0".to_string()), &tag())
            .unwrap()
            .unwrap();
        assert!(value.value().is_zero());
    }

    #[test]
    fn decimal_text_is_exact() {
        let value = fraction_from_text("50.5", false).unwrap();
        assert_eq!(value, BigRational::new(BigInt::from(101), BigInt::from(2)));

        let value = fraction_from_text("-0.25", false).unwrap();
        assert_eq!(value, BigRational::new(BigInt::from(-1), BigInt::from(4)));
    }

    #[test]
    fn limit_denominator_classics() {
        let pi = BigRational::from_float(std::f64::consts::PI).unwrap();
        assert_eq!(
            limit_denominator(&pi, 10),
            BigRational::new(BigInt::from(22), BigInt::from(7))
        );
        assert_eq!(
            limit_denominator(&pi, 100),
            BigRational::new(BigInt::from(311), BigInt::from(99))
        );
        let neg = limit_denominator(&-pi, 10);
        assert_eq!(neg, BigRational::new(BigInt::from(-22), BigInt::from(7)));
    }

    #[test]
    fn float_input_is_tamed() {
        let value = Rational::from_raw(&Raw::Float(0.1), &tag()).unwrap().unwrap();
        assert_eq!(
            value.value(),
            &BigRational::new(BigInt::from(1), BigInt::from(10))
        );
    }

    #[test]
    fn aperture_from_apex_only() {
        let raw = Raw::List(vec![Raw::Null, Raw::Ratio(4, 1)]);
        let aperture = Aperture::from_raw(&raw, &tag()).unwrap().unwrap();
        assert!((aperture.to_f64() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn aperture_tolerance() {
        let a = Aperture::from_raw(&Raw::List(vec![Raw::Ratio(28, 10), Raw::Null]), &tag())
            .unwrap()
            .unwrap();
        let b = Aperture::from_raw(&Raw::List(vec![Raw::Ratio(2797, 1000), Raw::Null]), &tag())
            .unwrap()
            .unwrap();
        assert!(a.contains(&b));
        assert!(b.contains(&a));

        let c = Aperture::from_raw(&Raw::List(vec![Raw::Ratio(4, 1), Raw::Null]), &tag())
            .unwrap()
            .unwrap();
        assert!(!a.contains(&c));
    }

    #[test]
    fn frame_rate_tolerance() {
        let exact = FrameRate::from_raw(&Raw::Ratio(30000, 1001), &tag())
            .unwrap()
            .unwrap();
        let rounded = FrameRate::from_raw(&Raw::Text("29.97".to_string()), &tag())
            .unwrap()
            .unwrap();
        assert!(exact.contains(&rounded));
        assert!(!exact.contains(&FrameRate::from_raw(&Raw::Int(30), &tag()).unwrap().unwrap()));
    }

    #[test]
    fn exif_output_shapes() {
        let value = Rational::from_ratio(1, 3);
        assert_eq!(value.to_exif(), Raw::Ratio(1, 3));
        assert_eq!(value.to_xmp(), Raw::Text("1/3".to_string()));
    }
}
