//! General ISO 8601 date/time scanning
//!
//! A sufficiently general parser for the ISO 8601 shapes that occur in photo
//! metadata: 1-3 date components, an optional time of 1-3 components behind
//! a `T` or space separator, optional fractional seconds, and an optional
//! trailing `+HH:MM` / `-HH:MM` / `Z` zone designator. Separators inside the
//! date may be `-` (XMP) or `:` (Exif) or absent.
//!
//! How much of the value was actually present is reported as a precision in
//! 1..=7 (1 = year only, 6 = whole second, 7 = subsecond). Missing low-order
//! date components parse as 1; a component explicitly written as zero (the
//! IPTC "unknown" convention) is promoted to 1 with the precision demoted to
//! match.

use crate::core::error::{MetaError, MetaResult};

/// Components extracted from an ISO 8601 string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
    /// 1..=7, derived from which components were present
    pub precision: u8,
    /// Minutes east of UTC
    pub tz_offset: Option<i32>,
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing `+HH:MM` / `-HH:MM` / `Z` zone designator off `s`
///
/// The colon is required, which keeps date separators (`2004-01-02`) from
/// being mistaken for an offset.
fn take_timezone(s: &str) -> (&str, Option<i32>) {
    if let Some(rest) = s.strip_suffix('Z') {
        return (rest, Some(0));
    }
    if let Some(pos) = s.rfind(['+', '-']) {
        if pos > 0 {
            let suffix = &s[pos + 1..];
            if let Some((hours, minutes)) = suffix.split_once(':') {
                if (1..=2).contains(&hours.len())
                    && minutes.len() == 2
                    && all_digits(hours)
                    && all_digits(minutes)
                {
                    let offset = hours.parse::<i32>().unwrap_or(0) * 60
                        + minutes.parse::<i32>().unwrap_or(0);
                    let offset = if s.as_bytes()[pos] == b'-' { -offset } else { offset };
                    return (&s[..pos], Some(offset));
                }
            }
        }
    }
    (s, None)
}

/// Split trailing `.digits` fractional seconds off `s`
fn take_subseconds(s: &str) -> (&str, Option<&str>) {
    if let Some(pos) = s.rfind('.') {
        let suffix = &s[pos + 1..];
        if all_digits(suffix) {
            return (&s[..pos], Some(suffix));
        }
    }
    (s, None)
}

/// Parse 1-3 numbers of 1-2 digits each, optionally `:`-separated
fn scan_time(s: &str) -> Option<Vec<u32>> {
    let bytes = s.as_bytes();
    let mut numbers = Vec::new();
    let mut pos = 0;
    while numbers.len() < 3 && pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && pos - start < 2 && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        numbers.push(s[start..pos].parse().ok()?);
        if pos < bytes.len() && bytes[pos] == b':' {
            pos += 1;
        }
    }
    if numbers.is_empty() || pos < bytes.len() {
        return None;
    }
    Some(numbers)
}

/// Parse year (1-4 digits) then up to two more 1-2 digit numbers, each
/// behind an optional `-` or `:` separator
fn scan_date(s: &str) -> Option<Vec<u32>> {
    let bytes = s.as_bytes();
    let mut numbers = Vec::new();
    let mut pos = 0;
    while numbers.len() < 3 && pos < bytes.len() {
        let width = if numbers.is_empty() { 4 } else { 2 };
        let start = pos;
        while pos < bytes.len() && pos - start < width && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return None;
        }
        numbers.push(s[start..pos].parse().ok()?);
        if numbers.len() < 3 && pos < bytes.len() && (bytes[pos] == b'-' || bytes[pos] == b':') {
            pos += 1;
        }
    }
    if numbers.is_empty() || pos < bytes.len() {
        return None;
    }
    Some(numbers)
}

/// Parse an ISO 8601 date/time string
///
/// `sub_sec` overrides fractional seconds stored out of band (the Exif
/// SubSecTime tags). An unrecognizable date component is the one fatal
/// error in this subsystem.
///
/// # Example
///
/// ```rust
/// use metakit::utils::iso8601;
///
/// let parts = iso8601::parse("2020-05-17T10:30:00+02:00", None).unwrap();
/// assert_eq!(parts.precision, 6);
/// assert_eq!(parts.tz_offset, Some(120));
///
/// let parts = iso8601::parse("2004-01", None).unwrap();
/// assert_eq!((parts.year, parts.month, parts.day), (2004, 1, 1));
/// assert_eq!(parts.precision, 2);
/// ```
pub fn parse(datetime_string: &str, sub_sec: Option<&str>) -> MetaResult<IsoParts> {
    let mut precision = 7u8;
    let unparsed = datetime_string.trim();

    // extract time zone
    let (unparsed, tz_offset) = take_timezone(unparsed);

    // extract sub seconds
    let (unparsed, scanned_sub_sec) = take_subseconds(unparsed);
    let sub_sec = sub_sec
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(scanned_sub_sec);
    let microsecond = match sub_sec {
        Some(digits) => {
            let padded: String = format!("{:0<6}", digits).chars().take(6).collect();
            padded.parse().unwrap_or(0)
        }
        None => {
            precision = 6;
            0
        }
    };

    // extract time
    let (unparsed, time) = match unparsed
        .rfind(['T', ' '])
        .and_then(|pos| scan_time(&unparsed[pos + 1..]).map(|t| (pos, t)))
    {
        Some((pos, time)) => (&unparsed[..pos], time),
        None => {
            precision = 3;
            (unparsed, Vec::new())
        }
    };
    if !time.is_empty() && time.len() < 3 {
        precision = 3 + time.len() as u8;
    }
    let hour = time.first().copied().unwrap_or(0);
    let minute = time.get(1).copied().unwrap_or(0);
    let second = time.get(2).copied().unwrap_or(0);

    // extract date
    let date = scan_date(unparsed)
        .ok_or_else(|| MetaError::ParseDateTime(datetime_string.to_string()))?;
    if date.len() < 3 {
        precision = date.len() as u8;
    }
    let year = date[0] as i32;
    let mut month = date.get(1).copied().unwrap_or(1);
    let mut day = date.get(2).copied().unwrap_or(1);
    if day == 0 {
        day = 1;
        precision = 2;
    }
    if month == 0 {
        month = 1;
        precision = 1;
    }

    Ok(IsoParts {
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond,
        precision,
        tz_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        let parts = parse("2023", None).unwrap();
        assert_eq!(parts.year, 2023);
        assert_eq!((parts.month, parts.day), (1, 1));
        assert_eq!(parts.precision, 1);
        assert_eq!(parts.tz_offset, None);
    }

    #[test]
    fn test_parse_year_month() {
        let parts = parse("2023-12", None).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2023, 12, 1));
        assert_eq!(parts.precision, 2);
    }

    #[test]
    fn test_parse_full_date() {
        let parts = parse("2023-12-25", None).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2023, 12, 25));
        assert_eq!(parts.precision, 3);
        assert_eq!(parts.tz_offset, None);
    }

    #[test]
    fn test_parse_exif_separators() {
        let parts = parse("2023:12:25 10:30:00", None).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2023, 12, 25));
        assert_eq!((parts.hour, parts.minute, parts.second), (10, 30, 0));
        assert_eq!(parts.precision, 6);
    }

    #[test]
    fn test_parse_with_timezone() {
        let parts = parse("2020-05-17T10:30:00+02:00", None).unwrap();
        assert_eq!(parts.precision, 6);
        assert_eq!(parts.tz_offset, Some(120));

        let parts = parse("2020-05-17T10:30:00-05:30", None).unwrap();
        assert_eq!(parts.tz_offset, Some(-330));

        let parts = parse("2020-05-17T10:30:00Z", None).unwrap();
        assert_eq!(parts.tz_offset, Some(0));
    }

    #[test]
    fn test_date_separator_not_taken_for_timezone() {
        // a trailing day must not parse as a negative offset
        let parts = parse("2020-05-17", None).unwrap();
        assert_eq!(parts.tz_offset, None);
        assert_eq!(parts.day, 17);
        assert_eq!(parts.precision, 3);
    }

    #[test]
    fn test_partial_time() {
        let parts = parse("2023-12-25T10", None).unwrap();
        assert_eq!(parts.hour, 10);
        assert_eq!(parts.precision, 4);

        let parts = parse("2023-12-25T10:30", None).unwrap();
        assert_eq!(parts.precision, 5);
    }

    #[test]
    fn test_subseconds() {
        let parts = parse("2023-12-25T10:30:00.25", None).unwrap();
        assert_eq!(parts.microsecond, 250_000);
        assert_eq!(parts.precision, 7);

        // out-of-band subsecond string, as stored by Exif
        let parts = parse("2023:12:25 10:30:00", Some("123")).unwrap();
        assert_eq!(parts.microsecond, 123_000);
        assert_eq!(parts.precision, 7);
    }

    #[test]
    fn test_zero_components_demote_precision() {
        let parts = parse("2004:01:00", None).unwrap();
        assert_eq!((parts.month, parts.day), (1, 1));
        assert_eq!(parts.precision, 2);

        let parts = parse("2004:00:00", None).unwrap();
        assert_eq!((parts.month, parts.day), (1, 1));
        assert_eq!(parts.precision, 1);
    }

    #[test]
    fn test_unparseable_is_fatal() {
        assert!(parse("not a date", None).is_err());
        assert!(parse("", None).is_err());
    }

    #[test]
    fn test_compact_form() {
        let parts = parse("20231225", None).unwrap();
        assert_eq!((parts.year, parts.month, parts.day), (2023, 12, 25));
    }
}
