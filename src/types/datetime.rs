//! Date/time values with component precision
//!
//! Photo metadata date/times are rarely complete: Exif has no timezone field
//! older than 2019, IPTC writes zeros for unknown components, XMP allows
//! year-only values. A [`DateTime`] therefore carries the instant together
//! with a precision in 1..=7 recording which calendar/time components are
//! meaningful, and an optional timezone offset in minutes.
//!
//! Components below the stated precision are zeroed at construction, and a
//! value with no time (precision <= 3) can have no timezone.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::core::error::{MetaError, MetaResult};
use crate::core::merge::{self, MergeOutcome};
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};
use crate::types::value::MetaValue;
use crate::utils::iso8601;

/// Seconds between the 1904-01-01 epoch (QuickTime) and the Unix epoch
const QT_EPOCH_OFFSET: i64 = 2_082_844_800;

/// A date/time with component precision and optional timezone
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    instant: NaiveDateTime,
    precision: u8,
    tz_offset: Option<i32>,
}

fn truncate_instant(instant: NaiveDateTime, precision: u8) -> NaiveDateTime {
    let (mut month, mut day) = (instant.month(), instant.day());
    let (mut hour, mut minute, mut second) = (instant.hour(), instant.minute(), instant.second());
    let mut micro = instant.and_utc().timestamp_subsec_micros();
    if precision < 7 {
        micro = 0;
    }
    if precision < 6 {
        second = 0;
    }
    if precision < 5 {
        minute = 0;
    }
    if precision < 4 {
        hour = 0;
    }
    if precision < 3 {
        day = 1;
    }
    if precision < 2 {
        month = 1;
    }
    NaiveDate::from_ymd_opt(instant.year(), month, day)
        .and_then(|d| NaiveTime::from_hms_micro_opt(hour, minute, second, micro).map(|t| d.and_time(t)))
        .unwrap_or(instant)
}

impl DateTime {
    /// Build a value, normalizing precision and timezone
    ///
    /// Precision defaults to 7; components below it are zeroed; no time
    /// means no timezone.
    pub fn new(instant: NaiveDateTime, precision: Option<u8>, tz_offset: Option<i32>) -> Self {
        let precision = precision.unwrap_or(7).clamp(1, 7);
        Self {
            instant: truncate_instant(instant, precision),
            precision,
            tz_offset: if precision <= 3 { None } else { tz_offset },
        }
    }

    /// The (truncated) instant
    pub fn instant(&self) -> NaiveDateTime {
        self.instant
    }

    /// Which components are meaningful: 1 = year only, 3 = full date,
    /// 6 = whole second, 7 = subsecond
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Timezone offset in minutes east of UTC, if known
    pub fn tz_offset(&self) -> Option<i32> {
        self.tz_offset
    }

    /// A copy reduced to the given precision
    pub fn truncated(&self, precision: u8) -> Self {
        Self::new(self.instant, Some(precision), self.tz_offset)
    }

    /// The instant shifted to UTC, when an offset is known
    pub fn to_utc(&self) -> NaiveDateTime {
        match self.tz_offset {
            Some(minutes) if minutes != 0 => self.instant - chrono::Duration::minutes(minutes as i64),
            _ => self.instant,
        }
    }

    /// Parse an ISO 8601 string, with optional out-of-band subseconds
    pub fn from_iso8601(datetime_string: &str, sub_sec: Option<&str>) -> MetaResult<Option<Self>> {
        if datetime_string.trim().is_empty() {
            return Ok(None);
        }
        let parts = iso8601::parse(datetime_string, sub_sec)?;
        let date = NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)
            .ok_or_else(|| MetaError::ParseDateTime(datetime_string.to_string()))?;
        let time = NaiveTime::from_hms_micro_opt(parts.hour, parts.minute, parts.second, parts.microsecond)
            .ok_or_else(|| MetaError::ParseDateTime(datetime_string.to_string()))?;
        Ok(Some(Self::new(
            date.and_time(time),
            Some(parts.precision),
            parts.tz_offset,
        )))
    }

    /// Render as ISO 8601, down to `precision` (default: own precision)
    pub fn to_iso8601(&self, precision: Option<u8>, time_zone: bool) -> String {
        let precision = precision.unwrap_or(self.precision).clamp(1, 7);
        let mut out = format!("{:04}", self.instant.year());
        if precision >= 2 {
            out.push_str(&format!("-{:02}", self.instant.month()));
        }
        if precision >= 3 {
            out.push_str(&format!("-{:02}", self.instant.day()));
        }
        if precision >= 4 {
            out.push_str(&format!("T{:02}", self.instant.hour()));
        }
        if precision >= 5 {
            out.push_str(&format!(":{:02}", self.instant.minute()));
        }
        if precision >= 6 {
            out.push_str(&format!(":{:02}", self.instant.second()));
        }
        if precision >= 7 {
            // millisecond resolution is all the formats can carry
            let micro = self.instant.and_utc().timestamp_subsec_micros();
            out.push_str(&format!(".{:03}", micro / 1000));
        }
        if precision > 3 && time_zone {
            if let Some(minutes) = self.tz_offset {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.abs();
                out.push_str(&format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60));
            }
        }
        out
    }

    // From the Exif spec, the format is "YYYY:MM:DD HH:MM:SS" and unknown
    // date/time may be blank-filled except for the colons. Files exist where
    // only some trailing fields are blank, e.g. "2004:01:  :  :  "; treat
    // those as reduced precision.
    fn from_exif(raw: &Raw) -> MetaResult<Option<Self>> {
        let (datetime_string, sub_sec) = match raw {
            Raw::List(items) => (
                items.first().and_then(Raw::as_str).unwrap_or(""),
                items.get(1).and_then(Raw::as_str),
            ),
            Raw::Text(s) => (s.as_str(), None),
            _ => return Ok(None),
        };
        if datetime_string.is_empty() {
            return Ok(None);
        }
        let mut datetime_string = datetime_string;
        while datetime_string.len() >= 3 && datetime_string.ends_with("  ") {
            match datetime_string.get(..datetime_string.len() - 3) {
                Some(shorter) => datetime_string = shorter,
                None => break,
            }
        }
        Self::from_iso8601(datetime_string, sub_sec)
    }

    // The access layer parses well-formed IPTC date & time into integer
    // fields; malformed values come through as strings and get one more
    // chance with the general parser. Missing date components are written
    // as 00. An all-zero time block is read as "no time information", not
    // midnight UTC -- the IPTC format cannot distinguish the two.
    fn from_iptc(raw: &Raw) -> MetaResult<Option<Self>> {
        let items = match raw.as_list() {
            Some(items) => items,
            None => return Ok(None),
        };
        let null = Raw::Null;
        let date_value = items.first().unwrap_or(&null);
        let time_value = items.get(1).unwrap_or(&null);
        if date_value.is_empty() {
            return Ok(None);
        }
        if let Some(date_string) = date_value.as_str() {
            let combined = match time_value.as_str() {
                Some(time_string) => format!("{}T{}", date_string, time_string),
                None => date_string.to_string(),
            };
            return Self::from_iso8601(&combined, None);
        }
        let date = match date_value.as_map() {
            Some(map) => map,
            None => return Ok(None),
        };
        let field = |map: &std::collections::BTreeMap<String, Raw>, key: &str| {
            map.get(key).and_then(Raw::coerce_int).unwrap_or(0)
        };
        let year = field(date, "year");
        if year == 0 {
            return Ok(None);
        }
        let mut month = field(date, "month");
        let mut day = field(date, "day");
        let mut precision = 3;
        let (mut hour, mut minute, mut second) = (0, 0, 0);
        let mut tz_offset = None;
        if let Some(time) = time_value.as_map() {
            tz_offset = Some((field(time, "tzHour") * 60 + field(time, "tzMinute")) as i32);
            hour = field(time, "hour");
            minute = field(time, "minute");
            second = field(time, "second");
            if hour != 0 || minute != 0 || second != 0 {
                precision = 6;
            }
        }
        if day == 0 {
            day = 1;
            precision = 2;
        }
        if month == 0 {
            month = 1;
            precision = 1;
        }
        let rendered = || {
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            )
        };
        let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
            .ok_or_else(|| MetaError::ParseDateTime(rendered()))?;
        let time = NaiveTime::from_hms_opt(hour as u32, minute as u32, second as u32)
            .ok_or_else(|| MetaError::ParseDateTime(rendered()))?;
        Ok(Some(Self::new(
            date.and_time(time),
            Some(precision),
            tz_offset,
        )))
    }

    // Many QuickTime movies use Apple's 1904 timestamp zero point rather
    // than the Unix epoch; assume dates fall between 1970 and 2034.
    fn from_video_timestamp(raw: &Raw) -> Option<Self> {
        let mut time_stamp = raw.coerce_int()?;
        if time_stamp == 0 {
            return None;
        }
        if time_stamp > QT_EPOCH_OFFSET {
            time_stamp -= QT_EPOCH_OFFSET;
        }
        let instant = chrono::DateTime::from_timestamp(time_stamp, 0)?.naive_utc();
        Some(Self::new(instant, Some(6), None))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601(None, true))
    }
}

impl MetaValue for DateTime {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        match tag.family() {
            Family::Exif => Self::from_exif(raw),
            Family::Iptc => Self::from_iptc(raw),
            Family::Xmp => {
                if tag.is_video() {
                    Ok(Self::from_video_timestamp(raw))
                } else {
                    match raw.as_str() {
                        Some(s) => Self::from_iso8601(s, None),
                        None => Ok(None),
                    }
                }
            }
        }
    }

    fn from_video(value: &str, _tag: &Tag) -> MetaResult<Option<Self>> {
        Self::from_iso8601(value, None)
    }

    fn to_exif(&self) -> Raw {
        let iso = self.to_iso8601(Some(self.precision.max(6)), false);
        let date_string = iso[..10].replace('-', ":");
        let time_string = &iso[11..19];
        let sub_sec_string = if iso.len() > 20 { &iso[20..] } else { "" };
        Raw::List(vec![
            Raw::Text(format!("{} {}", date_string, time_string)),
            Raw::Text(sub_sec_string.to_string()),
        ])
    }

    fn to_iptc(&self) -> Raw {
        let month = if self.precision < 2 { 0 } else { self.instant.month() as i64 };
        let day = if self.precision < 3 { 0 } else { self.instant.day() as i64 };
        let date_value = Raw::List(vec![
            Raw::Int(self.instant.year() as i64),
            Raw::Int(month),
            Raw::Int(day),
        ]);
        let time_value = if self.precision < 4 {
            Raw::Null
        } else {
            let offset = self.tz_offset.unwrap_or(0);
            Raw::List(vec![
                Raw::Int(self.instant.hour() as i64),
                Raw::Int(self.instant.minute() as i64),
                Raw::Int(self.instant.second() as i64),
                Raw::Int(offset.div_euclid(60) as i64),
                Raw::Int(offset.rem_euclid(60) as i64),
            ])
        };
        Raw::List(vec![date_value, time_value])
    }

    // XMP uses extended ISO 8601, but the time cannot be hours only, so an
    // hour-level value is written with minutes as well.
    fn to_xmp(&self) -> Raw {
        let precision = if self.precision == 4 { 5 } else { self.precision };
        Raw::Text(self.to_iso8601(Some(precision), true))
    }

    fn has_content(&self) -> bool {
        true
    }

    // Overrides the generic algorithm: equal instants merge field by field
    // with XMP as the trusted source for timezone and precision; differing
    // instants prefer a meaningful timezone, then higher precision, then
    // the existing value.
    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        if other == self {
            return self.clone();
        }
        if other.instant != self.instant {
            // only report when the difference is more than truncation
            let verbose = other.instant != truncate_instant(self.instant, other.precision);
            let self_tz_unset = matches!(self.tz_offset, None | Some(0));
            let other_tz_unset = matches!(other.tz_offset, None | Some(0));
            if self_tz_unset != other_tz_unset {
                if self_tz_unset {
                    if verbose {
                        merge::log_outcome(
                            Some(MergeOutcome::Replaced),
                            info,
                            tag,
                            self,
                            other,
                            Self::QUIET,
                        );
                    }
                    return other.clone();
                }
                if verbose {
                    merge::log_outcome(Some(MergeOutcome::Ignored), info, tag, self, other, Self::QUIET);
                }
                return self.clone();
            }
            if other.precision > self.precision {
                if verbose {
                    merge::log_outcome(Some(MergeOutcome::Replaced), info, tag, self, other, Self::QUIET);
                }
                return other.clone();
            }
            if verbose {
                merge::log_outcome(Some(MergeOutcome::Ignored), info, tag, self, other, Self::QUIET);
            }
            return self.clone();
        }
        // instants agree, merge the remaining fields
        let mut precision = self.precision;
        let mut tz_offset = self.tz_offset;
        if tag.family() == Family::Xmp {
            // XMP is the trusted source for timezone and precision
            precision = other.precision;
            tz_offset = other.tz_offset;
        } else {
            if other.precision > self.precision {
                precision = other.precision;
            }
            // only trust a non-zero timezone (IPTC defaults to zero)
            if matches!(self.tz_offset, None | Some(0)) && !matches!(other.tz_offset, None | Some(0))
            {
                tz_offset = other.tz_offset;
            }
        }
        Self::new(self.instant, Some(precision), tz_offset)
    }
}
