//! Date/time parsing, precision and merge behavior

use chrono::{Datelike, Timelike};
use pretty_assertions::assert_eq;

use metakit::{DateTime, MetaValue, Raw, Tag};

fn exif_tag() -> Tag {
    Tag::parse("Exif.Photo.DateTimeOriginal").unwrap()
}

fn xmp_tag() -> Tag {
    Tag::parse("Xmp.photoshop.DateCreated").unwrap()
}

#[test]
fn year_month_only() {
    let dt = DateTime::from_iso8601("2004-01", None).unwrap().unwrap();
    assert_eq!(dt.precision(), 2);
    assert_eq!(dt.instant().year(), 2004);
    assert_eq!(dt.instant().month(), 1);
    assert_eq!(dt.instant().day(), 1);
}

#[test]
fn full_datetime_with_offset() {
    let dt = DateTime::from_iso8601("2020-05-17T10:30:00+02:00", None)
        .unwrap()
        .unwrap();
    assert_eq!(dt.precision(), 6);
    assert_eq!(dt.tz_offset(), Some(120));

    let truncated = dt.truncated(3);
    assert_eq!(truncated.tz_offset(), None);
}

#[test]
fn unparseable_datetime_is_the_one_fatal_error() {
    assert!(DateTime::from_iso8601("not a date", None).is_err());
    let raw = Raw::List(vec![Raw::Text("junk value".to_string()), Raw::Null]);
    assert!(DateTime::from_raw(&raw, &exif_tag()).is_err());
}

#[test]
fn exif_serialization_is_fixed_width() {
    let dt = DateTime::from_iso8601("2020-05-17T10:30:09.25", None)
        .unwrap()
        .unwrap();
    match dt.to_exif() {
        Raw::List(items) => {
            assert_eq!(items[0], Raw::Text("2020:05:17 10:30:09".to_string()));
            assert_eq!(items[1], Raw::Text("250".to_string()));
        }
        other => panic!("unexpected raw shape: {:?}", other),
    }
}

#[test]
fn exif_round_trip_preserves_value() {
    let dt = DateTime::from_iso8601("2020-05-17T10:30:09", None)
        .unwrap()
        .unwrap();
    let back = DateTime::from_raw(&dt.to_exif(), &exif_tag()).unwrap().unwrap();
    assert_eq!(back, dt);
}

#[test]
fn xmp_round_trip_preserves_precision_and_zone() {
    for text in ["2004", "2004-01", "2004-01-15", "2020-05-17T10:30:00+02:00"] {
        let dt = DateTime::from_iso8601(text, None).unwrap().unwrap();
        let xmp = match dt.to_xmp() {
            Raw::Text(s) => s,
            other => panic!("unexpected raw shape: {:?}", other),
        };
        let back = DateTime::from_iso8601(&xmp, None).unwrap().unwrap();
        assert_eq!(back, dt);
    }
}

#[test]
fn iptc_date_only_round_trip_is_lossy_by_design() {
    // IPTC cannot distinguish "no time" from midnight, so writing a
    // date-only value produces a null time block
    let dt = DateTime::from_iso8601("2004-01-15", None).unwrap().unwrap();
    match dt.to_iptc() {
        Raw::List(items) => {
            assert_eq!(
                items[0],
                Raw::List(vec![Raw::Int(2004), Raw::Int(1), Raw::Int(15)])
            );
            assert_eq!(items[1], Raw::Null);
        }
        other => panic!("unexpected raw shape: {:?}", other),
    }
}

#[test]
fn video_timestamp_epochs() {
    let tag = Tag::parse("Xmp.video.DateUTC").unwrap();
    // 2020-05-17T10:30:00 UTC as Unix seconds
    let unix = 1_589_711_400i64;
    let dt = DateTime::from_raw(&Raw::Int(unix), &tag).unwrap().unwrap();
    assert_eq!(dt.instant().hour(), 10);

    // the same instant in Apple's 1904 epoch
    let dt_1904 = DateTime::from_raw(&Raw::Int(unix + 2_082_844_800), &tag)
        .unwrap()
        .unwrap();
    assert_eq!(dt_1904, dt);
}

#[test]
fn merge_prefers_meaningful_timezone_then_precision() {
    let zoned = DateTime::from_iso8601("2020-05-17T11:30:00+02:00", None)
        .unwrap()
        .unwrap();
    let naive = DateTime::from_iso8601("2020-05-17T10:30:00", None)
        .unwrap()
        .unwrap();
    assert_eq!(naive.merge("t", &exif_tag(), &zoned), zoned);
    assert_eq!(zoned.merge("t", &exif_tag(), &naive), zoned);

    let precise = DateTime::from_iso8601("2020-05-17", None).unwrap().unwrap();
    let vague = DateTime::from_iso8601("2020-06", None).unwrap().unwrap();
    assert_eq!(vague.merge("t", &exif_tag(), &precise), precise);
}

#[test]
fn merge_equal_instants_takes_xmp_zone_and_precision() {
    let base = DateTime::from_iso8601("2020-05-17T10:30", None).unwrap().unwrap();
    let exif_side = DateTime::new(base.instant(), Some(6), None);
    let xmp_side = DateTime::new(base.instant(), Some(5), Some(120));
    let merged = exif_side.merge("t", &xmp_tag(), &xmp_side);
    assert_eq!(merged.precision(), 5);
    assert_eq!(merged.tz_offset(), Some(120));
}
