//! GPS record merge tolerances and the location hierarchy

use std::collections::BTreeMap;

use num_rational::BigRational;
use pretty_assertions::assert_eq;

use metakit::{
    Altitude, GpsInfo, Label, Latitude, Location, Longitude, MetaValue, MultiLocation, Raw,
    SingleLocation, Tag, Text,
};

fn exif_tag() -> Tag {
    Tag::parse("Exif.GPSInfo.GPSInfo").unwrap()
}

fn xmp_tag() -> Tag {
    Tag::parse("Xmp.iptcExt.LocationShown").unwrap()
}

fn altitude(metres: f64) -> Altitude {
    Altitude::new(BigRational::from_float(metres).unwrap())
}

fn gps(lat: &str, lon: &str, alt: Option<f64>) -> GpsInfo {
    GpsInfo::new(
        None,
        alt.map(altitude),
        Latitude::from_degrees(lat),
        Longitude::from_degrees(lon),
    )
}

#[test]
fn beyond_tolerance_resolves_to_altitude_bearing_record() {
    let without_alt = gps("51.50", "-0.12", None);
    let with_alt = gps("51.51", "-0.12", Some(11.0));

    let merged = without_alt.merge("test", &exif_tag(), &with_alt);
    assert!(merged.altitude().is_some());
    assert!((merged.latitude().unwrap().to_f64() - 51.51).abs() < 1e-6);

    // and the same from the other side
    let merged = with_alt.merge("test", &exif_tag(), &without_alt);
    assert!(merged.altitude().is_some());
    assert!((merged.latitude().unwrap().to_f64() - 51.51).abs() < 1e-6);
}

#[test]
fn within_tolerance_merges_field_by_field() {
    let a = gps("51.5000000", "-0.12", None);
    let b = gps("51.5000001", "-0.12", Some(11.0));
    let merged = a.merge("test", &exif_tag(), &b);
    assert!((merged.latitude().unwrap().to_f64() - 51.5).abs() < 1e-6);
    assert!((merged.altitude().unwrap().to_f64() - 11.0).abs() < 1e-6);
}

#[test]
fn conflicting_altitudes_keep_existing() {
    let a = gps("51.50", "-0.12", Some(5.0));
    let b = gps("51.50", "-0.12", Some(11.0));
    let merged = a.merge("test", &exif_tag(), &b);
    assert!((merged.altitude().unwrap().to_f64() - 5.0).abs() < 1e-9);
}

#[test]
fn gps_round_trips_through_both_formats() {
    let original = gps("51.508333", "-0.125", Some(11.0));
    let back = GpsInfo::from_raw(&original.to_exif(), &exif_tag()).unwrap().unwrap();
    assert!(original.contains(&back));

    let tag = Tag::parse("Xmp.exif.GPSInfo").unwrap();
    let back = GpsInfo::from_raw(&original.to_xmp(), &tag).unwrap().unwrap();
    assert!(original.contains(&back));
}

fn location_raw(fields: &[(&str, &str)]) -> Raw {
    let mut map = BTreeMap::new();
    for (key, value) in fields {
        map.insert(key.to_string(), Raw::Text(value.to_string()));
    }
    Raw::Map(map)
}

#[test]
fn location_hierarchy_from_xmp_struct() {
    let raw = location_raw(&[
        ("Iptc4xmpExt:Sublocation", "Tower Bridge"),
        ("Iptc4xmpExt:City", "London"),
        ("Iptc4xmpExt:CountryName", "United Kingdom"),
        ("Iptc4xmpExt:CountryCode", "gb"),
        ("exif:GPSLatitude", "51,30.1N"),
        ("exif:GPSLongitude", "0,4.5W"),
    ]);
    let location = Location::from_raw(&raw, &xmp_tag()).unwrap().unwrap();
    assert_eq!(location.city.as_ref().map(Text::as_str), Some("London"));
    assert_eq!(location.country_code.as_ref().map(Label::as_str), Some("GB"));
    assert!(location.latitude.is_some());
    assert!(location.as_latlon().is_some());
}

#[test]
fn multi_location_is_additive_single_location_is_not() {
    let london = Location::from_raw(&location_raw(&[("Iptc4xmpExt:City", "London")]), &xmp_tag())
        .unwrap()
        .unwrap();
    let paris = Location::from_raw(&location_raw(&[("Iptc4xmpExt:City", "Paris")]), &xmp_tag())
        .unwrap()
        .unwrap();

    let shown = MultiLocation::new([london.clone()]);
    let merged = shown.merge("test", &xmp_tag(), &MultiLocation::new([paris.clone()]));
    assert_eq!(merged.len(), 2);

    let created = SingleLocation::new([london]);
    let merged = created.merge("test", &xmp_tag(), &SingleLocation::new([paris]));
    assert_eq!(merged.len(), 1);
}

#[test]
fn reverse_geocode_address_mapping() {
    let mut address = BTreeMap::new();
    address.insert("city".to_string(), "London".to_string());
    address.insert("country".to_string(), "United Kingdom".to_string());
    address.insert("country_code".to_string(), "gb".to_string());
    address.insert("tourism".to_string(), "Tower Bridge".to_string());
    let key_map: &[(&str, &[&str])] = &[
        ("Iptc4xmpExt:City", &["city", "town", "village"]),
        ("Iptc4xmpExt:CountryName", &["country"]),
        ("Iptc4xmpExt:CountryCode", &["country_code"]),
    ];
    let location = Location::from_address("51.5055", "-0.0754", &address, key_map);
    assert_eq!(location.city.as_ref().map(Text::as_str), Some("London"));
    assert_eq!(location.country_code.as_ref().map(Label::as_str), Some("GB"));
    assert_eq!(
        location.sublocation.as_ref().map(Text::as_str),
        Some("tourism: Tower Bridge")
    );
}
