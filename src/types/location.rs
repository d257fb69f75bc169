//! The IPTC location hierarchy
//!
//! A location is a named place (sublocation up to world region) plus an
//! optional position. XMP stores locations as structures keyed by the
//! `Iptc4xmpExt` field names; the legacy IPTC-IIM datasets deliver the same
//! fields as a positional list. A location can also be synthesized from a
//! reverse-geocoding address response through an explicit field-mapping
//! table.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};
use crate::types::gps::{Latitude, Longitude};
use crate::types::lang_alt::LangAlt;
use crate::types::rational::Rational;
use crate::types::strings::{Label, MultiString, Text};
use crate::types::value::MetaValue;
use crate::types::group;

/// XMP structure field names, in legacy list order
const KEYS: [&str; 11] = [
    "Iptc4xmpExt:Sublocation",
    "Iptc4xmpExt:City",
    "Iptc4xmpExt:ProvinceState",
    "Iptc4xmpExt:CountryName",
    "Iptc4xmpExt:CountryCode",
    "Iptc4xmpExt:WorldRegion",
    "Iptc4xmpExt:LocationName",
    "Iptc4xmpExt:LocationId",
    "exif:GPSLatitude",
    "exif:GPSLongitude",
    "exif:GPSAltitude",
];

/// One place, named and/or positioned
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub sublocation: Option<Text>,
    pub city: Option<Text>,
    pub province_state: Option<Text>,
    pub country_name: Option<Text>,
    pub country_code: Option<Label>,
    pub world_region: Option<Text>,
    pub location_name: Option<LangAlt>,
    pub location_id: Option<MultiString>,
    pub latitude: Option<Latitude>,
    pub longitude: Option<Longitude>,
    pub altitude: Option<Rational>,
}

impl Location {
    fn normalized(mut self) -> Self {
        // country codes are upper case
        self.country_code = self.country_code.map(|code| Label::new(code.to_uppercase()));
        self
    }

    fn from_fields(fields: &[(&str, &Raw)], tag: &Tag) -> Self {
        let mut value = Self::default();
        for (key, raw) in fields {
            if raw.is_empty() {
                continue;
            }
            match *key {
                "Iptc4xmpExt:Sublocation" => {
                    value.sublocation = Text::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:City" => value.city = Text::from_raw(raw, tag).ok().flatten(),
                "Iptc4xmpExt:ProvinceState" => {
                    value.province_state = Text::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:CountryName" => {
                    value.country_name = Text::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:CountryCode" => {
                    value.country_code = Label::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:WorldRegion" => {
                    value.world_region = Text::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:LocationName" => {
                    value.location_name = LangAlt::from_raw(raw, tag).ok().flatten()
                }
                "Iptc4xmpExt:LocationId" => {
                    value.location_id = MultiString::from_raw(raw, tag).ok().flatten()
                }
                "exif:GPSLatitude" => value.latitude = Latitude::from_raw(raw, tag).ok().flatten(),
                "exif:GPSLongitude" => {
                    value.longitude = Longitude::from_raw(raw, tag).ok().flatten()
                }
                "exif:GPSAltitude" => value.altitude = Rational::from_raw(raw, tag).ok().flatten(),
                _ => {}
            }
        }
        value.normalized()
    }

    /// Synthesize a location from a reverse-geocoding address response
    ///
    /// `key_map` maps each location field (by its `Iptc4xmpExt`/`exif`
    /// name) to the address keys that feed it, in order of preference.
    /// Address components not named in the map are folded into the
    /// sublocation, and only one country code is kept.
    pub fn from_address(
        latitude: &str,
        longitude: &str,
        address: &BTreeMap<String, String>,
        key_map: &[(&str, &[&str])],
    ) -> Self {
        let mut address = address.clone();
        let mut collected: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (key, foreign_keys) in key_map {
            for foreign_key in *foreign_keys {
                let text = match address.get(*foreign_key) {
                    Some(text) if !text.is_empty() => text.clone(),
                    _ => continue,
                };
                if KEYS.contains(key) {
                    let values = collected.entry(*key).or_default();
                    if !values.contains(&text) {
                        values.push(text);
                    }
                }
                address.remove(*foreign_key);
            }
        }
        // only use one country code
        if let Some(codes) = collected.get_mut("Iptc4xmpExt:CountryCode") {
            codes.truncate(1);
        }
        // put unknown address components in the sublocation
        let sublocation = collected.entry("Iptc4xmpExt:Sublocation").or_default();
        for (foreign_key, text) in &address {
            if text.is_empty() || sublocation.join(" ").contains(text.as_str()) {
                continue;
            }
            sublocation.insert(0, format!("{}: {}", foreign_key, text));
        }
        let field = |key: &str| -> Option<String> {
            let values = collected.get(key)?;
            if values.is_empty() {
                return None;
            }
            Some(values.join(", "))
        };
        let value = Self {
            sublocation: field("Iptc4xmpExt:Sublocation").map(Text::new),
            city: field("Iptc4xmpExt:City").map(Text::new),
            province_state: field("Iptc4xmpExt:ProvinceState").map(Text::new),
            country_name: field("Iptc4xmpExt:CountryName").map(Text::new),
            country_code: field("Iptc4xmpExt:CountryCode").map(Label::new),
            world_region: field("Iptc4xmpExt:WorldRegion").map(Text::new),
            location_name: None,
            location_id: None,
            latitude: Latitude::from_degrees(latitude),
            longitude: Longitude::from_degrees(longitude),
            altitude: None,
        };
        value.normalized()
    }

    /// `"lat, lon"` to six decimal places, when both are present
    pub fn as_latlon(&self) -> Option<String> {
        match (&self.latitude, &self.longitude) {
            (Some(latitude), Some(longitude)) => Some(format!("{}, {}", latitude, longitude)),
            _ => None,
        }
    }

    fn field_raws(&self, family: Family) -> Vec<Raw> {
        let convert = |value: &dyn MetaValueRaw| match family {
            Family::Exif => value.raw_exif(),
            Family::Iptc => value.raw_iptc(),
            Family::Xmp => value.raw_xmp(),
        };
        [
            self.sublocation.as_ref().map(|v| convert(v)),
            self.city.as_ref().map(|v| convert(v)),
            self.province_state.as_ref().map(|v| convert(v)),
            self.country_name.as_ref().map(|v| convert(v)),
            self.country_code.as_ref().map(|v| convert(v)),
            self.world_region.as_ref().map(|v| convert(v)),
            self.location_name.as_ref().map(|v| convert(v)),
            self.location_id.as_ref().map(|v| convert(v)),
            self.latitude.as_ref().map(|v| convert(v)),
            self.longitude.as_ref().map(|v| convert(v)),
            self.altitude.as_ref().map(|v| convert(v)),
        ]
        .into_iter()
        .map(Raw::from)
        .collect()
    }
}

/// Object-safe serialization view used to walk a location's fields
trait MetaValueRaw {
    fn raw_exif(&self) -> Raw;
    fn raw_iptc(&self) -> Raw;
    fn raw_xmp(&self) -> Raw;
}

impl<T: MetaValue> MetaValueRaw for T {
    fn raw_exif(&self) -> Raw {
        self.to_exif()
    }

    fn raw_iptc(&self) -> Raw {
        self.to_iptc()
    }

    fn raw_xmp(&self) -> Raw {
        self.to_xmp()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(name) = &self.location_name {
            lines.push(format!("LocationName: {}", name.compact()));
        }
        for (key, value) in [
            ("Sublocation", &self.sublocation),
            ("City", &self.city),
            ("ProvinceState", &self.province_state),
            ("CountryName", &self.country_name),
        ] {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key, value));
            }
        }
        if let Some(code) = &self.country_code {
            lines.push(format!("CountryCode: {}", code));
        }
        if let Some(region) = &self.world_region {
            lines.push(format!("WorldRegion: {}", region));
        }
        if let Some(ids) = &self.location_id {
            lines.push(format!("LocationId: {}", ids));
        }
        if let Some(latlon) = self.as_latlon() {
            lines.push(format!("Lat, lon: {}", latlon));
        }
        if let Some(altitude) = &self.altitude {
            lines.push(format!("Altitude: {}", altitude));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for Location {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            // "legacy" list of string values
            Raw::List(items) => {
                let fields: Vec<(&str, &Raw)> =
                    KEYS.iter().copied().zip(items.iter()).collect();
                Self::from_fields(&fields, tag)
            }
            Raw::Map(map) => {
                let fields: Vec<(&str, &Raw)> = map
                    .iter()
                    .map(|(key, raw)| (key.as_str(), raw))
                    .collect();
                Self::from_fields(&fields, tag)
            }
            _ => return Ok(None),
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(self.field_raws(Family::Exif))
    }

    fn to_iptc(&self) -> Raw {
        Raw::List(self.field_raws(Family::Iptc))
    }

    fn to_xmp(&self) -> Raw {
        if !self.has_content() {
            // a place holder is needed for empty values
            let mut map = BTreeMap::new();
            map.insert("Iptc4xmpExt:City".to_string(), Raw::Text(" ".to_string()));
            return Raw::Map(map);
        }
        let mut map = BTreeMap::new();
        for (key, raw) in KEYS.iter().zip(self.field_raws(Family::Xmp)) {
            if !raw.is_empty() {
                map.insert(key.to_string(), raw);
            }
        }
        Raw::Map(map)
    }

    fn has_content(&self) -> bool {
        self.sublocation.is_some()
            || self.city.is_some()
            || self.province_state.is_some()
            || self.country_name.is_some()
            || self.country_code.is_some()
            || self.world_region.is_some()
            || self.location_name.is_some()
            || self.location_id.is_some()
            || self.latitude.is_some()
            || self.longitude.is_some()
            || self.altitude.is_some()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag;
            sublocation, city, province_state, country_name, country_code,
            world_region, location_name, location_id, latitude, longitude,
            altitude)
    }
}

/// Any number of locations shown in the image
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiLocation(Vec<Location>);

/// The one location the image was created at
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SingleLocation(Vec<Location>);

fn locations_from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Vec<Location>> {
    let mut items = Vec::new();
    match raw {
        // Exif and IPTC store one location, XMP stores any number
        Raw::List(list) if tag.family() == Family::Xmp => {
            for item in list {
                if let Some(location) = Location::from_raw(item, tag)? {
                    items.push(location);
                }
            }
        }
        other => {
            if let Some(location) = Location::from_raw(other, tag)? {
                items.push(location);
            }
        }
    }
    Ok(group::normalize(items))
}

macro_rules! location_group {
    ($name:ident) => {
        impl $name {
            pub fn new<I: IntoIterator<Item = Location>>(items: I) -> Self {
                Self(group::normalize(items.into_iter().collect()))
            }

            pub fn items(&self) -> &[Location] {
                &self.0
            }

            pub fn iter(&self) -> std::slice::Iter<'_, Location> {
                self.0.iter()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let rendered = self
                    .0
                    .iter()
                    .map(Location::to_string)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                f.write_str(&rendered)
            }
        }
    };
}

location_group!(MultiLocation);
location_group!(SingleLocation);

impl MetaValue for MultiLocation {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let items = locations_from_raw(raw, tag)?;
        Ok(if items.is_empty() {
            None
        } else {
            Some(Self(items))
        })
    }

    fn to_exif(&self) -> Raw {
        self.0.first().map(MetaValue::to_exif).unwrap_or(Raw::Null)
    }

    fn to_iptc(&self) -> Raw {
        self.0.first().map(MetaValue::to_iptc).unwrap_or(Raw::Null)
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(self.0.iter().map(MetaValue::to_xmp).collect())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        let index = |items: &[Location], item: &Location| {
            items
                .iter()
                .position(|existing| existing == item)
                .unwrap_or(items.len())
        };
        Self(group::merge_into(&self.0, &other.0, info, tag, index))
    }
}

impl MetaValue for SingleLocation {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let items = locations_from_raw(raw, tag)?;
        Ok(if items.is_empty() {
            None
        } else {
            Some(Self(items))
        })
    }

    fn to_exif(&self) -> Raw {
        self.0.first().map(MetaValue::to_exif).unwrap_or(Raw::Null)
    }

    fn to_iptc(&self) -> Raw {
        self.0.first().map(MetaValue::to_iptc).unwrap_or(Raw::Null)
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(self.0.iter().map(MetaValue::to_xmp).collect())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    // there is only one "location created" slot
    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        let index = |_items: &[Location], _item: &Location| 0;
        Self(group::merge_into(&self.0, &other.0, info, tag, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xmp_tag() -> Tag {
        Tag::parse("Xmp.iptcExt.LocationShown").unwrap()
    }

    fn location_map(city: &str, country_code: &str) -> Raw {
        let mut map = BTreeMap::new();
        map.insert(
            "Iptc4xmpExt:City".to_string(),
            Raw::Text(city.to_string()),
        );
        map.insert(
            "Iptc4xmpExt:CountryCode".to_string(),
            Raw::Text(country_code.to_string()),
        );
        Raw::Map(map)
    }

    #[test]
    fn country_code_is_uppercased() {
        let location = Location::from_raw(&location_map("London", "gb"), &xmp_tag())
            .unwrap()
            .unwrap();
        assert_eq!(location.country_code.as_ref().map(Label::as_str), Some("GB"));
    }

    #[test]
    fn legacy_list_is_positional() {
        let raw = Raw::List(vec![
            Raw::Null,
            Raw::Text("London".to_string()),
            Raw::Null,
            Raw::Text("United Kingdom".to_string()),
        ]);
        let location = Location::from_raw(&raw, &xmp_tag()).unwrap().unwrap();
        assert_eq!(location.city.as_ref().map(Text::as_str), Some("London"));
        assert_eq!(
            location.country_name.as_ref().map(Text::as_str),
            Some("United Kingdom")
        );
    }

    #[test]
    fn from_address_maps_and_folds() {
        let mut address = BTreeMap::new();
        address.insert("town".to_string(), "Broadstairs".to_string());
        address.insert("county".to_string(), "Kent".to_string());
        address.insert("country".to_string(), "United Kingdom".to_string());
        address.insert("country_code".to_string(), "gb".to_string());
        address.insert("leisure".to_string(), "Memorial Recreation Ground".to_string());
        let key_map: &[(&str, &[&str])] = &[
            ("Iptc4xmpExt:City", &["town", "city"]),
            ("Iptc4xmpExt:ProvinceState", &["county"]),
            ("Iptc4xmpExt:CountryName", &["country"]),
            ("Iptc4xmpExt:CountryCode", &["country_code"]),
        ];
        let location = Location::from_address("51.3580", "1.4447", &address, key_map);
        assert_eq!(location.city.as_ref().map(Text::as_str), Some("Broadstairs"));
        assert_eq!(location.country_code.as_ref().map(Label::as_str), Some("GB"));
        // the unmapped component lands in the sublocation
        assert_eq!(
            location.sublocation.as_ref().map(Text::as_str),
            Some("leisure: Memorial Recreation Ground")
        );
        assert!(location.latitude.is_some());
    }

    #[test]
    fn xmp_round_trip() {
        let location = Location::from_raw(&location_map("London", "GB"), &xmp_tag())
            .unwrap()
            .unwrap();
        let back = Location::from_raw(&location.to_xmp(), &xmp_tag()).unwrap().unwrap();
        assert_eq!(back, location);
    }

    #[test]
    fn empty_location_gets_placeholder() {
        let location = Location::default();
        match location.to_xmp() {
            Raw::Map(map) => {
                assert_eq!(
                    map.get("Iptc4xmpExt:City"),
                    Some(&Raw::Text(" ".to_string()))
                );
            }
            other => panic!("unexpected raw shape: {:?}", other),
        }
    }

    #[test]
    fn multi_location_appends_new_places() {
        let a = MultiLocation::from_raw(
            &Raw::List(vec![location_map("London", "GB")]),
            &xmp_tag(),
        )
        .unwrap()
        .unwrap();
        let b = MultiLocation::from_raw(
            &Raw::List(vec![location_map("Paris", "FR")]),
            &xmp_tag(),
        )
        .unwrap()
        .unwrap();
        let merged = a.merge("test", &xmp_tag(), &b);
        assert_eq!(merged.len(), 2);

        // merging the same place again changes nothing
        let merged_again = merged.merge("test", &xmp_tag(), &b);
        assert_eq!(merged_again, merged);
    }

    #[test]
    fn single_location_merges_into_slot() {
        let a = SingleLocation::from_raw(&location_map("London", "GB"), &xmp_tag())
            .unwrap()
            .unwrap();
        let b = SingleLocation::from_raw(&location_map("Paris", "FR"), &xmp_tag())
            .unwrap()
            .unwrap();
        let merged = a.merge("test", &xmp_tag(), &b);
        assert_eq!(merged.len(), 1);
        // conflicting cities concatenate rather than multiply locations
        assert_eq!(
            merged.items()[0].city.as_ref().map(Text::as_str),
            Some("London // Paris")
        );
    }
}
