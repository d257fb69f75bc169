//! Licensor contact information
//!
//! Stored under the `plus:Licensor*` fields. The older
//! `Iptc4xmpCore:CreatorContactInfo` structure carries the same data under
//! different names and is read through an explicit key-renaming map; its
//! single address field holds both address lines, separated by a newline.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::strings::Text;
use crate::types::value::MetaValue;

const KEYS: [&str; 9] = [
    "plus:LicensorExtendedAddress",
    "plus:LicensorStreetAddress",
    "plus:LicensorCity",
    "plus:LicensorPostalCode",
    "plus:LicensorRegion",
    "plus:LicensorCountry",
    "plus:LicensorTelephone1",
    "plus:LicensorEmail",
    "plus:LicensorURL",
];

/// Renaming of creator-contact-info fields onto the licensor fields
const CI_MAP: [(&str, &str); 8] = [
    ("Iptc4xmpCore:CiAdrExtadr", "plus:LicensorStreetAddress"),
    ("Iptc4xmpCore:CiAdrCity", "plus:LicensorCity"),
    ("Iptc4xmpCore:CiAdrCtry", "plus:LicensorCountry"),
    ("Iptc4xmpCore:CiEmailWork", "plus:LicensorEmail"),
    ("Iptc4xmpCore:CiTelWork", "plus:LicensorTelephone1"),
    ("Iptc4xmpCore:CiAdrPcode", "plus:LicensorPostalCode"),
    ("Iptc4xmpCore:CiAdrRegion", "plus:LicensorRegion"),
    ("Iptc4xmpCore:CiUrlWork", "plus:LicensorURL"),
];

/// Who to contact about licensing an image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactInfo {
    pub extended_address: Option<Text>,
    pub street_address: Option<Text>,
    pub city: Option<Text>,
    pub postal_code: Option<Text>,
    pub region: Option<Text>,
    pub country: Option<Text>,
    pub telephone: Option<Text>,
    pub email: Option<Text>,
    pub url: Option<Text>,
}

impl ContactInfo {
    fn from_map(map: &BTreeMap<String, Raw>, tag: &Tag) -> Self {
        let field = |key: &str| {
            map.get(key)
                .and_then(|raw| Text::from_raw(raw, tag).ok().flatten())
        };
        Self {
            extended_address: field("plus:LicensorExtendedAddress"),
            street_address: field("plus:LicensorStreetAddress"),
            city: field("plus:LicensorCity"),
            postal_code: field("plus:LicensorPostalCode"),
            region: field("plus:LicensorRegion"),
            country: field("plus:LicensorCountry"),
            telephone: field("plus:LicensorTelephone1"),
            email: field("plus:LicensorEmail"),
            url: field("plus:LicensorURL"),
        }
    }

    fn field_pairs(&self) -> [(&'static str, &Option<Text>); 9] {
        [
            (KEYS[0], &self.extended_address),
            (KEYS[1], &self.street_address),
            (KEYS[2], &self.city),
            (KEYS[3], &self.postal_code),
            (KEYS[4], &self.region),
            (KEYS[5], &self.country),
            (KEYS[6], &self.telephone),
            (KEYS[7], &self.email),
            (KEYS[8], &self.url),
        ]
    }
}

impl fmt::Display for ContactInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (key, value) in self.field_pairs() {
            if let Some(value) = value {
                lines.push(format!("{}: {}", key.split(':').nth(1).unwrap_or(key), value));
            }
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for ContactInfo {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let value = if tag.name() == "Xmp.iptc.CreatorContactInfo" {
            let source = match raw.as_map() {
                Some(map) => map,
                None => return Ok(None),
            };
            // rename the CreatorContactInfo fields, then split the one
            // address field into its two lines
            let mut renamed: BTreeMap<String, Raw> = BTreeMap::new();
            for (from, to) in CI_MAP {
                if let Some(value) = source.get(from) {
                    renamed.insert(to.to_string(), value.clone());
                }
            }
            if let Some(address) = renamed
                .get("plus:LicensorStreetAddress")
                .and_then(Raw::as_str)
                .map(str::to_string)
            {
                if let Some((line1, line2)) = address.split_once('\n') {
                    if !line2.is_empty() {
                        renamed.insert(
                            "plus:LicensorExtendedAddress".to_string(),
                            Raw::Text(line1.to_string()),
                        );
                        renamed.insert(
                            "plus:LicensorStreetAddress".to_string(),
                            Raw::Text(line2.to_string()),
                        );
                    }
                }
            }
            Self::from_map(&renamed, tag)
        } else {
            // licensor data arrives as a one-element structure list
            match raw {
                Raw::List(items) => match items.first().and_then(Raw::as_map) {
                    Some(map) => Self::from_map(map, tag),
                    None => return Ok(None),
                },
                Raw::Map(map) => Self::from_map(map, tag),
                _ => return Ok(None),
            }
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(
            self.field_pairs()
                .iter()
                .map(|(_, value)| value.as_ref().map(MetaValue::to_exif).into())
                .collect(),
        )
    }

    fn to_xmp(&self) -> Raw {
        let mut map = BTreeMap::new();
        for (key, value) in self.field_pairs() {
            if let Some(value) = value {
                map.insert(key.to_string(), value.to_xmp());
            }
        }
        Raw::List(vec![Raw::Map(map)])
    }

    fn has_content(&self) -> bool {
        self.field_pairs().iter().any(|(_, value)| value.is_some())
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag;
            extended_address, street_address, city, postal_code, region,
            country, telephone, email, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creator_contact_info_is_renamed() {
        let mut map = BTreeMap::new();
        map.insert(
            "Iptc4xmpCore:CiAdrExtadr".to_string(),
            Raw::Text("Flat 3\n12 Any Street".to_string()),
        );
        map.insert(
            "Iptc4xmpCore:CiAdrCity".to_string(),
            Raw::Text("London".to_string()),
        );
        map.insert(
            "Iptc4xmpCore:CiEmailWork".to_string(),
            Raw::Text("photo@example.com".to_string()),
        );
        let tag = Tag::parse("Xmp.iptc.CreatorContactInfo").unwrap();
        let contact = ContactInfo::from_raw(&Raw::Map(map), &tag).unwrap().unwrap();
        assert_eq!(
            contact.extended_address.as_ref().map(Text::as_str),
            Some("Flat 3")
        );
        assert_eq!(
            contact.street_address.as_ref().map(Text::as_str),
            Some("12 Any Street")
        );
        assert_eq!(contact.city.as_ref().map(Text::as_str), Some("London"));
        assert_eq!(
            contact.email.as_ref().map(Text::as_str),
            Some("photo@example.com")
        );
    }

    #[test]
    fn licensor_struct_round_trip() {
        let mut map = BTreeMap::new();
        map.insert(
            "plus:LicensorCity".to_string(),
            Raw::Text("London".to_string()),
        );
        map.insert(
            "plus:LicensorURL".to_string(),
            Raw::Text("https://example.com".to_string()),
        );
        let tag = Tag::parse("Xmp.plus.Licensor").unwrap();
        let raw = Raw::List(vec![Raw::Map(map)]);
        let contact = ContactInfo::from_raw(&raw, &tag).unwrap().unwrap();
        let back = ContactInfo::from_raw(&contact.to_xmp(), &tag).unwrap().unwrap();
        assert_eq!(back, contact);
    }

    #[test]
    fn single_line_address_is_street_only() {
        let mut map = BTreeMap::new();
        map.insert(
            "Iptc4xmpCore:CiAdrExtadr".to_string(),
            Raw::Text("12 Any Street".to_string()),
        );
        let tag = Tag::parse("Xmp.iptc.CreatorContactInfo").unwrap();
        let contact = ContactInfo::from_raw(&Raw::Map(map), &tag).unwrap().unwrap();
        assert_eq!(contact.extended_address, None);
        assert_eq!(
            contact.street_address.as_ref().map(Text::as_str),
            Some("12 Any Street")
        );
    }
}
