//! Image regions
//!
//! An image region marks part of a picture: a boundary (rectangle, circle
//! or polygon, in pixel or relative units) plus role and content-type
//! classifications drawn from the IPTC controlled vocabularies. The legacy
//! Exif SubjectArea tag (2, 3 or 4 plain numbers) converts into a region
//! flagged as the main subject area, of which an image may have only one.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};
use crate::types::group;
use crate::types::value::MetaValue;

/// Identifier of the exclusive main-subject-area role
pub const MAIN_SUBJECT_AREA: &str =
    "http://cv.iptc.org/newscodes/imageregionrole/mainSubjectArea";

/// Identifier of the ordinary subject-area role
pub const SUBJECT_AREA: &str = "http://cv.iptc.org/newscodes/imageregionrole/subjectArea";

/// One term of a controlled vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CvTerm {
    /// Human readable name (en-GB)
    pub name: &'static str,
    /// The newscodes concept URI
    pub uri: &'static str,
}

/// The IPTC image region content types
pub const REGION_TYPES: [CvTerm; 16] = [
    CvTerm { name: "animal", uri: "http://cv.iptc.org/newscodes/imageregiontype/animal" },
    CvTerm { name: "artwork", uri: "http://cv.iptc.org/newscodes/imageregiontype/artwork" },
    CvTerm { name: "dividing line", uri: "http://cv.iptc.org/newscodes/imageregiontype/dividingLine" },
    CvTerm { name: "plant", uri: "http://cv.iptc.org/newscodes/imageregiontype/plant" },
    CvTerm { name: "geographic area", uri: "http://cv.iptc.org/newscodes/imageregiontype/geoArea" },
    CvTerm { name: "graphic", uri: "http://cv.iptc.org/newscodes/imageregiontype/graphic" },
    CvTerm { name: "machine-readable code", uri: "http://cv.iptc.org/newscodes/imageregiontype/machineCode" },
    CvTerm { name: "human", uri: "http://cv.iptc.org/newscodes/imageregiontype/human" },
    CvTerm { name: "product", uri: "http://cv.iptc.org/newscodes/imageregiontype/product" },
    CvTerm { name: "text", uri: "http://cv.iptc.org/newscodes/imageregiontype/text" },
    CvTerm { name: "building", uri: "http://cv.iptc.org/newscodes/imageregiontype/building" },
    CvTerm { name: "vehicle", uri: "http://cv.iptc.org/newscodes/imageregiontype/vehicle" },
    CvTerm { name: "food", uri: "http://cv.iptc.org/newscodes/imageregiontype/food" },
    CvTerm { name: "clothing", uri: "http://cv.iptc.org/newscodes/imageregiontype/clothing" },
    CvTerm { name: "rock formation", uri: "http://cv.iptc.org/newscodes/imageregiontype/rockFormation" },
    CvTerm { name: "body of water", uri: "http://cv.iptc.org/newscodes/imageregiontype/bodyOfWater" },
];

/// The IPTC image region roles
pub const REGION_ROLES: [CvTerm; 11] = [
    CvTerm { name: "cropping", uri: "http://cv.iptc.org/newscodes/imageregionrole/cropping" },
    CvTerm { name: "recommended cropping", uri: "http://cv.iptc.org/newscodes/imageregionrole/recomCropping" },
    CvTerm { name: "landscape format cropping", uri: "http://cv.iptc.org/newscodes/imageregionrole/landscapeCropping" },
    CvTerm { name: "portrait format cropping", uri: "http://cv.iptc.org/newscodes/imageregionrole/portraitCropping" },
    CvTerm { name: "square format cropping", uri: "http://cv.iptc.org/newscodes/imageregionrole/squareCropping" },
    CvTerm { name: "composite image item", uri: "http://cv.iptc.org/newscodes/imageregionrole/compositeImageItem" },
    CvTerm { name: "copyright region", uri: "http://cv.iptc.org/newscodes/imageregionrole/copyrightRegion" },
    CvTerm { name: "subject area", uri: SUBJECT_AREA },
    CvTerm { name: "main subject area", uri: MAIN_SUBJECT_AREA },
    CvTerm { name: "area of interest", uri: "http://cv.iptc.org/newscodes/imageregionrole/areaOfInterest" },
    CvTerm { name: "business use", uri: "http://cv.iptc.org/newscodes/imageregionrole/businessUse" },
];

/// Boundary shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionShape {
    Rectangle,
    Circle,
    Polygon,
}

impl RegionShape {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "polygon" => Some(Self::Polygon),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Polygon => "polygon",
        }
    }
}

/// Whether boundary numbers are pixels or fractions of the image size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionUnit {
    Pixel,
    Relative,
}

impl RegionUnit {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "pixel" => Some(Self::Pixel),
            "relative" => Some(Self::Relative),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pixel => "pixel",
            Self::Relative => "relative",
        }
    }
}

/// One polygon vertex
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

/// A region boundary
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionBoundary {
    pub shape: Option<RegionShape>,
    pub unit: Option<RegionUnit>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub rx: Option<f64>,
    pub vertices: Vec<Vertex>,
}

fn number_raw(value: f64, unit: Option<RegionUnit>) -> Raw {
    if unit == Some(RegionUnit::Pixel) && value.fract() == 0.0 {
        Raw::Int(value as i64)
    } else {
        Raw::Float(value)
    }
}

impl RegionBoundary {
    fn from_map(map: &BTreeMap<String, Raw>) -> Self {
        let number = |key: &str| map.get(key).and_then(Raw::coerce_float);
        let mut vertices = Vec::new();
        if let Some(Raw::List(items)) = map.get("Iptc4xmpExt:rbVertices") {
            for item in items {
                if let Some(vertex) = item.as_map() {
                    let x = vertex.get("Iptc4xmpExt:rbX").and_then(Raw::coerce_float);
                    let y = vertex.get("Iptc4xmpExt:rbY").and_then(Raw::coerce_float);
                    if let (Some(x), Some(y)) = (x, y) {
                        vertices.push(Vertex { x, y });
                    }
                }
            }
        }
        Self {
            shape: map
                .get("Iptc4xmpExt:rbShape")
                .and_then(Raw::as_str)
                .and_then(RegionShape::parse),
            unit: map
                .get("Iptc4xmpExt:rbUnit")
                .and_then(Raw::as_str)
                .and_then(RegionUnit::parse),
            x: number("Iptc4xmpExt:rbX"),
            y: number("Iptc4xmpExt:rbY"),
            w: number("Iptc4xmpExt:rbW"),
            h: number("Iptc4xmpExt:rbH"),
            rx: number("Iptc4xmpExt:rbRx"),
            vertices,
        }
    }

    fn to_map(&self) -> BTreeMap<String, Raw> {
        let mut map = BTreeMap::new();
        if let Some(shape) = self.shape {
            map.insert(
                "Iptc4xmpExt:rbShape".to_string(),
                Raw::Text(shape.as_str().to_string()),
            );
        }
        if let Some(unit) = self.unit {
            map.insert(
                "Iptc4xmpExt:rbUnit".to_string(),
                Raw::Text(unit.as_str().to_string()),
            );
        }
        for (key, value) in [
            ("Iptc4xmpExt:rbX", self.x),
            ("Iptc4xmpExt:rbY", self.y),
            ("Iptc4xmpExt:rbW", self.w),
            ("Iptc4xmpExt:rbH", self.h),
            ("Iptc4xmpExt:rbRx", self.rx),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), number_raw(value, self.unit));
            }
        }
        if !self.vertices.is_empty() {
            let vertices = self
                .vertices
                .iter()
                .map(|vertex| {
                    let mut v = BTreeMap::new();
                    v.insert("Iptc4xmpExt:rbX".to_string(), number_raw(vertex.x, self.unit));
                    v.insert("Iptc4xmpExt:rbY".to_string(), number_raw(vertex.y, self.unit));
                    Raw::Map(v)
                })
                .collect();
            map.insert("Iptc4xmpExt:rbVertices".to_string(), Raw::List(vertices));
        }
        map
    }

    // The mapping published by the IPTC for Exif SubjectArea values:
    // a point becomes a one-vertex polygon, three numbers a circle,
    // four numbers a rectangle centred on the given point.
    fn from_subject_area(numbers: &[i64]) -> Option<Self> {
        let mut boundary = Self {
            unit: Some(RegionUnit::Pixel),
            ..Self::default()
        };
        match *numbers {
            [x, y] => {
                boundary.shape = Some(RegionShape::Polygon);
                boundary.vertices = vec![Vertex {
                    x: x as f64,
                    y: y as f64,
                }];
            }
            [x, y, diameter] => {
                boundary.shape = Some(RegionShape::Circle);
                boundary.x = Some(x as f64);
                boundary.y = Some(y as f64);
                boundary.rx = Some((diameter / 2) as f64);
            }
            [x, y, w, h] => {
                boundary.shape = Some(RegionShape::Rectangle);
                boundary.x = Some((x - w / 2) as f64);
                boundary.y = Some((y - h / 2) as f64);
                boundary.w = Some(w as f64);
                boundary.h = Some(h as f64);
            }
            _ => return None,
        }
        Some(boundary)
    }
}

/// A vocabulary reference as stored in a region: names by language plus
/// concept identifiers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvEntry {
    pub names: BTreeMap<String, String>,
    pub identifiers: Vec<String>,
}

impl CvEntry {
    pub fn from_term(term: &CvTerm) -> Self {
        let mut names = BTreeMap::new();
        names.insert("en-GB".to_string(), term.name.to_string());
        Self {
            names,
            identifiers: vec![term.uri.to_string()],
        }
    }

    fn from_raw(raw: &Raw) -> Option<Self> {
        let map = raw.as_map()?;
        let mut entry = Self::default();
        if let Some(Raw::Map(names)) = map.get("Iptc4xmpExt:Name") {
            for (lang, text) in names {
                if let Some(text) = text.as_str() {
                    entry.names.insert(lang.clone(), text.to_string());
                }
            }
        }
        if let Some(Raw::List(identifiers)) = map.get("xmp:Identifier") {
            entry.identifiers = identifiers
                .iter()
                .filter_map(Raw::as_str)
                .map(str::to_string)
                .collect();
        }
        Some(entry)
    }

    fn to_raw(&self) -> Raw {
        let mut map = BTreeMap::new();
        if !self.names.is_empty() {
            let names = self
                .names
                .iter()
                .map(|(lang, text)| (lang.clone(), Raw::Text(text.clone())))
                .collect();
            map.insert("Iptc4xmpExt:Name".to_string(), Raw::Map(names));
        }
        if !self.identifiers.is_empty() {
            map.insert(
                "xmp:Identifier".to_string(),
                Raw::List(self.identifiers.iter().map(|uri| Raw::Text(uri.clone())).collect()),
            );
        }
        Raw::Map(map)
    }
}

/// One image region
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionItem {
    pub boundary: Option<RegionBoundary>,
    pub id: Option<String>,
    pub roles: Vec<CvEntry>,
    pub ctypes: Vec<CvEntry>,
    pub persons: Vec<String>,
}

impl RegionItem {
    /// A relative-unit rectangle from pixel note geometry, e.g. a face or
    /// crop annotation made against a known image size
    pub fn relative_rectangle(x: f64, y: f64, w: f64, h: f64, dims: (f64, f64)) -> Self {
        let (image_w, image_h) = dims;
        let round4 = |v: f64| (v * 10_000.0).round() / 10_000.0;
        let boundary = RegionBoundary {
            shape: Some(RegionShape::Rectangle),
            unit: Some(RegionUnit::Relative),
            x: Some(round4(x / image_w)),
            y: Some(round4(y / image_h)),
            w: Some(round4(w / image_w)),
            h: Some(round4(h / image_h)),
            rx: None,
            vertices: Vec::new(),
        };
        Self {
            boundary: Some(boundary),
            roles: vec![CvEntry::from_term(&REGION_ROLES[7])],
            ..Self::default()
        }
    }

    /// Only a single region of an image may be the main subject area
    pub fn is_main_subject_area(&self) -> bool {
        self.roles
            .iter()
            .any(|role| role.identifiers.iter().any(|uri| uri == MAIN_SUBJECT_AREA))
    }

    fn from_map(map: &BTreeMap<String, Raw>) -> Self {
        let boundary = map
            .get("Iptc4xmpExt:RegionBoundary")
            .and_then(Raw::as_map)
            .map(RegionBoundary::from_map);
        let entries = |key: &str| -> Vec<CvEntry> {
            match map.get(key) {
                Some(Raw::List(items)) => items.iter().filter_map(CvEntry::from_raw).collect(),
                Some(raw) => CvEntry::from_raw(raw).into_iter().collect(),
                None => Vec::new(),
            }
        };
        let persons = match map.get("Iptc4xmpExt:PersonInImage") {
            Some(Raw::List(items)) => items
                .iter()
                .filter_map(Raw::as_str)
                .map(str::to_string)
                .collect(),
            Some(Raw::Text(name)) => vec![name.clone()],
            _ => Vec::new(),
        };
        Self {
            boundary,
            id: map
                .get("Iptc4xmpExt:rId")
                .and_then(Raw::as_str)
                .map(str::to_string),
            roles: entries("Iptc4xmpExt:rRole"),
            ctypes: entries("Iptc4xmpExt:rCtype"),
            persons,
        }
    }

    fn from_subject_area(raw: &Raw) -> Option<Self> {
        let numbers: Vec<i64> = raw.as_list()?.iter().filter_map(Raw::coerce_int).collect();
        let boundary = RegionBoundary::from_subject_area(&numbers)?;
        Some(Self {
            boundary: Some(boundary),
            roles: vec![CvEntry::from_term(&REGION_ROLES[8])],
            ..Self::default()
        })
    }
}

impl fmt::Display for RegionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(boundary) = &self.boundary {
            let shape = boundary.shape.map(|s| s.as_str()).unwrap_or("unknown");
            let unit = boundary.unit.map(|u| u.as_str()).unwrap_or("unknown");
            lines.push(format!("boundary: {} ({})", shape, unit));
        }
        if let Some(id) = &self.id {
            lines.push(format!("id: {}", id));
        }
        for (key, entries) in [("role", &self.roles), ("type", &self.ctypes)] {
            for entry in entries {
                if let Some(name) = entry.names.values().next() {
                    lines.push(format!("{}: {}", key, name));
                }
            }
        }
        for person in &self.persons {
            lines.push(format!("person: {}", person));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for RegionItem {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        if tag.family() == Family::Exif {
            return Ok(Self::from_subject_area(raw));
        }
        let map = match raw.as_map() {
            Some(map) => map,
            None => return Ok(None),
        };
        let value = Self::from_map(map);
        Ok(if value.has_content() { Some(value) } else { None })
    }

    // the SubjectArea conversion is one way; regions have no Exif form
    fn to_exif(&self) -> Raw {
        Raw::Null
    }

    fn to_xmp(&self) -> Raw {
        let mut map = BTreeMap::new();
        if let Some(boundary) = &self.boundary {
            map.insert(
                "Iptc4xmpExt:RegionBoundary".to_string(),
                Raw::Map(boundary.to_map()),
            );
        }
        if let Some(id) = &self.id {
            map.insert("Iptc4xmpExt:rId".to_string(), Raw::Text(id.clone()));
        }
        if !self.roles.is_empty() {
            map.insert(
                "Iptc4xmpExt:rRole".to_string(),
                Raw::List(self.roles.iter().map(CvEntry::to_raw).collect()),
            );
        }
        if !self.ctypes.is_empty() {
            map.insert(
                "Iptc4xmpExt:rCtype".to_string(),
                Raw::List(self.ctypes.iter().map(CvEntry::to_raw).collect()),
            );
        }
        if !self.persons.is_empty() {
            map.insert(
                "Iptc4xmpExt:PersonInImage".to_string(),
                Raw::List(self.persons.iter().map(|p| Raw::Text(p.clone())).collect()),
            );
        }
        Raw::Map(map)
    }

    fn has_content(&self) -> bool {
        self.boundary.is_some()
            || self.id.is_some()
            || !self.roles.is_empty()
            || !self.ctypes.is_empty()
            || !self.persons.is_empty()
    }
}

/// All regions of one image
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRegions(Vec<RegionItem>);

impl ImageRegions {
    pub fn new<I: IntoIterator<Item = RegionItem>>(items: I) -> Self {
        Self(group::normalize(items.into_iter().collect()))
    }

    pub fn items(&self) -> &[RegionItem] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // identity: the main subject slot is exclusive, then external ids,
    // then structural equality
    fn index(items: &[RegionItem], other: &RegionItem) -> usize {
        if other.is_main_subject_area() {
            return items
                .iter()
                .position(RegionItem::is_main_subject_area)
                .unwrap_or(items.len());
        }
        items
            .iter()
            .position(|item| {
                item == other
                    || (item.id.is_some() && other.id.is_some() && item.id == other.id)
            })
            .unwrap_or(items.len())
    }
}

impl fmt::Display for ImageRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .map(RegionItem::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");
        f.write_str(&rendered)
    }
}

impl MetaValue for ImageRegions {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let mut items = Vec::new();
        match raw {
            Raw::List(list) if tag.family() == Family::Xmp => {
                for item in list {
                    if let Some(region) = RegionItem::from_raw(item, tag)? {
                        items.push(region);
                    }
                }
            }
            other => {
                if let Some(region) = RegionItem::from_raw(other, tag)? {
                    items.push(region);
                }
            }
        }
        let items = group::normalize(items);
        Ok(if items.is_empty() {
            None
        } else {
            Some(Self(items))
        })
    }

    fn to_exif(&self) -> Raw {
        Raw::Null
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(self.0.iter().map(MetaValue::to_xmp).collect())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        Self(group::merge_into(&self.0, &other.0, info, tag, Self::index))
    }
}
