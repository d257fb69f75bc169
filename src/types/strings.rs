//! String-valued metadata
//!
//! Two kinds of text live in photo metadata: values where concatenating two
//! sources would be wrong (a camera model, a country code) and values where
//! it is the least bad answer (a caption edited differently in two places).
//! [`Label`] is the former, [`Text`] the latter; both use substring
//! containment so a truncated copy of a value never duplicates it.

use std::fmt;
use std::ops::Deref;

use crate::core::error::MetaResult;
use crate::core::merge::{self, MergeOutcome};
use crate::core::raw::Raw;
use crate::core::tag::{Family, Tag};
use crate::types::value::MetaValue;

/// Separator used whenever two text fragments have to be kept side by side
pub const TEXT_SEPARATOR: &str = " // ";

fn text_from_raw(raw: &Raw) -> Option<String> {
    let text = match raw {
        Raw::Null | Raw::Map(_) => return None,
        Raw::Text(s) => s.trim().to_string(),
        Raw::Bytes(b) => String::from_utf8_lossy(b).trim().to_string(),
        Raw::Int(_) | Raw::Float(_) | Raw::Ratio(_, _) => raw.to_string(),
        Raw::List(items) => items
            .iter()
            .filter_map(text_from_raw)
            .collect::<Vec<_>>()
            .join(TEXT_SEPARATOR),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Trimmed text that never concatenates on merge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(String);

impl Label {
    pub fn new(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Label {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl MetaValue for Label {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(text_from_raw(raw).map(Label))
    }

    fn to_exif(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }
}

/// Trimmed text that concatenates distinct content on merge
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text(String);

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Text {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl MetaValue for Text {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(text_from_raw(raw).map(Text))
    }

    fn to_exif(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    fn concat(&self, other: &Self) -> (Self, MergeOutcome) {
        (
            Text(format!("{}{}{}", self.0, TEXT_SEPARATOR, other.0)),
            MergeOutcome::Merged,
        )
    }
}

/// Creating software name and version
///
/// IPTC stores the program name and version as two datasets; everywhere
/// else they are one string joined with `" v"`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Software(String);

impl Software {
    pub fn new(value: impl Into<String>) -> Self {
        let value: String = value.into();
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl MetaValue for Software {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        if tag.family() == Family::Iptc {
            if let Some(items) = raw.as_list() {
                let joined = items
                    .iter()
                    .filter_map(Raw::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" v");
                return Ok(if joined.is_empty() {
                    None
                } else {
                    Some(Software(joined))
                });
            }
        }
        Ok(text_from_raw(raw).map(Software))
    }

    fn to_exif(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn to_iptc(&self) -> Raw {
        Raw::List(
            self.0
                .split(" v")
                .map(|part| Raw::Text(part.to_string()))
                .collect(),
        )
    }

    fn to_xmp(&self) -> Raw {
        Raw::Text(self.0.clone())
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    fn concat(&self, other: &Self) -> (Self, MergeOutcome) {
        (
            Software(format!("{}{}{}", self.0, TEXT_SEPARATOR, other.0)),
            MergeOutcome::Merged,
        )
    }
}

/// An ordered list of distinct strings (keywords, location ids, creators)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiString(Vec<String>);

impl MultiString {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            items
                .into_iter()
                .map(|s| s.into().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub fn from_joined(value: &str) -> Self {
        Self::new(value.split(';'))
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MultiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl MetaValue for MultiString {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            Raw::Text(s) => Self::from_joined(s),
            Raw::List(items) => Self::new(items.iter().filter_map(text_from_raw)),
            _ => return Ok(None),
        };
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    fn to_exif(&self) -> Raw {
        Raw::Text(self.0.join(";"))
    }

    fn to_iptc(&self) -> Raw {
        Raw::List(self.0.iter().map(|s| Raw::Text(s.clone())).collect())
    }

    fn to_xmp(&self) -> Raw {
        self.to_iptc()
    }

    fn has_content(&self) -> bool {
        !self.0.is_empty()
    }

    // set-style membership
    fn contains(&self, other: &Self) -> bool {
        other.0.iter().all(|item| self.0.contains(item))
    }

    fn concat(&self, other: &Self) -> (Self, MergeOutcome) {
        let mut result = self.0.clone();
        for item in &other.0 {
            if !result.contains(item) {
                result.push(item.clone());
            }
        }
        (Self(result), MergeOutcome::Merged)
    }

    // IPTC-IIM truncates long values, so an incoming item that is a
    // truncated version of an existing one is not new information
    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        let iptc = tag.family() == Family::Iptc;
        let mut result = self.0.clone();
        let mut merged = false;
        for item in &other.0 {
            let present = result
                .iter()
                .any(|existing| existing == item || (iptc && existing.starts_with(item.as_str())));
            if !present {
                result.push(item.clone());
                merged = true;
            }
        }
        if merged {
            merge::log_outcome(
                Some(MergeOutcome::Merged),
                info,
                tag,
                self,
                other,
                Self::QUIET,
            );
            Self(result)
        } else {
            self.clone()
        }
    }
}

/// Keywords, including machine tags of the form `namespace:predicate=value`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keywords(MultiString);

/// Split a `namespace:predicate=value` machine tag into its parts
fn machine_tag(keyword: &str) -> Option<(&str, &str, &str)> {
    let (lhs, value) = keyword.rsplit_once('=')?;
    let (namespace, predicate) = lhs.rsplit_once(':')?;
    if namespace.is_empty() || predicate.is_empty() || value.is_empty() {
        return None;
    }
    Some((namespace, predicate, value))
}

impl Keywords {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(MultiString::new(items))
    }

    pub fn items(&self) -> &[String] {
        self.0.items()
    }

    /// Keywords meant for people
    pub fn human_tags(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|k| machine_tag(k).is_none())
            .map(String::as_str)
            .collect()
    }

    /// `(keyword, (namespace, predicate, value))` for each machine tag
    pub fn machine_tags(&self) -> impl Iterator<Item = (&str, (&str, &str, &str))> {
        self.0
            .iter()
            .filter_map(|k| machine_tag(k).map(|parts| (k.as_str(), parts)))
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl MetaValue for Keywords {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        Ok(MultiString::from_raw(raw, tag)?.map(Keywords))
    }

    fn to_exif(&self) -> Raw {
        self.0.to_exif()
    }

    fn to_iptc(&self) -> Raw {
        self.0.to_iptc()
    }

    fn to_xmp(&self) -> Raw {
        self.0.to_xmp()
    }

    fn has_content(&self) -> bool {
        self.0.has_content()
    }

    fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    fn concat(&self, other: &Self) -> (Self, MergeOutcome) {
        let (result, outcome) = self.0.concat(&other.0);
        (Keywords(result), outcome)
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        Keywords(self.0.merge(info, tag, &other.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xmp_tag() -> Tag {
        Tag::parse("Xmp.dc.title").unwrap()
    }

    fn iptc_tag() -> Tag {
        Tag::parse("Iptc.Application2.Keywords").unwrap()
    }

    #[test]
    fn label_never_concatenates() {
        let a = Label::new("alpha");
        let b = Label::new("beta");
        assert_eq!(a.merge("test", &xmp_tag(), &b), a);
    }

    #[test]
    fn text_concatenates_distinct_content() {
        let a = Text::new("alpha");
        let b = Text::new("beta");
        assert_eq!(a.merge("test", &xmp_tag(), &b).as_str(), "alpha // beta");
    }

    #[test]
    fn text_substring_is_contained() {
        let a = Text::new("a longer caption");
        let b = Text::new("longer");
        assert_eq!(a.merge("test", &xmp_tag(), &b), a);
        assert_eq!(b.merge("test", &xmp_tag(), &a), a);
    }

    #[test]
    fn list_input_joins() {
        let raw = Raw::List(vec![Raw::Text("one".to_string()), Raw::Text("two".to_string())]);
        let value = Label::from_raw(&raw, &xmp_tag()).unwrap().unwrap();
        assert_eq!(value.as_str(), "one // two");
    }

    #[test]
    fn software_iptc_round_trip() {
        let raw = Raw::List(vec![
            Raw::Text("PhotoThing".to_string()),
            Raw::Text("2.1".to_string()),
        ]);
        let tag = Tag::parse("Iptc.Application2.Program").unwrap();
        let value = Software::from_raw(&raw, &tag).unwrap().unwrap();
        assert_eq!(value.as_str(), "PhotoThing v2.1");
        assert_eq!(
            value.to_iptc(),
            Raw::List(vec![
                Raw::Text("PhotoThing".to_string()),
                Raw::Text("2.1".to_string()),
            ])
        );
    }

    #[test]
    fn multi_string_merge_appends_distinct() {
        let a = MultiString::new(["sunset", "beach"]);
        let b = MultiString::new(["beach", "holiday"]);
        let merged = a.merge("test", &xmp_tag(), &b);
        assert_eq!(merged.items(), ["sunset", "beach", "holiday"]);

        // symmetric in content
        let merged = b.merge("test", &xmp_tag(), &a);
        assert_eq!(merged.items(), ["beach", "holiday", "sunset"]);
    }

    #[test]
    fn multi_string_iptc_truncation() {
        let a = MultiString::new(["a rather long keyword value"]);
        let truncated = MultiString::new(["a rather long keyw"]);
        assert_eq!(a.merge("test", &iptc_tag(), &truncated), a);
        // without the IPTC adapter the truncated copy is new information
        let merged = a.merge("test", &xmp_tag(), &truncated);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn multi_string_parses_joined_text() {
        let value = MultiString::from_raw(&Raw::Text("one; two ;; three".to_string()), &xmp_tag())
            .unwrap()
            .unwrap();
        assert_eq!(value.items(), ["one", "two", "three"]);
        assert_eq!(value.to_exif(), Raw::Text("one;two;three".to_string()));
    }

    #[test]
    fn machine_tags_are_recognized() {
        let keywords = Keywords::new(["sunset", "geo:lat=51.5", "plain:colon"]);
        assert_eq!(keywords.human_tags(), ["sunset", "plain:colon"]);
        let tags: Vec<_> = keywords.machine_tags().collect();
        assert_eq!(tags, [("geo:lat=51.5", ("geo", "lat", "51.5"))]);
    }
}
