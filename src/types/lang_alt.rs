//! Language alternative text
//!
//! XMP "Lang Alt" values map RFC 3066 language tags to alternative versions
//! of the same text, with a reserved `x-default` key that mirrors the
//! default language when more than one is present. Language tags compare
//! case-insensitively. The map tracks a preferred default language
//! (separate from the alias key) used for ordering and best-match lookup,
//! and maintains one invariant on every write: the alias entry is removed
//! whenever it is empty or identical to the preferred language's text, so
//! there is never a meaningless duplicate default.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::error::MetaResult;
use crate::core::merge::{self, MergeOutcome};
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::strings::TEXT_SEPARATOR;
use crate::types::value::MetaValue;

/// Multilingual text with a distinguished default
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LangAlt {
    entries: BTreeMap<String, String>,
    default_lang: String,
}

impl LangAlt {
    /// The reserved default-alias key
    pub const DEFAULT: &'static str = "x-default";

    pub fn new() -> Self {
        Self::default()
    }

    /// A single text with no language information
    pub fn from_text(text: &str) -> Self {
        let mut value = Self::new();
        let text = text.trim();
        if !text.is_empty() {
            value.set(Self::DEFAULT, text);
        }
        value
    }

    /// Build from `(language, text)` pairs
    ///
    /// `preferred` is the caller's preferred language hint (e.g. the UI
    /// locale) and becomes the default language if it matches an entry,
    /// directly or by primary subtag. It is an explicit parameter; no
    /// ambient locale is consulted.
    pub fn from_pairs<I, K, V>(pairs: I, preferred: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut value = Self::new();
        let mut rest = Vec::new();
        for (key, text) in pairs {
            // write the alias first so reconciliation sees it whatever
            // order the caller supplied
            if key.as_ref().eq_ignore_ascii_case(Self::DEFAULT) {
                value.set(key.as_ref(), text.as_ref().trim());
            } else {
                rest.push((key.as_ref().to_string(), text.as_ref().trim().to_string()));
            }
        }
        for (key, text) in rest {
            value.set(&key, &text);
        }
        if let Some(preferred) = preferred {
            let primary = preferred.split('-').next().unwrap_or(preferred);
            for candidate in [preferred, primary] {
                if let Some(key) = value.find_key(candidate) {
                    value.default_lang = key;
                    break;
                }
            }
        }
        value
    }

    /// Case-insensitive key lookup, returning the stored casing
    pub fn find_key(&self, key: &str) -> Option<String> {
        self.entries
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .cloned()
    }

    /// The text for a language, looked up case-insensitively
    pub fn get(&self, lang: &str) -> Option<&str> {
        let key = self.find_key(lang)?;
        self.entries.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The preferred default language, or the alias key when none is set
    pub fn default_lang(&self) -> &str {
        if self.default_lang.is_empty() {
            Self::DEFAULT
        } else {
            &self.default_lang
        }
    }

    fn sort_key(&self, key: &str) -> String {
        if key.eq_ignore_ascii_case(Self::DEFAULT) {
            " ".to_string()
        } else if key.eq_ignore_ascii_case(&self.default_lang) && !self.default_lang.is_empty() {
            "!".to_string()
        } else {
            key.to_ascii_lowercase()
        }
    }

    /// Keys ordered default-alias first, then the preferred default
    /// language, then alphabetically
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort_by_key(|k| self.sort_key(k));
        keys
    }

    /// `(language, text)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.keys().into_iter().map(|k| {
            let text = self.entries.get(&k).map(String::as_str).unwrap_or("");
            (k, text)
        })
    }

    /// The text shown when no language is asked for
    pub fn default_text(&self) -> &str {
        self.keys()
            .first()
            .and_then(|k| self.entries.get(k))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Best text for a preferred language: exact tag, then primary
    /// subtag, then case-insensitive prefix, then the default
    pub fn best_match(&self, lang: Option<&str>) -> &str {
        if self.entries.len() == 1 {
            return self.default_text();
        }
        let lang = match lang {
            Some(lang) if !lang.is_empty() => lang,
            _ => return self.default_text(),
        };
        let mut candidates = vec![lang];
        if let Some((primary, _)) = lang.split_once('-') {
            candidates.push(primary);
        }
        for candidate in candidates {
            if let Some(key) = self.find_key(candidate) {
                return self.entries.get(&key).map(String::as_str).unwrap_or("");
            }
            let lower = candidate.to_ascii_lowercase();
            for key in self.keys() {
                if key.to_ascii_lowercase().starts_with(&lower) {
                    return self.entries.get(&key).map(String::as_str).unwrap_or("");
                }
            }
        }
        self.default_text()
    }

    /// Write one entry, maintaining the default-alias invariant
    fn set(&mut self, key: &str, value: &str) {
        if let Some(old_key) = self.find_key(key) {
            if old_key != key {
                // new key does not have the same case as the old one
                if self.default_lang == old_key {
                    self.default_lang = key.to_string();
                }
                self.entries.remove(&old_key);
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        // check for an empty or duplicate 'x-default' entry
        let dflt_key = match self.find_key(Self::DEFAULT) {
            Some(dflt_key) if dflt_key != key => dflt_key,
            _ => return,
        };
        let dflt_value = self.entries.get(&dflt_key).cloned().unwrap_or_default();
        if dflt_value.is_empty() || dflt_value == value {
            if self.default_lang == dflt_key {
                self.default_lang = key.to_string();
            }
            self.entries.remove(&dflt_key);
        }
    }

    /// One-line rendering, `[lang]` markers instead of separator lines
    pub fn compact(&self) -> String {
        let mut parts = Vec::new();
        for (key, text) in self.iter() {
            if !key.eq_ignore_ascii_case(Self::DEFAULT) {
                parts.push(format!("[{}]", key));
            }
            parts.push(text.to_string());
        }
        parts.join(" ")
    }

    /// A copy with one entry added or changed
    pub fn updated(&self, lang: &str, text: &str) -> Self {
        let mut value = self.clone();
        value.set(lang, text);
        value
    }

    /// A copy with a new preferred default language, folding any existing
    /// alias entry into it
    pub fn with_default_lang(&self, lang: &str) -> Self {
        let mut value = self.clone();
        value.default_lang = lang.to_string();
        let mut new_value = value.get(lang).unwrap_or("").to_string();
        let alias_key = match value.find_key(Self::DEFAULT) {
            Some(key) => key,
            None => {
                value.set(lang, &new_value);
                return value;
            }
        };
        let old_value = value.entries.get(&alias_key).cloned().unwrap_or_default();
        value.entries.remove(&alias_key);
        if old_value.contains(&new_value) {
            new_value = old_value;
        } else if !new_value.contains(&old_value) {
            new_value = format!("{}{}{}", new_value, TEXT_SEPARATOR, old_value);
        }
        value.set(lang, &new_value);
        value
    }
}

impl fmt::Display for LangAlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for (key, text) in self.iter() {
            if !key.eq_ignore_ascii_case(Self::DEFAULT) {
                lines.push(format!("-- {} --", key));
            }
            lines.push(text.to_string());
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for LangAlt {
    fn from_raw(raw: &Raw, _tag: &Tag) -> MetaResult<Option<Self>> {
        let value = match raw {
            Raw::Text(text) => Self::from_text(text),
            Raw::Map(map) => Self::from_pairs(
                map.iter().map(|(k, v)| (k.as_str(), v.to_string())),
                None,
            ),
            _ => return Ok(None),
        };
        Ok(if value.has_content() { Some(value) } else { None })
    }

    // the XMP spec says to store only the default language in Exif
    fn to_exif(&self) -> Raw {
        if !self.has_content() {
            return Raw::Null;
        }
        Raw::Text(self.default_text().to_string())
    }

    fn to_xmp(&self) -> Raw {
        if !self.has_content() {
            return Raw::Null;
        }
        let mut map = BTreeMap::new();
        if self.entries.len() == 1 {
            for (key, text) in &self.entries {
                map.insert(key.clone(), Raw::Text(text.clone()));
            }
            return Raw::Map(map);
        }
        // with more than one language the default is repeated under its
        // own language tag
        let default_lang = self.default_lang().to_string();
        let default_text = self.get(&default_lang).unwrap_or_else(|| self.default_text());
        map.insert(Self::DEFAULT.to_string(), Raw::Text(default_text.to_string()));
        map.insert(default_lang, Raw::Text(default_text.to_string()));
        for (key, text) in &self.entries {
            if !text.is_empty() {
                map.insert(key.clone(), Raw::Text(text.clone()));
            }
        }
        Raw::Map(map)
    }

    fn has_content(&self) -> bool {
        self.entries.values().any(|v| !v.is_empty())
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        if other == self {
            return self.clone();
        }
        let mut result = self.clone();
        for (mut key, value) in other.iter().map(|(k, v)| (k, v.to_string())) {
            if key.eq_ignore_ascii_case(Self::DEFAULT) {
                // the alias names no language; attach the text to whichever
                // entry already overlaps it
                for (k, v) in result.iter() {
                    if v.contains(&value) || value.contains(v) {
                        key = k;
                        break;
                    }
                }
            } else {
                key = result.find_key(&key).unwrap_or(key);
            }
            match result.get(&key).map(str::to_string) {
                None => result.set(&key, &value),
                Some(existing) if existing.contains(&value) => continue,
                Some(existing) if value.contains(&existing) => result.set(&key, &value),
                Some(existing) => {
                    result.set(&key, &format!("{}{}{}", existing, TEXT_SEPARATOR, value))
                }
            }
            merge::log_outcome(
                Some(MergeOutcome::Merged),
                &format!("{}[{}]", info, key),
                tag,
                self,
                other,
                Self::QUIET,
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> Tag {
        Tag::parse("Xmp.dc.description").unwrap()
    }

    #[test]
    fn duplicate_default_collapses() {
        let value = LangAlt::from_pairs(
            [("x-default", "Cat"), ("en-GB", "Cat")],
            None,
        );
        assert_eq!(value.len(), 1);
        assert_eq!(value.get("en-GB"), Some("Cat"));
        assert_eq!(value.find_key(LangAlt::DEFAULT), None);

        // order of the input pairs does not matter
        let value = LangAlt::from_pairs(
            [("en-GB", "Cat"), ("x-default", "Cat")],
            None,
        );
        assert_eq!(value.len(), 1);
    }

    #[test]
    fn empty_default_is_dropped() {
        let value = LangAlt::from_pairs([("x-default", ""), ("fr", "Chat")], None);
        assert_eq!(value.len(), 1);
        assert_eq!(value.get("fr"), Some("Chat"));
    }

    #[test]
    fn case_insensitive_lookup_and_rename() {
        let value = LangAlt::from_pairs([("en-gb", "Cat")], None);
        assert_eq!(value.get("EN-GB"), Some("Cat"));

        let value = value.updated("en-GB", "Dog");
        assert_eq!(value.len(), 1);
        assert_eq!(value.find_key("en-gb"), Some("en-GB".to_string()));
        assert_eq!(value.get("en-gb"), Some("Dog"));
    }

    #[test]
    fn best_match_fallbacks() {
        let value = LangAlt::from_pairs([("en-GB", "Cat"), ("fr", "Chat")], None);
        assert_eq!(value.best_match(Some("en-US")), "Cat");
        assert_eq!(value.best_match(Some("fr-CA")), "Chat");
        assert_eq!(value.best_match(Some("de")), value.default_text());
        assert_eq!(value.best_match(None), value.default_text());
    }

    #[test]
    fn preferred_language_orders_first() {
        let value = LangAlt::from_pairs([("en-GB", "Cat"), ("fr", "Chat")], Some("fr-FR"));
        assert_eq!(value.default_lang(), "fr");
        assert_eq!(value.keys(), ["fr", "en-GB"]);
        assert_eq!(value.default_text(), "Chat");
    }

    #[test]
    fn xmp_output_repeats_default() {
        let value = LangAlt::from_pairs([("en-GB", "Cat"), ("fr", "Chat")], Some("en"));
        match value.to_xmp() {
            Raw::Map(map) => {
                assert_eq!(map.get("x-default"), Some(&Raw::Text("Cat".to_string())));
                assert_eq!(map.get("en-GB"), Some(&Raw::Text("Cat".to_string())));
                assert_eq!(map.get("fr"), Some(&Raw::Text("Chat".to_string())));
            }
            other => panic!("unexpected raw shape: {:?}", other),
        }
    }

    #[test]
    fn merge_attaches_alias_to_overlapping_entry() {
        let a = LangAlt::from_pairs([("en-GB", "a longer caption")], None);
        let b = LangAlt::from_text("longer");
        let merged = a.merge("test", &tag(), &b);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.get("en-GB"), Some("a longer caption"));
    }

    #[test]
    fn merge_new_language_inserts() {
        let a = LangAlt::from_pairs([("en-GB", "Cat")], None);
        let b = LangAlt::from_pairs([("fr", "Chat")], None);
        let merged = a.merge("test", &tag(), &b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("fr"), Some("Chat"));
    }

    #[test]
    fn merge_conflicting_text_concatenates() {
        let a = LangAlt::from_pairs([("en-GB", "Cat")], None);
        let b = LangAlt::from_pairs([("en-gb", "Dog")], None);
        let merged = a.merge("test", &tag(), &b);
        assert_eq!(merged.get("en-GB"), Some("Cat // Dog"));
    }

    #[test]
    fn merge_is_idempotent() {
        let a = LangAlt::from_pairs([("en-GB", "Cat"), ("fr", "Chat")], None);
        assert_eq!(a.merge("test", &tag(), &a.clone()), a);
    }

    #[test]
    fn with_default_lang_folds_alias() {
        let a = LangAlt::from_pairs([("x-default", "old text"), ("fr", "Chat")], None);
        let value = a.updated("en", "old");
        // "old" is contained in the alias text, which was folded into "en"
        let value = value.with_default_lang("en");
        assert_eq!(value.default_lang(), "en");
        assert_eq!(value.find_key(LangAlt::DEFAULT), None);
    }
}
