//! Rights and licensing information

use std::fmt;

use crate::core::error::MetaResult;
use crate::core::raw::Raw;
use crate::core::tag::Tag;
use crate::types::lang_alt::LangAlt;
use crate::types::strings::Label;
use crate::types::value::MetaValue;

/// Usage terms (multilingual) plus the web statement URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rights {
    usage_terms: Option<LangAlt>,
    web_statement: Option<Label>,
}

impl Rights {
    pub fn new(usage_terms: Option<LangAlt>, web_statement: Option<Label>) -> Self {
        Self {
            usage_terms,
            web_statement,
        }
    }

    pub fn usage_terms(&self) -> Option<&LangAlt> {
        self.usage_terms.as_ref()
    }

    pub fn web_statement(&self) -> Option<&Label> {
        self.web_statement.as_ref()
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        if let Some(usage_terms) = &self.usage_terms {
            lines.push(format!("UsageTerms: {}", usage_terms));
        }
        if let Some(web_statement) = &self.web_statement {
            lines.push(format!("WebStatement: {}", web_statement));
        }
        f.write_str(&lines.join("\n"))
    }
}

impl MetaValue for Rights {
    fn from_raw(raw: &Raw, tag: &Tag) -> MetaResult<Option<Self>> {
        let (usage_raw, web_raw) = match raw {
            Raw::List(items) => (items.first(), items.get(1)),
            Raw::Map(map) => (map.get("UsageTerms"), map.get("WebStatement")),
            _ => return Ok(None),
        };
        let usage_terms = usage_raw.and_then(|raw| LangAlt::from_raw(raw, tag).ok().flatten());
        let web_statement = web_raw.and_then(|raw| Label::from_raw(raw, tag).ok().flatten());
        let value = Self::new(usage_terms, web_statement);
        Ok(if value.has_content() { Some(value) } else { None })
    }

    fn to_exif(&self) -> Raw {
        Raw::List(vec![
            self.usage_terms.as_ref().map(MetaValue::to_exif).into(),
            self.web_statement.as_ref().map(MetaValue::to_exif).into(),
        ])
    }

    fn to_xmp(&self) -> Raw {
        Raw::List(vec![
            self.usage_terms.as_ref().map(MetaValue::to_xmp).into(),
            self.web_statement.as_ref().map(MetaValue::to_xmp).into(),
        ])
    }

    fn has_content(&self) -> bool {
        self.usage_terms.is_some() || self.web_statement.is_some()
    }

    fn merge(&self, info: &str, tag: &Tag, other: &Self) -> Self {
        merge_fields!(self, other, info, tag; usage_terms, web_statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_per_field() {
        let tag = Tag::parse("Xmp.xmpRights.UsageTerms").unwrap();
        let a = Rights::new(Some(LangAlt::from_text("All rights reserved")), None);
        let b = Rights::new(None, Some(Label::new("https://example.com/licence")));
        let merged = a.merge("test", &tag, &b);
        assert!(merged.usage_terms().is_some());
        assert_eq!(
            merged.web_statement().map(Label::as_str),
            Some("https://example.com/licence")
        );
    }
}
