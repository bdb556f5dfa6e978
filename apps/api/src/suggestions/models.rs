//! Anchor text shapes returned by the completion model.
//!
//! The model is asked for `{primary, alternatives}`. Older prompts produced a
//! category-keyed mapping, which is still accepted when parsing.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A metric the model reports either as a number or as prose ("~1,200/mo").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorSuggestion {
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(alias = "anchorText")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnchorTexts {
    /// One recommended anchor plus alternatives. The requested schema.
    Ranked {
        primary: AnchorSuggestion,
        #[serde(default)]
        alternatives: Vec<AnchorSuggestion>,
    },
    /// `{"Exact Match": {...}, "Branded": {...}, ...}`. Deprecated.
    Categorized(CategorizedAnchors),
}

/// Category name to suggestion, kept in the order the model wrote them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedAnchors(Vec<(String, AnchorSuggestion)>);

impl CategorizedAnchors {
    /// A repeated category replaces the earlier entry in place.
    fn insert(&mut self, category: String, suggestion: AnchorSuggestion) {
        match self.0.iter_mut().find(|(name, _)| *name == category) {
            Some(entry) => entry.1 = suggestion,
            None => self.0.push((category, suggestion)),
        }
    }
}

#[cfg(test)]
impl CategorizedAnchors {
    pub fn get(&self, category: &str) -> Option<&AnchorSuggestion> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, suggestion)| suggestion)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for CategorizedAnchors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, suggestion) in &self.0 {
            map.serialize_entry(category, suggestion)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategorizedAnchors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = CategorizedAnchors;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to anchor suggestion")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut categories = CategorizedAnchors::default();
                while let Some((category, suggestion)) = access.next_entry()? {
                    categories.insert(category, suggestion);
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

impl AnchorTexts {
    pub fn suggestion_count(&self) -> usize {
        match self {
            AnchorTexts::Ranked { alternatives, .. } => 1 + alternatives.len(),
            AnchorTexts::Categorized(categories) => categories.0.len(),
        }
    }
}

/// Parsed anchor texts, or the model's raw text when it was not usable JSON.
pub type AnchorOutcome = Result<AnchorTexts, String>;

/// `anchorTexts` as it appears on the wire: an object or a plain string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnchorTextsField {
    Parsed(AnchorTexts),
    Raw(String),
}

impl From<AnchorOutcome> for AnchorTextsField {
    fn from(outcome: AnchorOutcome) -> Self {
        match outcome {
            Ok(parsed) => AnchorTextsField::Parsed(parsed),
            Err(raw) => AnchorTextsField::Raw(raw),
        }
    }
}
