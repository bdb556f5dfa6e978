//! Wire types for the Site Explorer endpoints.
//!
//! The vendor has shipped the list under different field names across API
//! versions, so each response is resolved once into a plain `Vec` here and
//! nothing downstream cares which shape arrived.

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Field names the organic-keywords list has shipped under, in lookup order.
pub(crate) const KEYWORD_LIST_FIELDS: &[&str] = &["data", "keywords"];
/// Field names the top-pages list has shipped under, in lookup order.
pub(crate) const PAGE_LIST_FIELDS: &[&str] = &["data", "pages"];

/// One organic keyword with its metrics.
///
/// `volume` and `difficulty` are `None` when the vendor omitted them or sent
/// something non-numeric. Unknown metrics never pass a threshold.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "KeywordWire")]
pub struct KeywordRecord {
    pub keyword: String,
    pub volume: Option<f64>,
    pub difficulty: Option<f64>,
}

/// A keyword row as sent. Both difficulty names may appear on one row.
#[derive(Deserialize)]
struct KeywordWire {
    #[serde(default, deserialize_with = "null_as_default")]
    keyword: String,
    #[serde(default, deserialize_with = "lenient_number")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    keyword_difficulty: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    difficulty: Option<f64>,
}

impl From<KeywordWire> for KeywordRecord {
    fn from(wire: KeywordWire) -> Self {
        Self {
            keyword: wire.keyword,
            volume: wire.volume,
            difficulty: wire.keyword_difficulty.or(wire.difficulty),
        }
    }
}

#[cfg(test)]
impl KeywordRecord {
    pub fn new(keyword: impl Into<String>, volume: f64, difficulty: f64) -> Self {
        Self {
            keyword: keyword.into(),
            volume: Some(volume),
            difficulty: Some(difficulty),
        }
    }
}

/// A top-ranking page of the target site.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopPage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub top_keyword: Option<String>,
}

/// Pulls the record list out of a response body.
///
/// The first non-null field in `fields` wins, even when it is an empty list.
/// No such field means no records. A list that is present but not an array
/// is an error. Rows that fail to parse are skipped so one bad row does not
/// cost the rest of the list.
pub(crate) fn parse_list<T: DeserializeOwned>(
    body: &str,
    fields: &[&str],
) -> Result<Vec<T>, serde_json::Error> {
    let root: Value = serde_json::from_str(body)?;
    let Value::Object(root) = root else {
        return Err(de::Error::custom("expected a JSON object at the top level"));
    };

    let Some((field, list)) = fields
        .iter()
        .find_map(|field| root.get(*field).filter(|v| !v.is_null()).map(|v| (*field, v)))
    else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = list else {
        return Err(de::Error::custom(format!("expected `{field}` to be an array")));
    };

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(field, index, "Skipping unreadable record: {e}");
                None
            }
        })
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `200`, `200.5` and `"200"`; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }))
}
