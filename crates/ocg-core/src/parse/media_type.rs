use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A media type object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, serde_json::Value>,
}

/// Find the `application/json` entry of a content map.
///
/// Keys are compared on their essence: parameters after `;` are ignored and
/// the comparison is case-insensitive, so `application/json; charset=utf-8`
/// matches.
pub fn find_json(content: &IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    content
        .iter()
        .find(|(key, _)| is_json(key))
        .map(|(key, mt)| (key.as_str(), mt))
}

fn is_json(key: &str) -> bool {
    let essence = key.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case(JSON_MEDIA_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> MediaType {
        MediaType {
            schema: None,
            example: None,
            examples: IndexMap::new(),
        }
    }

    #[test]
    fn finds_json_with_parameters() {
        let mut content = IndexMap::new();
        content.insert("text/plain".to_string(), media());
        content.insert("Application/JSON; charset=utf-8".to_string(), media());
        let (key, _) = find_json(&content).unwrap();
        assert_eq!(key, "Application/JSON; charset=utf-8");
    }

    #[test]
    fn ignores_other_json_flavours() {
        let mut content = IndexMap::new();
        content.insert("application/problem+json".to_string(), media());
        assert!(find_json(&content).is_none());
    }
}
