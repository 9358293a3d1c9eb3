use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::{MediaType, find_json};

/// A response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,
}

impl Response {
    pub fn json_content(&self) -> Option<(&str, &MediaType)> {
        find_json(&self.content)
    }

    /// A response without content, e.g. `204`.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}
