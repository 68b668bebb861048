use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    #[serde(rename = "authorId")]
    pub author_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tldr {
    pub text: Option<String>,
}

/// A paper as returned by the Semantic Scholar graph API.
///
/// Every field except the id is optional upstream, and the search endpoint
/// only returns the fields that were requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    #[serde(rename = "paperId")]
    pub paper_id: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Author>,
    #[serde(rename = "citationCount")]
    pub citation_count: Option<u64>,
    #[serde(rename = "publicationDate")]
    pub publication_date: Option<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    #[serde(rename = "externalIds", default, deserialize_with = "null_as_default")]
    pub external_ids: HashMap<String, Value>,
    pub r#abstract: Option<String>,
    pub tldr: Option<Tldr>,
}

impl Paper {
    /// Look up an external identifier, accepting string or numeric values.
    /// Arrays yield their first string element.
    pub fn external_id(&self, scheme: &str) -> Option<String> {
        match self.external_ids.get(scheme)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .find(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string()),
            _ => None,
        }
    }

    pub fn doi(&self) -> Option<String> {
        self.external_id("DOI")
    }

    /// ISSN from the identifier mapping, checking `ISSN` then `issn`.
    pub fn issn(&self) -> Option<String> {
        self.external_id("ISSN").or_else(|| self.external_id("issn"))
    }

    pub fn author_names(&self) -> Vec<String> {
        self.authors
            .iter()
            .map(|a| a.name.clone().unwrap_or_else(|| "Unknown".to_string()))
            .collect()
    }

    pub fn tldr_text(&self) -> Option<&str> {
        self.tldr.as_ref().and_then(|t| t.text.as_deref())
    }
}

/// One page of `paper/search` results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Paper>,
    pub total: Option<u64>,
    pub offset: Option<u64>,
    pub next: Option<u64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
