//! JSON description of existing runtime types.
//!
//! A manifest is a list of types, each naming its supertype, interfaces and
//! members. Member types use JVM descriptors (`I`, `Ljava/lang/String;`,
//! `(I)V`); modifiers are Java keywords. The raw layer here maps the JSON 1:1;
//! resolution into type descriptions happens in the type pool.

use indexmap::IndexMap;

use crate::modifier::flag_for_keyword;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RawType {
    pub name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(rename = "super", default)]
    pub super_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RawField {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RawMethod {
    pub name: String,
    pub descriptor: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RawAnnotation {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub values: IndexMap<String, serde_json::Value>,
}

/// Parse manifest JSON into raw types.
pub fn parse_manifest(json: &str) -> Result<Vec<RawType>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Fold modifier keywords into a flag set, reporting the first unknown one.
pub fn modifier_flags(keywords: &[String]) -> Result<u16, String> {
    keywords.iter().try_fold(0u16, |flags, keyword| {
        flag_for_keyword(keyword)
            .map(|bit| flags | bit)
            .ok_or_else(|| keyword.clone())
    })
}
