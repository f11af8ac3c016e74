use crate::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The `.vott` project manifest, reduced to the fields this tool reads.
/// Everything else in the document is left alone and only touched by the
/// textual rewrite pass.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VottProject {
    /// Keyed by asset id; the same id appears in each record's `id` field.
    pub assets: BTreeMap<String, VottAsset>,
    pub source_connection: VottConnection,
    pub target_connection: VottConnection,
    pub security_token: String,
}

#[derive(Debug, Deserialize)]
pub struct VottAsset {
    pub id: String,
    pub name: String,
    /// `file:`-prefixed, `%20`-encoded absolute path on the machine that
    /// created the project.
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct VottConnection {
    pub name: String,
}

impl VottProject {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
