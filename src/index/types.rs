use crate::error::{HookgateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of a repository's hook manifest. Manifest keys other than these
/// (`entry`, `language`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedRepo {
    /// `owner/name`
    pub repository: String,
    pub stars: u32,
    #[serde(default)]
    pub hooks: Vec<Hook>,
}

/// Local snapshot of every indexed repository and its hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    #[serde(default)]
    pub repositories: Vec<IndexedRepo>,
}

impl SearchIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HookgateError::Index(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn hook_count(&self) -> usize {
        self.repositories.iter().map(|r| r.hooks.len()).sum()
    }
}

/// Hooks declared by a `.pre-commit-hooks.yaml` document.
pub fn parse_manifest(text: &str) -> Result<Vec<Hook>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(text)?)
}
