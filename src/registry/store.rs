use crate::error::{HookgateError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    repos: Vec<RepoRecord>,
}

/// Registered repositories keyed by their GitHub node id.
///
/// With a backing path every successful create rewrites the whole file; a
/// failed write undoes the insert so memory and disk agree.
pub struct RegistryStore {
    path: Option<PathBuf>,
    records: Mutex<BTreeMap<String, RepoRecord>>,
}

impl RegistryStore {
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let records = match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: StoreFile = toml::from_str(&content)?;
                file.repos.into_iter().map(|r| (r.id.clone(), r)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            records: Mutex::new(records),
        })
    }

    pub async fn create(&self, record: RepoRecord) -> Result<RepoRecord> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.id) {
            return Err(HookgateError::Conflict(format!(
                "{}/{}",
                record.owner, record.name
            )));
        }
        records.insert(record.id.clone(), record.clone());

        if let Some(ref path) = self.path {
            if let Err(e) = write_file(path, &records) {
                records.remove(&record.id);
                return Err(e);
            }
        }
        Ok(record)
    }

    pub async fn list(&self) -> Vec<RepoRecord> {
        self.records.lock().await.values().cloned().collect()
    }
}

fn write_file(path: &Path, records: &BTreeMap<String, RepoRecord>) -> Result<()> {
    let file = StoreFile {
        repos: records.values().cloned().collect(),
    };
    let content =
        toml::to_string_pretty(&file).map_err(|e| HookgateError::Store(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
