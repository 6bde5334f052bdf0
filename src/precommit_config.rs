//! Edits to a project's `.pre-commit-config.yaml`.
//!
//! The document is rewritten through `serde_yaml`, so key order survives but
//! comments do not.

use crate::error::{HookgateError, Result};
use serde_yaml::{Mapping, Value};

pub const DEFAULT_CONFIG_FILE: &str = ".pre-commit-config.yaml";

pub fn repo_url(repository: &str) -> String {
    format!("https://github.com/{repository}")
}

pub fn contains_hook(content: &str, repository: &str, hook_id: &str) -> Result<bool> {
    let doc = parse(content)?;
    let url = repo_url(repository);
    Ok(repos(&doc)
        .iter()
        .filter(|entry| entry.get("repo").and_then(Value::as_str) == Some(url.as_str()))
        .any(|entry| hook_ids(entry).any(|id| id == hook_id)))
}

/// Add `hook_id` under the entry for `repository`, creating the entry (pinned
/// at `rev` when known) if the config has none. Adding a hook that is already
/// listed leaves the document unchanged.
pub fn add_hook(
    content: &str,
    repository: &str,
    hook_id: &str,
    rev: Option<&str>,
) -> Result<String> {
    let mut doc = parse(content)?;
    let url = repo_url(repository);
    let repos = repos_mut(&mut doc)?;

    let position = repos
        .iter()
        .position(|entry| entry.get("repo").and_then(Value::as_str) == Some(url.as_str()));
    let entry = match position {
        Some(i) => &mut repos[i],
        None => {
            let mut entry = Mapping::new();
            entry.insert("repo".into(), url.into());
            if let Some(rev) = rev {
                entry.insert("rev".into(), rev.into());
            }
            entry.insert("hooks".into(), Value::Sequence(Vec::new()));
            repos.push(Value::Mapping(entry));
            repos.last_mut().ok_or_else(|| malformed("repos"))?
        }
    };

    if !hook_ids(entry).any(|id| id == hook_id) {
        let hooks = entry
            .as_mapping_mut()
            .ok_or_else(|| malformed("repo entry"))?
            .entry("hooks".into())
            .or_insert_with(|| Value::Sequence(Vec::new()))
            .as_sequence_mut()
            .ok_or_else(|| malformed("hooks"))?;
        let mut hook = Mapping::new();
        hook.insert("id".into(), hook_id.into());
        hooks.push(Value::Mapping(hook));
    }

    Ok(serde_yaml::to_string(&doc)?)
}

/// Drop `hook_id` from every repo entry, and drop entries left with no hooks.
/// `None` when no entry listed the hook.
pub fn remove_hook(content: &str, hook_id: &str) -> Result<Option<String>> {
    let mut doc = parse(content)?;
    let repos = repos_mut(&mut doc)?;
    let mut removed = false;

    repos.retain_mut(|entry| {
        let Some(hooks) = entry.get_mut("hooks").and_then(Value::as_sequence_mut) else {
            return true;
        };
        let before = hooks.len();
        hooks.retain(|h| h.get("id").and_then(Value::as_str) != Some(hook_id));
        if hooks.len() == before {
            return true;
        }
        removed = true;
        !hooks.is_empty()
    });

    if !removed {
        return Ok(None);
    }
    Ok(Some(serde_yaml::to_string(&doc)?))
}

fn parse(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        let mut root = Mapping::new();
        root.insert("repos".into(), Value::Sequence(Vec::new()));
        return Ok(Value::Mapping(root));
    }
    let doc: Value = serde_yaml::from_str(content)?;
    if !doc.is_mapping() {
        return Err(malformed("document"));
    }
    Ok(doc)
}

fn repos(doc: &Value) -> &[Value] {
    doc.get("repos")
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn repos_mut(doc: &mut Value) -> Result<&mut Vec<Value>> {
    doc.as_mapping_mut()
        .ok_or_else(|| malformed("document"))?
        .entry("repos".into())
        .or_insert_with(|| Value::Sequence(Vec::new()))
        .as_sequence_mut()
        .ok_or_else(|| malformed("repos"))
}

fn hook_ids(entry: &Value) -> impl Iterator<Item = &str> {
    entry
        .get("hooks")
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(|h| h.get("id").and_then(Value::as_str))
}

fn malformed(what: &str) -> HookgateError {
    HookgateError::Yaml(serde::de::Error::custom(format!(
        "unexpected shape of {what} in pre-commit config"
    )))
}
