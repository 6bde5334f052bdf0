#![cfg(test)]

use crate::descriptor::RepoDescriptor;
use crate::error::{HookgateError, Result};
use crate::github::checker::{CheckFailure, RepoChecker};
use crate::index::build::HookSource;
use crate::index::types::{Hook, IndexedRepo};
use crate::registry::service::RepoResolver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Answers checks from a script keyed by `owner/name`, after a per-repo delay.
/// Unscripted repos come back as not found straight away.
#[derive(Default)]
pub struct ScriptedChecker {
    responses: HashMap<String, (Duration, std::result::Result<(), CheckFailure>)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(
        mut self,
        repo: &str,
        delay_ms: u64,
        outcome: std::result::Result<(), CheckFailure>,
    ) -> Self {
        self.responses
            .insert(repo.to_string(), (Duration::from_millis(delay_ms), outcome));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoChecker for ScriptedChecker {
    async fn check(&self, repo: &RepoDescriptor) -> std::result::Result<(), CheckFailure> {
        let key = repo.to_string();
        self.calls.lock().unwrap().push(key.clone());
        match self.responses.get(&key) {
            Some((delay, outcome)) => {
                tokio::time::sleep(*delay).await;
                *outcome
            }
            None => Err(CheckFailure::NotFound),
        }
    }
}

/// Maps `owner/name` to a fixed node id; `broken` repos fail as transport errors.
#[derive(Default)]
pub struct FakeResolver {
    ids: HashMap<String, String>,
    broken: Vec<String>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: &str, id: &str) -> Self {
        self.ids.insert(repo.to_string(), id.to_string());
        self
    }

    pub fn broken(mut self, repo: &str) -> Self {
        self.broken.push(repo.to_string());
        self
    }
}

#[async_trait]
impl RepoResolver for FakeResolver {
    async fn resolve_id(&self, repo: &RepoDescriptor) -> Result<String> {
        let key = repo.to_string();
        if self.broken.contains(&key) {
            return Err(HookgateError::GitHub("connection reset".to_string()));
        }
        self.ids
            .get(&key)
            .cloned()
            .ok_or(HookgateError::NotFound(key))
    }
}

/// Serves index entries from memory. Every hook's name is its id; repos
/// without a scripted revision have none.
#[derive(Default)]
pub struct FakeHookSource {
    repos: HashMap<String, (u32, Vec<Hook>)>,
    revisions: HashMap<String, String>,
}

impl FakeHookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: &str, stars: u32, hook_ids: &[&str]) -> Self {
        let hooks = hook_ids
            .iter()
            .map(|id| Hook {
                id: id.to_string(),
                name: id.to_string(),
                description: None,
            })
            .collect();
        self.repos.insert(repo.to_string(), (stars, hooks));
        self
    }

    pub fn with_revision(mut self, repo: &str, rev: &str) -> Self {
        self.revisions.insert(repo.to_string(), rev.to_string());
        self
    }
}

#[async_trait]
impl HookSource for FakeHookSource {
    async fn fetch(&self, repo: &RepoDescriptor) -> Result<IndexedRepo> {
        let key = repo.to_string();
        let (stars, hooks) = self
            .repos
            .get(&key)
            .cloned()
            .ok_or_else(|| HookgateError::NotFound(key.clone()))?;
        Ok(IndexedRepo {
            repository: key,
            stars,
            hooks,
        })
    }

    async fn latest_revision(&self, repo: &RepoDescriptor) -> Result<Option<String>> {
        Ok(self.revisions.get(&repo.to_string()).cloned())
    }
}
