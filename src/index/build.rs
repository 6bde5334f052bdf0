use crate::descriptor::RepoDescriptor;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::index::types::{parse_manifest, IndexedRepo, SearchIndex};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

const FETCH_CONCURRENCY: usize = 4;

/// Where index entries and pinned revisions come from.
#[async_trait]
pub trait HookSource: Send + Sync {
    async fn fetch(&self, repo: &RepoDescriptor) -> Result<IndexedRepo>;

    /// Revision to pin when a hook from `repo` is added to a config.
    async fn latest_revision(&self, repo: &RepoDescriptor) -> Result<Option<String>>;
}

#[async_trait]
impl HookSource for GitHubClient {
    async fn fetch(&self, repo: &RepoDescriptor) -> Result<IndexedRepo> {
        let stars = self.stars(repo).await?;
        let hooks = match self.fetch_manifest(repo).await? {
            Some(text) => parse_manifest(&text)?,
            None => Vec::new(),
        };
        Ok(IndexedRepo {
            repository: repo.to_string(),
            stars,
            hooks,
        })
    }

    async fn latest_revision(&self, repo: &RepoDescriptor) -> Result<Option<String>> {
        GitHubClient::latest_revision(self, repo).await
    }
}

/// Fetch every repo and keep those that declare at least one hook, in input
/// order. A repo that fails to fetch is logged and left out.
pub async fn build_index(source: &dyn HookSource, repos: &[RepoDescriptor]) -> SearchIndex {
    let results: Vec<_> = stream::iter(repos)
        .map(|repo| async move { (repo, source.fetch(repo).await) })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let mut repositories = Vec::new();
    for (repo, result) in results {
        match result {
            Ok(entry) if entry.hooks.is_empty() => {
                tracing::info!(%repo, "no hooks declared, skipping");
            }
            Ok(entry) => repositories.push(entry),
            Err(e) => tracing::warn!(%repo, error = %e, "skipping repository"),
        }
    }
    SearchIndex { repositories }
}
