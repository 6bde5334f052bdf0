use crate::descriptor::RepoDescriptor;
use crate::github::client::GitHubClient;
use crate::github::types::ManifestLookup;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckFailure {
    #[error("Repo not found, or it has no `{}` file.", crate::github::types::MANIFEST_PATH)]
    NotFound,

    #[error("Repo does not have valid `{}` file.", crate::github::types::MANIFEST_PATH)]
    InvalidManifest,

    #[error("Unexpected error validating repo.")]
    Transport,
}

/// Decides whether a repository is a usable hook source.
///
/// Implementations make at most one remote call per `check` and never
/// return transport errors raw: every failure is folded into a
/// [`CheckFailure`] before it reaches the caller.
#[async_trait]
pub trait RepoChecker: Send + Sync {
    async fn check(&self, repo: &RepoDescriptor) -> Result<(), CheckFailure>;
}

pub fn classify(lookup: ManifestLookup) -> Result<(), CheckFailure> {
    match lookup {
        ManifestLookup::File { size } if size > 0 => Ok(()),
        ManifestLookup::File { .. } | ManifestLookup::Directory => {
            Err(CheckFailure::InvalidManifest)
        }
        ManifestLookup::Missing => Err(CheckFailure::NotFound),
    }
}

#[async_trait]
impl RepoChecker for GitHubClient {
    async fn check(&self, repo: &RepoDescriptor) -> Result<(), CheckFailure> {
        match self.lookup_manifest(repo).await {
            Ok(lookup) => classify(lookup),
            Err(e) => {
                tracing::warn!(%repo, error = %e, "unexpected error validating repo");
                Err(CheckFailure::Transport)
            }
        }
    }
}
