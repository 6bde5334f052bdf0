use crate::descriptor::RepoDescriptor;
use crate::error::{HookgateError, Result};
use crate::github::client::GitHubClient;
use crate::registry::store::{RegistryStore, RepoRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Looks up the provider's stable identifier for a repository.
#[async_trait]
pub trait RepoResolver: Send + Sync {
    /// `HookgateError::NotFound` when the repository does not exist.
    async fn resolve_id(&self, repo: &RepoDescriptor) -> Result<String>;
}

#[async_trait]
impl RepoResolver for GitHubClient {
    async fn resolve_id(&self, repo: &RepoDescriptor) -> Result<String> {
        self.repo_node_id(repo).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created(RepoRecord),
    Conflict,
    NotFound,
    Invalid(String),
    InternalError(String),
}

pub struct Registry {
    resolver: Arc<dyn RepoResolver>,
    store: RegistryStore,
}

impl Registry {
    pub fn new(resolver: Arc<dyn RepoResolver>, store: RegistryStore) -> Self {
        Self { resolver, store }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub async fn register(&self, owner: &str, name: &str) -> RegistrationOutcome {
        let repo = match RepoDescriptor::new(owner, name) {
            Ok(r) => r,
            Err(e) => return RegistrationOutcome::Invalid(e.to_string()),
        };

        let id = match self.resolver.resolve_id(&repo).await {
            Ok(id) => id,
            Err(HookgateError::NotFound(_)) => return RegistrationOutcome::NotFound,
            Err(e) => {
                tracing::error!(%repo, error = %e, "resolving repository id");
                return RegistrationOutcome::InternalError(e.to_string());
            }
        };

        let record = RepoRecord {
            id,
            owner: repo.owner().to_string(),
            name: repo.name().to_string(),
            created_at: Utc::now(),
        };

        match self.store.create(record).await {
            Ok(record) => {
                tracing::info!(%repo, id = %record.id, "registered repository");
                RegistrationOutcome::Created(record)
            }
            Err(HookgateError::Conflict(_)) => RegistrationOutcome::Conflict,
            Err(e) => {
                tracing::error!(%repo, error = %e, "persisting repository");
                RegistrationOutcome::InternalError(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeResolver;

    fn registry(resolver: FakeResolver) -> Registry {
        Registry::new(Arc::new(resolver), RegistryStore::in_memory())
    }

    #[tokio::test]
    async fn test_second_submission_conflicts() {
        let registry = registry(FakeResolver::new().with_repo("foo/bar", "R_kgDO1"));

        let first = registry.register("foo", "bar").await;
        match first {
            RegistrationOutcome::Created(record) => {
                assert_eq!(record.id, "R_kgDO1");
                assert_eq!(record.owner, "foo");
                assert_eq!(record.name, "bar");
            }
            other => panic!("expected Created, got {other:?}"),
        }

        assert_eq!(
            registry.register("foo", "bar").await,
            RegistrationOutcome::Conflict
        );
        assert_eq!(registry.store().list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_is_keyed_by_remote_id() {
        // Same repository reached under its old and new name.
        let registry = registry(
            FakeResolver::new()
                .with_repo("old/name", "R_same")
                .with_repo("new/name", "R_same"),
        );

        assert!(matches!(
            registry.register("old", "name").await,
            RegistrationOutcome::Created(_)
        ));
        assert_eq!(
            registry.register("new", "name").await,
            RegistrationOutcome::Conflict
        );
    }

    #[tokio::test]
    async fn test_unknown_repo_is_not_found() {
        let registry = registry(FakeResolver::new());
        assert_eq!(
            registry.register("ghost", "repo").await,
            RegistrationOutcome::NotFound
        );
        assert!(registry.store().list().await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_shape_is_invalid() {
        let registry = registry(FakeResolver::new());
        for (owner, name) in [("", "bar"), ("foo", ""), ("a/b", "c")] {
            assert!(matches!(
                registry.register(owner, name).await,
                RegistrationOutcome::Invalid(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_resolver_failure_is_internal() {
        let registry = registry(FakeResolver::new().broken("foo/bar"));
        assert!(matches!(
            registry.register("foo", "bar").await,
            RegistrationOutcome::InternalError(_)
        ));
    }
}
