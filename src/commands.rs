//! The non-interactive subcommands. Each prints its result to stdout and
//! reports whether it succeeded.

use crate::config::Config;
use crate::descriptor::{self, RepoDescriptor};
use crate::error::{HookgateError, Result};
use crate::index::build::{self, HookSource};
use crate::index::search::{self, find_hooks};
use crate::index::types::SearchIndex;
use crate::precommit_config;
use crate::registry::store::RegistryStore;
use std::path::Path;

/// Index `requested` repos, or every registered repo when none are named.
pub async fn build_index(
    config: &Config,
    source: &dyn HookSource,
    requested: &[String],
) -> Result<bool> {
    let repos = if requested.is_empty() {
        registered_repos(&config.store_path).await?
    } else {
        let mut repos = Vec::with_capacity(requested.len());
        for text in requested {
            match descriptor::parse(text) {
                Ok(repo) => repos.push(repo),
                Err(e) => {
                    println!("{text}: {e}");
                    return Ok(false);
                }
            }
        }
        repos
    };

    if repos.is_empty() {
        println!("No repositories to index. Register some first or name them as arguments.");
        return Ok(false);
    }

    let index = build::build_index(source, &repos).await;
    index.save(&config.index_path)?;
    tracing::info!(
        path = %config.index_path.display(),
        repos = index.repositories.len(),
        "index saved"
    );
    println!(
        "Indexed {} hooks from {} of {} repositories into {}",
        index.hook_count(),
        index.repositories.len(),
        repos.len(),
        config.index_path.display()
    );
    Ok(true)
}

pub fn search(config: &Config, query: &str, limit: usize) -> Result<bool> {
    let Some(index) = load_index(&config.index_path)? else {
        return Ok(false);
    };

    let hits = search::search(&index, query, limit);
    if hits.is_empty() {
        println!("No results found for query: {query}");
        return Ok(false);
    }
    for hit in hits {
        println!("Match score: {}", hit.score);
        println!("Repository: {}", hit.repository);
        println!("Stars: {}", hit.stars);
        println!("Hook ID: {}", hit.hook.id);
        println!("Hook Name: {}", hit.hook.name);
        println!("Description: {}", hit.hook.description.as_deref().unwrap_or("-"));
        println!("---");
    }
    Ok(true)
}

/// Add the one hook `query` names to `config_file`, creating the file if needed.
pub async fn add(
    config: &Config,
    source: &dyn HookSource,
    query: &str,
    config_file: &Path,
) -> Result<bool> {
    let Some(index) = load_index(&config.index_path)? else {
        return Ok(false);
    };

    let (repo, hook) = match find_hooks(&index, query).as_slice() {
        [] => {
            println!("No hooks found matching '{query}'");
            return Ok(false);
        }
        [(repo, hook)] => (*repo, *hook),
        matches => {
            println!("Multiple hooks found matching '{query}':");
            for (repo, hook) in matches {
                println!("  {}:{}", repo.repository, hook.id);
            }
            return Ok(false);
        }
    };

    let content = match std::fs::read_to_string(config_file) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("Creating {}", config_file.display());
            String::new()
        }
        Err(e) => return Err(e.into()),
    };

    if precommit_config::contains_hook(&content, &repo.repository, &hook.id)? {
        println!("Hook '{}' from '{}' is already in config", hook.id, repo.repository);
        return Ok(false);
    }

    let descriptor = descriptor::parse(&repo.repository)
        .map_err(|e| HookgateError::Index(format!("{}: {e}", repo.repository)))?;
    let rev = source.latest_revision(&descriptor).await?;
    let updated =
        precommit_config::add_hook(&content, &repo.repository, &hook.id, rev.as_deref())?;
    std::fs::write(config_file, updated)?;

    println!("Added hook '{}' from '{}' to config", hook.id, repo.repository);
    Ok(true)
}

pub fn remove(hook_id: &str, config_file: &Path) -> Result<bool> {
    let content = match std::fs::read_to_string(config_file) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("Config file {} not found.", config_file.display());
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    match precommit_config::remove_hook(&content, hook_id)? {
        Some(updated) => {
            std::fs::write(config_file, updated)?;
            println!("Removed hook '{hook_id}' from config");
            Ok(true)
        }
        None => {
            println!("Hook '{hook_id}' not found in config");
            Ok(false)
        }
    }
}

async fn registered_repos(store_path: &Path) -> Result<Vec<RepoDescriptor>> {
    let store = RegistryStore::open(store_path)?;
    Ok(store
        .list()
        .await
        .into_iter()
        .filter_map(|r| RepoDescriptor::new(&r.owner, &r.name).ok())
        .collect())
}

fn load_index(path: &Path) -> Result<Option<SearchIndex>> {
    match SearchIndex::load(path) {
        Ok(index) => Ok(Some(index)),
        Err(HookgateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No index at {}. Run `hookgate build-index` first.", path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::store::RepoRecord;
    use crate::test_utils::FakeHookSource;
    use chrono::Utc;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            store_path: dir.path().join("registry.toml"),
            index_path: dir.path().join("index.toml"),
            ..Config::default()
        }
    }

    fn source() -> FakeHookSource {
        FakeHookSource::new()
            .with_repo("psf/black", 38_000, &["black", "black-jupyter"])
            .with_repo("someone/black", 2, &["black"])
            .with_repo("pycqa/flake8", 3_000, &["flake8"])
            .with_revision("psf/black", "24.1.0")
    }

    #[tokio::test]
    async fn test_build_index_defaults_to_registered_repos() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let store = RegistryStore::open(&config.store_path).unwrap();
        for (id, owner, name) in [("R_1", "psf", "black"), ("R_2", "foo", "gone")] {
            store
                .create(RepoRecord {
                    id: id.to_string(),
                    owner: owner.to_string(),
                    name: name.to_string(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert!(build_index(&config, &source(), &[]).await.unwrap());
        let index = SearchIndex::load(&config.index_path).unwrap();
        assert_eq!(index.repositories.len(), 1);
        assert_eq!(index.repositories[0].repository, "psf/black");
    }

    #[tokio::test]
    async fn test_build_index_rejects_bad_argument() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let requested = vec!["psf/black".to_string(), "nope".to_string()];

        assert!(!build_index(&config, &source(), &requested).await.unwrap());
        assert!(!config.index_path.exists());
    }

    #[tokio::test]
    async fn test_add_then_remove_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let requested = vec!["psf/black".to_string(), "pycqa/flake8".to_string()];
        build_index(&config, &source(), &requested).await.unwrap();
        let file = dir.path().join(precommit_config::DEFAULT_CONFIG_FILE);

        assert!(add(&config, &source(), "black-jupyter", &file).await.unwrap());
        assert!(add(&config, &source(), "flake8", &file).await.unwrap());
        assert!(!add(&config, &source(), "flake8", &file).await.unwrap());

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(precommit_config::contains_hook(&written, "psf/black", "black-jupyter").unwrap());
        assert!(written.contains("24.1.0"));

        assert!(remove("black-jupyter", &file).unwrap());
        assert!(!remove("black-jupyter", &file).unwrap());
        let written = std::fs::read_to_string(&file).unwrap();
        assert!(!written.contains("psf/black"));
        assert!(written.contains("flake8"));
    }

    #[tokio::test]
    async fn test_add_ambiguous_id_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let requested = vec!["psf/black".to_string(), "someone/black".to_string()];
        build_index(&config, &source(), &requested).await.unwrap();
        let file = dir.path().join(precommit_config::DEFAULT_CONFIG_FILE);

        assert!(!add(&config, &source(), "black", &file).await.unwrap());
        assert!(!file.exists());
        assert!(add(&config, &source(), "psf:black:black", &file).await.unwrap());
    }

    #[test]
    fn test_search_without_index_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!search(&config_in(&dir), "black", 5).unwrap());
    }

    #[test]
    fn test_remove_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove("black", &dir.path().join("absent.yaml")).unwrap());
    }
}
