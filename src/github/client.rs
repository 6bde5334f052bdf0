use crate::descriptor::RepoDescriptor;
use crate::error::{HookgateError, Result};
use crate::github::types::{ManifestLookup, MANIFEST_PATH};
use base64::{engine::general_purpose::STANDARD, Engine};
use octocrab::models::repos::Content;
use octocrab::Octocrab;

#[derive(Clone)]
pub struct GitHubClient {
    octo: Octocrab,
}

impl GitHubClient {
    /// Anonymous access works for public repositories, at a lower rate limit.
    pub fn new(token: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        let octo = builder
            .build()
            .map_err(|e| HookgateError::GitHub(e.to_string()))?;

        Ok(Self { octo })
    }

    /// One contents lookup of the manifest at the repository root.
    pub async fn lookup_manifest(&self, repo: &RepoDescriptor) -> Result<ManifestLookup> {
        let result = self
            .octo
            .repos(repo.owner(), repo.name())
            .get_content()
            .path(MANIFEST_PATH)
            .send()
            .await;

        let contents = match result {
            Ok(c) => c,
            Err(e) if is_not_found(&e) => return Ok(ManifestLookup::Missing),
            Err(e) => return Err(HookgateError::GitHub(e.to_string())),
        };

        Ok(lookup_from_listing(&contents.items))
    }

    /// The manifest text, or `None` when the repository has no manifest file.
    pub async fn fetch_manifest(&self, repo: &RepoDescriptor) -> Result<Option<String>> {
        let result = self
            .octo
            .repos(repo.owner(), repo.name())
            .get_content()
            .path(MANIFEST_PATH)
            .send()
            .await;

        let contents = match result {
            Ok(c) => c,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(HookgateError::GitHub(e.to_string())),
        };

        match (lookup_from_listing(&contents.items), contents.items.first()) {
            (ManifestLookup::File { .. }, Some(item)) => decode_content(item).map(Some),
            _ => Ok(None),
        }
    }

    pub async fn stars(&self, repo: &RepoDescriptor) -> Result<u32> {
        let result = self.octo.repos(repo.owner(), repo.name()).get().await;

        match result {
            Ok(r) => Ok(r.stargazers_count.unwrap_or(0)),
            Err(e) if is_not_found(&e) => Err(HookgateError::NotFound(repo.to_string())),
            Err(e) => Err(HookgateError::GitHub(e.to_string())),
        }
    }

    /// Newest tag name, or the head commit sha for untagged repositories.
    pub async fn latest_revision(&self, repo: &RepoDescriptor) -> Result<Option<String>> {
        let handler = self.octo.repos(repo.owner(), repo.name());

        let tags = handler
            .list_tags()
            .per_page(1u8)
            .send()
            .await
            .map_err(|e| HookgateError::GitHub(e.to_string()))?;
        if let Some(tag) = tags.items.into_iter().next() {
            return Ok(Some(tag.name));
        }

        let commits = handler
            .list_commits()
            .per_page(1u8)
            .send()
            .await
            .map_err(|e| HookgateError::GitHub(e.to_string()))?;
        Ok(commits.items.into_iter().next().map(|c| c.sha))
    }

    /// GitHub's node id for the repository, stable across renames and transfers.
    pub async fn repo_node_id(&self, repo: &RepoDescriptor) -> Result<String> {
        let result = self.octo.repos(repo.owner(), repo.name()).get().await;

        match result {
            Ok(r) => Ok(r.node_id.unwrap_or_else(|| r.id.to_string())),
            Err(e) if is_not_found(&e) => Err(HookgateError::NotFound(repo.to_string())),
            Err(e) => Err(HookgateError::GitHub(e.to_string())),
        }
    }
}

/// A file comes back as exactly one item carrying its own path; a directory
/// comes back as a listing of its children.
pub(crate) fn lookup_from_listing(items: &[Content]) -> ManifestLookup {
    match items {
        [item] if item.r#type == "file" && item.path == MANIFEST_PATH => ManifestLookup::File {
            size: u64::try_from(item.size).unwrap_or(0),
        },
        _ => ManifestLookup::Directory,
    }
}

fn decode_content(item: &Content) -> Result<String> {
    let Some(ref encoded) = item.content else {
        return Ok(String::new());
    };
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let raw = STANDARD
        .decode(compact)
        .map_err(|e| HookgateError::GitHub(format!("undecodable {}: {e}", item.path)))?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}
