use crate::descriptor::RepoDescriptor;
use crate::error::Result;
use crate::registry::server::{RegisterRequest, REPO_ROUTE};
use crate::registry::service::RegistrationOutcome;
use crate::registry::store::RepoRecord;
use reqwest::StatusCode;

#[derive(Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RegistryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{REPO_ROUTE}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn register(&self, repo: &RepoDescriptor) -> RegistrationOutcome {
        match self.post(repo).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(%repo, error = %e, "registry request failed");
                RegistrationOutcome::InternalError(e.to_string())
            }
        }
    }

    async fn post(&self, repo: &RepoDescriptor) -> Result<RegistrationOutcome> {
        let body = RegisterRequest {
            owner: repo.owner().to_string(),
            name: repo.name().to_string(),
        };
        let resp = self.http.post(&self.endpoint).json(&body).send().await?;

        let outcome = match resp.status() {
            StatusCode::CREATED | StatusCode::OK => {
                RegistrationOutcome::Created(resp.json::<RepoRecord>().await?)
            }
            StatusCode::CONFLICT => RegistrationOutcome::Conflict,
            StatusCode::NOT_FOUND => RegistrationOutcome::NotFound,
            StatusCode::BAD_REQUEST => RegistrationOutcome::Invalid(error_text(resp).await),
            status => RegistrationOutcome::InternalError(format!(
                "{status}: {}",
                error_text(resp).await
            )),
        };
        Ok(outcome)
    }
}

async fn error_text(resp: reqwest::Response) -> String {
    resp.json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| "no details".to_string())
}
