//! GitHub REST API client for tag refs and tag objects

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::provenance::api::TagRef;
use crate::provenance::error::ApiError;

/// Client for the git database endpoints of the GitHub API
pub struct GitHubApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubApi {
    /// Creates a client for the given API base URL
    ///
    /// The token, when present, is sent as a bearer token with every request.
    pub fn new(base_url: &str, token: Option<String>, timeout_ms: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent("readme-provenance")
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.github_base_url,
            config.github_token.clone(),
            config.timeout_ms,
        )
    }

    /// Lists `refs/tags/*` of a repository
    pub async fn list_tag_refs(&self, owner: &str, project: &str) -> Result<Vec<TagRef>, ApiError> {
        let url = format!("{}/repos/{}/{}/git/refs/tags", self.base_url, owner, project);
        let body = self.get_json(&url).await?;

        let Value::Array(items) = &body else {
            return Err(malformed(&url, "(body)", &body));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| -> Result<TagRef, ApiError> {
                let prefix = format!("[{i}]");
                Ok(TagRef {
                    raw_ref: string_field(&url, item, &prefix, &["ref"])?.to_string(),
                    sha: string_field(&url, item, &prefix, &["object", "sha"])?.to_string(),
                })
            })
            .collect()
    }

    /// Reads the commit SHA an annotated tag object points to
    pub async fn tag_commit(
        &self,
        owner: &str,
        project: &str,
        tag_sha: &str,
    ) -> Result<String, ApiError> {
        let url = format!(
            "{}/repos/{}/{}/git/tags/{}",
            self.base_url, owner, project, tag_sha
        );
        let body = self.get_json(&url).await?;
        Ok(string_field(&url, &body, "", &["object", "sha"])?.to_string())
    }

    async fn get_json(&self, url: &str) -> Result<Value, ApiError> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                headers,
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Walk `path` from `value` and require a string at the end
fn string_field<'a>(
    url: &str,
    value: &'a Value,
    prefix: &str,
    path: &[&str],
) -> Result<&'a str, ApiError> {
    let field = path.iter().fold(prefix.to_string(), |acc, key| {
        if acc.is_empty() {
            (*key).to_string()
        } else {
            format!("{acc}.{key}")
        }
    });

    let found = path
        .iter()
        .try_fold(value, |current, key| current.get(*key))
        .unwrap_or(&Value::Null);

    found
        .as_str()
        .ok_or_else(|| malformed(url, &field, found))
}

fn malformed(url: &str, field: &str, value: &Value) -> ApiError {
    ApiError::Malformed {
        url: url.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}
