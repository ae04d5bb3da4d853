use super::types::{RemoteResponse, SourceLocator};
use super::{RemoteError, RemoteSource};
use async_trait::async_trait;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GitHub account used to authenticate API requests
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Body of `GET /repos/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
struct ContentsBody {
    sha: Option<String>,
    content: Option<String>,
}

/// Reads file versions through the GitHub contents API
pub struct GitHubSource {
    client: reqwest::Client,
    credentials: Credentials,
    api_base: String,
}

impl GitHubSource {
    pub fn with_api_base(credentials: Credentials, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            credentials,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn contents_url(&self, locator: &SourceLocator) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base, locator.repository, locator.path
        )
    }
}

#[async_trait]
impl RemoteSource for GitHubSource {
    async fn fetch(
        &self,
        locator: &SourceLocator,
        known_fingerprint: &str,
    ) -> Result<RemoteResponse, RemoteError> {
        let url = self.contents_url(locator);
        debug!(url = %url, "Requesting file metadata");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("token {}", self.credentials.token))
            .header(USER_AGENT, &self.credentials.user)
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_contents_response(status.as_u16(), &body, known_fingerprint)
    }
}

/// Interpret a contents API response.
///
/// Content is only decoded when the reported `sha` differs from
/// `known_fingerprint`.
pub fn parse_contents_response(
    status: u16,
    body: &str,
    known_fingerprint: &str,
) -> Result<RemoteResponse, RemoteError> {
    if status == StatusCode::NOT_FOUND.as_u16() {
        return Ok(RemoteResponse::NotFound);
    }
    if !(200..300).contains(&status) {
        return Err(RemoteError::Status(status));
    }

    let parsed: ContentsBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return Ok(RemoteResponse::Malformed(format!("invalid JSON: {e}"))),
    };

    let Some(sha) = parsed.sha else {
        return Ok(RemoteResponse::Malformed("response has no sha".to_string()));
    };

    if sha == known_fingerprint {
        return Ok(RemoteResponse::Unchanged);
    }

    let Some(encoded) = parsed.content else {
        return Ok(RemoteResponse::Malformed("response has no content".to_string()));
    };

    // GitHub wraps base64 content at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    match BASE64_STANDARD.decode(compact) {
        Ok(content) => Ok(RemoteResponse::Updated {
            fingerprint: sha,
            content,
        }),
        Err(e) => Ok(RemoteResponse::Malformed(format!("invalid base64: {e}"))),
    }
}
