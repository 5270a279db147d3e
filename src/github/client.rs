use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::api_types::{decode_repos, RemoteRepo};
use super::{ProjectSource, SourceError};

const USER_AGENT: &str = concat!("cardfolio/", env!("CARGO_PKG_VERSION"));

/// Unauthenticated GitHub REST client, one page per request.
#[derive(Clone)]
pub struct GithubClient {
  http: reqwest::Client,
  base_url: Url,
}

impl GithubClient {
  pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
    let base_url =
      Url::parse(api_url).map_err(|e| eyre!("Invalid GitHub API url '{}': {}", api_url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("GitHub API url '{}' cannot carry a path", api_url));
    }

    Self::with_builder(base_url, reqwest::Client::builder().timeout(timeout))
  }

  fn with_builder(base_url: Url, builder: reqwest::ClientBuilder) -> Result<Self> {
    let http = builder
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base_url })
  }

  /// `{base}/users/{account}/repos`, with the account percent-encoded.
  pub fn repos_url(&self, account: &str) -> Result<Url, SourceError> {
    let account = account.trim();
    if account.is_empty() || account.contains('/') {
      return Err(SourceError::InvalidAccount(account.to_string()));
    }

    let mut url = self.base_url.clone();
    {
      let mut segments = url
        .path_segments_mut()
        .map_err(|_| SourceError::InvalidAccount(account.to_string()))?;
      segments.pop_if_empty().extend(["users", account, "repos"]);
    }
    Ok(url)
  }
}

#[async_trait]
impl ProjectSource for GithubClient {
  async fn fetch(&self, account: &str) -> Result<Vec<RemoteRepo>, SourceError> {
    let url = self.repos_url(account)?;
    debug!(%url, "Fetching repositories");

    let response = self
      .http
      .get(url.clone())
      .header(ACCEPT, "application/vnd.github+json")
      .send()
      .await
      .map_err(|e| SourceError::Network {
        url: url.to_string(),
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(SourceError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }

    let body = response.text().await.map_err(|e| SourceError::Network {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    let repos = decode_repos(&body).map_err(|e| SourceError::Decode {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    debug!(count = repos.len(), "Fetched repositories");
    Ok(repos)
  }

  fn label(&self) -> &'static str {
    "github"
  }
}
