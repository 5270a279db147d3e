//! Remote project sources.
//!
//! A source returns repository-shaped records for an account; the sync
//! coordinator maps them into [`Project`](crate::project::Project)s.

pub mod api_types;
mod catalog;
mod client;

use async_trait::async_trait;
use thiserror::Error;

pub use api_types::RemoteRepo;
pub use catalog::BuiltinSource;
pub use client::GithubClient;

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("invalid account name '{0}'")]
  InvalidAccount(String),

  #[error("request to {url} failed: {message}")]
  Network { url: String, message: String },

  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  #[error("unexpected response from {url}: {message}")]
  Decode { url: String, message: String },
}

/// Anything that can list the repositories of an account.
#[async_trait]
pub trait ProjectSource: Send + Sync {
  /// Fetch the full collection for `account` in one request.
  async fn fetch(&self, account: &str) -> Result<Vec<RemoteRepo>, SourceError>;

  /// Short label for headers and logs (e.g. "github").
  fn label(&self) -> &'static str;
}
