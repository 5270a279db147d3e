//! Serde-deserializable types matching GitHub API responses.
//!
//! Kept apart from [`Project`] so the wire shape can carry fields the store
//! never sees.

use serde::Deserialize;

use crate::project::Project;

/// One entry of `GET /users/{user}/repos`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRepo {
  pub id: i64,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
}

impl RemoteRepo {
  pub fn into_project(self) -> Project {
    Project {
      id: self.id,
      name: self.name,
      description: self.description,
    }
  }
}

/// Decode a repository listing body.
pub fn decode_repos(body: &str) -> serde_json::Result<Vec<RemoteRepo>> {
  serde_json::from_str(body)
}
