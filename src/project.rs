use serde::{Deserialize, Serialize};

/// A single portfolio entry shown in the project list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id: i64,
  pub name: String,
  pub description: Option<String>,
}

impl Project {
  pub fn new(id: i64, name: impl Into<String>, description: Option<&str>) -> Self {
    Self {
      id,
      name: name.into(),
      description: description.map(String::from),
    }
  }
}
