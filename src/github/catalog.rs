use async_trait::async_trait;

use super::{ProjectSource, RemoteRepo, SourceError};

/// Built-in portfolio entries with locally assigned ids.
const CATALOG: &[(i64, &str, Option<&str>)] = &[
  (
    1,
    "cartao-de-visita",
    Some("Digital business card with profile, contacts and project list"),
  ),
  (
    2,
    "agenda-academica",
    Some("Class schedule and assignment tracker"),
  ),
  (3, "controle-financeiro", Some("Personal expense tracker")),
  (4, "portfolio-web", None),
];

/// Source that always returns the fixed catalog, regardless of account.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl BuiltinSource {
  pub fn repos() -> Vec<RemoteRepo> {
    CATALOG
      .iter()
      .map(|(id, name, description)| RemoteRepo {
        id: *id,
        name: name.to_string(),
        description: description.map(String::from),
      })
      .collect()
  }
}

#[async_trait]
impl ProjectSource for BuiltinSource {
  async fn fetch(&self, _account: &str) -> Result<Vec<RemoteRepo>, SourceError> {
    Ok(Self::repos())
  }

  fn label(&self) -> &'static str {
    "built-in"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_catalog_is_stable() {
    let first = BuiltinSource.fetch("anyone").await.unwrap();
    let second = BuiltinSource.fetch("someone-else").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), CATALOG.len());
  }

  #[test]
  fn test_catalog_ids_are_unique_and_ascending() {
    let ids: Vec<i64> = BuiltinSource::repos().iter().map(|r| r.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
  }
}
