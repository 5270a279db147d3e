use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::store::{ProjectStore, StoreResult};

/// Account the built-in catalog is stamped under
pub const BUILTIN_ACCOUNT: &str = "builtin";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub profile: Profile,
  pub source: SourceConfig,
  /// Cache database location (defaults to the platform data directory)
  pub database: Option<PathBuf>,
}

/// The business card itself
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
  pub name: String,
  pub title: Option<String>,
  #[serde(default)]
  pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Contact {
  pub kind: ContactKind,
  pub value: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
  Phone,
  Email,
  Github,
  Location,
}

impl ContactKind {
  pub fn label(self) -> &'static str {
    match self {
      ContactKind::Phone => "Phone",
      ContactKind::Email => "Email",
      ContactKind::Github => "GitHub",
      ContactKind::Location => "Location",
    }
  }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  /// GitHub repositories of `account`
  #[default]
  Github,
  /// Fixed catalog compiled into the binary
  Builtin,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
  #[serde(default)]
  pub kind: SourceKind,
  /// Account whose repositories are listed
  #[serde(default)]
  pub account: String,
  #[serde(default = "default_api_url")]
  pub api_url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl SourceConfig {
  /// Account used for fetching and for the cache stamp.
  ///
  /// The built-in catalog ignores `account`, so it never stamps a real one.
  pub fn effective_account(&self) -> &str {
    match self.kind {
      SourceKind::Builtin => BUILTIN_ACCOUNT,
      SourceKind::Github => self.account.trim(),
    }
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

fn default_api_url() -> String {
  "https://api.github.com/".to_string()
}

fn default_timeout_secs() -> u64 {
  10
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./cardfolio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/cardfolio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/cardfolio/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("cardfolio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("cardfolio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;

    if config.source.kind == SourceKind::Github && config.source.account.trim().is_empty() {
      return Err(eyre!("source.account must not be empty"));
    }
    if config.source.timeout_secs == 0 {
      return Err(eyre!("source.timeout_secs must be at least 1"));
    }

    Ok(config)
  }

  /// Open the project cache for the configured source.
  ///
  /// Only GitHub results are persisted. The built-in catalog lives in a
  /// throwaway in-memory store so it never mixes with cached repositories.
  pub fn open_store(&self) -> StoreResult<ProjectStore> {
    match (self.source.kind, &self.database) {
      (SourceKind::Builtin, _) => ProjectStore::open_in_memory(),
      (SourceKind::Github, Some(path)) => ProjectStore::open(path),
      (SourceKind::Github, None) => ProjectStore::open_default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::github::BuiltinSource;
  use crate::sync::testing::{repo, ScriptedSource};
  use crate::sync::SyncCoordinator;
  use std::sync::Arc;

  const FULL: &str = r#"
profile:
  name: Ellen Leao
  title: Tecnologista em Sistemas para Internet
  contacts:
    - kind: phone
      value: "+55 11 90000-0000"
    - kind: github
      value: sraleao
source:
  kind: github
  account: sraleao
  timeout_secs: 3
database: /tmp/cardfolio-test.db
"#;

  #[test]
  fn test_parse_full_config() {
    let config = Config::parse(FULL).unwrap();

    assert_eq!(config.profile.name, "Ellen Leao");
    assert_eq!(config.profile.contacts.len(), 2);
    assert_eq!(config.profile.contacts[1].kind, ContactKind::Github);
    assert_eq!(config.source.account, "sraleao");
    assert_eq!(config.source.api_url, "https://api.github.com/");
    assert_eq!(config.source.timeout(), Duration::from_secs(3));
    assert_eq!(config.database, Some(PathBuf::from("/tmp/cardfolio-test.db")));
  }

  #[test]
  fn test_defaults() {
    let config = Config::parse(
      r#"
profile:
  name: Someone
source:
  account: someone
"#,
    )
    .unwrap();

    assert_eq!(config.source.kind, SourceKind::Github);
    assert_eq!(config.source.timeout_secs, 10);
    assert!(config.profile.contacts.is_empty());
    assert!(config.profile.title.is_none());
    assert!(config.database.is_none());
  }

  #[test]
  fn test_empty_account_rejected_for_github() {
    let yaml = "profile:\n  name: X\nsource:\n  account: \"  \"\n";
    assert!(Config::parse(yaml).is_err());

    let builtin = "profile:\n  name: X\nsource:\n  kind: builtin\n";
    let config = Config::parse(builtin).unwrap();
    assert_eq!(config.source.effective_account(), "builtin");
  }

  #[test]
  fn test_zero_timeout_rejected() {
    let yaml = "profile:\n  name: X\nsource:\n  account: x\n  timeout_secs: 0\n";
    let err = Config::parse(yaml).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
  }

  #[test]
  fn test_builtin_ignores_configured_account() {
    let yaml = "profile:\n  name: X\nsource:\n  kind: builtin\n  account: sraleao\n";
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.source.effective_account(), BUILTIN_ACCOUNT);
  }

  fn config_for(kind: &str, database: &Path) -> Config {
    Config::parse(&format!(
      "profile:\n  name: X\nsource:\n  kind: {}\n  account: sraleao\ndatabase: '{}'\n",
      kind,
      database.display()
    ))
    .unwrap()
  }

  #[tokio::test]
  async fn test_builtin_catalog_stays_out_of_github_cache() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cache.db");

    let builtin = config_for("builtin", &db);
    let sync = SyncCoordinator::new(
      Arc::new(BuiltinSource),
      builtin.open_store().unwrap(),
      builtin.source.effective_account(),
    );
    let report = sync.sync().await.unwrap();
    assert_eq!(report.stamp.account, BUILTIN_ACCOUNT);

    let github = config_for("github", &db);
    let store = github.open_store().unwrap();
    let sync = SyncCoordinator::new(
      ScriptedSource::ok(vec![repo(123456, "real-repo", None)]),
      store.clone(),
      github.source.effective_account(),
    );
    sync.sync().await.unwrap();

    let names: Vec<String> = store.list_all().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["real-repo"]);
    assert_eq!(store.last_sync("sraleao").unwrap().map(|s| s.count), Some(1));
    assert_eq!(store.last_sync(BUILTIN_ACCOUNT).unwrap(), None);
  }

  #[test]
  fn test_unknown_contact_kind_rejected() {
    let yaml = "profile:\n  name: X\n  contacts:\n    - kind: fax\n      value: \"1\"\nsource:\n  account: x\n";
    assert!(Config::parse(yaml).is_err());
  }

  #[test]
  fn test_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/cardfolio.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, FULL).unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.profile.title.as_deref(), Some("Tecnologista em Sistemas para Internet"));
  }
}
