//! One-shot refresh of the local project store from a remote source.
//!
//! Each call to [`SyncCoordinator::sync`] performs at most one fetch and one
//! batch write. There is no retry, backoff or periodic schedule; callers
//! decide when (and whether) to try again.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::github::{ProjectSource, RemoteRepo, SourceError};
use crate::store::{ProjectStore, StoreError, SyncStamp};

/// Progress of the current (or last) sync invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
  Idle,
  Fetching,
  Applying,
  Done,
  Failed,
}

#[derive(Debug, Error)]
pub enum SyncError {
  #[error(transparent)]
  Source(#[from] SourceError),

  #[error("could not save projects: {0}")]
  Store(#[from] StoreError),
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
  pub source: &'static str,
  pub stamp: SyncStamp,
}

/// Bridges a [`ProjectSource`] and the [`ProjectStore`]; the store's only writer.
pub struct SyncCoordinator {
  source: Arc<dyn ProjectSource>,
  store: ProjectStore,
  account: String,
  phase: watch::Sender<SyncPhase>,
}

impl SyncCoordinator {
  pub fn new(
    source: Arc<dyn ProjectSource>,
    store: ProjectStore,
    account: impl Into<String>,
  ) -> Self {
    let (phase, _) = watch::channel(SyncPhase::Idle);
    Self {
      source,
      store,
      account: account.into(),
      phase,
    }
  }

  pub fn account(&self) -> &str {
    &self.account
  }

  pub fn source_label(&self) -> &'static str {
    self.source.label()
  }

  pub fn store(&self) -> &ProjectStore {
    &self.store
  }

  #[allow(dead_code)]
  pub fn phase(&self) -> SyncPhase {
    *self.phase.borrow()
  }

  pub fn subscribe_phase(&self) -> watch::Receiver<SyncPhase> {
    self.phase.subscribe()
  }

  /// Fetch the account's collection and upsert it into the store.
  ///
  /// Every failure is returned as a value; the store is untouched on error.
  pub async fn sync(&self) -> Result<SyncReport, SyncError> {
    let result = self.run().await;

    match &result {
      Ok(report) => {
        self.phase.send_replace(SyncPhase::Done);
        info!(
          account = %self.account,
          source = report.source,
          count = report.stamp.count,
          "Sync finished"
        );
      }
      Err(e) => {
        self.phase.send_replace(SyncPhase::Failed);
        warn!(account = %self.account, error = %e, "Sync failed");
      }
    }

    result
  }

  async fn run(&self) -> Result<SyncReport, SyncError> {
    self.phase.send_replace(SyncPhase::Fetching);
    let repos = self.source.fetch(&self.account).await?;

    self.phase.send_replace(SyncPhase::Applying);
    let projects = repos.into_iter().map(RemoteRepo::into_project).collect();
    let stamp = self.store.apply_sync(&self.account, projects).await?;

    Ok(SyncReport {
      source: self.source.label(),
      stamp,
    })
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! Scripted sources shared by sync and state tests.

  use super::*;
  use async_trait::async_trait;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use tokio::sync::Notify;

  pub fn repo(id: i64, name: &str, description: Option<&str>) -> RemoteRepo {
    RemoteRepo {
      id,
      name: name.to_string(),
      description: description.map(String::from),
    }
  }

  /// Returns a fixed list, optionally waiting on `gate` first.
  pub struct ScriptedSource {
    pub repos: Vec<RemoteRepo>,
    pub gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
  }

  impl ScriptedSource {
    pub fn ok(repos: Vec<RemoteRepo>) -> Arc<Self> {
      Arc::new(Self {
        repos,
        gate: None,
        calls: AtomicUsize::new(0),
      })
    }

    pub fn gated(repos: Vec<RemoteRepo>, gate: Arc<Notify>) -> Arc<Self> {
      Arc::new(Self {
        repos,
        gate: Some(gate),
        calls: AtomicUsize::new(0),
      })
    }

    pub fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl ProjectSource for ScriptedSource {
    async fn fetch(&self, _account: &str) -> Result<Vec<RemoteRepo>, SourceError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Some(gate) = &self.gate {
        gate.notified().await;
      }
      Ok(self.repos.clone())
    }

    fn label(&self) -> &'static str {
      "scripted"
    }
  }

  /// Always fails as if the network were down.
  pub struct OfflineSource;

  #[async_trait]
  impl ProjectSource for OfflineSource {
    async fn fetch(&self, account: &str) -> Result<Vec<RemoteRepo>, SourceError> {
      Err(SourceError::Network {
        url: format!("http://offline.invalid/users/{account}/repos"),
        message: "connection refused".to_string(),
      })
    }

    fn label(&self) -> &'static str {
      "offline"
    }
  }
}
