//! Observable state for the project list screen.
//!
//! [`ProjectListModel`] combines the store's live list query with the outcome
//! of a single background sync and republishes both as a [`UiState`]:
//!
//! ```ignore
//! let mut model = ProjectListModel::new(coordinator);
//!
//! // In event loop tick
//! if model.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match model.state() {
//!     UiState::Loading => render_spinner(),
//!     UiState::Success(projects) => render_list(projects),
//!     UiState::Error(e) => render_list_with_error(model.cached(), e),
//! }
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::project::Project;
use crate::store::LiveQuery;
use crate::sync::{SyncCoordinator, SyncReport};

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState<T> {
  /// No data judgment yet
  Loading,
  /// Latest committed data
  Success(T),
  /// Last sync failed; cached data is still available separately
  Error(String),
}

impl<T> UiState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, UiState::Loading)
  }

  #[allow(dead_code)]
  pub fn is_success(&self) -> bool {
    matches!(self, UiState::Success(_))
  }

  #[allow(dead_code)]
  pub fn is_error(&self) -> bool {
    matches!(self, UiState::Error(_))
  }

  #[allow(dead_code)]
  pub fn data(&self) -> Option<&T> {
    match self {
      UiState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      UiState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type SyncOutcome = Result<SyncReport, String>;

/// Project list state for one screen visit.
///
/// Creating the model starts exactly one sync. Dropping it cancels any sync
/// still in flight; the store never sees a partial write either way.
pub struct ProjectListModel {
  state: UiState<Vec<Project>>,
  cached: Vec<Project>,
  live: LiveQuery<Vec<Project>>,
  sync: Arc<SyncCoordinator>,
  receiver: Option<mpsc::UnboundedReceiver<SyncOutcome>>,
  task: Option<JoinHandle<()>>,
  last_report: Option<SyncReport>,
}

impl ProjectListModel {
  /// Must be called from within a Tokio runtime.
  pub fn new(sync: Arc<SyncCoordinator>) -> Self {
    let mut live = sync.store().watch_all();
    let cached = live.current();

    let mut model = Self {
      state: UiState::Loading,
      cached,
      live,
      sync,
      receiver: None,
      task: None,
      last_report: None,
    };
    model.start_sync();
    model
  }

  pub fn state(&self) -> &UiState<Vec<Project>> {
    &self.state
  }

  /// Latest store contents, regardless of the sync outcome.
  pub fn cached(&self) -> &[Project] {
    &self.cached
  }

  pub fn is_syncing(&self) -> bool {
    self.receiver.is_some()
  }

  pub fn last_report(&self) -> Option<&SyncReport> {
    self.last_report.as_ref()
  }

  pub fn account(&self) -> &str {
    self.sync.account()
  }

  /// Start another sync unless one is already running.
  pub fn refresh(&mut self) {
    if self.is_syncing() {
      return;
    }
    self.start_sync();
  }

  /// Apply store changes and the sync outcome, if any arrived.
  ///
  /// Returns `true` if the state changed. Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;

    if self.live.has_changed() {
      self.cached = self.live.current();
      self.state = UiState::Success(self.cached.clone());
      changed = true;
    }

    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return changed,
    };

    match receiver.try_recv() {
      Ok(Ok(report)) => {
        // The commit may have landed after the live check above
        self.cached = self.live.current();
        self.state = UiState::Success(self.cached.clone());
        self.last_report = Some(report);
        self.finish_sync();
        true
      }
      Ok(Err(message)) => {
        self.state = UiState::Error(message);
        self.finish_sync();
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => changed,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        self.state = UiState::Error("Sync was cancelled".to_string());
        self.finish_sync();
        true
      }
    }
  }

  fn start_sync(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = if self.cached.is_empty() {
      UiState::Loading
    } else {
      UiState::Success(self.cached.clone())
    };

    let sync = Arc::clone(&self.sync);
    self.task = Some(tokio::spawn(async move {
      let result = sync.sync().await.map_err(|e| e.to_string());
      // Ignore send errors - the model may have been dropped
      let _ = tx.send(result);
    }));
  }

  fn finish_sync(&mut self) {
    self.receiver = None;
    self.task = None;
  }
}

impl Drop for ProjectListModel {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl std::fmt::Debug for ProjectListModel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ProjectListModel")
      .field("state", &self.state)
      .field("syncing", &self.is_syncing())
      .field("last_report", &self.last_report)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::ProjectStore;
  use crate::sync::testing::{repo, OfflineSource, ScriptedSource};
  use std::time::Duration;
  use tokio::sync::Notify;

  async fn store_with(projects: Vec<Project>) -> ProjectStore {
    let store = ProjectStore::open_in_memory().unwrap();
    store.upsert_all(projects).await.unwrap();
    store
  }

  /// Poll until the running sync has reported.
  async fn settle(model: &mut ProjectListModel) {
    for _ in 0..500 {
      model.poll();
      if !model.is_syncing() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("sync did not finish: {model:?}");
  }

  #[tokio::test]
  async fn test_empty_cache_loads_then_succeeds() {
    let store = store_with(vec![]).await;
    let coordinator = Arc::new(SyncCoordinator::new(
      ScriptedSource::ok(vec![repo(7, "X", Some("Y"))]),
      store,
      "octocat",
    ));

    let mut model = ProjectListModel::new(coordinator);
    assert!(model.state().is_loading());

    settle(&mut model).await;

    assert_eq!(
      model.state(),
      &UiState::Success(vec![Project::new(7, "X", Some("Y"))])
    );
    assert_eq!(model.last_report().map(|r| r.stamp.count), Some(1));
  }

  #[tokio::test]
  async fn test_cached_data_shown_before_sync() {
    let store = store_with(vec![Project::new(1, "A", None)]).await;
    let gate = Arc::new(Notify::new());
    let coordinator = Arc::new(SyncCoordinator::new(
      ScriptedSource::gated(vec![repo(2, "B", None)], gate.clone()),
      store,
      "octocat",
    ));

    let mut model = ProjectListModel::new(coordinator);
    assert_eq!(
      model.state().data(),
      Some(&vec![Project::new(1, "A", None)])
    );

    gate.notify_one();
    settle(&mut model).await;

    let ids: Vec<i64> = model.cached().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(model.state().is_success());
  }

  #[tokio::test]
  async fn test_failed_sync_keeps_cached_data() {
    let store = store_with(vec![Project::new(1, "A", None)]).await;
    let coordinator = Arc::new(SyncCoordinator::new(
      Arc::new(OfflineSource),
      store.clone(),
      "octocat",
    ));

    let mut model = ProjectListModel::new(coordinator);
    settle(&mut model).await;

    let message = model.state().error().unwrap();
    assert!(message.contains("connection refused"), "got {message}");
    assert_eq!(model.cached(), &[Project::new(1, "A", None)]);
    assert_eq!(store.list_all().unwrap(), vec![Project::new(1, "A", None)]);
  }

  #[tokio::test]
  async fn test_failed_sync_on_empty_cache_is_error() {
    let store = store_with(vec![]).await;
    let coordinator = Arc::new(SyncCoordinator::new(Arc::new(OfflineSource), store, "octocat"));

    let mut model = ProjectListModel::new(coordinator);
    assert!(model.state().is_loading());

    settle(&mut model).await;
    assert!(model.state().is_error());
    assert!(model.cached().is_empty());
  }

  #[tokio::test]
  async fn test_refresh_while_syncing_is_noop() {
    let store = store_with(vec![]).await;
    let gate = Arc::new(Notify::new());
    let source = ScriptedSource::gated(vec![repo(1, "a", None)], gate.clone());
    let coordinator = Arc::new(SyncCoordinator::new(source.clone(), store, "octocat"));

    let mut model = ProjectListModel::new(coordinator);
    tokio::time::sleep(Duration::from_millis(10)).await;
    model.refresh();
    assert!(model.is_syncing());

    gate.notify_one();
    settle(&mut model).await;
    assert_eq!(source.calls(), 1);

    // A finished sync can be repeated on demand
    gate.notify_one();
    model.refresh();
    settle(&mut model).await;
    assert_eq!(source.calls(), 2);
  }

  #[tokio::test]
  async fn test_outcome_arriving_after_live_check_shows_committed_rows() {
    let store = store_with(vec![]).await;
    let coordinator = Arc::new(SyncCoordinator::new(
      ScriptedSource::ok(vec![repo(7, "X", Some("Y"))]),
      store,
      "octocat",
    ));

    let mut model = ProjectListModel::new(coordinator);

    // Let the sync commit and report without the model polling in between,
    // then consume the change notification as an earlier tick would have.
    let task = model.task.take().unwrap();
    task.await.unwrap();
    model.live.current();

    assert!(model.poll());
    assert_eq!(
      model.state(),
      &UiState::Success(vec![Project::new(7, "X", Some("Y"))])
    );
    assert_eq!(model.cached(), &[Project::new(7, "X", Some("Y"))]);
  }

  #[tokio::test]
  async fn test_external_writes_are_observed() {
    let store = store_with(vec![]).await;
    let coordinator = Arc::new(SyncCoordinator::new(
      ScriptedSource::ok(vec![]),
      store.clone(),
      "octocat",
    ));

    let mut model = ProjectListModel::new(coordinator);
    settle(&mut model).await;
    assert_eq!(model.state(), &UiState::Success(vec![]));

    store
      .upsert_all(vec![Project::new(3, "late", None)])
      .await
      .unwrap();

    assert!(model.poll());
    assert_eq!(model.cached(), &[Project::new(3, "late", None)]);
  }

  #[tokio::test]
  async fn test_dropping_model_cancels_sync() {
    let store = store_with(vec![Project::new(1, "A", None)]).await;
    let gate = Arc::new(Notify::new());
    let coordinator = Arc::new(SyncCoordinator::new(
      ScriptedSource::gated(vec![repo(2, "B", None)], gate.clone()),
      store.clone(),
      "octocat",
    ));

    let model = ProjectListModel::new(coordinator);
    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(model);

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.list_all().unwrap(), vec![Project::new(1, "A", None)]);
  }
}
