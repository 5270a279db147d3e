use futures::Stream;
use std::sync::Arc;
use tokio::sync::watch;

use crate::project::Project;

/// Committed contents of the project table, ascending by id.
pub(super) type Snapshot = Arc<Vec<Project>>;

type Selector<T> = Box<dyn Fn(&[Project]) -> T + Send + Sync>;

/// A store read that keeps producing results as the table changes.
///
/// Delivery follows watch-channel semantics: a slow reader skips
/// intermediate commits but always sees the latest one.
pub struct LiveQuery<T> {
  rx: watch::Receiver<Snapshot>,
  select: Selector<T>,
}

impl<T> LiveQuery<T> {
  pub(super) fn new<F>(rx: watch::Receiver<Snapshot>, select: F) -> Self
  where
    F: Fn(&[Project]) -> T + Send + Sync + 'static,
  {
    Self {
      rx,
      select: Box::new(select),
    }
  }

  /// Result against the latest committed state, marking it as seen.
  pub fn current(&mut self) -> T {
    let snapshot = self.rx.borrow_and_update();
    (self.select)(snapshot.as_slice())
  }

  /// Whether a commit happened since the last `current()` / `changed()`.
  pub fn has_changed(&self) -> bool {
    self.rx.has_changed().unwrap_or(false)
  }

  /// Wait for the next commit. Returns `None` once the store is gone.
  #[allow(dead_code)]
  pub async fn changed(&mut self) -> Option<T> {
    self.rx.changed().await.ok()?;
    Some(self.current())
  }

  /// Stream yielding the current result first, then one item per observed commit.
  #[allow(dead_code)]
  pub fn into_stream(self) -> impl Stream<Item = T>
  where
    T: 'static,
  {
    futures::stream::unfold((self, true), |(mut query, first)| async move {
      if first {
        let value = query.current();
        return Some((value, (query, false)));
      }
      let value = query.changed().await?;
      Some((value, (query, false)))
    })
  }
}

impl<T> std::fmt::Debug for LiveQuery<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LiveQuery")
      .field("rows", &self.rx.borrow().len())
      .finish_non_exhaustive()
  }
}
