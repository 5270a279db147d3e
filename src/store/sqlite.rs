//! SQLite implementation of the project store.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::live::{LiveQuery, Snapshot};
use super::{schema, StoreError, StoreResult, SyncStamp};
use crate::project::Project;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Durable, observable table of projects.
///
/// Cloning is cheap and every clone shares the same connection and
/// live-query channel.
#[derive(Clone)]
pub struct ProjectStore {
  inner: Arc<Inner>,
}

struct Inner {
  conn: Mutex<Connection>,
  snapshot: watch::Sender<Snapshot>,
}

impl Inner {
  fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|_| StoreError::Poisoned)
  }
}

impl ProjectStore {
  /// Open the store at the default location.
  pub fn open_default() -> StoreResult<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the store at `path`.
  pub fn open(path: &Path) -> StoreResult<Self> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    let conn = Connection::open(path).map_err(|source| StoreError::Open {
      path: path.to_path_buf(),
      source,
    })?;

    debug!(path = %path.display(), "Opening project store");
    Self::from_connection(conn)
  }

  /// Open a store that lives only as long as this value and its clones.
  pub fn open_in_memory() -> StoreResult<Self> {
    let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
      path: PathBuf::from(":memory:"),
      source,
    })?;
    Self::from_connection(conn)
  }

  /// Get the default database path.
  pub fn default_path() -> StoreResult<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(StoreError::NoDataDir)?;

    Ok(data_dir.join("cardfolio").join("cache.db"))
  }

  fn from_connection(conn: Connection) -> StoreResult<Self> {
    conn
      .busy_timeout(Duration::from_secs(5))
      .map_err(StoreError::Schema)?;

    if schema::prepare(&conn).map_err(StoreError::Schema)? {
      warn!("Cached projects were discarded after a schema change");
    }

    let projects = query_all(&conn)?;
    info!(count = projects.len(), "Project store ready");

    let (snapshot, _) = watch::channel(Arc::new(projects));
    Ok(Self {
      inner: Arc::new(Inner {
        conn: Mutex::new(conn),
        snapshot,
      }),
    })
  }

  /// All projects, ascending by id.
  pub fn list_all(&self) -> StoreResult<Vec<Project>> {
    let conn = self.inner.lock()?;
    Ok(query_all(&conn)?)
  }

  /// A single project by id.
  pub fn get_by_id(&self, id: i64) -> StoreResult<Option<Project>> {
    let conn = self.inner.lock()?;
    let project = conn
      .query_row(
        "SELECT id, name, description FROM projects WHERE id = ?1",
        params![id],
        project_from_row,
      )
      .optional()?;
    Ok(project)
  }

  /// Live variant of [`list_all`](Self::list_all).
  pub fn watch_all(&self) -> LiveQuery<Vec<Project>> {
    LiveQuery::new(self.inner.snapshot.subscribe(), |projects| {
      projects.to_vec()
    })
  }

  /// Live variant of [`get_by_id`](Self::get_by_id).
  pub fn watch_by_id(&self, id: i64) -> LiveQuery<Option<Project>> {
    LiveQuery::new(self.inner.snapshot.subscribe(), move |projects| {
      projects
        .binary_search_by_key(&id, |p| p.id)
        .ok()
        .map(|idx| projects[idx].clone())
    })
  }

  /// Insert or replace every record in one transaction.
  ///
  /// Returns the number of records written. On error nothing is applied.
  /// The binary only writes through `apply_sync`; this is the plain batch write.
  #[cfg_attr(not(test), allow(dead_code))]
  pub async fn upsert_all(&self, projects: Vec<Project>) -> StoreResult<usize> {
    if projects.is_empty() {
      return Ok(0);
    }

    let count = projects.len();
    self.write_in_background(projects, None).await?;
    Ok(count)
  }

  /// Upsert a synced batch and stamp `account` as synced, atomically.
  pub async fn apply_sync(&self, account: &str, projects: Vec<Project>) -> StoreResult<SyncStamp> {
    let stamp = self
      .write_in_background(projects, Some(account.to_string()))
      .await?;
    stamp.ok_or_else(|| StoreError::Worker("sync stamp was not recorded".to_string()))
  }

  /// When `account` was last synced, if ever.
  pub fn last_sync(&self, account: &str) -> StoreResult<Option<SyncStamp>> {
    let conn = self.inner.lock()?;
    let row: Option<(String, u32)> = conn
      .query_row(
        "SELECT synced_at, count FROM sync_stamps WHERE account = ?1",
        params![account],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    match row {
      Some((synced_at, count)) => Ok(Some(SyncStamp {
        account: account.to_string(),
        synced_at: parse_datetime(&synced_at)?,
        count,
      })),
      None => Ok(None),
    }
  }

  // The write runs on the blocking pool so it finishes (commit or rollback)
  // even when the awaiting task is cancelled.
  async fn write_in_background(
    &self,
    projects: Vec<Project>,
    account: Option<String>,
  ) -> StoreResult<Option<SyncStamp>> {
    let store = self.clone();
    tokio::task::spawn_blocking(move || store.write_batch(&projects, account.as_deref()))
      .await
      .map_err(|e| StoreError::Worker(e.to_string()))?
  }

  fn write_batch(
    &self,
    projects: &[Project],
    account: Option<&str>,
  ) -> StoreResult<Option<SyncStamp>> {
    let mut conn = self.inner.lock()?;
    let tx = conn.transaction().map_err(StoreError::Write)?;

    {
      let mut stmt = tx
        .prepare_cached(
          "INSERT OR REPLACE INTO projects (id, name, description) VALUES (?1, ?2, ?3)",
        )
        .map_err(StoreError::Write)?;

      for project in projects {
        stmt
          .execute(params![project.id, project.name, project.description])
          .map_err(StoreError::Write)?;
      }
    }

    let stamp = match account {
      Some(account) => {
        let stamp = SyncStamp {
          account: account.to_string(),
          synced_at: Utc::now().trunc_subsecs(0),
          count: u32::try_from(projects.len()).unwrap_or(u32::MAX),
        };
        tx.execute(
          "INSERT OR REPLACE INTO sync_stamps (account, synced_at, count) VALUES (?1, ?2, ?3)",
          params![
            stamp.account,
            stamp.synced_at.format(TIMESTAMP_FORMAT).to_string(),
            stamp.count
          ],
        )
        .map_err(StoreError::Write)?;
        Some(stamp)
      }
      None => None,
    };

    let snapshot = query_all(&tx).map_err(StoreError::Write)?;
    tx.commit().map_err(StoreError::Write)?;

    debug!(
      written = projects.len(),
      total = snapshot.len(),
      "Committed project batch"
    );

    // Published under the connection lock so observers see commits in order
    self.inner.snapshot.send_replace(Arc::new(snapshot));

    Ok(stamp)
  }
}

#[cfg(test)]
impl ProjectStore {
  /// Makes any insert of `id` abort its statement, simulating a mid-batch failure.
  pub(crate) fn fail_inserts_of(&self, id: i64) {
    let conn = self.inner.conn.lock().unwrap();
    conn
      .execute_batch(&format!(
        "CREATE TRIGGER fail_insert_{id} BEFORE INSERT ON projects WHEN NEW.id = {id}
         BEGIN SELECT RAISE(ABORT, 'simulated write failure'); END;"
      ))
      .unwrap();
  }
}

fn query_all(conn: &Connection) -> rusqlite::Result<Vec<Project>> {
  let mut stmt = conn.prepare_cached("SELECT id, name, description FROM projects ORDER BY id ASC")?;
  let rows = stmt.query_map([], project_from_row)?;
  rows.collect()
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
  Ok(Project {
    id: row.get(0)?,
    name: row.get(1)?,
    description: row.get(2)?,
  })
}

/// Parse a datetime string stored as "YYYY-MM-DD HH:MM:SS" (UTC).
fn parse_datetime(s: &str) -> StoreResult<DateTime<Utc>> {
  chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
    .map(|dt| dt.and_utc())
    .map_err(|_| StoreError::BadTimestamp(s.to_string()))
}
