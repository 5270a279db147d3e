use rusqlite::Connection;
use tracing::warn;

/// Bumped whenever the table layout changes. A mismatch drops every table.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT
);

-- Last successful sync per account
CREATE TABLE IF NOT EXISTS sync_stamps (
    account TEXT PRIMARY KEY,
    synced_at TEXT NOT NULL,
    count INTEGER NOT NULL
);
"#;

const RESET: &str = r#"
DROP TABLE IF EXISTS projects;
DROP TABLE IF EXISTS sync_stamps;
"#;

/// Bring the connection up to the current schema.
///
/// Returns `true` when a previous schema was found and its data discarded.
pub fn prepare(conn: &Connection) -> rusqlite::Result<bool> {
  let version = user_version(conn)?;

  if version == SCHEMA_VERSION {
    conn.execute_batch(SCHEMA)?;
    return Ok(false);
  }

  if version != 0 {
    warn!(
      found = version,
      expected = SCHEMA_VERSION,
      "Project store schema mismatch, resetting"
    );
  }

  conn.execute_batch(&format!(
    "BEGIN;\n{RESET}\n{SCHEMA}\nPRAGMA user_version = {SCHEMA_VERSION};\nCOMMIT;"
  ))?;

  Ok(version != 0)
}

pub fn user_version(conn: &Connection) -> rusqlite::Result<i64> {
  conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}
