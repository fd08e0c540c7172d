//! SQLite connection pooling for the event store.
//!
//! Connections are tuned for an append-mostly log: WAL journaling so
//! queries never block the single writer, `synchronous = NORMAL` (safe
//! under WAL), and a busy timeout so a contended write waits instead of
//! failing immediately.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Connection tunables, loaded from the database config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// How long a connection waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Upper bound on pooled connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when opening the event database.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool could not be built or its first connection failed init.
    #[error("could not open the event database pool: {0}")]
    Build(#[from] r2d2::Error),
}

fn init_connection(
    conn: &rusqlite::Connection,
    busy_timeout_ms: u64,
) -> Result<(), rusqlite::Error> {
    // journal_mode reports back the mode actually in effect. In-memory
    // databases answer "memory"; anything else but "wal" means WAL was
    // refused and the single-writer assumptions below would not hold.
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if mode != "wal" && mode != "memory" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("journal_mode is '{mode}', expected wal")),
        ));
    }

    conn.execute_batch(&format!(
        "PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
}

/// Opens a pooled handle to the event database at `db_path`.
///
/// The file is created if absent. `:memory:` works for tests, with the
/// caveat that every pooled connection then opens its own private
/// database; tests that share state across connections need a file.
///
/// # Errors
///
/// Returns `PoolError::Build` if the pool cannot be constructed.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(move |conn| init_connection(conn, settings.busy_timeout_ms));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connections_carry_event_log_pragmas() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 3,
        };

        let pool = create_pool(":memory:", settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert!(
            mode == "wal" || mode == "memory",
            "unexpected journal_mode: {mode}"
        );

        // 1 = NORMAL
        let synchronous: i32 = conn
            .query_row("PRAGMA synchronous;", [], |row| row.get(0))
            .expect("should query synchronous");
        assert_eq!(synchronous, 1, "synchronous should be NORMAL");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1, "foreign keys should be enabled");

        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500, "busy timeout should match settings");

        assert_eq!(pool.max_size(), 3, "pool max size should match settings");
    }

    #[test]
    fn pooled_connections_share_a_file_backed_db() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("beacon.db");
        let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
            .expect("pool creation should succeed");

        {
            let conn = pool.get().expect("first connection");
            conn.execute_batch("CREATE TABLE probe (id INTEGER PRIMARY KEY)")
                .expect("create table");
        }

        let conn = pool.get().expect("second connection");
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'probe')",
                [],
                |row| row.get(0),
            )
            .expect("should query sqlite_master");
        assert!(exists, "table created on one connection should be visible on another");
    }
}
