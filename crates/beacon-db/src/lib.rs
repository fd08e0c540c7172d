//! Database layer for the Beacon event service.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and runtime settings. Every table used by the
//! event service is created through versioned migrations managed here.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: no external database process required. WAL
//!   allows concurrent readers with a single writer, which matches the
//!   event log's append-mostly access pattern.
//! - **`r2d2` connection pool**: bounded connection reuse with deterministic
//!   return-to-pool on drop, so every request-scoped connection is released
//!   on every exit path.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, ensuring migrations ship with the server and cannot
//!   drift from the code that depends on them.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
