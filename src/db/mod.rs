pub mod migrations;
pub mod repository;
pub mod store;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;

pub use store::SqliteStore;

/// How long a writer waits for another connection's write lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Open the database file in WAL mode and bring the schema up to date.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}
