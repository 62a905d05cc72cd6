use log::info;
use rusqlite::Connection;

use crate::error::Result;

const SCHEMA_VERSION: u32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    info!("migrating schema from v{} to v{}", current, SCHEMA_VERSION);

    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY,
            username     TEXT,
            created_at   TEXT NOT NULL,
            last_active  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS user_progress (
            user_id          TEXT PRIMARY KEY,
            juz_progress     TEXT NOT NULL,
            total_completed  INTEGER NOT NULL DEFAULT 0
                             CHECK(total_completed BETWEEN 0 AND 30),
            completed_hatims INTEGER NOT NULL DEFAULT 0
                             CHECK(completed_hatims >= 0),
            revision         INTEGER NOT NULL DEFAULT 0
        );

        -- Append-only. seq keeps insertion order for equal timestamps.
        CREATE TABLE IF NOT EXISTS hatims (
            seq           INTEGER PRIMARY KEY AUTOINCREMENT,
            id            TEXT NOT NULL UNIQUE,
            user_id       TEXT NOT NULL,
            completed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_hatims_completed_at ON hatims(completed_at);
        CREATE INDEX IF NOT EXISTS idx_hatims_user ON hatims(user_id);
    ")?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('users', 'user_progress', 'hatims')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
