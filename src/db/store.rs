use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

use crate::db::repository::{HatimRepo, ProgressRepo, UserRepo};
use crate::error::{Result, TrackerError};
use crate::models::{JuzProgress, User, UserProgress};
use crate::tracker::ProgressStore;

/// [`ProgressStore`] over an open SQLite connection.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ProgressStore for SqliteStore<'_> {
    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        UserRepo::get(self.conn, user_id)
    }

    fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>> {
        ProgressRepo::get(self.conn, user_id)
    }

    fn create_progress(&self, user_id: &str) -> Result<UserProgress> {
        ProgressRepo::insert_fresh(self.conn, user_id)
    }

    fn put_progress(
        &self,
        user_id: &str,
        juz: &[JuzProgress],
        total_completed: u32,
        completed_hatims: u32,
        expected_revision: i64,
    ) -> Result<i64> {
        ProgressRepo::update(
            self.conn,
            user_id,
            juz,
            total_completed,
            completed_hatims,
            expected_revision,
        )
    }

    fn append_cycle_event(&self, user_id: &str, at: DateTime<Utc>) -> Result<String> {
        HatimRepo::append(self.conn, user_id, &at)
    }

    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        // IMMEDIATE takes the write lock up front, so no other connection can
        // commit between our read and our write. Statements issued through
        // self.conn run inside this transaction; returning early drops it,
        // which rolls back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(|e| busy_as_conflict(e.into()))?;
        let value = f(self).map_err(busy_as_conflict)?;
        tx.commit().map_err(|e| busy_as_conflict(e.into()))?;
        Ok(value)
    }
}

/// A write lock still held elsewhere after the busy timeout is a lost race,
/// not a storage failure.
fn busy_as_conflict(err: TrackerError) -> TrackerError {
    match err {
        TrackerError::Persistence(rusqlite::Error::SqliteFailure(e, msg))
            if e.code == ErrorCode::DatabaseBusy =>
        {
            let detail = msg.unwrap_or_else(|| "database is locked".to_string());
            warn!("write lock unavailable: {}", detail);
            TrackerError::Conflict(detail)
        }
        other => other,
    }
}
