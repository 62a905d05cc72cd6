use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{JuzProgress, User, UserProgress};

/// What the progress state machine needs from persistent storage.
pub trait ProgressStore {
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    fn get_username(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.get_user(user_id)?.and_then(|u| u.username))
    }

    fn get_progress(&self, user_id: &str) -> Result<Option<UserProgress>>;

    /// Create the all-incomplete record on first touch and return it.
    fn create_progress(&self, user_id: &str) -> Result<UserProgress>;

    /// Store the vector and counters if `expected_revision` is still current.
    /// Returns the revision after the write.
    fn put_progress(
        &self,
        user_id: &str,
        juz: &[JuzProgress],
        total_completed: u32,
        completed_hatims: u32,
        expected_revision: i64,
    ) -> Result<i64>;

    /// Append a hatim event and return its id.
    fn append_cycle_event(&self, user_id: &str, at: DateTime<Utc>) -> Result<String>;

    /// Run `f` as one unit: either all of its writes become visible or none do.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>;
}
