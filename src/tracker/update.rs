//! Marking a juz complete or incomplete.
//!
//! The stored record keeps two cached counters next to the 30-entry vector:
//! `total_completed` is always recounted from the vector on write, and
//! `completed_hatims` is bumped exactly when the recount reaches 30 from a
//! stored total below 30. Unmarking never lowers the hatim count.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{Result, TrackerError};
use crate::models::progress::{count_completed, is_valid_juz};
use crate::models::{UserProgress, JUZ_COUNT};
use crate::tracker::ProgressStore;

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The juz already had the requested state; nothing was written.
    Unchanged,
    Updated,
    /// This change completed all 30 juz and logged a new hatim.
    HatimCompleted { hatim_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JuzUpdate {
    pub progress: UserProgress,
    pub outcome: UpdateOutcome,
}

/// Set the completion flag of one juz, stamping changes with the current time.
pub fn set_juz_completion<S: ProgressStore>(
    store: &S,
    user_id: &str,
    juz_id: u32,
    completed: bool,
) -> Result<JuzUpdate> {
    apply_juz_change(store, user_id, juz_id, completed, Utc::now())
}

pub fn apply_juz_change<S: ProgressStore>(
    store: &S,
    user_id: &str,
    juz_id: u32,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<JuzUpdate> {
    if !is_valid_juz(juz_id) {
        return Err(TrackerError::InvalidJuz(juz_id));
    }

    store.atomically(|store| {
        let user = store
            .get_user(user_id)?
            .ok_or_else(|| TrackerError::NotFound(user_id.to_string()))?;

        let mut progress = match store.get_progress(user_id)? {
            Some(p) => p,
            None => {
                info!("first touch for {}, creating progress record", user_id);
                store.create_progress(user_id)?
            }
        };
        progress.username = user.username;

        let entry = progress
            .juz
            .iter_mut()
            .find(|j| j.juz_id == juz_id)
            .ok_or_else(|| TrackerError::Corrupt(format!("{}: juz {} missing", user_id, juz_id)))?;

        if entry.completed == completed {
            debug!("juz {} for {} already completed={}", juz_id, user_id, completed);
            return Ok(JuzUpdate {
                progress,
                outcome: UpdateOutcome::Unchanged,
            });
        }

        entry.completed = completed;
        entry.completed_at = completed.then_some(now);

        let previous_total = progress.total_completed;
        let total_completed = count_completed(&progress.juz);
        let mut completed_hatims = progress.completed_hatims;
        let mut outcome = UpdateOutcome::Updated;

        if previous_total < JUZ_COUNT && total_completed == JUZ_COUNT {
            completed_hatims += 1;
            let hatim_id = store.append_cycle_event(user_id, now)?;
            info!("{} completed hatim #{} ({})", user_id, completed_hatims, hatim_id);
            outcome = UpdateOutcome::HatimCompleted { hatim_id };
        }

        progress.revision = store.put_progress(
            user_id,
            &progress.juz,
            total_completed,
            completed_hatims,
            progress.revision,
        )?;
        progress.total_completed = total_completed;
        progress.completed_hatims = completed_hatims;

        Ok(JuzUpdate { progress, outcome })
    })
}

/// Load a user's progress, creating the empty record on first touch.
pub fn load_progress<S: ProgressStore>(store: &S, user_id: &str) -> Result<UserProgress> {
    store.atomically(|store| {
        let user = store
            .get_user(user_id)?
            .ok_or_else(|| TrackerError::NotFound(user_id.to_string()))?;
        let mut progress = match store.get_progress(user_id)? {
            Some(p) => p,
            None => store.create_progress(user_id)?,
        };
        progress.username = user.username;
        Ok(progress)
    })
}
