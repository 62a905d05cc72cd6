use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Hatim, JuzProgress, UserProgress, JUZ_COUNT};

/// Community-wide totals shown on every dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_users: u64,
    pub total_completed_juz: u64,
    pub total_hatims: u64,
    pub recent_hatims: Vec<Hatim>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub user_id: String,
    pub username: Option<String>,
    pub completed_count: u32,
    pub hatim_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_completed_juz: u64,
    pub total_hatims: u64,
    pub top_users: Vec<TopUser>,
    /// Every reader in retrieval order.
    pub readers: Vec<TopUser>,
}

impl From<&UserProgress> for TopUser {
    fn from(p: &UserProgress) -> Self {
        Self {
            user_id: p.user_id.clone(),
            username: p.username.clone(),
            completed_count: p.total_completed,
            hatim_count: p.completed_hatims,
        }
    }
}

impl AdminStats {
    /// Totals over every record plus the `limit` users with the most juz read.
    ///
    /// Ties keep the order in which the records were retrieved.
    pub fn from_progress(all: &[UserProgress], limit: usize) -> Self {
        let mut ranked: Vec<&UserProgress> = all.iter().collect();
        ranked.sort_by(|a, b| b.total_completed.cmp(&a.total_completed));

        Self {
            total_users: all.len() as u64,
            total_completed_juz: all.iter().map(|p| p.total_completed as u64).sum(),
            total_hatims: all.iter().map(|p| p.completed_hatims as u64).sum(),
            top_users: ranked.into_iter().take(limit).map(TopUser::from).collect(),
            readers: all.iter().map(TopUser::from).collect(),
        }
    }
}

/// Figures for the personal progress page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalStats {
    pub percent: u32,
    pub remaining: u32,
    pub next_juz: Option<u32>,
    pub first_completed: Option<DateTime<Utc>>,
    pub last_completed: Option<DateTime<Utc>>,
    /// Mean gap in days between consecutive completions; needs two or more.
    pub avg_days_between: Option<f64>,
    /// Completed juz in juz order.
    pub completed: Vec<JuzProgress>,
}

impl PersonalStats {
    pub fn from_progress(progress: &UserProgress) -> Self {
        let mut dates: Vec<DateTime<Utc>> = progress
            .juz
            .iter()
            .filter(|j| j.completed)
            .filter_map(|j| j.completed_at)
            .collect();
        dates.sort();

        let first_completed = dates.first().copied();
        let last_completed = dates.last().copied();

        // Consecutive gaps telescope to last - first.
        let avg_days_between = match (first_completed, last_completed) {
            (Some(first), Some(last)) if dates.len() >= 2 => {
                let span_ms = (last - first).num_milliseconds() as f64;
                Some(span_ms / (dates.len() - 1) as f64 / 86_400_000.0)
            }
            _ => None,
        };

        Self {
            percent: completion_percent(progress.total_completed),
            remaining: progress.remaining(),
            next_juz: progress.next_incomplete(),
            first_completed,
            last_completed,
            avg_days_between,
            completed: progress.juz.iter().filter(|j| j.completed).cloned().collect(),
        }
    }
}

pub fn completion_percent(total_completed: u32) -> u32 {
    ((total_completed as f64 / JUZ_COUNT as f64) * 100.0).round() as u32
}
