use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of juz in one full reading (one hatim).
pub const JUZ_COUNT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JuzProgress {
    pub juz_id: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JuzProgress {
    pub fn incomplete(juz_id: u32) -> Self {
        Self {
            juz_id,
            completed: false,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub username: Option<String>,
    pub juz: Vec<JuzProgress>,
    pub total_completed: u32,
    pub completed_hatims: u32,
    /// Bumped on every write; used to detect concurrent edits.
    #[serde(skip)]
    pub revision: i64,
}

impl UserProgress {
    /// A first-touch record: all 30 juz incomplete, no hatims.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            username: None,
            juz: fresh_juz(),
            total_completed: 0,
            completed_hatims: 0,
            revision: 0,
        }
    }

    pub fn get(&self, juz_id: u32) -> Option<&JuzProgress> {
        self.juz.iter().find(|j| j.juz_id == juz_id)
    }

    pub fn is_completed(&self, juz_id: u32) -> bool {
        self.get(juz_id).map(|j| j.completed).unwrap_or(false)
    }

    /// Lowest-numbered juz not yet read.
    pub fn next_incomplete(&self) -> Option<u32> {
        self.juz.iter().find(|j| !j.completed).map(|j| j.juz_id)
    }

    pub fn remaining(&self) -> u32 {
        JUZ_COUNT.saturating_sub(self.total_completed)
    }
}

pub fn fresh_juz() -> Vec<JuzProgress> {
    (1..=JUZ_COUNT).map(JuzProgress::incomplete).collect()
}

pub fn count_completed(juz: &[JuzProgress]) -> u32 {
    juz.iter().filter(|j| j.completed).count() as u32
}

pub fn is_valid_juz(juz_id: u32) -> bool {
    (1..=JUZ_COUNT).contains(&juz_id)
}

/// Check that a decoded vector holds exactly juz 1..=30 in order.
pub fn is_well_formed(juz: &[JuzProgress]) -> bool {
    juz.len() == JUZ_COUNT as usize
        && juz
            .iter()
            .enumerate()
            .all(|(i, j)| j.juz_id == i as u32 + 1)
}
