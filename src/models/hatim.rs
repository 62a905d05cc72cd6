use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed reading of all 30 juz. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hatim {
    pub id: String,
    pub user_id: String,
    pub username: Option<String>,
    pub completed_at: DateTime<Utc>,
}
