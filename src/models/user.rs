use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl User {
    /// A brand-new anonymous device identity.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn display_name(&self) -> &str {
        display_name(self.username.as_deref())
    }
}

/// Name shown for users who never picked one.
pub fn display_name(username: Option<&str>) -> &str {
    username.unwrap_or("Anonymous")
}
