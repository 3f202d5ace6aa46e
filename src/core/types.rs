use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the local session. All engine instances act on behalf of
/// this user; other users are fixtures.
pub const CURRENT_USER_ID: &str = "current-user";

/// Generate a collision-resistant entity id.
///
/// Millisecond timestamp prefix keeps ids roughly sortable by creation
/// time; the random suffix makes collisions negligible even for ids
/// minted within the same millisecond.
pub fn generate_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple())
}

/// UI color theme, persisted under its own store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}
