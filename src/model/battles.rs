use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStatus {
    Active,
    Completed,
}

/// A two-party wagered competition.
///
/// Invariant: `completed_at`, `winner_*` and `loser_*` are set if and
/// only if `status == Completed`, and the winner is always one of the
/// two participants with the loser being the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub id: String,
    pub challenger_id: String,
    pub challenger_name: String,
    pub opponent_id: String,
    pub opponent_name: String,
    pub stake: u32,
    pub status: BattleStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_name: Option<String>,
}

impl Battle {
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.challenger_id == user_id || self.opponent_id == user_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    /// Terminal states are immutable; only `Pending` may transition.
    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }
}

/// A time-bounded proposal to start a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleInvitation {
    pub id: String,
    pub challenger_id: String,
    pub challenger_name: String,
    pub opponent_id: String,
    pub opponent_name: String,
    pub stake: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
}

impl BattleInvitation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A self-managed personal challenge shown on the battles page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBattle {
    pub id: String,
    pub title: String,
    pub opponent_name: String,
    pub stake: u32,
    pub created: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub completed: bool,
}

/// Directory entry for a known user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub rating: u32,
    pub is_online: bool,
}
