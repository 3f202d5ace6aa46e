//! Store keys and capacity policy.
//!
//! Keys are part of the external contract: existing stores written by
//! earlier sessions must keep decoding, so the names never change.

pub const THEME: &str = "theme";
pub const CASES: &str = "cases";
pub const USER_CASES: &str = "userCases";
pub const PERSONAL_BATTLES: &str = "personalBattles";
pub const NOTIFICATIONS: &str = "notifications";
pub const HAS_WELCOME_NOTIFICATION: &str = "hasWelcomeNotification";
pub const SHOP_ITEMS: &str = "shopItems";
pub const ORDERS: &str = "orders";
pub const ACHIEVEMENTS: &str = "achievements";
pub const TASKS: &str = "tasks";
pub const BATTLES: &str = "battles";
pub const BATTLE_INVITATIONS: &str = "battleInvitations";

/// Total-usage soft ceiling checked at startup. Crossing it triggers a
/// sweep of stale keys, not a write failure.
pub const SOFT_TOTAL_CEILING_BYTES: usize = 8 * 1024 * 1024;

/// Per-kind pre-flight ceilings, applied before touching the store.
pub const CASES_CEILING_BYTES: usize = 4 * 1024 * 1024;
pub const USER_CASES_CEILING_BYTES: usize = 2 * 1024 * 1024;

/// Substrings identifying keys left behind by older builds. Matching
/// keys are fair game for the startup sweep.
pub const STALE_KEY_PATTERNS: [&str; 5] =
    ["oldCases", "tempCases", "backup_cases", "cache_", "temp_"];
