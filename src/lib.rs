//! GRITHER engagement engine: in-memory collections for achievements,
//! shop, tasks, cases, wagered battles and notifications, mirrored into
//! a capacity-limited key/value store on every mutation.
//!
//! Memory is the source of truth; the store is a best-effort snapshot.
//! Every failure path (malformed payload, quota exhaustion) degrades to
//! reduced or default data instead of surfacing an error.
//!
//! # Examples
//!
//! ```
//! use grither::{BattleStatus, CURRENT_USER_ID, Engine};
//!
//! let mut engine = Engine::open_default();
//!
//! // Challenge a colleague.
//! let invitation_id = engine
//!     .create_battle_invitation(CURRENT_USER_ID, "user1", 120, None)
//!     .unwrap();
//!
//! // They accept; an active battle appears and both sides get notified.
//! let battle_id = engine.accept_battle_invitation(&invitation_id).unwrap();
//! engine.complete_battle(&battle_id, "user1").unwrap();
//!
//! let battle = engine.battles().iter().find(|b| b.id == battle_id).unwrap();
//! assert_eq!(battle.status, BattleStatus::Completed);
//! ```

pub mod battles;
pub mod core;
pub mod facade;
pub mod model;
pub mod notifications;
pub mod repository;
pub mod seed;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{CURRENT_USER_ID, EngineError, Result, Theme};
pub use facade::Engine;
pub use model::{
    Achievement, Battle, BattleInvitation, BattleStatus, CaseType, InvitationStatus, Notification,
    NotificationKind, Order, OrderStatus, PersonalBattle, Priority, Prize, ShopItem, Task, User,
    UserCase,
};
pub use notifications::NotificationCenter;
pub use repository::{Entity, Repository, RepositoryConfig, TrimStrategy};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_default_seeds_collections() {
        let engine = Engine::open_default();
        assert!(!engine.battles().is_empty());
        assert!(!engine.cases().is_empty());
        assert_eq!(engine.current_user().id, CURRENT_USER_ID);
    }

    #[test]
    fn test_full_battle_flow() {
        let mut engine = Engine::open_default();
        let before = engine.battles().len();

        let invitation_id = engine
            .create_battle_invitation("user1", CURRENT_USER_ID, 120, None)
            .unwrap();
        let battle_id = engine.accept_battle_invitation(&invitation_id).unwrap();
        assert_eq!(engine.battles().len(), before + 1);

        engine.complete_battle(&battle_id, "user1").unwrap();
        let battle = engine
            .battles()
            .iter()
            .find(|b| b.id == battle_id)
            .unwrap();
        assert_eq!(battle.status, BattleStatus::Completed);
        assert_eq!(battle.loser_id.as_deref(), Some(CURRENT_USER_ID));
    }

    #[test]
    fn test_theme_persists_across_sessions() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mut engine = Engine::open(FileStore::open(dir.path()).unwrap());
            engine.set_theme(Theme::Light);
        }
        let engine = Engine::open(FileStore::open(dir.path()).unwrap());
        assert_eq!(engine.theme(), Theme::Light);
    }
}
