pub mod manager;

pub use manager::{BattleManager, INVITATION_TTL_HOURS};
