//! Entity records persisted by the engine.
//!
//! Every record serializes with camelCase field names; temporal fields
//! are typed `DateTime<Utc>` so decoding restores them without any
//! field-name-driven post-processing.

pub mod battles;
pub mod cases;
pub mod notifications;
pub mod progress;
pub mod shop;

pub use battles::{Battle, BattleInvitation, BattleStatus, InvitationStatus, PersonalBattle, User};
pub use cases::{CaseType, Prize, UserCase};
pub use notifications::{Notification, NotificationKind, Priority};
pub use progress::{Achievement, Task};
pub use shop::{Order, OrderStatus, ShopItem};
