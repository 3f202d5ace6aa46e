//! `Entity` implementations for the concrete record kinds.

use crate::model::{
    Achievement, Battle, BattleInvitation, CaseType, Notification, Order, PersonalBattle,
    ShopItem, Task, UserCase,
};

use super::collection::Entity;

impl Entity for Notification {
    const KIND: &'static str = "notifications";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Battle {
    const KIND: &'static str = "battles";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for BattleInvitation {
    const KIND: &'static str = "battle invitations";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for PersonalBattle {
    const KIND: &'static str = "personal battles";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for CaseType {
    const KIND: &'static str = "cases";

    fn id(&self) -> &str {
        &self.id
    }

    /// Inline image payloads never reach the store; they are restored
    /// from the seed catalog on the next load.
    fn to_persisted(&self) -> Self {
        self.without_inline_images()
    }
}

impl Entity for UserCase {
    const KIND: &'static str = "user cases";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ShopItem {
    const KIND: &'static str = "shop items";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Order {
    const KIND: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Achievement {
    const KIND: &'static str = "achievements";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Task {
    const KIND: &'static str = "tasks";

    fn id(&self) -> &str {
        &self.id
    }
}
