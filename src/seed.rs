//! Seed fixtures: the collections a fresh session starts from, and the
//! fallbacks used when a stored payload is absent or malformed.

use chrono::{Duration, Utc};

use crate::core::CURRENT_USER_ID;
use crate::model::{
    Achievement, Battle, BattleInvitation, BattleStatus, CaseType, InvitationStatus, Prize,
    ShopItem, Task, User,
};

pub fn users() -> Vec<User> {
    let user = |id: &str, name: &str, level: u32, rating: u32, is_online: bool| User {
        id: id.to_string(),
        name: name.to_string(),
        level,
        rating,
        is_online,
    };
    vec![
        user("user1", "Anna Ivanova", 15, 1250, true),
        user("user2", "Peter Petrov", 12, 980, false),
        user("user3", "Maria Sidorova", 18, 1450, true),
        user("user4", "Alexey Kozlov", 14, 1120, true),
        user("user5", "Elena Morozova", 16, 1380, false),
        user(CURRENT_USER_ID, "You", 10, 950, true),
    ]
}

pub fn battles() -> Vec<Battle> {
    let now = Utc::now();
    let completed = |id: &str,
                     challenger: (&str, &str),
                     opponent: (&str, &str),
                     stake: u32,
                     days_ago: i64,
                     duration_min: i64,
                     challenger_won: bool| {
        let started_at = now - Duration::days(days_ago);
        let (winner, loser) = if challenger_won {
            (challenger, opponent)
        } else {
            (opponent, challenger)
        };
        Battle {
            id: id.to_string(),
            challenger_id: challenger.0.to_string(),
            challenger_name: challenger.1.to_string(),
            opponent_id: opponent.0.to_string(),
            opponent_name: opponent.1.to_string(),
            stake,
            status: BattleStatus::Completed,
            started_at,
            completed_at: Some(started_at + Duration::minutes(duration_min)),
            winner_id: Some(winner.0.to_string()),
            winner_name: Some(winner.1.to_string()),
            loser_id: Some(loser.0.to_string()),
            loser_name: Some(loser.1.to_string()),
        }
    };

    vec![
        completed(
            "battle1",
            ("user1", "Anna Ivanova"),
            (CURRENT_USER_ID, "You"),
            150,
            2,
            30,
            true,
        ),
        completed(
            "battle2",
            (CURRENT_USER_ID, "You"),
            ("user3", "Maria Sidorova"),
            200,
            5,
            45,
            true,
        ),
        completed(
            "battle3",
            ("user4", "Alexey Kozlov"),
            ("user2", "Peter Petrov"),
            100,
            7,
            20,
            true,
        ),
        Battle {
            id: "battle4".to_string(),
            challenger_id: "user5".to_string(),
            challenger_name: "Elena Morozova".to_string(),
            opponent_id: CURRENT_USER_ID.to_string(),
            opponent_name: "You".to_string(),
            stake: 75,
            status: BattleStatus::Active,
            started_at: now - Duration::hours(2),
            completed_at: None,
            winner_id: None,
            winner_name: None,
            loser_id: None,
            loser_name: None,
        },
    ]
}

pub fn invitations() -> Vec<BattleInvitation> {
    let now = Utc::now();
    vec![
        BattleInvitation {
            id: "invitation1".to_string(),
            challenger_id: "user3".to_string(),
            challenger_name: "Maria Sidorova".to_string(),
            opponent_id: CURRENT_USER_ID.to_string(),
            opponent_name: "You".to_string(),
            stake: 120,
            message: Some("Rematch time!".to_string()),
            created_at: now - Duration::minutes(30),
            expires_at: now + Duration::minutes(30 + 23 * 60),
            status: InvitationStatus::Pending,
        },
        BattleInvitation {
            id: "invitation2".to_string(),
            challenger_id: "user1".to_string(),
            challenger_name: "Anna Ivanova".to_string(),
            opponent_id: CURRENT_USER_ID.to_string(),
            opponent_name: "You".to_string(),
            stake: 180,
            message: None,
            created_at: now - Duration::minutes(10),
            expires_at: now + Duration::minutes(10 + 23 * 60),
            status: InvitationStatus::Pending,
        },
    ]
}

pub fn case_catalog() -> Vec<CaseType> {
    let prize = |id: &str, name: &str, image: &str| Prize {
        id: id.to_string(),
        name: name.to_string(),
        image: Some(image.to_string()),
    };
    vec![
        CaseType {
            id: "case-bronze".to_string(),
            name: "Bronze Case".to_string(),
            image: Some("/images/cases/bronze.png".to_string()),
            prizes: vec![
                prize("prize-sticker", "Sticker pack", "/images/prizes/stickers.png"),
                prize("prize-coffee", "Coffee voucher", "/images/prizes/coffee.png"),
            ],
        },
        CaseType {
            id: "case-silver".to_string(),
            name: "Silver Case".to_string(),
            image: Some("/images/cases/silver.png".to_string()),
            prizes: vec![
                prize("prize-mug", "Team mug", "/images/prizes/mug.png"),
                prize("prize-hoodie", "Hoodie", "/images/prizes/hoodie.png"),
            ],
        },
        CaseType {
            id: "case-gold".to_string(),
            name: "Gold Case".to_string(),
            image: Some("/images/cases/gold.png".to_string()),
            prizes: vec![
                prize("prize-day-off", "Extra day off", "/images/prizes/dayoff.png"),
                prize("prize-gadget", "Gadget budget", "/images/prizes/gadget.png"),
            ],
        },
    ]
}

pub fn achievements() -> Vec<Achievement> {
    let achievement = |id: &str, title: &str, description: &str, progress: u32, target: u32| {
        let unlocked = progress >= target;
        Achievement {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            unlocked,
            unlocked_at: unlocked.then(|| Utc::now() - Duration::days(1)),
            progress,
            target,
        }
    };
    vec![
        achievement("ach-first-battle", "First Blood", "Win your first battle", 1, 1),
        achievement("ach-streak", "On a Roll", "Win 5 battles in a row", 2, 5),
        achievement("ach-collector", "Collector", "Open 10 cases", 4, 10),
    ]
}

pub fn tasks() -> Vec<Task> {
    let task = |id: &str, title: &str, description: &str, reward: u32| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        reward,
        completed: false,
        completed_at: None,
    };
    vec![
        task("task-standup", "Daily standup", "Join the morning standup", 10),
        task("task-review", "Review a PR", "Review a teammate's pull request", 25),
        task("task-demo", "Friday demo", "Show something at the Friday demo", 50),
    ]
}

pub fn shop_items() -> Vec<ShopItem> {
    let item = |id: &str, title: &str, description: &str, price: u32, category: &str| ShopItem {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        price,
        category: category.to_string(),
        image: None,
        is_active: true,
    };
    vec![
        item("shop-tshirt", "Team T-shirt", "Branded T-shirt", 300, "merch"),
        item("shop-lunch", "Lunch with the CTO", "A one-on-one lunch", 800, "bonus"),
        item("shop-parking", "Parking spot for a week", "The good one, near the door", 450, "bonus"),
    ]
}
