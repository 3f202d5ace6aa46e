use crate::battles::BattleManager;
use crate::core::{CURRENT_USER_ID, EngineError, Result, Theme};
use crate::model::{
    Achievement, Battle, BattleInvitation, CaseType, Order, PersonalBattle, ShopItem, Task, User,
    UserCase,
};
use crate::notifications::NotificationCenter;
use crate::repository::{Repository, RepositoryConfig, TrimStrategy};
use crate::seed;
use crate::storage::{KeyValueStore, MemoryStore, StoreAdapter, keys};

/// The engagement engine: one instance per logical session.
///
/// Owns every repository and coordinates startup (store maintenance,
/// loading, first-run welcome). The UI layer reads through the borrow
/// accessors and mutates only through the operations defined here and
/// on the repositories — never through the store directly.
pub struct Engine {
    adapter: StoreAdapter,
    theme: Theme,
    users: Vec<User>,
    notifications: NotificationCenter,
    battles: BattleManager,
    cases: Repository<CaseType>,
    user_cases: Repository<UserCase>,
    personal_battles: Repository<PersonalBattle>,
    shop_items: Repository<ShopItem>,
    orders: Repository<Order>,
    achievements: Repository<Achievement>,
    tasks: Repository<Task>,
}

impl Engine {
    /// Open an engine over the given store: run startup maintenance,
    /// load every collection (seeding defaults on first run), and post
    /// the one-time welcome notification.
    pub fn open<S: KeyValueStore + 'static>(store: S) -> Self {
        let adapter = StoreAdapter::new(store);
        adapter.maintain();

        let theme = match adapter.read::<Theme>(keys::THEME) {
            Ok(Some(theme)) => theme,
            Ok(None) => Theme::default(),
            Err(e) => {
                log::warn!("loading theme failed ({e}); using default");
                Theme::default()
            }
        };

        let mut notifications = NotificationCenter::new(adapter.clone());
        notifications.load();

        let mut battles = BattleManager::new(adapter.clone());
        battles.load(seed::battles(), seed::invitations());

        let mut cases = Repository::new(
            adapter.clone(),
            RepositoryConfig {
                key: keys::CASES,
                ceiling_bytes: Some(keys::CASES_CEILING_BYTES),
                strategy: TrimStrategy::None,
            },
        );
        let catalog = seed::case_catalog();
        cases.load_or(catalog.clone());
        // Saved cases may have had their inline images stripped on a
        // previous persist; put the catalog images back.
        cases.update_where(
            |case| case.image.is_none() || case.prizes.iter().any(|p| p.image.is_none()),
            |case| {
                if let Some(defaults) = catalog.iter().find(|d| d.id == case.id) {
                    case.restore_images_from(defaults);
                }
            },
        );

        let mut user_cases = Repository::new(
            adapter.clone(),
            RepositoryConfig {
                key: keys::USER_CASES,
                ceiling_bytes: Some(keys::USER_CASES_CEILING_BYTES),
                strategy: TrimStrategy::KeepLast(50),
            },
        );
        user_cases.load();

        let mut personal_battles = Repository::new(
            adapter.clone(),
            RepositoryConfig::unbounded(keys::PERSONAL_BATTLES),
        );
        personal_battles.load();

        let mut shop_items =
            Repository::new(adapter.clone(), RepositoryConfig::unbounded(keys::SHOP_ITEMS));
        shop_items.load_or(seed::shop_items());

        let mut orders = Repository::new(adapter.clone(), RepositoryConfig::unbounded(keys::ORDERS));
        orders.load();

        let mut achievements = Repository::new(
            adapter.clone(),
            RepositoryConfig::unbounded(keys::ACHIEVEMENTS),
        );
        achievements.load_or(seed::achievements());

        let mut tasks = Repository::new(adapter.clone(), RepositoryConfig::unbounded(keys::TASKS));
        tasks.load_or(seed::tasks());

        notifications.welcome_once();

        Self {
            adapter,
            theme,
            users: seed::users(),
            notifications,
            battles,
            cases,
            user_cases,
            personal_battles,
            shop_items,
            orders,
            achievements,
            tasks,
        }
    }

    /// Open over a fresh in-memory store.
    pub fn open_default() -> Self {
        Self::open(MemoryStore::new())
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.adapter.write(keys::THEME, &theme, None) {
            log::warn!("failed to persist theme: {e}");
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, user_id: &str) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .ok_or_else(|| EngineError::NotFound("user", user_id.to_string()))
    }

    pub fn current_user(&self) -> &User {
        self.users
            .iter()
            .find(|u| u.id == CURRENT_USER_ID)
            .expect("seed users always include the current user")
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    // ------------------------------------------------------------------
    // Battles
    // ------------------------------------------------------------------

    pub fn create_battle_invitation(
        &mut self,
        challenger_id: &str,
        opponent_id: &str,
        stake: u32,
        message: Option<String>,
    ) -> Result<String> {
        let challenger = self.user(challenger_id)?.clone();
        let opponent = self.user(opponent_id)?.clone();
        self.battles.create_invitation(
            &challenger,
            &opponent,
            stake,
            message,
            &mut self.notifications,
        )
    }

    pub fn accept_battle_invitation(&mut self, invitation_id: &str) -> Result<String> {
        self.battles
            .accept_invitation(invitation_id, &mut self.notifications)
    }

    pub fn decline_battle_invitation(&mut self, invitation_id: &str) -> Result<()> {
        self.battles
            .decline_invitation(invitation_id, &mut self.notifications)
    }

    pub fn complete_battle(&mut self, battle_id: &str, winner_id: &str) -> Result<()> {
        self.battles
            .complete_battle(battle_id, winner_id, &mut self.notifications)
    }

    pub fn battles(&self) -> &[Battle] {
        self.battles.battles()
    }

    pub fn battles_for(&self, user_id: &str) -> Vec<&Battle> {
        self.battles.battles_for(user_id)
    }

    pub fn battle_invitations(&mut self) -> &[BattleInvitation] {
        self.battles.invitations()
    }

    pub fn remove_battle(&mut self, battle_id: &str) -> bool {
        self.battles.remove_battle(battle_id)
    }

    // ------------------------------------------------------------------
    // Repositories
    // ------------------------------------------------------------------

    pub fn cases(&self) -> &Repository<CaseType> {
        &self.cases
    }

    pub fn cases_mut(&mut self) -> &mut Repository<CaseType> {
        &mut self.cases
    }

    pub fn user_cases(&self) -> &Repository<UserCase> {
        &self.user_cases
    }

    pub fn user_cases_mut(&mut self) -> &mut Repository<UserCase> {
        &mut self.user_cases
    }

    pub fn personal_battles(&self) -> &Repository<PersonalBattle> {
        &self.personal_battles
    }

    pub fn personal_battles_mut(&mut self) -> &mut Repository<PersonalBattle> {
        &mut self.personal_battles
    }

    pub fn shop_items(&self) -> &Repository<ShopItem> {
        &self.shop_items
    }

    pub fn shop_items_mut(&mut self) -> &mut Repository<ShopItem> {
        &mut self.shop_items
    }

    pub fn orders(&self) -> &Repository<Order> {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut Repository<Order> {
        &mut self.orders
    }

    pub fn achievements(&self) -> &Repository<Achievement> {
        &self.achievements
    }

    pub fn achievements_mut(&mut self) -> &mut Repository<Achievement> {
        &mut self.achievements
    }

    pub fn tasks(&self) -> &Repository<Task> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut Repository<Task> {
        &mut self.tasks
    }

    /// Bytes currently used in the backing store.
    pub fn store_usage_bytes(&self) -> usize {
        self.adapter.used_bytes()
    }
}
