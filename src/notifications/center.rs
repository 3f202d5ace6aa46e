//! Append-only notification log with read/unread state.

use chrono::Utc;
use serde_json::Value as JsonValue;

use crate::core::generate_id;
use crate::model::{Notification, NotificationKind, Priority};
use crate::repository::{Repository, RepositoryConfig, TrimStrategy};
use crate::storage::{StoreAdapter, keys};

/// At most this many entries are ever written to the store, however
/// long the in-memory log grows.
pub const PERSISTED_LIMIT: usize = 100;

/// The only cross-component event channel: lifecycle transitions that
/// should alert the user land here. The log is newest-first.
pub struct NotificationCenter {
    log: Repository<Notification>,
    adapter: StoreAdapter,
}

impl NotificationCenter {
    pub fn new(adapter: StoreAdapter) -> Self {
        let log = Repository::new(
            adapter.clone(),
            RepositoryConfig {
                key: keys::NOTIFICATIONS,
                ceiling_bytes: None,
                strategy: TrimStrategy::KeepNewest(PERSISTED_LIMIT),
            },
        );
        Self { log, adapter }
    }

    pub fn load(&mut self) {
        self.log.load();
    }

    pub fn load_or(&mut self, defaults: Vec<Notification>) {
        self.log.load_or(defaults);
    }

    /// Record a new notification. Id and timestamp are assigned here;
    /// the entry starts unread at the front of the log. Returns the
    /// assigned id.
    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: Priority,
        data: Option<JsonValue>,
    ) -> String {
        let notification = Notification {
            id: generate_id(),
            kind,
            title: title.into(),
            message: message.into(),
            priority,
            timestamp: Utc::now(),
            read: false,
            data,
        };
        let id = notification.id.clone();
        self.log.prepend(notification);
        id
    }

    pub fn items(&self) -> &[Notification] {
        self.log.items()
    }

    pub fn unread_count(&self) -> usize {
        self.log.items().iter().filter(|n| !n.read).count()
    }

    /// Flip a single entry to read. Idempotent; false when the id is
    /// unknown.
    pub fn mark_read(&mut self, id: &str) -> bool {
        self.log.update(id, |n| n.read = true)
    }

    /// Flip every unread entry. Returns how many were flipped; a second
    /// call is a no-op.
    pub fn mark_all_read(&mut self) -> usize {
        self.log.update_where(|n| !n.read, |n| n.read = true)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.log.remove(id)
    }

    pub fn clear_all(&mut self) {
        self.log.clear();
    }

    /// Post the first-run welcome notification, guarded by a sentinel
    /// key so it fires once per store. Returns true when posted.
    pub fn welcome_once(&mut self) -> bool {
        if self.adapter.contains(keys::HAS_WELCOME_NOTIFICATION) {
            return false;
        }
        self.notify(
            NotificationKind::System,
            "Welcome to GRITHER!",
            "You'll receive notifications here about new tasks, achievements, battles and more.",
            Priority::Medium,
            None,
        );
        if let Err(e) = self.adapter.write(keys::HAS_WELCOME_NOTIFICATION, &true, None) {
            log::warn!("failed to persist welcome sentinel: {e}");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn center() -> NotificationCenter {
        let mut center = NotificationCenter::new(StoreAdapter::new(MemoryStore::new()));
        center.load();
        center
    }

    #[test]
    fn test_notify_prepends_unread() {
        let mut center = center();
        center.notify(
            NotificationKind::Task,
            "First",
            "first",
            Priority::Low,
            None,
        );
        let newest = center.notify(
            NotificationKind::Battle,
            "Second",
            "second",
            Priority::High,
            None,
        );

        assert_eq!(center.items().len(), 2);
        assert_eq!(center.items()[0].id, newest);
        assert!(center.items().iter().all(|n| !n.read));
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn test_mark_all_read_is_idempotent() {
        let mut center = center();
        center.notify(NotificationKind::Shop, "A", "a", Priority::Low, None);
        center.notify(NotificationKind::Shop, "B", "b", Priority::Low, None);

        assert_eq!(center.mark_all_read(), 2);
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.mark_all_read(), 0);
    }

    #[test]
    fn test_mark_read_unknown_id() {
        let mut center = center();
        assert!(!center.mark_read("nope"));
    }

    #[test]
    fn test_persisted_log_is_capped_at_limit() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut center = NotificationCenter::new(adapter.clone());
        center.load();

        for i in 0..(PERSISTED_LIMIT + 1) {
            center.notify(
                NotificationKind::System,
                format!("n{i}"),
                "",
                Priority::Low,
                None,
            );
        }

        assert_eq!(center.items().len(), PERSISTED_LIMIT + 1);
        let stored: Vec<Notification> = adapter.read(keys::NOTIFICATIONS).unwrap().unwrap();
        assert_eq!(stored.len(), PERSISTED_LIMIT);
        // The oldest entry is absent from the stored payload.
        assert!(stored.iter().all(|n| n.title != "n0"));
        // But still present in memory.
        assert!(center.items().iter().any(|n| n.title == "n0"));
    }

    #[test]
    fn test_welcome_fires_once_per_store() {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut center = NotificationCenter::new(adapter.clone());
        center.load();
        assert!(center.welcome_once());
        assert!(!center.welcome_once());

        let mut second = NotificationCenter::new(adapter);
        second.load();
        assert!(!second.welcome_once());
    }

    #[test]
    fn test_clear_all_then_remove_are_noops() {
        let mut center = center();
        let id = center.notify(NotificationKind::System, "A", "a", Priority::Low, None);
        center.clear_all();
        assert!(center.items().is_empty());
        assert!(!center.remove(&id));
    }
}
