//! Battle lifecycle: invitation -> active battle -> completed battle.
//!
//! Invitations transition exactly once out of `Pending`; accepted
//! invitations spawn exactly one active battle. Expiry is advisory and
//! enforced at read time: the first observation of a past-due pending
//! invitation flips it to `Expired`, after which it can no longer be
//! accepted or declined.

use chrono::{Duration, Utc};
use serde_json::json;

use crate::core::{EngineError, Result, generate_id};
use crate::model::{
    Battle, BattleInvitation, BattleStatus, InvitationStatus, NotificationKind, Priority, User,
};
use crate::notifications::NotificationCenter;
use crate::repository::{Repository, RepositoryConfig};
use crate::storage::{StoreAdapter, keys};

pub const INVITATION_TTL_HOURS: i64 = 24;

pub struct BattleManager {
    invitations: Repository<BattleInvitation>,
    battles: Repository<Battle>,
}

impl BattleManager {
    pub fn new(adapter: StoreAdapter) -> Self {
        Self {
            invitations: Repository::new(
                adapter.clone(),
                RepositoryConfig::unbounded(keys::BATTLE_INVITATIONS),
            ),
            battles: Repository::new(adapter, RepositoryConfig::unbounded(keys::BATTLES)),
        }
    }

    pub fn load(&mut self, seed_battles: Vec<Battle>, seed_invitations: Vec<BattleInvitation>) {
        self.battles.load_or(seed_battles);
        self.invitations.load_or(seed_invitations);
    }

    /// Propose a battle. Fails with `InvalidStake` unless `stake > 0`.
    /// Emits a high-priority notification addressed at the opponent and
    /// returns the invitation id.
    pub fn create_invitation(
        &mut self,
        challenger: &User,
        opponent: &User,
        stake: u32,
        message: Option<String>,
        notifications: &mut NotificationCenter,
    ) -> Result<String> {
        if stake == 0 {
            return Err(EngineError::InvalidStake(stake));
        }

        let now = Utc::now();
        let invitation = BattleInvitation {
            id: generate_id(),
            challenger_id: challenger.id.clone(),
            challenger_name: challenger.name.clone(),
            opponent_id: opponent.id.clone(),
            opponent_name: opponent.name.clone(),
            stake,
            message,
            created_at: now,
            expires_at: now + Duration::hours(INVITATION_TTL_HOURS),
            status: InvitationStatus::Pending,
        };
        let id = invitation.id.clone();
        self.invitations.prepend(invitation);

        notifications.notify(
            NotificationKind::Battle,
            "New battle challenge!",
            format!(
                "{} challenges you to a battle. Stake: {} coins.",
                challenger.name, stake
            ),
            Priority::High,
            Some(json!({ "invitationId": id, "stake": stake })),
        );
        Ok(id)
    }

    /// Accept a pending invitation, spawning exactly one active battle.
    /// Returns the new battle's id.
    pub fn accept_invitation(
        &mut self,
        invitation_id: &str,
        notifications: &mut NotificationCenter,
    ) -> Result<String> {
        let invitation = self.actionable_invitation(invitation_id)?;

        self.invitations
            .update(invitation_id, |inv| inv.status = InvitationStatus::Accepted);

        let battle = Battle {
            id: generate_id(),
            challenger_id: invitation.challenger_id.clone(),
            challenger_name: invitation.challenger_name.clone(),
            opponent_id: invitation.opponent_id.clone(),
            opponent_name: invitation.opponent_name.clone(),
            stake: invitation.stake,
            status: BattleStatus::Active,
            started_at: Utc::now(),
            completed_at: None,
            winner_id: None,
            winner_name: None,
            loser_id: None,
            loser_name: None,
        };
        let battle_id = battle.id.clone();
        self.battles.prepend(battle);

        notifications.notify(
            NotificationKind::Battle,
            "Challenge accepted!",
            format!(
                "{} accepted your battle challenge. Stake: {} coins.",
                invitation.opponent_name, invitation.stake
            ),
            Priority::Medium,
            Some(json!({ "battleId": battle_id })),
        );
        Ok(battle_id)
    }

    /// Decline a pending invitation.
    pub fn decline_invitation(
        &mut self,
        invitation_id: &str,
        notifications: &mut NotificationCenter,
    ) -> Result<()> {
        let invitation = self.actionable_invitation(invitation_id)?;

        self.invitations
            .update(invitation_id, |inv| inv.status = InvitationStatus::Declined);

        notifications.notify(
            NotificationKind::Battle,
            "Challenge declined",
            format!(
                "{} declined your battle challenge.",
                invitation.opponent_name
            ),
            Priority::Low,
            Some(json!({ "invitationId": invitation_id })),
        );
        Ok(())
    }

    /// Resolve an active battle to a single winner.
    pub fn complete_battle(
        &mut self,
        battle_id: &str,
        winner_id: &str,
        notifications: &mut NotificationCenter,
    ) -> Result<()> {
        let battle = self
            .battles
            .get(battle_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound("battle", battle_id.to_string()))?;

        if battle.status == BattleStatus::Completed {
            return Err(EngineError::InvalidState(format!(
                "battle '{battle_id}' is already completed"
            )));
        }
        if !battle.is_participant(winner_id) {
            return Err(EngineError::InvalidWinner(
                winner_id.to_string(),
                battle_id.to_string(),
            ));
        }

        let challenger_won = winner_id == battle.challenger_id;
        let (winner_name, loser_id, loser_name) = if challenger_won {
            (
                battle.challenger_name.clone(),
                battle.opponent_id.clone(),
                battle.opponent_name.clone(),
            )
        } else {
            (
                battle.opponent_name.clone(),
                battle.challenger_id.clone(),
                battle.challenger_name.clone(),
            )
        };

        self.battles.update(battle_id, |b| {
            b.status = BattleStatus::Completed;
            b.completed_at = Some(Utc::now());
            b.winner_id = Some(winner_id.to_string());
            b.winner_name = Some(winner_name.clone());
            b.loser_id = Some(loser_id.clone());
            b.loser_name = Some(loser_name.clone());
        });

        notifications.notify(
            NotificationKind::Battle,
            "Battle finished!",
            format!(
                "Winner: {}. Stake: {} coins.",
                winner_name, battle.stake
            ),
            Priority::Medium,
            Some(json!({
                "battleId": battle_id,
                "winnerId": winner_id,
                "stake": battle.stake,
            })),
        );
        Ok(())
    }

    /// Flip every past-due pending invitation to `Expired`. Returns how
    /// many were flipped.
    pub fn expire_stale_invitations(&mut self) -> usize {
        let now = Utc::now();
        self.invitations.update_where(
            |inv| inv.status == InvitationStatus::Pending && inv.is_expired_at(now),
            |inv| inv.status = InvitationStatus::Expired,
        )
    }

    /// All invitations, newest first. Past-due pending invitations are
    /// expired before the slice is handed out.
    pub fn invitations(&mut self) -> &[BattleInvitation] {
        self.expire_stale_invitations();
        self.invitations.items()
    }

    pub fn battles(&self) -> &[Battle] {
        self.battles.items()
    }

    pub fn battles_for(&self, user_id: &str) -> Vec<&Battle> {
        self.battles
            .items()
            .iter()
            .filter(|b| b.is_participant(user_id))
            .collect()
    }

    /// Admin delete of a battle record.
    pub fn remove_battle(&mut self, battle_id: &str) -> bool {
        self.battles.remove(battle_id)
    }

    /// Fetch an invitation that is still actionable, expiring it first
    /// when past due.
    fn actionable_invitation(&mut self, invitation_id: &str) -> Result<BattleInvitation> {
        let invitation = self
            .invitations
            .get(invitation_id)
            .cloned()
            .ok_or_else(|| EngineError::NotFound("invitation", invitation_id.to_string()))?;

        if invitation.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "invitation '{invitation_id}' is no longer pending"
            )));
        }
        if invitation.is_expired_at(Utc::now()) {
            self.invitations
                .update(invitation_id, |inv| inv.status = InvitationStatus::Expired);
            return Err(EngineError::InvalidState(format!(
                "invitation '{invitation_id}' has expired"
            )));
        }
        Ok(invitation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoreAdapter};

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            level: 10,
            rating: 1000,
            is_online: true,
        }
    }

    fn fixtures() -> (BattleManager, NotificationCenter) {
        let adapter = StoreAdapter::new(MemoryStore::new());
        let mut manager = BattleManager::new(adapter.clone());
        manager.load(Vec::new(), Vec::new());
        let mut notifications = NotificationCenter::new(adapter);
        notifications.load();
        (manager, notifications)
    }

    #[test]
    fn test_zero_stake_is_rejected() {
        let (mut manager, mut notifications) = fixtures();
        let err = manager
            .create_invitation(&user("a", "A"), &user("b", "B"), 0, None, &mut notifications)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStake(0)));
        assert!(manager.invitations().is_empty());
        assert!(notifications.items().is_empty());
    }

    #[test]
    fn test_expired_invitation_cannot_be_accepted() {
        let (mut manager, mut notifications) = fixtures();
        let id = manager
            .create_invitation(
                &user("a", "A"),
                &user("b", "B"),
                50,
                None,
                &mut notifications,
            )
            .unwrap();

        // Force the invitation past its deadline.
        manager
            .invitations
            .update(&id, |inv| inv.expires_at = Utc::now() - Duration::hours(1));

        let err = manager.accept_invitation(&id, &mut notifications).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        assert_eq!(
            manager.invitations()[0].status,
            InvitationStatus::Expired
        );
        // Once expired, declining is also rejected.
        assert!(matches!(
            manager.decline_invitation(&id, &mut notifications),
            Err(EngineError::InvalidState(_))
        ));
        assert!(manager.battles().is_empty());
    }

    #[test]
    fn test_lazy_sweep_expires_pending_invitations() {
        let (mut manager, mut notifications) = fixtures();
        let id = manager
            .create_invitation(
                &user("a", "A"),
                &user("b", "B"),
                50,
                None,
                &mut notifications,
            )
            .unwrap();
        manager
            .invitations
            .update(&id, |inv| inv.expires_at = Utc::now() - Duration::minutes(5));

        let invitations = manager.invitations();
        assert_eq!(invitations[0].status, InvitationStatus::Expired);
    }

    #[test]
    fn test_complete_battle_unknown_winner() {
        let (mut manager, mut notifications) = fixtures();
        let invitation_id = manager
            .create_invitation(
                &user("a", "A"),
                &user("b", "B"),
                80,
                None,
                &mut notifications,
            )
            .unwrap();
        let battle_id = manager
            .accept_invitation(&invitation_id, &mut notifications)
            .unwrap();

        let err = manager
            .complete_battle(&battle_id, "outsider", &mut notifications)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidWinner(_, _)));
        assert_eq!(manager.battles()[0].status, BattleStatus::Active);
    }

    #[test]
    fn test_remove_battle() {
        let (mut manager, mut notifications) = fixtures();
        let invitation_id = manager
            .create_invitation(
                &user("a", "A"),
                &user("b", "B"),
                30,
                None,
                &mut notifications,
            )
            .unwrap();
        let battle_id = manager
            .accept_invitation(&invitation_id, &mut notifications)
            .unwrap();
        assert!(manager.remove_battle(&battle_id));
        assert!(!manager.remove_battle(&battle_id));
    }
}
