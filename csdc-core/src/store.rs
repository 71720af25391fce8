//! The query interface scoring needs from the event store.
//!
//! Ingestion and persistence live elsewhere; scoring only reads through this
//! trait. Implementations must be safe to share across scoring threads.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::model::{Combo, Game, Milestone, Player, PlayerId};

/// Read-only access to players, games and milestones.
pub trait EventStore: Send + Sync {
    /// Everyone taking part in the season, in any order.
    fn contestants(&self) -> Result<Vec<Player>, StoreError>;

    /// Games by `player` on non-blacklisted accounts playing `combo` that
    /// started in `[start, end)`.
    fn candidate_games(
        &self,
        player: PlayerId,
        combo: &Combo,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError>;

    /// All milestones of a game, ordered by time.
    fn milestones(&self, gid: &str) -> Result<Vec<Milestone>, StoreError>;
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn contestants(&self) -> Result<Vec<Player>, StoreError> {
        (**self).contestants()
    }

    fn candidate_games(
        &self,
        player: PlayerId,
        combo: &Combo,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError> {
        (**self).candidate_games(player, combo, start, end)
    }

    fn milestones(&self, gid: &str) -> Result<Vec<Milestone>, StoreError> {
        (**self).milestones(gid)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Store over plain vectors. Blacklisting is modelled by leaving the
    /// game out.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct FakeStore {
        pub(crate) players: Vec<Player>,
        pub(crate) games: Vec<Game>,
        pub(crate) milestones: Vec<Milestone>,
        pub(crate) fail: bool,
    }

    impl FakeStore {
        pub(crate) fn player(&mut self, id: PlayerId) -> &mut Self {
            self.players.push(Player {
                id,
                name: format!("player{}", id),
            });
            self
        }
    }

    impl EventStore for FakeStore {
        fn contestants(&self) -> Result<Vec<Player>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("offline".to_string()));
            }
            Ok(self.players.clone())
        }

        fn candidate_games(
            &self,
            player: PlayerId,
            combo: &Combo,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Game>, StoreError> {
            Ok(self
                .games
                .iter()
                .filter(|g| g.player_id == player && g.plays(combo))
                .filter(|g| g.start >= start && g.start < end)
                .cloned()
                .collect())
        }

        fn milestones(&self, gid: &str) -> Result<Vec<Milestone>, StoreError> {
            let mut found: Vec<_> = self
                .milestones
                .iter()
                .filter(|m| m.gid == gid)
                .cloned()
                .collect();
            found.sort_by_key(|m| m.time);
            Ok(found)
        }
    }

    #[test]
    fn store_is_usable_through_a_reference() {
        let mut store = FakeStore::default();
        store.player(3);
        fn first_id<S: EventStore>(store: S) -> PlayerId {
            store.contestants().unwrap()[0].id
        }
        let by_ref: &dyn EventStore = &store;
        assert_eq!(first_id(by_ref), 3);
    }
}
