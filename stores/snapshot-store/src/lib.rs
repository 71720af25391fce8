//! [`EventStore`] over a JSON snapshot exported by the ingestion pipeline.
//!
//! The snapshot is read once and indexed in memory: games by player, with
//! blacklisted accounts already removed, and milestones by game in time
//! order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use csdc_core::model::{Account, AccountId, Combo, Game, Milestone, Player, PlayerId};
use csdc_core::{EventStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Account {account} of {owner} does not exist")]
    UnknownAccount { owner: String, account: AccountId },

    #[error("Player {0} does not exist")]
    UnknownPlayer(PlayerId),

    #[error("Contestant {0:?} is not a known player")]
    UnknownContestant(String),

    #[error("Game {0} appears more than once")]
    DuplicateGame(String),
}

/// The snapshot file as written by ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub accounts: Vec<Account>,
    pub games: Vec<Game>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    /// Names of the players taking part. Everyone, when absent.
    #[serde(default)]
    pub contestants: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    contestants: Vec<Player>,
    games: HashMap<PlayerId, Vec<Game>>,
    /// Every game kept after blacklisting.
    gids: HashSet<String>,
    milestones: HashMap<String, Vec<Milestone>>,
}

impl SnapshotStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        let players: HashSet<PlayerId> = snapshot.players.iter().map(|p| p.id).collect();

        let mut accounts = HashMap::new();
        for account in &snapshot.accounts {
            if !players.contains(&account.player_id) {
                return Err(SnapshotError::UnknownPlayer(account.player_id));
            }
            accounts.insert(account.id, account);
        }

        let mut seen = HashSet::new();
        let mut gids = HashSet::new();
        let mut games: HashMap<PlayerId, Vec<Game>> = HashMap::new();
        let mut blacklisted = 0;
        for mut game in snapshot.games {
            if !seen.insert(game.gid.clone()) {
                return Err(SnapshotError::DuplicateGame(game.gid));
            }
            let account = accounts.get(&game.account_id).ok_or_else(|| {
                SnapshotError::UnknownAccount {
                    owner: format!("game {}", game.gid),
                    account: game.account_id,
                }
            })?;
            if account.blacklisted {
                blacklisted += 1;
                continue;
            }
            game.player_id = account.player_id;
            gids.insert(game.gid.clone());
            games.entry(game.player_id).or_default().push(game);
        }
        for list in games.values_mut() {
            list.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.gid.cmp(&b.gid)));
        }

        let mut milestones: HashMap<String, Vec<Milestone>> = HashMap::new();
        let mut orphans = 0;
        for milestone in snapshot.milestones {
            if gids.contains(&milestone.gid) {
                milestones.entry(milestone.gid.clone()).or_default().push(milestone);
            } else if !seen.contains(&milestone.gid) {
                orphans += 1;
            }
        }
        for list in milestones.values_mut() {
            list.sort_by_key(|m| m.time);
        }

        let contestants = match snapshot.contestants {
            None => snapshot.players.clone(),
            Some(names) => names
                .iter()
                .map(|name| {
                    snapshot
                        .players
                        .iter()
                        .find(|p| p.name.eq_ignore_ascii_case(name))
                        .cloned()
                        .ok_or_else(|| SnapshotError::UnknownContestant(name.clone()))
                })
                .collect::<Result<_, _>>()?,
        };

        if blacklisted > 0 {
            log::info!("skipped {} games on blacklisted accounts", blacklisted);
        }
        if orphans > 0 {
            log::warn!("dropped {} milestones of unknown games", orphans);
        }
        log::debug!(
            "snapshot: {} contestants, {} games, {} games with milestones",
            contestants.len(),
            gids.len(),
            milestones.len()
        );

        Ok(Self {
            contestants,
            games,
            gids,
            milestones,
        })
    }
}

impl EventStore for SnapshotStore {
    fn contestants(&self) -> Result<Vec<Player>, StoreError> {
        Ok(self.contestants.clone())
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
            .get(&player)
            .into_iter()
            .flatten()
            .filter(|g| g.plays(combo) && g.start >= start && g.start < end)
            .cloned()
            .collect())
    }

    fn milestones(&self, gid: &str) -> Result<Vec<Milestone>, StoreError> {
        if !self.gids.contains(gid) {
            return Err(StoreError::UnknownGame(gid.to_string()));
        }
        Ok(self.milestones.get(gid).cloned().unwrap_or_default())
    }
}
