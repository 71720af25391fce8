//! Scoring engine for a weekly roguelike tournament.
//!
//! Games and milestones come in through an [`EventStore`]; a validated
//! [`SeasonConfig`] says which combo each week plays and which bonus rules
//! apply. [`score_season`] turns the two into week tables and ranked season
//! standings. Every pass is a pure function of its inputs and can be re-run
//! at any time.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod ranking;
pub mod rules;
pub mod season;
pub mod selector;
pub mod store;
pub mod vocab;
pub mod week;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use config::SeasonConfig;
pub use error::{ConfigError, Result, ScoringError, StoreError};
pub use model::{Account, Combo, Game, Ktyp, Milestone, Place, Player, PlayerId, Verb};
pub use rules::{AchievementRule, GameView, MilestoneFilter, Predicate};
pub use season::{OneTimeAchievements, SeasonAggregator, SeasonStanding};
pub use store::EventStore;
pub use week::{ScorecardRow, Week, WeekScorer, WeekTable, WeeklyAchievements};

/// Output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub season: String,
    /// One table per configured week, in week order.
    pub weeks: Vec<WeekTable>,
    /// Every contestant, in rank order.
    pub standings: Vec<SeasonStanding>,
}

impl Standings {
    pub fn week(&self, number: u32) -> Option<&WeekTable> {
        self.weeks.iter().find(|table| table.week == number)
    }
}

/// Score every week and rank every contestant. Any store failure fails the
/// whole pass.
pub fn score_season<S: EventStore + ?Sized>(config: &SeasonConfig, store: &S) -> Result<Standings> {
    let mut players = store.contestants()?;
    players.sort_by_key(|p| p.id);
    players.dedup_by_key(|p| p.id);

    let per_week: Vec<Vec<week::PlayerWeek>> = config
        .weeks()
        .par_iter()
        .map(|week| WeekScorer::new(week).score_players(store, &players))
        .collect::<Result<_>>()?;

    let weeks = config
        .weeks()
        .iter()
        .zip(&per_week)
        .map(|(week, results)| {
            WeekTable::from_rows(week, results.iter().map(|r| r.row.clone()).collect())
        })
        .collect();

    let aggregator = SeasonAggregator::new();
    let standings: Vec<SeasonStanding> = players
        .par_iter()
        .enumerate()
        .map(|(i, player)| {
            let results: Vec<_> = config
                .weeks()
                .iter()
                .zip(&per_week)
                .map(|(week, results)| (week, results[i].clone()))
                .collect();
            aggregator.standing(player.clone(), &results)
        })
        .collect();
    let standings = season::rank(standings);

    log::info!(
        "scored season {:?}: {} weeks, {} contestants",
        config.name(),
        config.weeks().len(),
        standings.len()
    );
    Ok(Standings {
        season: config.name().to_string(),
        weeks,
        standings,
    })
}
