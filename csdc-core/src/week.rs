//! Weekly scoring: one scorecard row per contestant per week.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::Result;
use crate::model::{Combo, Player, PlayerId};
use crate::rules::{AchievementRule, Predicate};
use crate::selector::{self, GameRecord};
use crate::store::EventStore;

/// A scoring period with its required combo, gods and bonus rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
    pub number: u32,
    pub combo: Combo,
    pub gods: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bonus1: Option<AchievementRule>,
    pub bonus2: Option<AchievementRule>,
}

impl Week {
    /// A week with no bonus rules.
    pub fn new(
        number: u32,
        combo: Combo,
        gods: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            number,
            combo,
            gods,
            start,
            end,
            bonus1: None,
            bonus2: None,
        }
    }

    pub fn with_bonuses(
        mut self,
        bonus1: Option<AchievementRule>,
        bonus2: Option<AchievementRule>,
    ) -> Self {
        self.bonus1 = bonus1;
        self.bonus2 = bonus2;
        self
    }

    /// Whether `time` falls in `[start, end)`.
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.start <= time && time < self.end
    }
}

/// Achievements earned by one game in one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAchievements {
    pub uniq: bool,
    pub brenter: bool,
    pub brend: bool,
    pub god: bool,
    pub rune: bool,
    pub threerune: bool,
    pub orb: bool,
    pub win: bool,
    pub bonusone: u32,
    pub bonustwo: u32,
}

impl WeeklyAchievements {
    /// Each standard achievement is worth one point.
    pub fn standard_points(&self) -> u32 {
        [
            self.uniq,
            self.brenter,
            self.brend,
            self.god,
            self.rune,
            self.threerune,
            self.orb,
            self.win,
        ]
        .iter()
        .filter(|&&earned| earned)
        .count() as u32
    }

    pub fn bonus(&self) -> u32 {
        self.bonusone + self.bonustwo
    }

    pub fn total(&self) -> u32 {
        self.standard_points() + self.bonus()
    }
}

/// One contestant's result for one week. A contestant with no qualifying
/// game still gets a row, with no game and a total of 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorecardRow {
    pub player_id: PlayerId,
    pub week: u32,
    pub gid: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub achievements: Option<WeeklyAchievements>,
    pub total: u32,
}

impl ScorecardRow {
    pub fn empty(player_id: PlayerId, week: u32) -> Self {
        Self {
            player_id,
            week,
            gid: None,
            start: None,
            score: None,
            achievements: None,
            total: 0,
        }
    }

    pub fn played(&self) -> bool {
        self.gid.is_some()
    }

    pub fn bonus(&self) -> u32 {
        self.achievements.map_or(0, |a| a.bonus())
    }

    /// Week table order: total, bonus and game score descending, then
    /// earlier start. Rows without a game go last.
    pub fn table_order(&self, other: &Self) -> Ordering {
        other
            .played()
            .cmp(&self.played())
            .then_with(|| other.total.cmp(&self.total))
            .then_with(|| other.bonus().cmp(&self.bonus()))
            .then_with(|| other.score.cmp(&self.score))
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.player_id.cmp(&other.player_id))
    }
}

/// A player's week: the scored row plus every game that qualified, which
/// season-long achievements are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerWeek {
    pub row: ScorecardRow,
    pub qualifying: Vec<GameRecord>,
}

/// A week's scored table, sorted by [`ScorecardRow::table_order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTable {
    pub week: u32,
    pub combo: String,
    pub rows: Vec<ScorecardRow>,
}

impl WeekTable {
    pub fn from_rows(week: &Week, mut rows: Vec<ScorecardRow>) -> Self {
        rows.sort_by(ScorecardRow::table_order);
        Self {
            week: week.number,
            combo: week.combo.to_string(),
            rows,
        }
    }
}

/// Evaluates the standard and bonus rules of one week.
pub struct WeekScorer<'w> {
    week: &'w Week,
    uniq: Predicate,
    brenter: Predicate,
    brend: Predicate,
    god: Predicate,
    rune: Predicate,
    threerune: Predicate,
    orb: Predicate,
}

impl<'w> WeekScorer<'w> {
    pub fn new(week: &'w Week) -> Self {
        Self {
            week,
            uniq: catalog::unique_kill(),
            brenter: catalog::branch_enter(),
            brend: catalog::branch_end(),
            god: catalog::god_champion(&week.gods),
            rune: catalog::runes(1),
            threerune: catalog::runes(3),
            orb: catalog::orb(),
        }
    }

    /// Evaluate a game, seeing only milestones up to the end of the week.
    pub fn evaluate(&self, record: &GameRecord) -> WeeklyAchievements {
        let view = record.view(self.week.end);
        let award = |rule: &Option<AchievementRule>| rule.as_ref().map_or(0, |r| r.award(&view));
        WeeklyAchievements {
            uniq: self.uniq.evaluate(&view),
            brenter: self.brenter.evaluate(&view),
            brend: self.brend.evaluate(&view),
            god: self.god.evaluate(&view),
            rune: self.rune.evaluate(&view),
            threerune: self.threerune.evaluate(&view),
            orb: self.orb.evaluate(&view),
            win: view.won(),
            bonusone: award(&self.week.bonus1),
            bonustwo: award(&self.week.bonus2),
        }
    }

    fn row(&self, player: PlayerId, record: &GameRecord) -> ScorecardRow {
        let achievements = self.evaluate(record);
        ScorecardRow {
            player_id: player,
            week: self.week.number,
            gid: Some(record.game.gid.clone()),
            start: Some(record.game.start),
            score: record.game.score,
            total: achievements.total(),
            achievements: Some(achievements),
        }
    }

    /// Score one player. With a redo available, the better of the two games
    /// is used; the first game wins ties.
    pub fn score_player<S: EventStore + ?Sized>(
        &self,
        store: &S,
        player: &Player,
    ) -> Result<PlayerWeek> {
        let Some(selection) = selector::select(store, player.id, self.week)? else {
            return Ok(PlayerWeek {
                row: ScorecardRow::empty(player.id, self.week.number),
                qualifying: Vec::new(),
            });
        };

        let mut row = self.row(player.id, &selection.first);
        if let Some(redo) = &selection.redo {
            let redo_row = self.row(player.id, redo);
            if redo_row.total > row.total {
                log::debug!(
                    "week {}: player {} scores redo {} ({} > {})",
                    self.week.number,
                    player.id,
                    redo.game.gid,
                    redo_row.total,
                    row.total
                );
                row = redo_row;
            }
        }

        Ok(PlayerWeek {
            row,
            qualifying: selection.records().cloned().collect(),
        })
    }

    /// Score every player, in the order given.
    pub fn score_players<S: EventStore + ?Sized>(
        &self,
        store: &S,
        players: &[Player],
    ) -> Result<Vec<PlayerWeek>> {
        players
            .par_iter()
            .map(|player| self.score_player(store, player))
            .collect()
    }
}
