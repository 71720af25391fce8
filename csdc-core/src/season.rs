//! Season standings: weekly rows plus one-time achievements, ranked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::model::Player;
use crate::ranking::{self, RankKey};
use crate::rules::AchievementRule;
use crate::selector::GameRecord;
use crate::week::{PlayerWeek, ScorecardRow, Week};

/// Season-long achievements. Each is earned if any qualifying game earns
/// it, and scores once no matter how many do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeAchievements {
    pub fifteenrune: bool,
    pub lowxlzot: bool,
    pub zig: bool,
    pub sub40k: bool,
    pub nolairwin: bool,
    pub asceticrune: bool,
}

impl OneTimeAchievements {
    pub fn merge(&mut self, other: &OneTimeAchievements) {
        self.fifteenrune |= other.fifteenrune;
        self.lowxlzot |= other.lowxlzot;
        self.zig |= other.zig;
        self.sub40k |= other.sub40k;
        self.nolairwin |= other.nolairwin;
        self.asceticrune |= other.asceticrune;
    }

    fn flags(&self) -> [bool; 6] {
        [
            self.fifteenrune,
            self.lowxlzot,
            self.zig,
            self.sub40k,
            self.nolairwin,
            self.asceticrune,
        ]
    }
}

/// Evaluates the one-time rules. Rule order matches the fields of
/// [`OneTimeAchievements`].
#[derive(Debug, Clone)]
pub struct OneTimeScorer {
    rules: [AchievementRule; 6],
}

impl Default for OneTimeScorer {
    fn default() -> Self {
        Self {
            rules: [
                catalog::fifteen_rune(),
                catalog::low_xl_zot(),
                catalog::zig_clear(),
                catalog::sub40k(),
                catalog::no_lair_win(),
                catalog::ascetic_rune(),
            ],
        }
    }
}

impl OneTimeScorer {
    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }

    /// One game, seen from `week`'s cutoff.
    pub fn evaluate(&self, record: &GameRecord, week: &Week) -> OneTimeAchievements {
        let view = record.view(week.end);
        let [fifteenrune, lowxlzot, zig, sub40k, nolairwin, asceticrune] =
            self.rules.each_ref().map(|rule| rule.is_met(&view));
        OneTimeAchievements {
            fifteenrune,
            lowxlzot,
            zig,
            sub40k,
            nolairwin,
            asceticrune,
        }
    }

    pub fn points(&self, earned: &OneTimeAchievements) -> u32 {
        self.rules
            .iter()
            .zip(earned.flags())
            .filter(|(_, flag)| *flag)
            .map(|(rule, _)| rule.points)
            .sum()
    }
}

/// One player's season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStanding {
    pub rank: usize,
    pub player: Player,
    /// Scorecard rows keyed by week number.
    pub weeks: BTreeMap<u32, ScorecardRow>,
    pub week_totals: BTreeMap<u32, u32>,
    pub one_time: OneTimeAchievements,
    pub one_time_points: u32,
    pub grand_total: u32,
    pub tiebreak: u32,
    pub high_score: Option<i64>,
    pub played: bool,
}

impl SeasonStanding {
    pub fn rank_key(&self) -> RankKey {
        RankKey {
            grand_total: self.grand_total,
            tiebreak: self.tiebreak,
            high_score: self.high_score,
            played: self.played,
            player_id: self.player.id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeasonAggregator {
    one_time: OneTimeScorer,
}

impl SeasonAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unranked standing from a player's results, one entry per
    /// week.
    pub fn standing(&self, player: Player, results: &[(&Week, PlayerWeek)]) -> SeasonStanding {
        let mut weeks = BTreeMap::new();
        let mut one_time = OneTimeAchievements::default();
        let mut high_score = None;
        let mut tiebreak = 0;
        let mut weekly_total = 0;

        for (week, result) in results {
            for record in &result.qualifying {
                one_time.merge(&self.one_time.evaluate(record, week));
                high_score = high_score.max(record.game.score);
            }
            tiebreak += result.row.bonus();
            weekly_total += result.row.total;
            weeks.insert(week.number, result.row.clone());
        }

        let week_totals = weeks.iter().map(|(&n, row)| (n, row.total)).collect();
        let played = weeks.values().any(ScorecardRow::played);
        let one_time_points = self.one_time.points(&one_time);

        SeasonStanding {
            rank: 0,
            player,
            weeks,
            week_totals,
            one_time,
            one_time_points,
            grand_total: weekly_total + one_time_points,
            tiebreak,
            high_score,
            played,
        }
    }
}

/// Sort standings into rank order and fill in their ranks.
pub fn rank(mut standings: Vec<SeasonStanding>) -> Vec<SeasonStanding> {
    let ranks = ranking::rank_by(&mut standings, SeasonStanding::rank_key);
    for (standing, rank) in standings.iter_mut().zip(ranks) {
        standing.rank = rank;
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Combo, Game, Ktyp, Milestone, Verb};
    use crate::rules::tests::at;
    use crate::week::WeeklyAchievements;

    fn week(number: u32, start_day: u32) -> Week {
        Week::new(
            number,
            Combo::new("DD", "Fi"),
            vec!["Trog".to_string()],
            at(start_day, 0),
            at(start_day + 7, 0),
        )
    }

    fn player(id: u64) -> Player {
        Player {
            id,
            name: format!("player{}", id),
        }
    }

    fn winning_game(gid: &str, end: chrono::DateTime<chrono::Utc>, score: i64) -> GameRecord {
        let mut game: Game = crate::rules::tests::game(gid);
        game.ktyp = Some(Ktyp::Winning);
        game.end = Some(end);
        game.score = Some(score);
        let mut orb = Milestone::new(gid, Verb::Orb, end);
        orb.runes = Some(15);
        orb.turn = Some(39_000);
        GameRecord {
            game,
            milestones: vec![orb],
        }
    }

    fn result(
        week: &Week,
        player: u64,
        total: u32,
        bonus: u32,
        games: Vec<GameRecord>,
    ) -> PlayerWeek {
        let first = games.first();
        PlayerWeek {
            row: ScorecardRow {
                player_id: player,
                week: week.number,
                gid: first.map(|r| r.game.gid.clone()),
                start: first.map(|r| r.game.start),
                score: first.and_then(|r| r.game.score),
                achievements: first.map(|_| WeeklyAchievements {
                    bonusone: bonus,
                    ..WeeklyAchievements::default()
                }),
                total,
            },
            qualifying: games,
        }
    }

    #[test]
    fn one_time_points_follow_rule_values() {
        let scorer = OneTimeScorer::default();
        let all = OneTimeAchievements {
            fifteenrune: true,
            lowxlzot: true,
            zig: true,
            sub40k: true,
            nolairwin: true,
            asceticrune: true,
        };
        assert_eq!(scorer.points(&all), 27);
        let sub40k = OneTimeAchievements {
            sub40k: true,
            ..OneTimeAchievements::default()
        };
        assert_eq!(scorer.points(&sub40k), 6);
    }

    #[test]
    fn one_time_achievements_score_once() {
        let w1 = week(1, 4);
        let w2 = week(2, 11);
        let agg = SeasonAggregator::new();
        let results = [
            (&w1, result(&w1, 1, 1, 0, vec![winning_game("a", at(9, 0), 100)])),
            (&w2, result(&w2, 1, 1, 0, vec![winning_game("b", at(16, 0), 300)])),
        ];
        let standing = agg.standing(player(1), &results);

        assert!(standing.one_time.fifteenrune);
        assert!(standing.one_time.sub40k);
        assert!(standing.one_time.nolairwin);
        assert_eq!(standing.one_time_points, 3 + 6 + 6);
        assert_eq!(standing.grand_total, 2 + 15);
        assert_eq!(standing.high_score, Some(300));
        assert_eq!(standing.week_totals, BTreeMap::from([(1, 1), (2, 1)]));
    }

    #[test]
    fn one_time_uses_the_week_cutoff() {
        let w1 = week(1, 4);
        let agg = SeasonAggregator::new();
        // Won after week 1 closed.
        let results = [(&w1, result(&w1, 1, 0, 0, vec![winning_game("a", at(12, 0), 100)]))];
        let standing = agg.standing(player(1), &results);
        assert!(!standing.one_time.fifteenrune);
        assert_eq!(standing.one_time_points, 0);
    }

    #[test]
    fn redo_games_count_toward_high_score() {
        let w1 = week(1, 4);
        let agg = SeasonAggregator::new();
        let mut first = winning_game("first", at(12, 0), 10);
        first.game.ktyp = Some(Ktyp::Other("mon".to_string()));
        let redo = winning_game("redo", at(12, 0), 999);
        let results = [(&w1, result(&w1, 1, 0, 0, vec![first, redo]))];
        assert_eq!(agg.standing(player(1), &results).high_score, Some(999));
    }

    #[test]
    fn tiebreak_sums_weekly_bonuses() {
        let w1 = week(1, 4);
        let w2 = week(2, 11);
        let agg = SeasonAggregator::new();
        let mut g = winning_game("a", at(20, 0), 1);
        g.game.ktyp = None;
        g.game.end = None;
        let results = [
            (&w1, result(&w1, 1, 3, 2, vec![g.clone()])),
            (&w2, result(&w2, 1, 4, 1, vec![g])),
        ];
        let standing = agg.standing(player(1), &results);
        assert_eq!(standing.tiebreak, 3);
        assert_eq!(standing.grand_total, 7);
        assert!(standing.played);
    }

    #[test]
    fn player_without_games_still_stands() {
        let w1 = week(1, 4);
        let agg = SeasonAggregator::new();
        let results = [(&w1, result(&w1, 5, 0, 0, vec![]))];
        let standing = agg.standing(player(5), &results);
        assert!(!standing.played);
        assert_eq!(standing.high_score, None);
        assert_eq!(standing.week_totals[&1], 0);
    }

    #[test]
    fn ranking_assigns_positions() {
        let w1 = week(1, 4);
        let agg = SeasonAggregator::new();
        let standings = vec![
            agg.standing(player(2), &[(&w1, result(&w1, 2, 1, 0, vec![]))]),
            agg.standing(player(1), &[(&w1, result(&w1, 1, 1, 0, vec![]))]),
            agg.standing(player(3), &[(&w1, result(&w1, 3, 5, 0, vec![]))]),
        ];
        let ranked = rank(standings);
        let order: Vec<_> = ranked.iter().map(|s| (s.rank, s.player.id)).collect();
        assert_eq!(order, [(1, 3), (2, 1), (3, 2)]);
    }

    #[test]
    fn weeks_serialize_keyed_by_number() {
        let w1 = week(1, 4);
        let agg = SeasonAggregator::new();
        let standing = agg.standing(player(1), &[(&w1, result(&w1, 1, 7, 0, vec![]))]);
        let json = serde_json::to_value(&standing).unwrap();
        assert_eq!(json["week_totals"]["1"], 7);
        assert_eq!(json["weeks"]["1"]["total"], 7);
    }
}
