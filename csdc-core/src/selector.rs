//! Picks the game that counts for a player in a week.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{Game, Ktyp, Milestone, PlayerId};
use crate::rules::GameView;
use crate::store::EventStore;
use crate::week::Week;

/// A first game that dies below this experience level may be redone.
pub const REDO_MAX_XL: u32 = 5;

/// A game together with its time-ordered milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub game: Game,
    pub milestones: Vec<Milestone>,
}

impl GameRecord {
    pub fn load<S: EventStore + ?Sized>(store: &S, game: Game) -> Result<Self> {
        let mut milestones = store.milestones(&game.gid)?;
        if !milestones.windows(2).all(|pair| pair[0].time <= pair[1].time) {
            log::warn!("milestones of {} are out of order; sorting", game.gid);
            milestones.sort_by_key(|m| m.time);
        }
        Ok(Self { game, milestones })
    }

    pub fn view(&self, cutoff: DateTime<Utc>) -> GameView<'_> {
        GameView::new(&self.game, &self.milestones, cutoff)
    }

    /// Experience level from the latest milestone at or before `at` that
    /// recorded one.
    pub fn xl_at(&self, at: DateTime<Utc>) -> Option<u32> {
        self.milestones
            .iter()
            .rev()
            .skip_while(|m| m.time > at)
            .find_map(|m| m.xl)
    }
}

/// The games eligible to score for one player in one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub first: GameRecord,
    /// Present only when the first game allows a redo.
    pub redo: Option<GameRecord>,
}

impl Selection {
    pub fn records(&self) -> impl Iterator<Item = &GameRecord> {
        std::iter::once(&self.first).chain(self.redo.iter())
    }
}

/// A redo replaces nothing unless the first game is over, was a death, ended
/// below [`REDO_MAX_XL`], and the redo started after it ended.
pub fn redo_allowed(first: &GameRecord, second: &Game) -> bool {
    let Some(end) = first.game.end else {
        return false;
    };
    first.game.ktyp.as_ref().map_or(false, Ktyp::is_death)
        && first.xl_at(end).map_or(false, |xl| xl < REDO_MAX_XL)
        && second.start > end
}

/// Order candidates by start time; the gid breaks exact ties.
fn sort_candidates(games: &mut [Game]) {
    games.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.gid.cmp(&b.gid)));
}

/// Select the first game and, if it qualifies, the redo game for `player`.
pub fn select<S: EventStore + ?Sized>(
    store: &S,
    player: PlayerId,
    week: &Week,
) -> Result<Option<Selection>> {
    let mut candidates = store.candidate_games(player, &week.combo, week.start, week.end)?;
    candidates.retain(|g| g.plays(&week.combo) && week.contains(g.start));
    sort_candidates(&mut candidates);

    let mut candidates = candidates.into_iter();
    let Some(first) = candidates.next() else {
        return Ok(None);
    };
    let first = GameRecord::load(store, first)?;

    let redo = match candidates.next() {
        Some(second) if redo_allowed(&first, &second) => {
            log::debug!(
                "week {}: player {} may redo {} with {}",
                week.number,
                player,
                first.game.gid,
                second.gid
            );
            Some(GameRecord::load(store, second)?)
        }
        _ => None,
    };

    Ok(Some(Selection { first, redo }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Combo, Verb};
    use crate::rules::tests::at;
    use crate::store::tests::FakeStore;

    fn week() -> Week {
        Week::new(1, Combo::new("DD", "Fi"), vec!["Trog".to_string()], at(4, 0), at(11, 0))
    }

    fn game(gid: &str, start: DateTime<Utc>) -> Game {
        let mut g = crate::rules::tests::game(gid);
        g.start = start;
        g
    }

    fn died(mut g: Game, end: DateTime<Utc>) -> Game {
        g.end = Some(end);
        g.ktyp = Some(Ktyp::Other("mon".to_string()));
        g
    }

    fn xl_milestone(gid: &str, time: DateTime<Utc>, xl: u32) -> Milestone {
        let mut m = Milestone::new(gid, Verb::DeathFinal, time);
        m.xl = Some(xl);
        m
    }

    #[test]
    fn no_candidates_selects_nothing() {
        let store = FakeStore::default();
        assert_eq!(select(&store, 1, &week()).unwrap(), None);
    }

    #[test]
    fn earliest_game_in_window_is_first() {
        let mut store = FakeStore::default();
        store.games = vec![
            game("late", at(7, 0)),
            game("early", at(5, 0)),
            game("before", at(3, 0)),
            game("after", at(11, 0)),
        ];
        let selection = select(&store, 1, &week()).unwrap().unwrap();
        assert_eq!(selection.first.game.gid, "early");
        assert_eq!(selection.redo, None);
    }

    #[test]
    fn other_combos_are_not_candidates() {
        let mut store = FakeStore::default();
        let mut other = game("mifi", at(5, 0));
        other.species = "Mi".to_string();
        store.games = vec![other, game("ddfi", at(6, 0))];
        let selection = select(&store, 1, &week()).unwrap().unwrap();
        assert_eq!(selection.first.game.gid, "ddfi");
    }

    #[test]
    fn low_xl_death_allows_redo() {
        let mut store = FakeStore::default();
        store.games = vec![
            died(game("first", at(5, 0)), at(5, 2)),
            game("second", at(6, 0)),
        ];
        store.milestones = vec![xl_milestone("first", at(5, 2), 4)];
        let selection = select(&store, 1, &week()).unwrap().unwrap();
        assert_eq!(selection.redo.unwrap().game.gid, "second");
    }

    #[test]
    fn xl5_death_does_not_allow_redo() {
        let mut store = FakeStore::default();
        store.games = vec![
            died(game("first", at(5, 0)), at(5, 2)),
            game("second", at(6, 0)),
        ];
        store.milestones = vec![xl_milestone("first", at(5, 2), 5)];
        let selection = select(&store, 1, &week()).unwrap().unwrap();
        assert_eq!(selection.redo, None);
    }

    #[test]
    fn quitting_does_not_allow_redo() {
        let mut store = FakeStore::default();
        let mut first = died(game("first", at(5, 0)), at(5, 2));
        first.ktyp = Some(Ktyp::Quitting);
        store.games = vec![first, game("second", at(6, 0))];
        store.milestones = vec![xl_milestone("first", at(5, 2), 1)];
        assert_eq!(select(&store, 1, &week()).unwrap().unwrap().redo, None);
    }

    #[test]
    fn redo_must_start_after_first_ends() {
        let mut store = FakeStore::default();
        store.games = vec![
            died(game("first", at(5, 0)), at(5, 6)),
            game("overlap", at(5, 3)),
        ];
        store.milestones = vec![xl_milestone("first", at(5, 6), 2)];
        assert_eq!(select(&store, 1, &week()).unwrap().unwrap().redo, None);
    }

    #[test]
    fn ongoing_first_game_allows_no_redo() {
        let mut store = FakeStore::default();
        store.games = vec![game("first", at(5, 0)), game("second", at(6, 0))];
        store.milestones = vec![xl_milestone("first", at(5, 2), 1)];
        assert_eq!(select(&store, 1, &week()).unwrap().unwrap().redo, None);
    }

    #[test]
    fn only_one_redo_is_considered() {
        let mut store = FakeStore::default();
        store.games = vec![
            died(game("first", at(5, 0)), at(5, 2)),
            died(game("second", at(6, 0)), at(6, 1)),
            game("third", at(7, 0)),
        ];
        store.milestones = vec![
            xl_milestone("first", at(5, 2), 1),
            xl_milestone("second", at(6, 1), 1),
        ];
        let selection = select(&store, 1, &week()).unwrap().unwrap();
        let gids: Vec<_> = selection.records().map(|r| r.game.gid.as_str()).collect();
        assert_eq!(gids, ["first", "second"]);
    }

    #[test]
    fn xl_is_read_from_latest_milestone_before_end() {
        let record = GameRecord {
            game: died(game("g", at(5, 0)), at(5, 5)),
            milestones: vec![
                xl_milestone("g", at(5, 1), 3),
                Milestone::new("g", Verb::Rune, at(5, 2)),
                xl_milestone("g", at(5, 9), 12),
            ],
        };
        assert_eq!(record.xl_at(at(5, 5)), Some(3));
    }
}
