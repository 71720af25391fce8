use chrono::{DateTime, TimeZone, Utc};

use csdc_core::model::Verb;
use csdc_core::{
    score_season, Combo, EventStore, Game, Ktyp, Milestone, Player, PlayerId, SeasonConfig,
    StoreError,
};

#[derive(Default)]
struct MemoryStore {
    players: Vec<Player>,
    games: Vec<Game>,
    milestones: Vec<Milestone>,
}

impl EventStore for MemoryStore {
    fn contestants(&self) -> Result<Vec<Player>, StoreError> {
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
            .filter(|g| {
                g.player_id == player && g.plays(combo) && g.start >= start && g.start < end
            })
            .cloned()
            .collect())
    }

    fn milestones(&self, gid: &str) -> Result<Vec<Milestone>, StoreError> {
        Ok(self.milestones.iter().filter(|m| m.gid == gid).cloned().collect())
    }
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 10, day, hour, 0, 0).unwrap()
}

fn config() -> SeasonConfig {
    SeasonConfig::from_json(
        r#"{
            "name": "CSDC 2018 test",
            "weeks": [
                {
                    "number": 1,
                    "species": "DD",
                    "background": "Fi",
                    "gods": ["Makhleb", "Trog", "Okawaru"],
                    "start": "2018-10-04T00:00:00Z",
                    "end": "2018-10-11T00:00:00Z"
                },
                {
                    "number": 2,
                    "species": "Mi",
                    "background": "Be",
                    "gods": ["Trog"],
                    "start": "2018-10-11T00:00:00Z",
                    "end": "2018-10-18T00:00:00Z",
                    "bonus1": "TempleIn4kTurn",
                    "bonus2": "RuneIn15kTurn"
                }
            ]
        }"#,
    )
    .unwrap()
}

fn player(id: PlayerId, name: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
    }
}

fn game(gid: &str, player_id: PlayerId, combo: (&str, &str), start: DateTime<Utc>) -> Game {
    Game {
        gid: gid.to_string(),
        account_id: player_id,
        player_id,
        species: combo.0.to_string(),
        background: combo.1.to_string(),
        start,
        end: None,
        ktyp: None,
        score: None,
    }
}

fn milestone(
    gid: &str,
    verb: Verb,
    place: Option<&str>,
    turn: u64,
    time: DateTime<Utc>,
) -> Milestone {
    let mut m = Milestone::new(gid, verb, time);
    m.place = place.map(|p| p.parse().unwrap());
    m.turn = Some(turn);
    m
}

#[test]
fn ongoing_game_scores_progress() {
    let mut store = MemoryStore::default();
    store.players.push(player(1, "p"));
    store.games.push(game("g", 1, ("DD", "Fi"), at(5, 0)));
    let mut rune = milestone("g", Verb::Rune, Some("Lair:5"), 9000, at(5, 4));
    rune.runes = Some(1);
    store.milestones = vec![
        milestone("g", Verb::BranchEnter, Some("D:1"), 0, at(5, 0)),
        milestone("g", Verb::BranchEnter, Some("Lair:1"), 500, at(5, 1)),
        rune,
        milestone("g", Verb::BranchEnd, Some("Lair:6"), 9200, at(5, 5)),
    ];

    let standings = score_season(&config(), &store).unwrap();
    let row = &standings.week(1).unwrap().rows[0];
    let achievements = row.achievements.unwrap();
    assert!(achievements.brenter);
    assert!(achievements.rune);
    assert!(achievements.brend);
    assert!(!achievements.threerune);
    assert!(!achievements.win);
    assert_eq!(row.total, 3);
}

#[test]
fn fast_win_earns_sub40k_once() {
    let mut store = MemoryStore::default();
    store.players.push(player(1, "speedy"));
    let mut won = game("g", 1, ("DD", "Fi"), at(5, 0));
    won.end = Some(at(6, 0));
    won.ktyp = Some(Ktyp::Winning);
    won.score = Some(1_000_000);
    store.games.push(won);
    let mut rune = milestone("g", Verb::Rune, Some("Vaults:5"), 39_999, at(5, 20));
    rune.runes = Some(3);
    store.milestones.push(rune);

    let standings = score_season(&config(), &store).unwrap();
    let standing = &standings.standings[0];
    assert!(standing.one_time.sub40k);
    // Never entered Lair either.
    assert!(standing.one_time.nolairwin);
    assert!(!standing.one_time.fifteenrune);
    assert_eq!(standing.one_time_points, 12);
    // rune, threerune and win.
    assert_eq!(standing.week_totals[&1], 3);
    assert_eq!(standing.grand_total, 15);
    assert_eq!(standing.high_score, Some(1_000_000));
}

#[test]
fn everyone_is_ranked_even_without_games() {
    let mut store = MemoryStore::default();
    store.players = vec![player(3, "c"), player(1, "a"), player(2, "b")];
    store.games.push(game("g", 2, ("Mi", "Be"), at(12, 0)));
    store.milestones.push(milestone("g", Verb::Unique, Some("D:2"), 400, at(12, 1)));

    let standings = score_season(&config(), &store).unwrap();
    let order: Vec<_> = standings
        .standings
        .iter()
        .map(|s| (s.rank, s.player.id, s.grand_total, s.played))
        .collect();
    assert_eq!(order, [(1, 2, 1, true), (2, 1, 0, false), (3, 3, 0, false)]);

    let week2 = standings.week(2).unwrap();
    assert_eq!(week2.combo, "MiBe");
    assert_eq!(week2.rows[0].gid.as_deref(), Some("g"));
    assert!(week2.rows[1..].iter().all(|r| r.gid.is_none() && r.total == 0));
}

#[test]
fn game_outside_window_does_not_count() {
    let mut store = MemoryStore::default();
    store.players.push(player(1, "late"));
    store.games.push(game("g", 1, ("DD", "Fi"), at(11, 0)));
    let standings = score_season(&config(), &store).unwrap();
    assert!(!standings.standings[0].played);
}

#[test]
fn standings_serialize_with_week_keys() {
    let mut store = MemoryStore::default();
    store.players.push(player(1, "p"));
    let standings = score_season(&config(), &store).unwrap();
    let json = serde_json::to_value(&standings).unwrap();
    assert_eq!(json["standings"][0]["week_totals"]["2"], 0);
    assert!(json["standings"][0]["weeks"]["1"]["gid"].is_null());
}
