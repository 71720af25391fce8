//! Built-in achievement rules: the standard weekly set, the season-long
//! one-time set, and the library of bonus rules weeks can pick from.

use crate::model::{Place, Verb};
use crate::rules::{AchievementRule, Cmp, Field, MilestoneFilter, Predicate};
use crate::vocab::{BRANCHES, HELL_BRANCHES, MULTI_LEVEL_BRANCHES, RUNE_BRANCHES};

fn occurred(filter: MilestoneFilter) -> Predicate {
    Predicate::Occurred(filter)
}

/// Entering any rune branch not in `excluded`.
fn entering_rune_branch(excluded: &[&str]) -> MilestoneFilter {
    let branches = RUNE_BRANCHES
        .iter()
        .copied()
        .filter(|b| !excluded.contains(b));
    MilestoneFilter::verb(Verb::BranchEnter).entering(branches)
}

fn entering_counted_branch() -> MilestoneFilter {
    MilestoneFilter::verb(Verb::BranchEnter).entering(MULTI_LEVEL_BRANCHES.iter().copied())
}

fn rune() -> MilestoneFilter {
    MilestoneFilter::verb(Verb::Rune)
}

fn runes_at_least(n: i64) -> MilestoneFilter {
    MilestoneFilter::any().with(Field::Runes, Cmp::Ge, n)
}

/// Kill, banish, pacify or slimify a unique.
pub fn unique_kill() -> Predicate {
    occurred(MilestoneFilter::verbs([
        Verb::Unique,
        Verb::UniqueBanished,
        Verb::UniquePacified,
        Verb::UniqueSlimified,
    ]))
}

/// Enter any multi-level branch other than the Dungeon.
pub fn branch_enter() -> Predicate {
    let branches = BRANCHES
        .iter()
        .filter(|(name, multilevel)| *multilevel && *name != "D")
        .map(|(name, _)| *name);
    occurred(MilestoneFilter::verb(Verb::BranchEnter).in_branches(branches))
}

/// Reach the last floor of any multi-level branch.
pub fn branch_end() -> Predicate {
    let branches = BRANCHES
        .iter()
        .filter(|(_, multilevel)| *multilevel)
        .map(|(name, _)| *name);
    occurred(MilestoneFilter::verb(Verb::BranchEnd).in_branches(branches))
}

pub fn god_champion(gods: &[String]) -> Predicate {
    Predicate::Champion {
        gods: gods.to_vec(),
    }
}

pub fn runes(n: i64) -> Predicate {
    occurred(runes_at_least(n))
}

pub fn orb() -> Predicate {
    occurred(MilestoneFilter::verb(Verb::Orb))
}

/// Win with all 15 runes.
pub fn fifteen_rune() -> AchievementRule {
    AchievementRule::new(
        "FifteenRune",
        "Win with all 15 runes.",
        3,
        Predicate::All {
            of: vec![Predicate::Won, runes(15)],
        },
    )
}

pub fn low_xl_zot() -> AchievementRule {
    AchievementRule::new(
        "LowXLZot",
        "Enter Zot at XL <= 20.",
        3,
        occurred(
            MilestoneFilter::verb(Verb::BranchEnter)
                .at(Place::entry("Zot"))
                .with(Field::Xl, Cmp::Le, 20),
        ),
    )
}

/// Leave a Ziggurat from its last floor.
pub fn zig_clear() -> AchievementRule {
    AchievementRule::new(
        "Zig",
        "Clear a Ziggurat.",
        3,
        occurred(MilestoneFilter::verb(Verb::ZigExit).from_place(Place::new("Zig", 27))),
    )
}

/// Win without any milestone at or past turn 40,000.
pub fn sub40k() -> AchievementRule {
    AchievementRule::new(
        "Sub40k",
        "Win in fewer than 40,000 turns.",
        6,
        Predicate::All {
            of: vec![
                Predicate::Won,
                Predicate::NeverOccurred(MilestoneFilter::any().with(Field::Turn, Cmp::Ge, 40_000)),
            ],
        },
    )
}

pub fn no_lair_win() -> AchievementRule {
    AchievementRule::new(
        "NoLairWin",
        "Win without entering Lair.",
        6,
        Predicate::All {
            of: vec![
                Predicate::Won,
                Predicate::NeverOccurred(
                    MilestoneFilter::verb(Verb::BranchEnter).at(Place::entry("Lair")),
                ),
            ],
        },
    )
}

pub fn ascetic_rune() -> AchievementRule {
    AchievementRule::new(
        "AsceticRune",
        "Collect a rune before using any potions or scrolls.",
        6,
        occurred(
            rune()
                .with(Field::PotionsUsed, Cmp::Eq, 0)
                .with(Field::ScrollsUsed, Cmp::Eq, 0),
        ),
    )
}

/// Season-long achievements, each awarded at most once.
pub fn one_time_rules() -> Vec<AchievementRule> {
    vec![
        fifteen_rune(),
        low_xl_zot(),
        zig_clear(),
        sub40k(),
        no_lair_win(),
        ascetic_rune(),
    ]
}

/// Every bonus rule that weeks can reference by name.
pub fn bonus_rules() -> Vec<AchievementRule> {
    vec![
        AchievementRule::new(
            "RuneBranchLowSkill",
            "Enter a rune branch with all base skills < 11.",
            1,
            Predicate::Any {
                of: vec![
                    occurred(entering_rune_branch(&[]).with(Field::SkLev, Cmp::Lt, 11)),
                    occurred(
                        MilestoneFilter::verb(Verb::AbyssEnter).with(Field::SkLev, Cmp::Lt, 11),
                    ),
                ],
            },
        ),
        AchievementRule::new(
            "RuneLowSkill",
            "Collect a rune with all base skills < 11.",
            1,
            occurred(rune().with(Field::SkLev, Cmp::Lt, 11)),
        ),
        AchievementRule::new(
            "EnterSlime2nd",
            "Enter Slime as your second multi-level branch (don't get banished).",
            1,
            Predicate::CountBelow {
                target: MilestoneFilter::verb(Verb::BranchEnter).at(Place::entry("Slime")),
                counted: entering_counted_branch(),
                bound: 2,
            },
        ),
        AchievementRule::new(
            "GetTheSlimyRuneFirst",
            "Get the slimy rune without entering any multi-level branch other than Lair, Slime, and D (don't get banished).",
            1,
            Predicate::CountBelow {
                target: rune().at(Place::new("Slime", 5)),
                counted: entering_counted_branch(),
                bound: 3,
            },
        ),
        AchievementRule::new(
            "TempleIn4kTurn",
            "Enter the Temple in less than 4,000 turns.",
            1,
            occurred(
                MilestoneFilter::verb(Verb::BranchEnter)
                    .at(Place::entry("Temple"))
                    .with(Field::Turn, Cmp::Lt, 4_000),
            ),
        ),
        AchievementRule::new(
            "RuneIn15kTurn",
            "Collect a rune in less than 15,000 turns.",
            1,
            occurred(rune().with(Field::Turn, Cmp::Lt, 15_000)),
        ),
        AchievementRule::new(
            "LairEndXL12",
            "Reach the end of Lair at XL <= 12.",
            1,
            occurred(
                MilestoneFilter::verb(Verb::BranchEnd)
                    .at(Place::new("Lair", 6))
                    .with(Field::Xl, Cmp::Le, 12),
            ),
        ),
        AchievementRule::new(
            "VaultEndXL18",
            "Reach the end of the Vaults at XL <= 18.",
            1,
            occurred(
                MilestoneFilter::verb(Verb::BranchEnd)
                    .at(Place::new("Vaults", 5))
                    .with(Field::Xl, Cmp::Le, 18),
            ),
        ),
        AchievementRule::new(
            "Elf3BeforeRunes",
            "Reach the end of Elf before entering a rune branch.",
            1,
            Predicate::Before {
                target: MilestoneFilter::verb(Verb::BranchEnd).at(Place::new("Elf", 3)),
                blocker: entering_rune_branch(&[]),
            },
        ),
        AchievementRule::new(
            "Depths5BeforeRunes",
            "Reach the end of the Depths before entering a rune branch.",
            1,
            Predicate::Before {
                target: MilestoneFilter::verb(Verb::BranchEnd).at(Place::new("Depths", 5)),
                blocker: entering_rune_branch(&[]),
            },
        ),
        AchievementRule::new(
            "GeryonBeforeRune",
            "Kill or slimify Geryon before entering a rune branch (excluding the Abyss).",
            1,
            Predicate::Before {
                target: MilestoneFilter::verbs([Verb::Unique, Verb::UniqueSlimified])
                    .msg_contains("Geryon"),
                blocker: entering_rune_branch(&["Abyss"]),
            },
        ),
        AchievementRule::new(
            "HellPanRuneFirst",
            "Get a rune from Hell or Pan before entering any other rune branch (excluding the Abyss).",
            1,
            Predicate::Before {
                target: rune().msg_excludes("byssal"),
                blocker: {
                    let mut excluded = vec!["Abyss"];
                    excluded.extend_from_slice(HELL_BRANCHES);
                    entering_rune_branch(&excluded)
                },
            },
        ),
        AchievementRule::new(
            "GoldenRune",
            "Collect the golden rune.",
            1,
            occurred(rune().at(Place::new("Tomb", 3))),
        ),
        AchievementRule::new(
            "VowOfCourage",
            "Collect at least 5 runes before entering the Depths.",
            1,
            Predicate::Before {
                target: rune().with(Field::Runes, Cmp::Ge, 5),
                blocker: MilestoneFilter::verb(Verb::BranchEnter).at(Place::entry("Depths")),
            },
        ),
        AchievementRule::new(
            "RuneNoSBranch",
            "Collect a rune before entering Shoals, Snake, Spider, or Swamp.",
            1,
            Predicate::Before {
                target: rune(),
                blocker: MilestoneFilter::verb(Verb::BranchEnter)
                    .entering(["Shoals", "Snake", "Spider", "Swamp"]),
            },
        ),
        AchievementRule::new(
            "RuneNoLair",
            "Collect a rune before entering Lair.",
            1,
            Predicate::Before {
                target: rune(),
                blocker: MilestoneFilter::verb(Verb::BranchEnter).at(Place::entry("Lair")),
            },
        ),
        AchievementRule::new(
            "RuneDontDie",
            "Collect a rune without dying.",
            1,
            Predicate::Before {
                target: rune(),
                blocker: MilestoneFilter::verb(Verb::Death),
            },
        ),
        AchievementRule::new(
            "2RuneDont2Die",
            "Collect two runes without dying twice.",
            1,
            Predicate::CountBelow {
                target: rune(),
                counted: MilestoneFilter::verb(Verb::Death),
                bound: 2,
            },
        ),
    ]
}

/// Look up a built-in bonus rule by name.
pub fn bonus_rule(name: &str) -> Option<AchievementRule> {
    bonus_rules().into_iter().find(|rule| rule.name == name)
}
