//! Achievement predicates evaluated against one game's milestones.
//!
//! Rules are small declarative values ([`Predicate`]) so they can be loaded
//! from configuration, validated once, and then evaluated any number of
//! times against a [`GameView`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Game, Ktyp, Milestone, Place, Verb};
use crate::vocab;

/// A game as seen from a scoring cutoff: milestones recorded after the
/// cutoff are invisible, even if the game is still open.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    game: &'a Game,
    milestones: &'a [Milestone],
    cutoff: DateTime<Utc>,
}

impl<'a> GameView<'a> {
    /// `milestones` must be ordered by time.
    pub fn new(game: &'a Game, milestones: &'a [Milestone], cutoff: DateTime<Utc>) -> Self {
        let visible = milestones.partition_point(|m| m.time <= cutoff);
        Self {
            game,
            milestones: &milestones[..visible],
            cutoff,
        }
    }

    pub fn milestones(&self) -> &'a [Milestone] {
        self.milestones
    }

    /// Won, and finished by the cutoff. An ongoing game has no end and so
    /// can never count as won.
    pub fn won(&self) -> bool {
        matches!(self.game.ktyp, Some(Ktyp::Winning))
            && self.game.end.map_or(false, |end| end <= self.cutoff)
    }

    fn matching<'f>(&self, filter: &'f MilestoneFilter) -> impl Iterator<Item = &'a Milestone> + 'f
    where
        'a: 'f,
    {
        let milestones: &'a [Milestone] = self.milestones;
        milestones.iter().filter(move |m| filter.matches(m))
    }
}

/// Numeric milestone attribute a [`Threshold`] can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Xl,
    Turn,
    Runes,
    PotionsUsed,
    ScrollsUsed,
    SkLev,
}

impl Field {
    fn read(&self, m: &Milestone) -> Option<i64> {
        match self {
            Field::Xl => m.xl.map(i64::from),
            Field::Turn => m.turn.and_then(|t| i64::try_from(t).ok()),
            Field::Runes => m.runes.map(i64::from),
            Field::PotionsUsed => m.potionsused.map(i64::from),
            Field::ScrollsUsed => m.scrollsused.map(i64::from),
            Field::SkLev => m.sklev.map(i64::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cmp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Cmp {
    fn holds(&self, left: i64, right: i64) -> bool {
        match self {
            Cmp::Lt => left < right,
            Cmp::Le => left <= right,
            Cmp::Eq => left == right,
            Cmp::Ge => left >= right,
            Cmp::Gt => left > right,
        }
    }
}

/// `field op value`. Never matches a milestone that lacks the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub field: Field,
    pub op: Cmp,
    pub value: i64,
}

impl Threshold {
    pub fn matches(&self, m: &Milestone) -> bool {
        self.field
            .read(m)
            .map_or(false, |actual| self.op.holds(actual, self.value))
    }
}

/// Constraints a single milestone must meet. Empty lists mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MilestoneFilter {
    pub verbs: Vec<Verb>,
    pub places: Vec<Place>,
    pub branches: Vec<String>,
    pub oplace: Option<Place>,
    pub god: Option<String>,
    pub msg_contains: Option<String>,
    /// Requires a message that does not contain this text.
    pub msg_excludes: Option<String>,
    pub thresholds: Vec<Threshold>,
}

impl MilestoneFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn verb(verb: Verb) -> Self {
        Self::verbs([verb])
    }

    pub fn verbs(verbs: impl IntoIterator<Item = Verb>) -> Self {
        Self {
            verbs: verbs.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn at(self, place: Place) -> Self {
        self.at_any([place])
    }

    pub fn at_any(mut self, places: impl IntoIterator<Item = Place>) -> Self {
        self.places.extend(places);
        self
    }

    /// Entry floor of each branch.
    pub fn entering(self, branches: impl IntoIterator<Item = &'static str>) -> Self {
        self.at_any(branches.into_iter().map(Place::entry))
    }

    pub fn in_branches<S: ToString>(mut self, branches: impl IntoIterator<Item = S>) -> Self {
        self.branches
            .extend(branches.into_iter().map(|b| b.to_string()));
        self
    }

    pub fn from_place(mut self, place: Place) -> Self {
        self.oplace = Some(place);
        self
    }

    pub fn god(mut self, god: &str) -> Self {
        self.god = Some(god.to_string());
        self
    }

    pub fn msg_contains(mut self, text: &str) -> Self {
        self.msg_contains = Some(text.to_string());
        self
    }

    pub fn msg_excludes(mut self, text: &str) -> Self {
        self.msg_excludes = Some(text.to_string());
        self
    }

    pub fn with(mut self, field: Field, op: Cmp, value: i64) -> Self {
        self.thresholds.push(Threshold { field, op, value });
        self
    }

    pub fn matches(&self, m: &Milestone) -> bool {
        if !self.verbs.is_empty() && !self.verbs.contains(&m.verb) {
            return false;
        }
        if !self.places.is_empty() && !m.place.as_ref().map_or(false, |p| self.places.contains(p)) {
            return false;
        }
        if !self.branches.is_empty()
            && !m
                .place
                .as_ref()
                .map_or(false, |p| self.branches.iter().any(|b| *b == p.branch))
        {
            return false;
        }
        if let Some(oplace) = &self.oplace {
            if m.oplace.as_ref() != Some(oplace) {
                return false;
            }
        }
        if let Some(god) = &self.god {
            if m.god.as_deref() != Some(god.as_str()) {
                return false;
            }
        }
        if let Some(text) = &self.msg_contains {
            if !m.msg.as_deref().map_or(false, |msg| msg.contains(text.as_str())) {
                return false;
            }
        }
        if let Some(text) = &self.msg_excludes {
            if !m.msg.as_deref().map_or(false, |msg| !msg.contains(text.as_str())) {
                return false;
            }
        }
        self.thresholds.iter().all(|t| t.matches(m))
    }

    fn validate(&self, rule: &str) -> Result<(), ConfigError> {
        let branches = self
            .places
            .iter()
            .chain(self.oplace.iter())
            .map(|p| p.branch.as_str())
            .chain(self.branches.iter().map(String::as_str));
        for branch in branches {
            if !vocab::is_branch(branch) {
                return Err(ConfigError::UnknownBranch {
                    rule: rule.to_string(),
                    branch: branch.to_string(),
                });
            }
        }
        if let Some(god) = &self.god {
            check_god(rule, god)?;
        }
        Ok(())
    }
}

/// A boolean condition over a [`GameView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Some visible milestone matches.
    Occurred(MilestoneFilter),
    /// No visible milestone matches, anywhere in the game.
    NeverOccurred(MilestoneFilter),
    /// Some `target` milestone has no `blocker` milestone on an earlier turn.
    Before {
        target: MilestoneFilter,
        blocker: MilestoneFilter,
    },
    /// Some `target` milestone has fewer than `bound` `counted` milestones on
    /// earlier turns.
    CountBelow {
        target: MilestoneFilter,
        counted: MilestoneFilter,
        bound: usize,
    },
    /// Champion of at least one of `gods`, and never renounced any god.
    Champion { gods: Vec<String> },
    /// Won by the cutoff.
    Won,
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
}

impl Predicate {
    pub fn evaluate(&self, view: &GameView<'_>) -> bool {
        match self {
            Predicate::Occurred(filter) => view.matching(filter).next().is_some(),
            Predicate::NeverOccurred(filter) => view.matching(filter).next().is_none(),
            Predicate::Before { target, blocker } => {
                let first_blocker = view.matching(blocker).filter_map(|m| m.turn).min();
                view.matching(target)
                    .any(|m| match (m.turn, first_blocker) {
                        (Some(turn), Some(blocked)) => turn <= blocked,
                        _ => true,
                    })
            }
            Predicate::CountBelow {
                target,
                counted,
                bound,
            } => {
                let mut turns: Vec<u64> = view.matching(counted).filter_map(|m| m.turn).collect();
                turns.sort_unstable();
                view.matching(target).any(|m| {
                    let earlier = m
                        .turn
                        .map_or(0, |turn| turns.partition_point(|&t| t < turn));
                    earlier < *bound
                })
            }
            Predicate::Champion { gods } => {
                let renounced = MilestoneFilter::verb(Verb::GodRenounce);
                view.matching(&renounced).next().is_none()
                    && gods.iter().any(|god| champion_of(god).evaluate(view))
            }
            Predicate::Won => view.won(),
            Predicate::All { of } => of.iter().all(|p| p.evaluate(view)),
            Predicate::Any { of } => of.iter().any(|p| p.evaluate(view)),
        }
    }

    /// Check every place, branch and god this predicate names against the
    /// built-in vocabulary.
    pub fn validate(&self, rule: &str) -> Result<(), ConfigError> {
        match self {
            Predicate::Occurred(filter) | Predicate::NeverOccurred(filter) => filter.validate(rule),
            Predicate::Before { target, blocker } => {
                target.validate(rule)?;
                blocker.validate(rule)
            }
            Predicate::CountBelow {
                target, counted, ..
            } => {
                target.validate(rule)?;
                counted.validate(rule)
            }
            Predicate::Champion { gods } => gods.iter().try_for_each(|god| check_god(rule, god)),
            Predicate::Won => Ok(()),
            Predicate::All { of } | Predicate::Any { of } => {
                of.iter().try_for_each(|p| p.validate(rule))
            }
        }
    }
}

/// What champion status means for a single god, ignoring renouncement.
fn champion_of(god: &str) -> Predicate {
    if god == vocab::NO_GOD {
        Predicate::NeverOccurred(MilestoneFilter::verb(Verb::GodWorship))
    } else if vocab::WORSHIP_CHAMPION_GODS.contains(&god) {
        Predicate::Occurred(MilestoneFilter::verb(Verb::GodWorship).god(god))
    } else {
        Predicate::Occurred(MilestoneFilter::verb(Verb::GodMaxPiety).god(god))
    }
}

fn check_god(context: &str, god: &str) -> Result<(), ConfigError> {
    if vocab::is_god(god) {
        Ok(())
    } else {
        Err(ConfigError::UnknownGod {
            context: context.to_string(),
            god: god.to_string(),
        })
    }
}

/// Largest point value a rule may award. Keeps every weekly and season sum
/// far inside `u32`.
pub const MAX_RULE_POINTS: u32 = 100;

/// A named predicate with a point value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRule {
    pub name: String,
    pub description: String,
    pub points: u32,
    pub predicate: Predicate,
}

impl AchievementRule {
    pub fn new(name: &str, description: &str, points: u32, predicate: Predicate) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            points,
            predicate,
        }
    }

    pub fn is_met(&self, view: &GameView<'_>) -> bool {
        self.predicate.evaluate(view)
    }

    /// `points` if met, otherwise 0.
    pub fn award(&self, view: &GameView<'_>) -> u32 {
        if self.is_met(view) {
            self.points
        } else {
            0
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points > MAX_RULE_POINTS {
            return Err(ConfigError::PointsOutOfRange {
                rule: self.name.clone(),
                points: self.points,
                max: MAX_RULE_POINTS,
            });
        }
        self.predicate.validate(&self.name)
    }
}
