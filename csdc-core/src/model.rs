//! Games, milestones and the identities that own them.
//!
//! These are produced by ingestion and are never mutated by scoring.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub type PlayerId = u64;
pub type AccountId = u64;

/// A person, stable across server accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Unique display name.
    pub name: String,
}

/// A server-specific login belonging to exactly one [`Player`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub server: String,
    /// FK [`Player::id`].
    pub player_id: PlayerId,
    /// Griefer and bot accounts never score.
    #[serde(default)]
    pub blacklisted: bool,
}

/// A species + background pairing, e.g. `DDFi`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combo {
    pub species: String,
    pub background: String,
}

impl Combo {
    pub fn new(species: &str, background: &str) -> Self {
        Self {
            species: species.to_string(),
            background: background.to_string(),
        }
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.species, self.background)
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ktyp {
    Winning,
    Quitting,
    Leaving,
    Wizmode,
    /// Any other kill type; all of these are deaths.
    Other(String),
}

impl Ktyp {
    /// Whether this ending is the character dying.
    pub fn is_death(&self) -> bool {
        matches!(self, Ktyp::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Ktyp::Winning => "winning",
            Ktyp::Quitting => "quitting",
            Ktyp::Leaving => "leaving",
            Ktyp::Wizmode => "wizmode",
            Ktyp::Other(name) => name,
        }
    }
}

impl From<String> for Ktyp {
    fn from(value: String) -> Self {
        match value.as_str() {
            "winning" => Ktyp::Winning,
            "quitting" => Ktyp::Quitting,
            "leaving" => Ktyp::Leaving,
            "wizmode" => Ktyp::Wizmode,
            _ => Ktyp::Other(value),
        }
    }
}

impl From<Ktyp> for String {
    fn from(value: Ktyp) -> Self {
        match value {
            Ktyp::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Ktyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub gid: String,
    /// FK [`Account::id`].
    pub account_id: AccountId,
    /// FK [`Player::id`], denormalized from the account.
    pub player_id: PlayerId,
    pub species: String,
    pub background: String,
    pub start: DateTime<Utc>,
    /// `None` while the game is still in progress.
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ktyp: Option<Ktyp>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl Game {
    pub fn plays(&self, combo: &Combo) -> bool {
        self.species == combo.species && self.background == combo.background
    }
}

/// Kind of milestone event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    #[serde(rename = "begin")]
    Begin,
    #[serde(rename = "br.enter")]
    BranchEnter,
    #[serde(rename = "br.end")]
    BranchEnd,
    #[serde(rename = "br.exit")]
    BranchExit,
    #[serde(rename = "abyss.enter")]
    AbyssEnter,
    #[serde(rename = "abyss.exit")]
    AbyssExit,
    #[serde(rename = "zig")]
    Zig,
    #[serde(rename = "zig.enter")]
    ZigEnter,
    #[serde(rename = "zig.exit")]
    ZigExit,
    #[serde(rename = "shaft")]
    Shaft,
    #[serde(rename = "rune")]
    Rune,
    #[serde(rename = "orb")]
    Orb,
    #[serde(rename = "uniq")]
    Unique,
    #[serde(rename = "uniq.ban")]
    UniqueBanished,
    #[serde(rename = "uniq.ens")]
    UniqueEnslaved,
    #[serde(rename = "uniq.pac")]
    UniquePacified,
    #[serde(rename = "uniq.slime")]
    UniqueSlimified,
    #[serde(rename = "ghost")]
    Ghost,
    #[serde(rename = "ghost.ban")]
    GhostBanished,
    #[serde(rename = "god.worship")]
    GodWorship,
    #[serde(rename = "god.maxpiety")]
    GodMaxPiety,
    #[serde(rename = "god.ecumenical")]
    GodEcumenical,
    #[serde(rename = "god.renounce")]
    GodRenounce,
    #[serde(rename = "god.mollify")]
    GodMollify,
    #[serde(rename = "sacrifice")]
    Sacrifice,
    #[serde(rename = "ancestor.class")]
    AncestorClass,
    #[serde(rename = "death")]
    Death,
    #[serde(rename = "death.final")]
    DeathFinal,
    #[serde(rename = "monstrous")]
    Monstrous,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Begin => "begin",
            Verb::BranchEnter => "br.enter",
            Verb::BranchEnd => "br.end",
            Verb::BranchExit => "br.exit",
            Verb::AbyssEnter => "abyss.enter",
            Verb::AbyssExit => "abyss.exit",
            Verb::Zig => "zig",
            Verb::ZigEnter => "zig.enter",
            Verb::ZigExit => "zig.exit",
            Verb::Shaft => "shaft",
            Verb::Rune => "rune",
            Verb::Orb => "orb",
            Verb::Unique => "uniq",
            Verb::UniqueBanished => "uniq.ban",
            Verb::UniqueEnslaved => "uniq.ens",
            Verb::UniquePacified => "uniq.pac",
            Verb::UniqueSlimified => "uniq.slime",
            Verb::Ghost => "ghost",
            Verb::GhostBanished => "ghost.ban",
            Verb::GodWorship => "god.worship",
            Verb::GodMaxPiety => "god.maxpiety",
            Verb::GodEcumenical => "god.ecumenical",
            Verb::GodRenounce => "god.renounce",
            Verb::GodMollify => "god.mollify",
            Verb::Sacrifice => "sacrifice",
            Verb::AncestorClass => "ancestor.class",
            Verb::Death => "death",
            Verb::DeathFinal => "death.final",
            Verb::Monstrous => "monstrous",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A branch and a floor within it. Single-level branches are floor 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Place {
    pub branch: String,
    pub level: u8,
}

impl Place {
    pub fn new(branch: &str, level: u8) -> Self {
        Self {
            branch: branch.to_string(),
            level,
        }
    }

    /// The first floor of `branch`, where `br.enter` milestones are recorded.
    pub fn entry(branch: &str) -> Self {
        Self::new(branch, 1)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if crate::vocab::is_multilevel(&self.branch) {
            write!(f, "{}:{}", self.branch, self.level)
        } else {
            f.write_str(&self.branch)
        }
    }
}

/// Error parsing a `Branch:level` place string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed place: {0:?}")]
pub struct PlaceParseError(pub String);

impl FromStr for Place {
    type Err = PlaceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (branch, level) = match s.split_once(':') {
            Some((branch, level)) => {
                let level = level
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| PlaceParseError(s.to_string()))?;
                (branch.trim(), level)
            }
            None => (s.trim(), 1),
        };
        if branch.is_empty() || level == 0 {
            return Err(PlaceParseError(s.to_string()));
        }
        Ok(Place::new(branch, level))
    }
}

impl Serialize for Place {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Place {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One timestamped event within a [`Game`]. Attributes are optional because
/// not every verb records every field.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// FK [`Game::gid`].
    pub gid: String,
    pub verb: Verb,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub place: Option<Place>,
    /// Origin place, e.g. the Ziggurat floor being left on `zig.exit`.
    #[serde(default)]
    pub oplace: Option<Place>,
    #[serde(default)]
    pub god: Option<String>,
    #[serde(default)]
    pub xl: Option<u32>,
    #[serde(default)]
    pub turn: Option<u64>,
    /// Runes held when the event happened.
    #[serde(default)]
    pub runes: Option<u32>,
    #[serde(default)]
    pub potionsused: Option<u32>,
    #[serde(default)]
    pub scrollsused: Option<u32>,
    /// Highest base skill level at the time.
    #[serde(default)]
    pub sklev: Option<u32>,
    #[serde_as(as = "serde_with::NoneAsEmptyString")]
    #[serde(default)]
    pub msg: Option<String>,
}

impl Milestone {
    /// A bare milestone with every optional attribute unset.
    pub fn new(gid: &str, verb: Verb, time: DateTime<Utc>) -> Self {
        Self {
            gid: gid.to_string(),
            verb,
            time,
            place: None,
            oplace: None,
            god: None,
            xl: None,
            turn: None,
            runes: None,
            potionsused: None,
            scrollsused: None,
            sklev: None,
            msg: None,
        }
    }
}
