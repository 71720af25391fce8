use thiserror::Error;

/// Problems found while loading a season configuration. All of these are
/// fatal: no scoring runs against a configuration that fails to load.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unknown branch {branch:?} in rule {rule:?}")]
    UnknownBranch { rule: String, branch: String },

    #[error("Unknown god {god:?} in {context}")]
    UnknownGod { context: String, god: String },

    #[error("Unknown species {0:?}")]
    UnknownSpecies(String),

    #[error("Unknown background {0:?}")]
    UnknownBackground(String),

    #[error("Week {week} references unknown rule {rule:?}")]
    UnknownRule { week: u32, rule: String },

    #[error("Rule {rule:?} awards {points} points; at most {max} allowed")]
    PointsOutOfRange { rule: String, points: u32, max: u32 },

    #[error("Rule {0:?} is defined more than once")]
    DuplicateRule(String),

    #[error("Week {0} is defined more than once")]
    DuplicateWeek(u32),

    #[error("Week {0} has an empty scoring window")]
    EmptyWindow(u32),
}

/// Failure reported by an [`EventStore`](crate::store::EventStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Event store unavailable: {0}")]
    Unavailable(String),
}

/// A scoring pass either completes or fails as a whole.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Event store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T, E = ScoringError> = std::result::Result<T, E>;
