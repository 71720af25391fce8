//! Season configuration: weeks and rules, validated once at load time.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::catalog;
use crate::error::ConfigError;
use crate::model::Combo;
use crate::rules::AchievementRule;
use crate::vocab;
use crate::week::Week;

/// On-disk form of a season.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeasonFile {
    name: String,
    /// Rules beyond the built-in catalog. A rule here shadows a catalog rule
    /// of the same name.
    #[serde(default)]
    rules: Vec<AchievementRule>,
    weeks: Vec<WeekFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeekFile {
    number: u32,
    species: String,
    background: String,
    gods: Vec<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    bonus1: Option<String>,
    #[serde(default)]
    bonus2: Option<String>,
}

/// A validated season. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonConfig {
    name: String,
    rules: Vec<AchievementRule>,
    weeks: Vec<Week>,
}

impl SeasonConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let file: SeasonFile = serde_json::from_str(text)?;
        let lookup = |week: u32, name: Option<String>| {
            name.map(|rule| {
                resolve_rule(&file.rules, &rule).ok_or(ConfigError::UnknownRule { week, rule })
            })
            .transpose()
        };

        let mut weeks = Vec::with_capacity(file.weeks.len());
        for w in file.weeks.iter() {
            let bonus1 = lookup(w.number, w.bonus1.clone())?;
            let bonus2 = lookup(w.number, w.bonus2.clone())?;
            weeks.push(
                Week::new(
                    w.number,
                    Combo::new(&w.species, &w.background),
                    w.gods.clone(),
                    w.start,
                    w.end,
                )
                .with_bonuses(bonus1, bonus2),
            );
        }
        Self::new(&file.name, file.rules, weeks)
    }

    /// Validate and assemble a season. Weeks are kept in week-number order.
    pub fn new(
        name: &str,
        rules: Vec<AchievementRule>,
        mut weeks: Vec<Week>,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateRule(rule.name.clone()));
            }
            rule.validate()?;
        }

        let mut numbers = HashSet::new();
        for week in &weeks {
            if !numbers.insert(week.number) {
                return Err(ConfigError::DuplicateWeek(week.number));
            }
            validate_week(week)?;
        }
        weeks.sort_by_key(|w| w.number);

        log::info!(
            "loaded season {:?}: {} weeks, {} custom rules",
            name,
            weeks.len(),
            rules.len()
        );
        Ok(Self {
            name: name.to_string(),
            rules,
            weeks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn week(&self, number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.number == number)
    }

    /// The week being played at `now`, if any.
    pub fn current_week(&self, now: DateTime<Utc>) -> Option<&Week> {
        self.weeks.iter().find(|w| w.contains(now))
    }

    /// Look up a rule by name, custom rules first.
    pub fn rule(&self, name: &str) -> Option<AchievementRule> {
        resolve_rule(&self.rules, name)
    }

    /// Custom rules followed by every catalog bonus rule they do not shadow.
    pub fn bonus_rules(&self) -> Vec<AchievementRule> {
        let mut all = self.rules.clone();
        all.extend(
            catalog::bonus_rules()
                .into_iter()
                .filter(|rule| self.rules.iter().all(|own| own.name != rule.name)),
        );
        all
    }
}

fn resolve_rule(custom: &[AchievementRule], name: &str) -> Option<AchievementRule> {
    custom
        .iter()
        .find(|rule| rule.name == name)
        .cloned()
        .or_else(|| catalog::bonus_rule(name))
}

fn validate_week(week: &Week) -> Result<(), ConfigError> {
    if !vocab::is_species(&week.combo.species) {
        return Err(ConfigError::UnknownSpecies(week.combo.species.clone()));
    }
    if !vocab::is_background(&week.combo.background) {
        return Err(ConfigError::UnknownBackground(week.combo.background.clone()));
    }
    if let Some(god) = week.gods.iter().find(|god| !vocab::is_god(god)) {
        return Err(ConfigError::UnknownGod {
            context: format!("week {}", week.number),
            god: god.clone(),
        });
    }
    if week.start >= week.end {
        return Err(ConfigError::EmptyWindow(week.number));
    }
    for bonus in week.bonus1.iter().chain(week.bonus2.iter()) {
        bonus.validate()?;
    }
    Ok(())
}
