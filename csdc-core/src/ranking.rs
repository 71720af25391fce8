//! Deterministic multi-key ranking of season standings.

use std::cmp::Ordering;

use crate::model::PlayerId;

/// The keys a standing is ranked by, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankKey {
    pub grand_total: u32,
    /// Sum of weekly bonus points.
    pub tiebreak: u32,
    pub high_score: Option<i64>,
    /// At least one week had a game.
    pub played: bool,
    pub player_id: PlayerId,
}

impl RankKey {
    /// Grand total, tie-break, high score and played descending. Players
    /// equal on all four keep player id order, so no two share a position.
    pub fn order(&self, other: &Self) -> Ordering {
        other
            .grand_total
            .cmp(&self.grand_total)
            .then(other.tiebreak.cmp(&self.tiebreak))
            .then(other.high_score.cmp(&self.high_score))
            .then(other.played.cmp(&self.played))
            .then(self.player_id.cmp(&other.player_id)) // Lower id wins ties
    }
}

/// Sort `items` into rank order and return their 1-based ranks, in the
/// sorted order.
pub fn rank_by<T>(items: &mut [T], key: impl Fn(&T) -> RankKey) -> Vec<usize> {
    items.sort_by(|a, b| key(a).order(&key(b)));
    (1..=items.len()).collect()
}
