use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::models::Position;

/// Euclidean distance between two positions.
pub fn distance(a: Position, b: Position) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Convert a normalized distance to meters.
pub fn to_meters(distance_normalized: f64, config: &ScoringConfig) -> f64 {
    distance_normalized * config.meters_per_unit
}

/// Linear decay from `max_score` at 0m to 0 at `max_distance` and beyond.
pub fn score_for_distance(distance_meters: f64, config: &ScoringConfig) -> u32 {
    if config.max_distance <= 0.0 {
        return if distance_meters <= 0.0 { config.max_score } else { 0 };
    }
    let raw = f64::from(config.max_score) * (1.0 - distance_meters / config.max_distance);
    raw.round().clamp(0.0, f64::from(config.max_score)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResult {
    pub distance_normalized: f64,
    pub distance_meters: f64,
    pub score: u32,
}

/// Score a guess against the ground truth.
pub fn evaluate_guess(guess: Position, truth: Position, config: &ScoringConfig) -> GuessResult {
    let distance_normalized = distance(guess, truth);
    let distance_meters = to_meters(distance_normalized, config);
    GuessResult {
        distance_normalized,
        distance_meters,
        score: score_for_distance(distance_meters, config),
    }
}

/// Percentage of the maximum achievable score, 0 when nothing was playable.
pub fn accuracy_percent(total_score: u64, rounds: u32, config: &ScoringConfig) -> f64 {
    let max = u64::from(rounds) * u64::from(config.max_score);
    if max == 0 {
        return 0.0;
    }
    total_score as f64 / max as f64 * 100.0
}
