use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning for the guess-to-score conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Meters represented by one normalized map unit.
    pub meters_per_unit: f64,
    /// Distance in meters at which the score reaches zero.
    pub max_distance: f64,
    pub max_score: u32,
    /// Average accuracy (percent) at or above which a game counts as good.
    pub good_accuracy_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            meters_per_unit: 100.0,
            max_distance: 50.0,
            max_score: 5000,
            good_accuracy_threshold: 50.0,
        }
    }
}

/// Tuning for pan/zoom interaction on the map viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_zoom_step: f64,
    pub key_zoom_step: f64,
    /// Pixels per arrow-key press.
    pub key_pan_step: f64,
    /// Max interval between two taps of a double tap, in milliseconds.
    pub double_tap_ms: f64,
    /// Max distance between two taps of a double tap, in pixels.
    pub double_tap_slop: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 5.0,
            wheel_zoom_step: 0.2,
            key_zoom_step: 0.1,
            key_pan_step: 10.0,
            double_tap_ms: 300.0,
            double_tap_slop: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub scoring: ScoringConfig,
    pub viewport: ViewportConfig,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.meters_per_unit > 0.0) {
            return Err(ConfigError::InvalidTuning("metersPerUnit must be positive"));
        }
        if !(self.max_distance > 0.0) {
            return Err(ConfigError::InvalidTuning("maxDistance must be positive"));
        }
        if !(0.0..=100.0).contains(&self.good_accuracy_threshold) {
            return Err(ConfigError::InvalidTuning(
                "goodAccuracyThreshold must be between 0 and 100",
            ));
        }
        Ok(())
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0) {
            return Err(ConfigError::InvalidTuning("minZoom must be positive"));
        }
        if !(self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::InvalidTuning("minZoom must not exceed maxZoom"));
        }
        if !(self.wheel_zoom_step > 0.0 && self.key_zoom_step > 0.0) {
            return Err(ConfigError::InvalidTuning("zoom steps must be positive"));
        }
        if !(self.key_pan_step >= 0.0 && self.double_tap_ms >= 0.0 && self.double_tap_slop >= 0.0) {
            return Err(ConfigError::InvalidTuning("pan step and tap limits must not be negative"));
        }
        Ok(())
    }
}

impl GameConfig {
    /// Parse a config, filling missing fields with defaults, and reject
    /// values the viewer or scorer cannot work with.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.viewport.validate()
    }
}
