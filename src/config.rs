//! Runtime configuration.
//!
//! Every field has a default so the page can pass a partial JSON object to
//! `start_game_with_config` (or nothing at all).

use serde::{Deserialize, Serialize};

use crate::scenario::SelectionRules;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub spike_events_url: String,
    pub food_responses_url: String,
    pub daily_patterns_url: String,
    /// Minimum rise over baseline (mg/dL, exclusive) for a playable spike.
    pub min_spike_rise: f64,
    /// Minimum response-curve length (exclusive).
    pub min_curve_samples: usize,
    pub pool_size: usize,
    /// How long the "food placed" notification stays up.
    pub notification_ms: i32,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let rules = SelectionRules::default();
        Self {
            spike_events_url: "./processed_data/spike_events.json".to_string(),
            food_responses_url: "./processed_data/food_responses.json".to_string(),
            daily_patterns_url: "./processed_data/daily_patterns.json".to_string(),
            min_spike_rise: rules.min_rise,
            min_curve_samples: rules.min_samples,
            pool_size: rules.pool_size,
            notification_ms: 3000,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    pub fn selection_rules(&self) -> SelectionRules {
        SelectionRules {
            min_rise: self.min_spike_rise,
            min_samples: self.min_curve_samples,
            pool_size: self.pool_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{"seed": 42, "pool_size": 2}"#).unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.pool_size, 2);
        assert_eq!(cfg.min_spike_rise, 40.0);
        assert_eq!(cfg.spike_events_url, "./processed_data/spike_events.json");
        assert_eq!(cfg.selection_rules().min_samples, 10);
    }

    #[test]
    fn empty_input_is_default() {
        assert_eq!(GameConfig::from_json("  ").unwrap(), GameConfig::default());
        assert!(GameConfig::from_json("{\"pool_size\": \"three\"}").is_err());
    }
}
