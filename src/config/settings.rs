//! Operator settings
//!
//! Everything the operator feeds the bot: reference images for the quest
//! and acceptable support servants, the AP item policy, matching
//! thresholds, and polling intervals. Validated once at construction, used
//! read-only afterwards.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::BotError;

/// Polling intervals for the three kinds of wait the bot performs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timings {
    /// Short settle after a tap.
    pub short: Duration,
    /// The poll interval while waiting for a marker.
    pub mid: Duration,
    /// Long wait after a support-list refresh.
    pub long: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(1),
            mid: Duration::from_secs(2),
            long: Duration::from_secs(10),
        }
    }
}

/// Main bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Screenshot of the quest tile to farm.
    pub quest: PathBuf,
    /// Screenshots of acceptable support servants, in preference order
    /// (the first one found on screen wins, not the best).
    pub friends: Vec<PathBuf>,
    /// AP recovery items to try in order when AP runs out. Marker names,
    /// e.g. `["silver_apple", "gold_apple"]`. Empty means stop instead.
    pub ap_items: Vec<String>,
    /// Matching threshold for the quest tile.
    pub quest_threshold: f32,
    /// Matching threshold for support servants.
    pub friend_threshold: f32,
    /// Default threshold for every other marker.
    pub match_threshold: f32,
    /// Number of stages in the quest.
    pub stage_count: u8,
    /// Confidence floor a stage indicator must clear to be trusted.
    pub stage_floor: f32,
    /// Swipe-and-rescan cycles over the support list before forcing a
    /// refresh.
    pub friend_scan_cycles: u32,
    /// Polling intervals.
    pub timings: Timings,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            quest: PathBuf::from("quest.png"),
            friends: vec![PathBuf::from("friend.png")],
            ap_items: Vec::new(),
            quest_threshold: 0.97,
            friend_threshold: 0.97,
            match_threshold: 0.85,
            stage_count: 3,
            stage_floor: 0.8,
            friend_scan_cycles: 6,
            timings: Timings::default(),
        }
    }
}

impl BotConfig {
    /// Check the configuration before any device I/O happens.
    ///
    /// Thresholds must lie in `(0, 1]`, the stage count must be positive,
    /// and at least one support servant image is required.
    pub fn validate(&self) -> Result<(), BotError> {
        for (name, value) in [
            ("quest_threshold", self.quest_threshold),
            ("friend_threshold", self.friend_threshold),
            ("match_threshold", self.match_threshold),
            ("stage_floor", self.stage_floor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(BotError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.stage_count < 1 {
            return Err(BotError::Config("stage_count must be at least 1".into()));
        }
        if self.friends.is_empty() {
            return Err(BotError::Config(
                "at least one friend image is required".into(),
            ));
        }
        if self.friend_scan_cycles < 1 {
            return Err(BotError::Config(
                "friend_scan_cycles must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stage_count, 3);
        assert!(config.ap_items.is_empty());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut config = BotConfig::default();
        config.quest_threshold = 0.0;
        assert!(matches!(config.validate(), Err(BotError::Config(_))));

        config.quest_threshold = 1.0;
        assert!(config.validate().is_ok());

        config.stage_floor = 1.2;
        assert!(matches!(config.validate(), Err(BotError::Config(_))));

        config.stage_floor = f32::NAN;
        assert!(matches!(config.validate(), Err(BotError::Config(_))));
    }

    #[test]
    fn test_stage_count_and_friends_required() {
        let mut config = BotConfig::default();
        config.stage_count = 0;
        assert!(config.validate().is_err());

        config = BotConfig::default();
        config.friends.clear();
        assert!(config.validate().is_err());
    }
}
