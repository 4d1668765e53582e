//! FGO Farmer - ADB-driven Fate/Grand Order battle automation
//!
//! This library drives a connected Android device through simulated touch
//! input and verifies game state through on-screen template matching. The
//! operator supplies a quest screenshot, one or more acceptable support
//! servant screenshots, a per-stage battle script, and an AP item policy;
//! [`battle::BattleBot`] then loops "enter battle, play rounds, close out
//! rewards" until the requested loop count or AP exhaustion.
//!
//! Device I/O and recognition sit behind the [`device::Device`] and
//! [`vision::Matcher`] traits so the controller can be exercised against
//! fakes without a device attached.

pub mod battle;
pub mod config;
pub mod device;
pub mod vision;

pub use battle::{BattleBot, StageScripts};
pub use config::{BotConfig, ButtonLayout};

/// Errors reported by the bot.
///
/// Recognition misses are deliberately not represented here: the controller
/// absorbs them into its retry loops. Running out of AP is not an error
/// either; [`battle::BattleBot::run`] returns `Ok` with the loop count it
/// managed.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Invalid operator-supplied configuration, rejected at construction.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A second handler was registered for the same stage.
    #[error("stage {0} already has a registered script")]
    DuplicateStage(u8),
    /// A battle reached a stage with no registered handler.
    #[error("no script registered for stage {0}")]
    MissingScript(u8),
    /// An action primitive was called with arguments outside its contract.
    /// The offending device action is skipped; the battle keeps running.
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// A symbolic button name is missing from the layout table.
    #[error("unknown button '{0}'")]
    UnknownButton(String),
    /// A slot index outside the layout's 1-based range.
    #[error("slot index {index} out of range for '{name}'")]
    SlotIndex { name: String, index: u8 },
    /// A swipe track name missing from the layout table.
    #[error("unknown swipe track '{0}'")]
    UnknownTrack(String),
    /// The button layout file could not be parsed.
    #[error("failed to parse button layout: {0}")]
    Layout(#[from] serde_json::Error),
    /// A configuration or asset file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A reference image could not be loaded at setup time.
    #[error("failed to load reference image '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

impl BotError {
    /// Whether this error leaves the round loop running when a stage
    /// script returns it.
    pub fn is_precondition(&self) -> bool {
        matches!(self, BotError::Precondition(_))
    }
}
