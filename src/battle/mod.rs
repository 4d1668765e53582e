//! Battle orchestration module
//!
//! The core of the crate: [`BattleBot`] sequences battle entry, per-round
//! stage detection and script dispatch, skill/attack input, and battle
//! close-out, all from the noisy feedback of on-screen template matches.

pub mod controller;
pub mod markers;
pub mod script;

pub use controller::{detect_stage, load_references, BattleBot, Session};
pub use script::{StageScript, StageScripts};
