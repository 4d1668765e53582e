//! Stage script registry
//!
//! Binds a handler to each stage number. The handler is opaque to the
//! controller: it gets a `&mut BattleBot` and issues whatever skill,
//! master-skill, and attack calls the operator scripted for that stage.

use std::collections::HashMap;

use super::controller::BattleBot;
use crate::device::Device;
use crate::vision::Matcher;
use crate::BotError;

/// A per-stage battle script.
pub type StageScript<D, M> = Box<dyn Fn(&mut BattleBot<D, M>) -> Result<(), BotError>>;

/// Stage number to handler table. One handler per stage, at most.
pub struct StageScripts<D: Device, M: Matcher> {
    handlers: HashMap<u8, StageScript<D, M>>,
}

impl<D: Device, M: Matcher> Default for StageScripts<D, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Device, M: Matcher> StageScripts<D, M> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a script for a stage.
    ///
    /// Registering the same stage twice is a configuration error, caught
    /// here rather than mid-battle.
    pub fn at_stage(
        &mut self,
        stage: u8,
        script: impl Fn(&mut BattleBot<D, M>) -> Result<(), BotError> + 'static,
    ) -> Result<(), BotError> {
        if self.handlers.contains_key(&stage) {
            return Err(BotError::DuplicateStage(stage));
        }
        log::debug!("script registered for stage {stage}");
        self.handlers.insert(stage, Box::new(script));
        Ok(())
    }

    /// Look up the script for a stage. A reachable stage without a script
    /// is a configuration error and propagates.
    pub fn get(&self, stage: u8) -> Result<&StageScript<D, M>, BotError> {
        self.handlers.get(&stage).ok_or(BotError::MissingScript(stage))
    }

    /// Number of registered stages.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no stage has a script yet.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
