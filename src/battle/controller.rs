//! Battle controller
//!
//! The state machine that runs farming loops against a live device. Each
//! loop is "enter battle, play rounds until the battle ends, close out the
//! reward screens". The only feedback channel is the screen, so every
//! decision is made by refreshing the captured frame and asking the
//! matcher; transient recognition failures are absorbed by retry loops
//! rather than escalated.
//!
//! All real time elapses in [`BattleBot::wait`] and the marker waits, and
//! every wait re-captures the frame before the next decision.

use std::time::Duration;

use crate::config::buttons::Button;
use crate::config::{BotConfig, ButtonLayout};
use crate::device::{Device, Humanizer};
use crate::vision::{Matcher, TemplateMatcher};
use crate::BotError;

use super::markers;
use super::script::StageScripts;

/// Swipe gesture duration in milliseconds.
const SWIPE_DURATION_MS: u32 = 500;

/// Swipe track used to browse the quest list.
const TRACK_QUEST: &str = "quest";
/// Swipe track used to browse the support list.
const TRACK_FRIEND: &str = "friend";

/// Buttons and tracks the controller taps by name; checked up front so a
/// broken custom layout fails at construction, not mid-battle.
const REQUIRED_BUTTONS: &[&str] = &[
    "skill",
    "choose_object",
    "master_skill_menu",
    "master_skill",
    "change",
    "card",
    "noble_card",
    "blank",
];
const REQUIRED_TRACKS: &[&str] = &[TRACK_QUEST, TRACK_FRIEND];

/// Per-run session counters. Reset at the start of each battle, never
/// persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    /// Battles fully completed in the current run.
    pub loops_completed: u32,
    /// Stage the bot last detected, if any.
    pub current_stage: Option<u8>,
    /// Rounds played in the current battle.
    pub rounds: u32,
}

/// The battle orchestration controller.
///
/// Owns the device, the matcher, and all mutable session state; nothing is
/// global, so independent instances can run side by side in tests.
pub struct BattleBot<D: Device, M: Matcher> {
    device: D,
    matcher: M,
    layout: ButtonLayout,
    config: BotConfig,
    friend_count: usize,
    humanizer: Humanizer,
    session: Session,
    wait_fn: Box<dyn FnMut(Duration)>,
}

impl<D: Device, M: Matcher> BattleBot<D, M> {
    /// Create a controller. The configuration and layout are validated
    /// here, before any device I/O.
    pub fn new(
        device: D,
        matcher: M,
        layout: ButtonLayout,
        config: BotConfig,
    ) -> Result<Self, BotError> {
        config.validate()?;
        for name in REQUIRED_BUTTONS.iter().copied() {
            layout.button(name)?;
        }
        for name in REQUIRED_TRACKS.iter().copied() {
            layout.track(name)?;
        }
        let friend_count = config.friends.len();
        log::info!(
            "bot initialized: {} stage(s), {} acceptable friend(s), ap policy {:?}",
            config.stage_count,
            friend_count,
            config.ap_items
        );
        Ok(Self {
            device,
            matcher,
            layout,
            config,
            friend_count,
            humanizer: Humanizer::new(),
            session: Session::default(),
            wait_fn: Box::new(std::thread::sleep),
        })
    }

    /// Replace the wait function. Tests inject a no-op so polling loops
    /// run without real delay.
    pub fn with_wait_fn(mut self, wait_fn: impl FnMut(Duration) + 'static) -> Self {
        self.wait_fn = Box::new(wait_fn);
        self
    }

    /// Current session counters.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Run up to `max_loops` battles sequentially and return how many
    /// completed. Returns early with `Ok` when AP runs out and no policy
    /// item works; only configuration errors and non-precondition script
    /// errors propagate.
    pub fn run(&mut self, scripts: &StageScripts<D, M>, max_loops: u32) -> Result<u32, BotError> {
        self.session = Session::default();
        for _ in 0..max_loops {
            log::info!("entering battle...");
            if !self.enter_battle() {
                log::info!(
                    "AP exhausted; stopping after {} loop(s)",
                    self.session.loops_completed
                );
                break;
            }
            let rounds = self.play_battle(scripts)?;
            self.end_battle();
            self.session.loops_completed += 1;
            log::info!(
                "battle {} complete, {} round(s) played",
                self.session.loops_completed,
                rounds
            );
        }
        log::info!("{} battle(s) played in total", self.session.loops_completed);
        Ok(self.session.loops_completed)
    }

    // ---- state machine phases ----

    /// Enter a battle from the main menu. Returns `false` only on AP
    /// exhaustion with no usable recovery item.
    fn enter_battle(&mut self) -> bool {
        self.session.current_stage = None;
        self.session.rounds = 0;

        self.wait_until(markers::MENU);

        // The quest list is scrollable and its length unknown, so the
        // search is uncapped; the operator bounds it by killing the run.
        while !self.find_and_tap(markers::QUEST, self.config.quest_threshold) {
            self.swipe_track(TRACK_QUEST);
            self.wait(self.config.timings.short);
        }
        self.wait(self.config.timings.mid);

        if self.exists(markers::AP_REGEN) && !self.recover_ap() {
            return false;
        }

        // Support selection. An acceptable friend may simply not be
        // online yet, so refresh-and-rescan repeats until one shows up.
        let friend = loop {
            if let Some(friend) = self.find_friend() {
                break friend;
            }
            self.find_and_tap(markers::REFRESH_FRIENDS, self.config.match_threshold);
            self.wait(self.config.timings.short);
            self.find_and_tap(markers::YES, self.config.match_threshold);
            self.wait(self.config.timings.long);
        };
        self.find_and_tap(&friend, self.config.friend_threshold);
        self.wait(self.config.timings.short);

        self.wait_until(markers::START_QUEST);
        self.find_and_tap(markers::START_QUEST, self.config.match_threshold);
        self.wait(self.config.timings.short);
        self.wait_until(markers::ATTACK);
        true
    }

    /// Try the configured AP items in order. Returns whether one worked.
    fn recover_ap(&mut self) -> bool {
        if self.config.ap_items.is_empty() {
            log::info!("AP exhausted and no recovery items configured");
            return false;
        }
        let items = self.config.ap_items.clone();
        for item in &items {
            if self.find_and_tap(item, self.config.match_threshold) {
                self.wait(self.config.timings.short);
                if self.find_and_tap(markers::DECIDE, self.config.match_threshold) {
                    self.wait_until(markers::REFRESH_FRIENDS);
                    log::info!("recovered AP with '{item}'");
                    return true;
                }
            }
        }
        log::info!("no configured AP item was usable");
        false
    }

    /// Scan the support list for an acceptable friend. Each cycle checks
    /// every acceptable image before swiping onward; the first hit wins.
    /// Returns `None` once the cycle budget is spent.
    fn find_friend(&mut self) -> Option<String> {
        self.wait_until(markers::REFRESH_FRIENDS);
        for _ in 0..self.config.friend_scan_cycles {
            for index in 0..self.friend_count {
                let name = markers::friend_slot(index);
                if self.exists_at(&name, self.config.friend_threshold) {
                    log::debug!("found support '{name}'");
                    return Some(name);
                }
            }
            self.swipe_track(TRACK_FRIEND);
            self.wait(self.config.timings.short);
        }
        None
    }

    /// Play rounds until the battle ends. Returns the round count.
    fn play_battle(&mut self, scripts: &StageScripts<D, M>) -> Result<u32, BotError> {
        loop {
            let Some(stage) = self.current_stage() else {
                // Either the battle ended between polls or the UI is in a
                // state the indicators don't cover. Not fatal; hand the
                // rounds played back to the loop.
                log::warn!("could not determine current stage; leaving battle");
                return Ok(self.session.rounds);
            };
            self.session.current_stage = Some(stage);
            self.session.rounds += 1;
            log::info!(
                "stage {stage}/{}, round {}, running stage script",
                self.config.stage_count,
                self.session.rounds
            );

            let script = scripts.get(stage)?;
            if let Err(e) = script(self) {
                if e.is_precondition() {
                    // The offending tap was already skipped; the battle
                    // is still in a sane state.
                    log::error!("stage {stage} script reported: {e}");
                } else {
                    return Err(e);
                }
            }

            // The script's actions resolve client-side into either the
            // next round's attack button or the bond screen. Both are
            // guaranteed to eventually appear, so no timeout here.
            loop {
                self.wait(self.config.timings.mid);
                if self.exists(markers::BOND) || self.exists(markers::BOND_UP) {
                    log::info!("bond screen detected, battle over");
                    return Ok(self.session.rounds);
                }
                if self.exists(markers::ATTACK) {
                    log::debug!("attack button detected, next round");
                    break;
                }
            }
        }
    }

    /// Close out the reward screens back to the main menu.
    fn end_battle(&mut self) {
        self.wait(self.config.timings.mid);

        // Reward and level-up overlays don't all carry markers; tap a
        // blank spot until the proceed button shows up.
        while !self.exists(markers::NEXT_STEP) {
            if let Ok(button) = self.layout.button("blank") {
                self.tap_button(button);
            }
            self.wait(self.config.timings.mid);
        }
        self.find_and_tap(markers::NEXT_STEP, self.config.match_threshold);
        self.wait(self.config.timings.mid);

        // First-clear bonus, only present once per quest.
        if self.exists(markers::PLEASE_TAP) {
            self.find_and_tap(markers::PLEASE_TAP, self.config.match_threshold);
            self.wait(self.config.timings.short);
        }

        // Decline the friend request if the dialog came up.
        if self.exists(markers::NOT_APPLY) {
            self.find_and_tap(markers::NOT_APPLY, self.config.match_threshold);
        }

        self.wait_until(markers::MENU);
    }

    /// Wait for battle quiescence, then read the stage indicators.
    fn current_stage(&mut self) -> Option<u8> {
        self.wait_until(markers::ATTACK);
        detect_stage(&self.matcher, self.config.stage_count, self.config.stage_floor)
    }

    // ---- action primitives (called from stage scripts) ----

    /// Use a servant skill. `servant` and `skill` are 1-based; `target`
    /// is required if the skill turns out to need one.
    pub fn use_skill(&mut self, servant: u8, skill: u8, target: Option<u8>) -> Result<(), BotError> {
        check_range("servant", servant, 1, 3)?;
        check_range("skill", skill, 1, 3)?;
        if let Some(target) = target {
            check_range("skill target", target, 1, 3)?;
        }

        self.wait_until(markers::ATTACK);
        let mut button = self.layout.slot("skill", self.layout.strides.skill, skill)?;
        button.x += self.layout.strides.servant * (i32::from(servant) - 1);
        self.tap_button(button);
        log::debug!("used skill ({servant}, {skill})");
        self.wait(self.config.timings.short);

        let result = if self.exists(markers::CHOOSE_OBJECT) {
            match target {
                Some(target) => {
                    let button = self.layout.slot(
                        "choose_object",
                        self.layout.strides.choose_object,
                        target,
                    )?;
                    self.tap_button(button);
                    log::debug!("chose skill target {target}");
                    Ok(())
                }
                None => Err(BotError::Precondition(
                    "skill requires a target and none was given".into(),
                )),
            }
        } else {
            Ok(())
        };
        // Settle even when the chooser was left unanswered.
        self.wait(self.config.timings.short * 2);
        result
    }

    /// Use a master skill. A plain targeted skill needs `target` in
    /// 1..=3; Order Change additionally needs `target2` in 4..=6 for the
    /// benched servant to swap in.
    pub fn use_master_skill(
        &mut self,
        skill: u8,
        target: Option<u8>,
        target2: Option<u8>,
    ) -> Result<(), BotError> {
        check_range("master skill", skill, 1, 3)?;

        self.wait_until(markers::ATTACK);
        let menu = self.layout.button("master_skill_menu")?;
        self.tap_button(menu);
        self.wait(self.config.timings.short);

        let button = self
            .layout
            .slot("master_skill", self.layout.strides.master_skill, skill)?;
        self.tap_button(button);
        log::debug!("used master skill {skill}");
        self.wait(self.config.timings.short);

        if self.exists(markers::CHOOSE_OBJECT) {
            let Some(target) = target else {
                return Err(BotError::Precondition(
                    "master skill requires a target and none was given".into(),
                ));
            };
            check_range("master skill target", target, 1, 3)?;
            let button =
                self.layout
                    .slot("choose_object", self.layout.strides.choose_object, target)?;
            self.tap_button(button);
            log::debug!("chose master skill target {target}");
        } else if self.exists(markers::CHANGE_DISABLED) {
            let (Some(active), Some(bench)) = (target, target2) else {
                return Err(BotError::Precondition(
                    "order change requires two targets".into(),
                ));
            };
            check_range("order change active slot", active, 1, 3)?;
            check_range("order change bench slot", bench, 4, 6)?;

            let first = self.layout.slot("change", self.layout.strides.change, active)?;
            self.tap_button(first);
            let second = self.layout.slot("change", self.layout.strides.change, bench)?;
            self.tap_button(second);
            log::debug!("order change ({active}, {bench})");

            self.wait(self.config.timings.short);
            self.find_and_tap(markers::CHANGE, self.config.match_threshold);
        }
        self.wait(self.config.timings.short);
        Ok(())
    }

    /// Tap the attack button and pick exactly three distinct cards.
    ///
    /// Ids 1..=5 are the normal card row, 6..=8 the noble phantasm row.
    /// Tap order is preserved exactly as supplied since it decides the
    /// combo sequencing. All checks happen before the first tap.
    pub fn attack(&mut self, cards: &[u8]) -> Result<(), BotError> {
        if cards.len() != 3 {
            return Err(BotError::Precondition(format!(
                "exactly 3 cards required, got {}",
                cards.len()
            )));
        }
        let mut seen = [false; 9];
        for &card in cards {
            if !(1..=8).contains(&card) {
                return Err(BotError::Precondition(format!(
                    "card id {card} outside 1..=8"
                )));
            }
            if seen[card as usize] {
                return Err(BotError::Precondition(format!("card id {card} given twice")));
            }
            seen[card as usize] = true;
        }

        self.wait_until(markers::ATTACK);
        self.find_and_tap(markers::ATTACK, self.config.match_threshold);
        self.wait(self.config.timings.short * 2);

        for &card in cards {
            let button = if card <= 5 {
                self.layout.slot("card", self.layout.strides.card, card)?
            } else {
                self.layout
                    .slot("noble_card", self.layout.strides.card, card - 5)?
            };
            self.tap_button(button);
        }
        log::debug!("attacked with cards {cards:?}");
        Ok(())
    }

    // ---- waiting and tapping plumbing ----

    /// Sleep, then re-capture the frame. The screen may have changed in
    /// any way across this call.
    fn wait(&mut self, duration: Duration) {
        log::debug!("waiting {duration:?}");
        (self.wait_fn)(duration);
        self.refresh();
    }

    /// Re-capture the frame. A failed capture keeps the previous frame
    /// and is left to the surrounding retry loop.
    fn refresh(&mut self) {
        match self.device.capture() {
            Some(frame) => self.matcher.refresh(frame),
            None => log::warn!("screen capture failed, keeping previous frame"),
        }
    }

    /// Block until a marker appears, polling at the mid interval.
    fn wait_until(&mut self, name: &str) {
        log::debug!("waiting until '{name}' appears");
        self.refresh();
        while !self.exists(name) {
            self.wait(self.config.timings.mid);
        }
    }

    fn exists(&self, name: &str) -> bool {
        self.exists_at(name, self.config.match_threshold)
    }

    fn exists_at(&self, name: &str, threshold: f32) -> bool {
        self.matcher.probability(name) >= threshold
    }

    /// Locate a marker and tap a random point inside it. A miss or a
    /// failed tap is reported as `false` for the caller's retry loop.
    fn find_and_tap(&mut self, name: &str, threshold: f32) -> bool {
        let Some((x, y)) = self.matcher.find(name, threshold) else {
            log::warn!("'{name}' not found on screen");
            return false;
        };
        let Some((w, h)) = self.matcher.size(name) else {
            return false;
        };
        self.tap_button(Button {
            x: x as i32,
            y: y as i32,
            w,
            h,
        })
    }

    fn tap_button(&mut self, button: Button) -> bool {
        let (x, y) = self.humanizer.point_in(&button);
        self.device.tap(x, y)
    }

    /// Swipe along a named track with endpoint jitter. Layout tracks are
    /// validated at construction, so a lookup miss here only logs.
    fn swipe_track(&mut self, name: &str) -> bool {
        let track = match self.layout.track(name) {
            Ok(track) => track,
            Err(e) => {
                log::error!("{e}");
                return false;
            }
        };
        let [x1, y1, x2, y2] = self.humanizer.jitter(track);
        self.device.swipe((x1, y1), (x2, y2), SWIPE_DURATION_MS)
    }
}

/// Pick the stage whose indicator image scores highest, provided it
/// clears the confidence floor. Below-floor readings are undetermined.
pub fn detect_stage(matcher: &impl Matcher, stage_count: u8, floor: f32) -> Option<u8> {
    let mut best: Option<(u8, f32)> = None;
    for stage in 1..=stage_count {
        let name = markers::stage_indicator(stage, stage_count);
        let confidence = matcher.probability(&name);
        if confidence > floor && best.is_none_or(|(_, b)| confidence > b) {
            best = Some((stage, confidence));
        }
    }
    match best {
        Some((stage, confidence)) => {
            log::debug!("detected stage {stage} at confidence {confidence:.3}");
            Some(stage)
        }
        None => {
            log::warn!("no stage indicator cleared the confidence floor");
            None
        }
    }
}

/// Load the operator's quest and friend screenshots into a matcher under
/// the names the controller looks them up by.
pub fn load_references(matcher: &mut TemplateMatcher, config: &BotConfig) -> Result<(), BotError> {
    matcher.load_file(markers::QUEST, &config.quest)?;
    for (index, path) in config.friends.iter().enumerate() {
        matcher.load_file(markers::friend_slot(index), path)?;
    }
    Ok(())
}

fn check_range(what: &str, value: u8, min: u8, max: u8) -> Result<(), BotError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(BotError::Precondition(format!(
            "{what} must be in {min}..={max}, got {value}"
        )))
    }
}
