//! FGO Farmer CLI
//!
//! Wires the battle controller to a real adb device: loads the marker
//! images and the operator's quest/friend screenshots, registers a simple
//! card script per stage, and farms.
//!
//! Usage: `farmer [images_dir] [max_loops] [adb_addr]`

use std::env;
use std::process::ExitCode;

use fgo_farmer::battle::{load_references, BattleBot, StageScripts};
use fgo_farmer::config::{BotConfig, ButtonLayout};
use fgo_farmer::device::{AdbDevice, Device};
use fgo_farmer::vision::TemplateMatcher;
use fgo_farmer::BotError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("FGO Farmer - ADB battle automation");
    println!("==================================");
    println!();

    match run() {
        Ok(count) => {
            println!("{count} battle(s) completed. Good bye!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<u32, BotError> {
    let mut args = env::args().skip(1);
    let images_dir = args.next().unwrap_or_else(|| "images".to_string());
    let max_loops: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(10);
    let addr = args.next();

    let config = BotConfig::default();
    let stage_count = config.stage_count;

    let mut matcher = TemplateMatcher::new();
    matcher.load_dir(&images_dir)?;
    load_references(&mut matcher, &config)?;

    let mut device = AdbDevice::default();
    if let Some(addr) = &addr {
        if !device.connect(addr, false) {
            return Err(BotError::Config(format!(
                "could not connect to adb device at {addr}"
            )));
        }
    }
    if !device.connected() {
        return Err(BotError::Config("no usable adb device attached".into()));
    }
    match device.screen_size() {
        Some((1280, 720)) => {}
        Some((w, h)) => log::warn!(
            "screen is {w}x{h}; the default button layout is calibrated for 1280x720"
        ),
        None => log::warn!("could not query the screen size"),
    }

    // Default farming script: lead with the noble phantasm, fill the
    // chain with the first two normal cards. Replace per quest as needed.
    let mut scripts = StageScripts::new();
    for stage in 1..=stage_count {
        scripts.at_stage(stage, |bot| bot.attack(&[6, 1, 2]))?;
    }

    let mut bot = BattleBot::new(device, matcher, ButtonLayout::default(), config)?;
    bot.run(&scripts, max_loops)
}
