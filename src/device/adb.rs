//! ADB device driver
//!
//! Drives an Android device (or emulator) through the `adb` executable:
//! `input tap` / `input swipe` for touch events and `screencap -p` for
//! screen capture. `adb shell screencap` mangles PNG output by rewriting
//! `\n` as `\r\n` (or `\r\r\n` on some builds), so captures go through a
//! sanitising pass before decoding.

use std::process::Command;

use image::DynamicImage;

use super::Device;

/// Device controller backed by an adb subprocess.
pub struct AdbDevice {
    adb_path: String,
}

impl Default for AdbDevice {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbDevice {
    /// Create a controller using the given adb executable.
    pub fn new(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    /// Run an adb command and return its raw stdout, or `None` if the
    /// process could not be spawned or exited nonzero.
    fn run(&self, args: &[&str]) -> Option<Vec<u8>> {
        log::debug!("adb {}", args.join(" "));
        let output = match Command::new(&self.adb_path).args(args).output() {
            Ok(output) => output,
            Err(e) => {
                log::error!("failed to run adb: {e}");
                return None;
            }
        };
        if !output.status.success() {
            log::error!(
                "adb {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        Some(output.stdout)
    }

    /// Run an adb command and return stdout split into lines.
    fn run_lines(&self, args: &[&str]) -> Option<Vec<String>> {
        let stdout = self.run(args)?;
        Some(
            String::from_utf8_lossy(&stdout)
                .lines()
                .map(str::to_string)
                .collect(),
        )
    }

    /// Connect to a device over tcp/ip. Only needed for network targets;
    /// USB and emulator-bundled adb builds attach automatically.
    pub fn connect(&mut self, addr: &str, restart: bool) -> bool {
        if restart {
            self.run_lines(&["kill-server"]);
        }
        let Some(output) = self.run_lines(&["connect", addr]) else {
            return false;
        };
        if output.iter().any(|line| line.starts_with("connected")) {
            log::info!("connected to device at {addr}");
            true
        } else {
            log::error!("failed to connect to device at {addr}: {}", output.join("\n"));
            false
        }
    }

    /// Query the device resolution via `wm size`.
    pub fn screen_size(&mut self) -> Option<(u32, u32)> {
        let output = self.run_lines(&["shell", "wm", "size"])?;
        for line in &output {
            if line.starts_with("Physical size") {
                if let Some(size) = parse_size_line(line) {
                    log::info!("got screen size {} x {}", size.0, size.1);
                    return Some(size);
                }
            }
        }
        log::error!("failed to get screen size: {}", output.join("\n"));
        None
    }
}

impl Device for AdbDevice {
    fn connected(&mut self) -> bool {
        let Some(output) = self.run_lines(&["devices"]) else {
            return false;
        };
        let devices = output
            .iter()
            .filter(|line| line.ends_with("device"))
            .count();
        match devices {
            0 => {
                log::error!("no device connected");
                false
            }
            1 => true,
            _ => {
                log::error!("more than one device connected");
                false
            }
        }
    }

    fn tap(&mut self, x: i32, y: i32) -> bool {
        let ok = self
            .run(&["shell", &format!("input tap {x} {y}")])
            .is_some();
        if ok {
            log::debug!("tapped at ({x}, {y})");
        } else {
            log::warn!("failed to tap at ({x}, {y})");
        }
        ok
    }

    fn swipe(&mut self, from: (i32, i32), to: (i32, i32), duration_ms: u32) -> bool {
        let cmd = format!(
            "input swipe {} {} {} {} {duration_ms}",
            from.0, from.1, to.0, to.1
        );
        let ok = self.run(&["shell", &cmd]).is_some();
        if ok {
            log::debug!("swiped from {from:?} to {to:?} in {duration_ms}ms");
        } else {
            log::warn!("failed to swipe from {from:?} to {to:?}");
        }
        ok
    }

    fn capture(&mut self) -> Option<DynamicImage> {
        let raw = self.run(&["shell", "screencap -p"])?;
        let png = png_sanitize(&raw);
        match image::load_from_memory(&png) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::warn!("failed to decode screen capture: {e}");
                None
            }
        }
    }
}

/// Undo adb's line-ending rewrite on binary PNG output.
///
/// The bytes between the PNG signature's `\x1a` and the next `\n` reveal
/// what `\n` was rewritten to; every occurrence of that pattern is folded
/// back to a plain `\n`.
fn png_sanitize(data: &[u8]) -> Vec<u8> {
    let Some(pos) = data.iter().position(|&b| b == 0x1a) else {
        return data.to_vec();
    };
    let Some(rel) = data[pos..].iter().position(|&b| b == b'\n') else {
        return data.to_vec();
    };
    let pattern = &data[pos + 1..=pos + rel];
    if pattern == b"\n" {
        return data.to_vec();
    }

    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i..].starts_with(pattern) {
            out.push(b'\n');
            i += pattern.len();
        } else {
            out.push(data[i]);
            i += 1;
        }
    }
    out
}

/// Pull `WxH` out of a `wm size` output line.
fn parse_size_line(line: &str) -> Option<(u32, u32)> {
    let dims = line.rsplit(' ').next()?;
    let (w, h) = dims.trim().split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}
