//! Tap and swipe randomization
//!
//! Repeated pixel-identical taps are an easy automation tell, so every tap
//! lands on a uniformly random point inside the target rectangle and every
//! swipe gets a few pixels of endpoint jitter.

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::buttons::{Button, Track};

/// Maximum swipe endpoint jitter in pixels, each direction.
const SWIPE_JITTER: i32 = 5;

/// Randomizer for tap points and swipe tracks.
pub struct Humanizer {
    rng: ThreadRng,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer {
    /// Create a new humanizer.
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Pick a random point inside a button rectangle.
    pub fn point_in(&mut self, button: &Button) -> (i32, i32) {
        let x = self.rng.gen_range(button.x..button.x + button.w.max(1) as i32);
        let y = self.rng.gen_range(button.y..button.y + button.h.max(1) as i32);
        (x, y)
    }

    /// Jitter all four endpoints of a swipe track by a few pixels.
    pub fn jitter(&mut self, track: Track) -> Track {
        track.map(|v| v + self.rng.gen_range(-SWIPE_JITTER..=SWIPE_JITTER))
    }
}
