//! Access gate
//!
//! Hides the console behind a passkey prompt that is itself hidden until the
//! operator performs a trigger gesture. A UI nicety, not a security boundary:
//! no lockout, no rate limit, nothing persisted.

use tracing::debug;

pub const DEFAULT_PASSKEY: &str = "Exviun";

/// Number of trigger gestures that reveal the prompt
pub const REVEAL_THRESHOLD: u32 = 4;

/// Minimum right-to-left travel for a swipe to count
pub const SWIPE_MIN_DISTANCE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Gate {
    passkey: String,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(DEFAULT_PASSKEY)
    }
}

impl Gate {
    pub fn new(passkey: impl Into<String>) -> Self {
        Self {
            passkey: passkey.into(),
        }
    }

    /// Exact, case-sensitive comparison
    pub fn check_passkey(&self, input: &str) -> bool {
        let ok = input == self.passkey;
        debug!(ok, "Passkey checked");
        ok
    }
}

/// Counts trigger gestures; the fourth one reveals the passkey prompt
#[derive(Debug, Default)]
pub struct RevealTrigger {
    key_presses: u32,
    swipes: u32,
}

impl RevealTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key press. Only `r`/`R` counts; other keys leave the count alone.
    pub fn press(&mut self, key: char) -> bool {
        if !key.eq_ignore_ascii_case(&'r') {
            return false;
        }

        self.key_presses += 1;
        if self.key_presses >= REVEAL_THRESHOLD {
            self.key_presses = 0;
            return true;
        }
        false
    }

    /// Register every character of a typed line, true if any press revealed the prompt
    pub fn press_all(&mut self, input: &str) -> bool {
        input.chars().fold(false, |revealed, c| self.press(c) || revealed)
    }

    /// Register a horizontal swipe from `start_x` to `end_x`
    pub fn swipe(&mut self, start_x: f64, end_x: f64) -> bool {
        if start_x - end_x <= SWIPE_MIN_DISTANCE {
            return false;
        }

        self.swipes += 1;
        if self.swipes >= REVEAL_THRESHOLD {
            self.swipes = 0;
            return true;
        }
        false
    }
}
