//! Move code to report translation.
//!
//! | code | effect |
//! |------|--------|
//! | `H` | R, plus an extra hold delay |
//! | `<` `>` | pad Left / Right; merges a following `A` or `B` |
//! | `D` `d` | pad Up / Down |
//! | `S` | pad Down and latch it until the script is replaced |
//! | `A` `B` | press A / B; merges a following `D` |
//! | `R` `L` `r` `l` | R, L, ZR, ZL |
//! | `Y` `X` `+` `-` `c` `h` | Y, X, Plus, Minus, Capture, Home |
//!
//! Anything else leaves the report neutral.

use crate::command::Script;
use crate::types::{Buttons, Hat, SwitchReport};

/// Side effects of translating one code, beyond the report itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Translation {
    /// Script codes consumed by this frame: 1, or 2 after a merge.
    pub consumed: usize,
    /// The code latches the pad to Down.
    pub hold_down: bool,
    /// The code asks for the extra hold delay.
    pub extended: bool,
}

impl Translation {
    const SINGLE: Self = Self {
        consumed: 1,
        hold_down: false,
        extended: false,
    };

    #[inline]
    #[must_use]
    pub const fn merged(self) -> bool {
        self.consumed > 1
    }
}

/// Buttons pressed by codes that never merge.
const fn plain_button(code: u8) -> Option<Buttons> {
    Some(match code {
        b'R' => Buttons::R,
        b'L' => Buttons::L,
        b'r' => Buttons::ZR,
        b'l' => Buttons::ZL,
        b'Y' => Buttons::Y,
        b'X' => Buttons::X,
        b'+' => Buttons::PLUS,
        b'-' => Buttons::MINUS,
        b'c' => Buttons::CAPTURE,
        b'h' => Buttons::HOME,
        _ => return None,
    })
}

/// Translate the code at `index` into `report`.
///
/// With `optimize` set and a code after `index`, a direction followed by
/// `A`/`B`, or `A`/`B` followed by `D`, collapse into one frame. An index
/// past the end of the script leaves the report untouched.
pub fn translate(
    script: &Script,
    index: usize,
    optimize: bool,
    report: &mut SwitchReport,
) -> Translation {
    let mut out = Translation::SINGLE;
    let Some(code) = script.get(index) else {
        return out;
    };
    let lookahead = if optimize { script.get(index + 1) } else { None };

    match code {
        b'H' => {
            report.buttons |= Buttons::R;
            out.extended = true;
        }
        b'<' | b'>' => {
            report.hat = if code == b'<' { Hat::Left } else { Hat::Right };
            let action = match lookahead {
                Some(b'A') => Some(Buttons::A),
                Some(b'B') => Some(Buttons::B),
                _ => None,
            };
            if let Some(action) = action {
                report.buttons |= action;
                out.consumed = 2;
            }
        }
        b'D' => report.hat = Hat::Up,
        b'd' => report.hat = Hat::Down,
        b'S' => {
            report.hat = Hat::Down;
            out.hold_down = true;
        }
        b'A' | b'B' => {
            report.buttons |= if code == b'A' { Buttons::A } else { Buttons::B };
            if lookahead == Some(b'D') {
                report.hat = Hat::Up;
                out.consumed = 2;
            }
        }
        other => {
            if let Some(button) = plain_button(other) {
                report.buttons |= button;
            }
        }
    }

    out
}
