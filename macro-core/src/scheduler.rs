//! Tick scheduler: walks the active script, one press frame and one
//! neutral spacer frame per code.
//!
//! ```text
//! Press(0) -> Spacer(1) -> Press(1) -> Spacer(2) -> ... -> Press(len) = done
//! ```
//!
//! A merged press consumes two codes and goes straight to `Spacer(i + 2)`.

use crate::command::Script;
use crate::translate::translate;
use crate::types::{Hat, SwitchReport};

/// Where the cursor is within the active script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Next tick presses the code at this index.
    Press(usize),
    /// Next tick is a neutral release frame; the press after it uses this index.
    Spacer(usize),
}

impl Phase {
    /// Index of the next code to be pressed.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Phase::Press(i) | Phase::Spacer(i) => i,
        }
    }
}

/// What produced a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// No script is playing.
    Idle,
    /// The code at `index` was pressed, together with the next one if `merged`.
    Press { index: usize, merged: bool },
    /// Release frame between two presses.
    Spacer,
    /// The Down latch is set.
    Hold,
    /// The script just ran out.
    Complete,
    /// Repeat of the previous fresh frame.
    Replay,
}

/// A freshly computed frame, before the echo stage sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub report: SwitchReport,
    pub kind: FrameKind,
    /// The frame asks for the extra hold delay.
    pub extended: bool,
}

impl Step {
    const fn neutral(kind: FrameKind) -> Self {
        Self {
            report: SwitchReport::neutral(),
            kind,
            extended: false,
        }
    }
}

/// Cursor over the active script.
#[derive(Debug, Clone)]
pub struct Scheduler {
    script: Script,
    phase: Phase,
    active: bool,
    hold_down: bool,
    ticks: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            script: Script::empty(),
            phase: Phase::Press(0),
            active: false,
            hold_down: false,
            ticks: 0,
        }
    }

    /// Replace the active script and rewind.
    ///
    /// With `release` set the script starts with a spacer, so the host
    /// sees everything released before the first press.
    pub fn load(&mut self, script: Script, release: bool) {
        self.script = script;
        self.phase = if release {
            Phase::Spacer(0)
        } else {
            Phase::Press(0)
        };
        self.active = true;
        self.hold_down = false;
        self.ticks = 0;
    }

    /// Advance by one tick.
    pub fn tick(&mut self, optimize: bool) -> Step {
        if !self.active {
            return Step::neutral(FrameKind::Idle);
        }

        if self.hold_down {
            let mut step = Step::neutral(FrameKind::Hold);
            step.report.hat = Hat::Down;
            return step;
        }

        self.ticks += 1;
        match self.phase {
            Phase::Spacer(next) => {
                self.phase = Phase::Press(next);
                Step::neutral(FrameKind::Spacer)
            }
            Phase::Press(index) if index >= self.script.len() => {
                self.active = false;
                Step::neutral(FrameKind::Complete)
            }
            Phase::Press(index) => {
                let mut report = SwitchReport::neutral();
                let t = translate(&self.script, index, optimize, &mut report);
                if t.hold_down {
                    self.hold_down = true;
                }
                self.phase = Phase::Spacer(index + t.consumed);
                Step {
                    report,
                    kind: FrameKind::Press {
                        index,
                        merged: t.merged(),
                    },
                    extended: t.extended,
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    #[must_use]
    pub fn is_holding_down(&self) -> bool {
        self.hold_down
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Script ticks taken since the last load, not counting hold ticks.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    #[inline]
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }
}
