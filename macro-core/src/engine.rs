//! The playback engine: ingestion, scheduling and echo in one context.

use crate::command::{Command, CommandBuffer, Script};
use crate::config::EngineConfig;
use crate::echo::Echo;
use crate::scheduler::{FrameKind, Phase, Scheduler};
use crate::types::{OutputReport, SwitchReport};

/// One poll's worth of output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub report: SwitchReport,
    pub kind: FrameKind,
    /// Wait this long before handing the report to the host.
    pub delay_ms: u32,
}

/// Scripted input playback engine.
///
/// Bytes go in through [`on_byte`](Self::on_byte); the host poller pulls
/// reports out through [`next_frame`](Self::next_frame). Nothing here
/// fails: overflow, unknown codes and a finished script all degrade to
/// neutral reports.
///
/// # Example
///
/// ```
/// use macro_core::{Buttons, Engine, EngineConfig};
///
/// let mut engine = Engine::new(EngineConfig::DEFAULT);
/// for &b in b"A\r" {
///     engine.on_byte(b);
/// }
///
/// let pressed = engine.next_frame().report;
/// assert_eq!(pressed.buttons, Buttons::A);
/// // Held for two more polls
/// assert_eq!(engine.next_frame().report, pressed);
/// assert_eq!(engine.next_frame().report, pressed);
/// // Then released
/// assert!(engine.next_frame().report.is_neutral());
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    buffer: CommandBuffer,
    optimize: bool,
    scheduler: Scheduler,
    echo: Echo,
    dropped_bytes: u32,
    host_reports: u32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::DEFAULT)
    }
}

impl Engine {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            buffer: CommandBuffer::new(),
            optimize: config.optimize,
            scheduler: Scheduler::new(),
            echo: Echo::new(config.echoes),
            dropped_bytes: 0,
            host_reports: 0,
        }
    }

    /// Feed one byte from the serial link.
    pub fn on_byte(&mut self, byte: u8) -> Command {
        let command = self.buffer.push(byte);
        match &command {
            Command::Publish(script) => self.publish(script.clone()),
            Command::Optimize(enabled) => {
                debug!("optimize: {}", enabled);
                self.optimize = *enabled;
            }
            Command::Dropped => {
                self.dropped_bytes = self.dropped_bytes.saturating_add(1);
            }
            Command::Staged | Command::Ignored => {}
        }
        command
    }

    /// Make `script` the active script, discarding whatever was playing.
    pub fn publish(&mut self, script: Script) {
        let release = self.config.release_on_supersede && self.scheduler.is_active();
        if release {
            // The new script's leading spacer is the release frame.
            self.echo.cancel();
        }
        debug!("publish {} codes (release: {})", script.len(), release);
        self.scheduler.load(script, release);
    }

    /// Produce the report for the next polling interval.
    pub fn next_frame(&mut self) -> Frame {
        if let Some(report) = self.echo.replay() {
            return Frame {
                report,
                kind: FrameKind::Replay,
                delay_ms: 0,
            };
        }

        let step = self.scheduler.tick(self.optimize);
        self.echo.store(step.report);
        if step.kind == FrameKind::Complete {
            debug!("script complete");
        }

        Frame {
            report: step.report,
            kind: step.kind,
            delay_ms: if step.extended {
                self.config.hold_delay_ms
            } else {
                0
            },
        }
    }

    /// Shorthand for `next_frame().report`.
    pub fn next_report(&mut self) -> SwitchReport {
        self.next_frame().report
    }

    /// Take a host-to-device report. It is decoded, counted and dropped.
    pub fn accept_output_report(&mut self, data: &[u8]) {
        match OutputReport::from_bytes(data) {
            Ok(report) => {
                trace!("host report: {:?}", report);
                self.host_reports = self.host_reports.saturating_add(1);
            }
            Err(e) => warn!("host report of {} bytes: {:?}", data.len(), e),
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn optimize(&self) -> bool {
        self.optimize
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    #[inline]
    #[must_use]
    pub fn is_holding_down(&self) -> bool {
        self.scheduler.is_holding_down()
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    #[inline]
    #[must_use]
    pub fn script(&self) -> &Script {
        self.scheduler.script()
    }

    /// Bytes currently waiting for a terminator.
    #[inline]
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    #[must_use]
    pub fn echo_credit(&self) -> u8 {
        self.echo.credit()
    }

    /// Bytes dropped because the staging buffer was full.
    #[inline]
    #[must_use]
    pub fn dropped_bytes(&self) -> u32 {
        self.dropped_bytes
    }

    /// Well-formed host-to-device reports received.
    #[inline]
    #[must_use]
    pub fn host_reports(&self) -> u32 {
        self.host_reports
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::command::MAX_SCRIPT_LEN;
    use crate::types::{Buttons, Hat};
    use std::vec::Vec;

    fn send(engine: &mut Engine, bytes: &[u8]) {
        for &b in bytes {
            engine.on_byte(b);
        }
    }

    fn collect(engine: &mut Engine, polls: usize) -> Vec<Frame> {
        (0..polls).map(|_| engine.next_frame()).collect()
    }

    fn pressed(buttons: Buttons, hat: Hat) -> SwitchReport {
        SwitchReport {
            buttons,
            hat,
            ..SwitchReport::neutral()
        }
    }

    #[test]
    fn test_single_press_timeline() {
        let mut engine = Engine::default();
        send(&mut engine, b"A\r");

        let frames = collect(&mut engine, 12);
        let a = pressed(Buttons::A, Hat::Center);
        let neutral = SwitchReport::neutral();

        assert_eq!(frames[0].report, a);
        assert_eq!(
            frames[1],
            Frame {
                report: a,
                kind: FrameKind::Replay,
                delay_ms: 0,
            }
        );
        assert_eq!(frames[2].report, a);
        assert_eq!(frames[3].kind, FrameKind::Spacer);
        assert_eq!(frames[3].report, neutral);
        assert_eq!(frames[4].report, neutral);
        assert_eq!(frames[5].report, neutral);
        assert_eq!(frames[6].kind, FrameKind::Complete);
        assert!(frames[6..].iter().all(|f| f.report.is_neutral()));
        assert!(!engine.is_active());
    }

    #[test]
    fn test_merged_press_timeline() {
        let mut engine = Engine::default();
        send(&mut engine, b"!<A\r");
        assert!(engine.optimize());

        let frames = collect(&mut engine, 9);
        let merged = pressed(Buttons::A, Hat::Left);

        assert_eq!(
            frames[0].kind,
            FrameKind::Press {
                index: 0,
                merged: true
            }
        );
        assert!(frames[..3].iter().all(|f| f.report == merged));
        assert_eq!(frames[3].kind, FrameKind::Spacer);
        assert_eq!(frames[6].kind, FrameKind::Complete);
        assert!(frames[3..].iter().all(|f| f.report.is_neutral()));
    }

    #[test]
    fn test_merge_chain_skips_consumed_codes() {
        let mut engine = Engine::default();
        send(&mut engine, b"!<AD>BD\r");

        let fresh: Vec<Frame> = collect(&mut engine, 27)
            .into_iter()
            .filter(|f| f.kind != FrameKind::Replay)
            .collect();
        let kinds: Vec<FrameKind> = fresh.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [
                FrameKind::Press { index: 0, merged: true },
                FrameKind::Spacer,
                FrameKind::Press { index: 2, merged: false },
                FrameKind::Spacer,
                FrameKind::Press { index: 3, merged: true },
                FrameKind::Spacer,
                FrameKind::Press { index: 5, merged: false },
                FrameKind::Spacer,
                FrameKind::Complete,
            ]
        );
        assert_eq!(fresh[0].report, pressed(Buttons::A, Hat::Left));
        assert_eq!(fresh[2].report, pressed(Buttons::NONE, Hat::Up));
        assert_eq!(fresh[4].report, pressed(Buttons::B, Hat::Right));
        assert_eq!(fresh[6].report, pressed(Buttons::NONE, Hat::Up));
        assert!(!engine.is_active());
    }

    #[test]
    fn test_clone_carries_staged_bytes() {
        let mut engine = Engine::default();
        send(&mut engine, b"A\rXY");
        engine.next_frame();

        let mut copy = engine.clone();
        assert_eq!(copy.staged_len(), 2);
        assert_eq!(copy.echo_credit(), engine.echo_credit());

        send(&mut copy, b"\r");
        assert_eq!(copy.script().as_bytes(), b"XY");
        assert_eq!(engine.script().as_bytes(), b"A");
        assert_eq!(engine.staged_len(), 2);
    }

    #[test]
    fn test_optimize_toggle_off() {
        let mut engine = Engine::default();
        send(&mut engine, b"!?<A\r");
        assert!(!engine.optimize());
        assert_eq!(engine.next_report(), pressed(Buttons::NONE, Hat::Left));
    }

    #[test]
    fn test_replay_is_identical() {
        let mut engine = Engine::default();
        send(&mut engine, b"h\r");
        let first = engine.next_frame();
        assert_eq!(engine.echo_credit(), 2);
        while engine.echo_credit() > 0 {
            assert_eq!(engine.next_frame().report.to_bytes(), first.report.to_bytes());
        }
    }

    #[test]
    fn test_hold_down_until_next_script() {
        let mut engine = Engine::default();
        send(&mut engine, b"SAB\r");

        for frame in collect(&mut engine, 50) {
            assert_eq!(frame.report.hat, Hat::Down);
            assert!(frame.report.buttons.is_empty());
        }
        assert!(engine.is_holding_down());

        send(&mut engine, b"X\r");
        assert!(!engine.is_holding_down());
        let frames = collect(&mut engine, 6);
        assert!(frames.iter().any(|f| f.report.buttons == Buttons::X));
        assert!(frames.iter().all(|f| f.report.hat == Hat::Center));
    }

    #[test]
    fn test_supersede_inserts_release_frame() {
        let mut engine = Engine::default();
        send(&mut engine, b"AAAA\r");
        let first = engine.next_frame();
        assert_eq!(first.report.buttons, Buttons::A);

        // Replace mid-press: the pending replay is dropped and the host
        // sees one neutral frame before the new press.
        send(&mut engine, b"B\r");
        let release = engine.next_frame();
        assert_eq!(release.kind, FrameKind::Spacer);
        assert!(release.report.is_neutral());

        let frames = collect(&mut engine, 3);
        assert_eq!(frames[0].kind, FrameKind::Replay);
        assert_eq!(frames[2].report.buttons, Buttons::B);
    }

    #[test]
    fn test_supersede_without_release() {
        let mut engine = Engine::new(EngineConfig {
            release_on_supersede: false,
            ..EngineConfig::DEFAULT
        });
        send(&mut engine, b"AAAA\r");
        engine.next_frame();
        send(&mut engine, b"B\r");

        // Remaining replay credit of the old frame is served first.
        let frames = collect(&mut engine, 3);
        assert_eq!(frames[0].report.buttons, Buttons::A);
        assert_eq!(frames[1].report.buttons, Buttons::A);
        assert_eq!(frames[2].report.buttons, Buttons::B);
    }

    #[test]
    fn test_publish_on_idle_starts_with_press() {
        let mut engine = Engine::default();
        send(&mut engine, b"A\r");
        collect(&mut engine, 9);
        assert!(!engine.is_active());

        send(&mut engine, b"B\r");
        assert_eq!(engine.next_report().buttons, Buttons::B);
    }

    #[test]
    fn test_overflow_is_silent() {
        let mut engine = Engine::default();
        send(&mut engine, &[b'd'; MAX_SCRIPT_LEN + 10]);
        assert_eq!(engine.staged_len(), MAX_SCRIPT_LEN);
        assert_eq!(engine.dropped_bytes(), 10);

        send(&mut engine, b"\r");
        assert_eq!(engine.script().len(), MAX_SCRIPT_LEN);
        assert_eq!(engine.staged_len(), 0);
    }

    #[test]
    fn test_h_requests_delay() {
        let mut engine = Engine::default();
        send(&mut engine, b"H\r");
        let frame = engine.next_frame();
        assert_eq!(frame.report.buttons, Buttons::R);
        assert_eq!(frame.delay_ms, 85);
        assert_eq!(engine.next_frame().delay_ms, 0);
    }

    #[test]
    fn test_staging_does_not_disturb_playback() {
        let mut engine = Engine::default();
        send(&mut engine, b"AB\r");
        let first = engine.next_frame();
        send(&mut engine, b"XYXY");
        assert_eq!(engine.next_frame().report, first.report);
        assert_eq!(engine.script().as_bytes(), b"AB");
    }

    #[test]
    fn test_idle_engine_is_neutral() {
        let mut engine = Engine::default();
        for frame in collect(&mut engine, 5) {
            assert!(frame.report.is_neutral());
        }
    }

    #[test]
    fn test_output_reports_are_discarded() {
        let mut engine = Engine::default();
        engine.accept_output_report(&[0u8; 8]);
        engine.accept_output_report(&[0u8; 3]);
        assert_eq!(engine.host_reports(), 1);
        assert!(engine.next_report().is_neutral());
    }
}
