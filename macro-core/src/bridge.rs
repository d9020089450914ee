//! The two activities around a [`SharedEngine`]: receiving script bytes
//! and serving reports to the host.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::command::Command;
use crate::engine::Frame;
use crate::input::{ByteSource, InputError};
use crate::output::{OutputError, ReportSink};
use crate::shared::SharedEngine;

/// Forwards bytes from a [`ByteSource`] into the engine.
///
/// # Error Handling
///
/// Source errors are logged and returned; the next call simply reads on.
/// Whatever was staged before the error stays staged.
pub struct ScriptReceiver<'a, M: RawMutex, I> {
    engine: &'a SharedEngine<M>,
    input: I,
    echo: bool,
}

impl<'a, M: RawMutex, I: ByteSource> ScriptReceiver<'a, M, I> {
    /// Create a receiver that echoes every byte back to the sender.
    pub fn new(engine: &'a SharedEngine<M>, input: I) -> Self {
        Self {
            engine,
            input,
            echo: true,
        }
    }

    /// Enable or disable echoing received bytes.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Run the receiver indefinitely.
    pub async fn run(&mut self) -> ! {
        loop {
            let _ = self.receive_one().await;
        }
    }

    /// Receive a single byte and apply it to the engine.
    pub async fn receive_one(&mut self) -> Result<Command, BridgeError> {
        let byte = match self.input.receive().await {
            Ok(byte) => byte,
            Err(e) => {
                warn!("input error: {:?}", e);
                return Err(BridgeError::Input(e));
            }
        };

        if self.echo {
            self.input.echo(byte).await;
        }

        let command = self.engine.on_byte(byte);
        if command == Command::Dropped {
            trace!("staging buffer full, dropped {=u8:#x}", byte);
        }
        Ok(command)
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn into_input(self) -> I {
        self.input
    }
}

/// Pulls frames from the engine and hands them to a [`ReportSink`].
///
/// The sink paces the loop: one frame per host poll. Frames asking for an
/// extra hold are delayed with `D` before they are sent.
pub struct ReportPlayer<'a, M: RawMutex, O, D> {
    engine: &'a SharedEngine<M>,
    output: O,
    delay: D,
}

impl<'a, M: RawMutex, O: ReportSink, D: DelayNs> ReportPlayer<'a, M, O, D> {
    pub fn new(engine: &'a SharedEngine<M>, output: O, delay: D) -> Self {
        Self {
            engine,
            output,
            delay,
        }
    }

    /// Run the player indefinitely.
    pub async fn run(&mut self) -> ! {
        loop {
            let _ = self.play_one().await;
        }
    }

    /// Produce one frame and send it.
    ///
    /// A frame the sink rejects is lost; the engine has already moved on.
    pub async fn play_one(&mut self) -> Result<Frame, BridgeError> {
        let frame = self.engine.next_frame();

        if frame.delay_ms > 0 {
            self.delay.delay_ms(frame.delay_ms).await;
        }

        if let Err(e) = self.output.send(&frame.report).await {
            warn!("output error: {:?}", e);
            return Err(BridgeError::Output(e));
        }
        Ok(frame)
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the player into its sink and delay.
    pub fn into_parts(self) -> (O, D) {
        (self.output, self.delay)
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the byte source.
    Input(InputError),
    /// Error from the report sink.
    Output(OutputError),
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::EngineConfig;
    use crate::scheduler::FrameKind;
    use crate::types::{Buttons, Hat, SwitchReport};
    use core::future::Future;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::collections::VecDeque;
    use std::vec::Vec;

    struct MockInput {
        bytes: VecDeque<Result<u8, InputError>>,
        echoed: Vec<u8>,
    }

    impl MockInput {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.iter().map(|&b| Ok(b)).collect(),
                echoed: Vec::new(),
            }
        }
    }

    impl ByteSource for MockInput {
        fn receive(&mut self) -> impl Future<Output = Result<u8, InputError>> {
            core::future::ready(self.bytes.pop_front().unwrap_or(Err(InputError::Io)))
        }

        async fn echo(&mut self, byte: u8) {
            self.echoed.push(byte);
        }

        fn is_connected(&self) -> bool {
            !self.bytes.is_empty()
        }
    }

    #[derive(Default)]
    struct MockOutput {
        sent: Vec<SwitchReport>,
        fail: bool,
    }

    impl ReportSink for MockOutput {
        fn send(&mut self, report: &SwitchReport) -> impl Future<Output = Result<(), OutputError>> {
            let result = if self.fail {
                Err(OutputError::Io)
            } else {
                self.sent.push(*report);
                Ok(())
            };
            core::future::ready(result)
        }

        fn is_ready(&self) -> bool {
            !self.fail
        }
    }

    #[derive(Default)]
    struct MockDelay {
        waited_ms: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waited_ms.push(ns / 1_000_000);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.waited_ms.push(ms);
        }
    }

    fn engine() -> SharedEngine<NoopRawMutex> {
        SharedEngine::new(EngineConfig::DEFAULT)
    }

    fn receive_all<I: ByteSource>(receiver: &mut ScriptReceiver<'_, NoopRawMutex, I>, n: usize) {
        for _ in 0..n {
            block_on(receiver.receive_one()).unwrap();
        }
    }

    #[test]
    fn test_receiver_publishes_and_echoes() {
        let shared = engine();
        let mut receiver = ScriptReceiver::new(&shared, MockInput::new(b"!<B\r\n"));

        receive_all(&mut receiver, 5);

        assert_eq!(receiver.input().echoed, b"!<B\r\n");
        assert!(shared.lock(|e| e.optimize()));
        assert!(shared.lock(|e| e.script().as_bytes() == b"<B"));
    }

    #[test]
    fn test_receiver_without_echo() {
        let shared = engine();
        let mut receiver = ScriptReceiver::new(&shared, MockInput::new(b"A\r")).with_echo(false);
        receive_all(&mut receiver, 2);
        assert!(receiver.input().echoed.is_empty());
        assert!(shared.lock(|e| e.is_active()));
    }

    #[test]
    fn test_receiver_error_keeps_staged_bytes() {
        let shared = engine();
        let mut input = MockInput::new(b"AB");
        input.bytes.push_back(Err(InputError::Framing));
        input.bytes.push_back(Ok(b'\r'));
        let mut receiver = ScriptReceiver::new(&shared, input);

        receive_all(&mut receiver, 2);
        assert_eq!(
            block_on(receiver.receive_one()),
            Err(BridgeError::Input(InputError::Framing))
        );
        assert!(matches!(
            block_on(receiver.receive_one()),
            Ok(Command::Publish(_))
        ));
        assert_eq!(shared.lock(|e| e.script().len()), 2);
    }

    #[test]
    fn test_player_sends_frames_in_order() {
        let shared = engine();
        for &b in b"!>A\r" {
            shared.on_byte(b);
        }
        let mut player = ReportPlayer::new(&shared, MockOutput::default(), MockDelay::default());

        for _ in 0..6 {
            block_on(player.play_one()).unwrap();
        }

        let sent = &player.output().sent;
        assert_eq!(sent.len(), 6);
        assert_eq!(sent[0].hat, Hat::Right);
        assert_eq!(sent[0].buttons, Buttons::A);
        assert_eq!(sent[1], sent[0]);
        assert_eq!(sent[2], sent[0]);
        assert!(sent[3..].iter().all(|r| r.is_neutral()));
    }

    #[test]
    fn test_player_waits_on_extended_frame() {
        let shared = engine();
        for &b in b"H\r" {
            shared.on_byte(b);
        }
        let mut player = ReportPlayer::new(&shared, MockOutput::default(), MockDelay::default());

        let frame = block_on(player.play_one()).unwrap();
        assert_eq!(frame.delay_ms, 85);
        block_on(player.play_one()).unwrap();

        let (_, delay) = player.into_parts();
        assert_eq!(delay.waited_ms, [85]);
    }

    #[test]
    fn test_player_output_error_loses_frame() {
        let shared = engine();
        for &b in b"A\r" {
            shared.on_byte(b);
        }
        let output = MockOutput {
            fail: true,
            ..MockOutput::default()
        };
        let mut player = ReportPlayer::new(&shared, output, MockDelay::default());

        assert_eq!(
            block_on(player.play_one()),
            Err(BridgeError::Output(OutputError::Io))
        );
        player.output_mut().fail = false;
        let frame = block_on(player.play_one()).unwrap();
        assert_eq!(frame.kind, FrameKind::Replay);
    }
}
