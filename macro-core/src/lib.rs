//! Platform-agnostic scripted input playback for a Switch-compatible gamepad.
//!
//! A short line of move codes arrives over a serial link; this crate turns
//! it into a timed sequence of HID input reports served to the host one
//! per polling interval. It has no platform-specific dependencies and runs
//! both in embedded `no_std` firmware and on host for testing.
//!
//! # Overview
//!
//! - [`types`]: Report data ([`SwitchReport`], [`Buttons`], [`Hat`], [`Stick`])
//! - [`command`]: Byte ingestion and script publishing ([`CommandBuffer`], [`Script`])
//! - [`translate`]: Move code to report mapping ([`translate()`])
//! - [`scheduler`]: Press/spacer tick state machine ([`Scheduler`], [`Phase`])
//! - [`echo`]: Holds each fresh frame for extra polls ([`Echo`])
//! - [`engine`]: All of the above in one context ([`Engine`], [`Frame`])
//! - [`shared`]: The engine behind a mutex ([`SharedEngine`])
//! - [`input`] / [`output`]: Transport traits ([`ByteSource`], [`ReportSink`])
//! - [`bridge`]: The two activities ([`ScriptReceiver`], [`ReportPlayer`])
//!
//! # Protocol
//!
//! ```text
//! !<A>BSd\r\n
//! ```
//!
//! - `\r` publishes the bytes received so far as the active script
//! - `\n` is ignored
//! - `!` / `?` turn direction+action merging on / off
//! - everything else is a move code, see [`translate`]
//!
//! Each code becomes one press frame followed by one neutral frame, and
//! every fresh frame is repeated for [`EngineConfig::echoes`] extra polls.
//!
//! # Example
//!
//! ```rust
//! use macro_core::{Buttons, Engine, EngineConfig, Hat};
//!
//! let mut engine = Engine::new(EngineConfig::DEFAULT);
//! for &b in b"!<A\r" {
//!     engine.on_byte(b);
//! }
//!
//! let report = engine.next_report();
//! assert_eq!(report.hat, Hat::Left);
//! assert!(report.buttons.contains(Buttons::A));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This must go first so the logging macros are visible to later modules.
mod fmt;

pub mod bridge;
pub mod command;
pub mod config;
pub mod echo;
pub mod engine;
pub mod input;
pub mod output;
pub mod scheduler;
pub mod shared;
pub mod translate;
pub mod types;

// Re-export main types at crate root
pub use bridge::{BridgeError, ReportPlayer, ScriptReceiver};
pub use command::{Command, CommandBuffer, Script, MAX_SCRIPT_LEN};
pub use config::EngineConfig;
pub use echo::Echo;
pub use engine::{Engine, Frame};
pub use input::{ByteSource, InputError};
pub use output::{OutputError, ReportSink};
pub use scheduler::{FrameKind, Phase, Scheduler};
pub use shared::SharedEngine;
pub use translate::{translate, Translation};
pub use types::{
    Buttons, Hat, OutputReport, ReportError, Stick, SwitchReport, STICK_CENTER, STICK_MAX,
    STICK_MIN,
};
