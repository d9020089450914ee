//! Report sink trait and error types.

use core::future::Future;

use crate::types::SwitchReport;

/// Error type for output operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// USB/communication I/O error.
    Io,
    /// Device not ready (e.g., USB not enumerated).
    NotReady,
}

/// Async trait for the host side of the engine.
///
/// `send` completes when the host has picked the report up, which is what
/// paces playback to the polling interval.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReportSink {
    /// Hand one report to the host.
    fn send(&mut self, report: &SwitchReport) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the output is ready to accept data.
    fn is_ready(&self) -> bool;
}
