//! Byte source trait and error types.

use core::future::Future;

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// UART/communication I/O error.
    Io,
    /// UART framing error.
    Framing,
    /// Receiver overrun; at least one byte was lost.
    Overrun,
}

/// Async trait for the serial side of the engine.
///
/// Implementations hand over one byte at a time, exactly as received.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ByteSource {
    /// Wait for and receive the next byte.
    fn receive(&mut self) -> impl Future<Output = Result<u8, InputError>>;

    /// Send a received byte back to the sender as typing feedback.
    ///
    /// Best effort; the default does nothing.
    fn echo(&mut self, byte: u8) -> impl Future<Output = ()> {
        let _ = byte;
        core::future::ready(())
    }

    /// Check if the source is connected/ready.
    fn is_connected(&self) -> bool;
}
