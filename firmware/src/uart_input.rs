//! UART byte source feeding scripts into the engine.
//!
//! Move codes arrive one byte at a time; see [`macro_core::command`] for the
//! control bytes.
//!
//! # Pins
//!
//! Uses UART1 by default:
//! - GPIO 8: TX (echo back to the sender)
//! - GPIO 9: RX (script input)

use embassy_rp::uart::{Async, Error as UartError, UartRx, UartTx};
use macro_core::{ByteSource, InputError};

/// Convert UART errors to [`InputError`].
///
/// This is a helper function instead of a `From` impl to avoid orphan rule issues
/// (both `UartError` and `InputError` are defined in external crates).
#[inline]
fn uart_error_to_input_error(e: UartError) -> InputError {
    match e {
        UartError::Framing => InputError::Framing,
        UartError::Overrun => InputError::Overrun,
        _ => InputError::Io,
    }
}

/// UART-based byte source.
pub struct UartByteSource<'d> {
    rx: UartRx<'d, Async>,
    tx: UartTx<'d, Async>,
}

impl<'d> UartByteSource<'d> {
    /// Create a byte source from the two halves of a split UART.
    #[must_use]
    pub fn new(rx: UartRx<'d, Async>, tx: UartTx<'d, Async>) -> Self {
        Self { rx, tx }
    }
}

impl ByteSource for UartByteSource<'_> {
    async fn receive(&mut self) -> Result<u8, InputError> {
        let mut byte = [0u8; 1];
        self.rx
            .read(&mut byte)
            .await
            .map_err(uart_error_to_input_error)?;
        Ok(byte[0])
    }

    async fn echo(&mut self, byte: u8) {
        // Feedback only; a failed echo must not stall ingestion.
        let _ = self.tx.write(&[byte]).await;
    }

    fn is_connected(&self) -> bool {
        // UART is always "connected" if we have the peripheral
        true
    }
}
