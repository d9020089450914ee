//! Serial-scripted Switch gamepad for RP2040.
//!
//! The firmware enumerates as a HORI Pokken Tournament Pro Pad, which the
//! Switch accepts as a Pro Controller, and plays back move-code scripts
//! received over UART.
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART1 TX | 8    | Echo of received bytes |
//! | UART1 RX | 9    | Script input (9600 baud, 8N1) |
//! | LED      | 25   | On-board LED (error indicator) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four concurrent tasks
//! around one [`SharedEngine`] in a `static`:
//!
//! - **USB Task**: Manages the USB device stack
//! - **Input Task**: Reads UART bytes and feeds them to the engine
//! - **Output Task**: Pulls one frame per host poll and writes it to the IN endpoint
//! - **Host Report Task**: Reads the OUT endpoint and hands reports to the engine
//!
//! Every engine call is a critical section, so a script published by the
//! input task is seen whole by the output task.
//!
//! # Modules
//!
//! - [`uart_input`]: UART byte source ([`UartByteSource`])
//! - [`usb_output`]: USB HID output ([`UsbHidOutput`], [`SwitchRequestHandler`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`uart-echo`** (default): Echo every received byte back over UART TX
//! - **`optimize-default`**: Boot with direction+action merging enabled
//!
//! # Re-exports
//!
//! This crate re-exports the engine types from [`macro_core`] for convenience,
//! so consumers only need to depend on this crate.

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they install conflicting panic handlers");

// Re-export core types for convenience
pub use macro_core::{
    BridgeError, Buttons, ByteSource, Command, EngineConfig, Frame, FrameKind, Hat, InputError,
    OutputError, ReportPlayer, ReportSink, ScriptReceiver, SharedEngine, SwitchReport,
    MAX_SCRIPT_LEN,
};

pub mod uart_input;
pub mod usb_output;

pub use uart_input::UartByteSource;
pub use usb_output::{
    configure_usb_hid, SharedSwitchEngine, SwitchRequestHandler, UsbHidOutput, REPORT_DESCRIPTOR,
    REPORT_SIZE,
};
