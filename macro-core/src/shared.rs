//! Engine shared between the byte-receiving side and the polling side.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::command::Command;
use crate::config::EngineConfig;
use crate::engine::{Engine, Frame};

/// An [`Engine`] behind a blocking mutex.
///
/// Every call runs inside one lock scope, so publishing a script (copy,
/// cursor reset, buffer clear) is never observed half done by the poller.
/// With `CriticalSectionRawMutex` the scope is a critical section and the
/// engine can be driven from interrupt context.
pub struct SharedEngine<M: RawMutex> {
    inner: Mutex<M, RefCell<Engine>>,
}

impl<M: RawMutex> SharedEngine<M> {
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Engine::new(config))),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        self.inner.lock(|engine| f(&mut engine.borrow_mut()))
    }

    pub fn on_byte(&self, byte: u8) -> Command {
        self.lock(|engine| engine.on_byte(byte))
    }

    pub fn next_frame(&self) -> Frame {
        self.lock(Engine::next_frame)
    }

    pub fn accept_output_report(&self, data: &[u8]) {
        self.lock(|engine| engine.accept_output_report(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Buttons;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_shared_publish_and_poll() {
        let shared: SharedEngine<NoopRawMutex> = SharedEngine::new(EngineConfig::DEFAULT);
        for &b in b"Y\r" {
            shared.on_byte(b);
        }
        assert!(shared.lock(|engine| engine.is_active()));
        assert_eq!(shared.next_frame().report.buttons, Buttons::Y);
    }

    #[test]
    fn test_shared_output_report() {
        let shared: SharedEngine<NoopRawMutex> = SharedEngine::new(EngineConfig::DEFAULT);
        shared.accept_output_report(&[0u8; 8]);
        assert_eq!(shared.lock(|engine| engine.host_reports()), 1);
    }
}
