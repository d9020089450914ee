//! Command ingestion: turns a byte stream into published scripts and
//! optimization toggles.
//!
//! Control bytes:
//! - `\r` - publish the staged bytes as the active script
//! - `\n` - ignored, so CR+LF line endings work
//! - `!` / `?` - enable / disable direction+action merging
//!
//! Every other byte is staged, up to [`MAX_SCRIPT_LEN`]. Bytes past that
//! are dropped without telling the sender.

use heapless::Vec;

/// Capacity of the staging buffer and of a published script.
pub const MAX_SCRIPT_LEN: usize = 32;

pub const TERMINATOR: u8 = b'\r';
pub const LINE_FEED: u8 = b'\n';
pub const OPTIMIZE_ON: u8 = b'!';
pub const OPTIMIZE_OFF: u8 = b'?';

/// A published sequence of move codes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script(Vec<u8, MAX_SCRIPT_LEN>);

impl Script {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a script from raw codes, truncating at [`MAX_SCRIPT_LEN`].
    #[must_use]
    pub fn new(codes: &[u8]) -> Self {
        let len = codes.len().min(MAX_SCRIPT_LEN);
        let mut inner = Vec::new();
        // Cannot fail: `len` never exceeds the capacity.
        let _ = inner.extend_from_slice(&codes[..len]);
        Self(inner)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Code at `index`, if it is within the script.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Script {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Script({=[u8]:a})", self.as_bytes())
    }
}

/// What a single byte did to the ingestion state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// The staged bytes were published as a new script.
    Publish(Script),
    /// The optimization flag was set to the given value.
    Optimize(bool),
    /// The byte was appended to the staging buffer.
    Staged,
    /// The staging buffer was full and the byte was dropped.
    Dropped,
    /// The byte has no effect (line feed).
    Ignored,
}

/// Fixed-capacity staging buffer fed one byte at a time.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    staged: Vec<u8, MAX_SCRIPT_LEN>,
}

impl CommandBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { staged: Vec::new() }
    }

    /// Feed one byte. Never blocks, never fails.
    pub fn push(&mut self, byte: u8) -> Command {
        match byte {
            TERMINATOR => Command::Publish(Script(core::mem::take(&mut self.staged))),
            OPTIMIZE_ON => Command::Optimize(true),
            OPTIMIZE_OFF => Command::Optimize(false),
            LINE_FEED => Command::Ignored,
            _ => match self.staged.push(byte) {
                Ok(()) => Command::Staged,
                Err(_) => Command::Dropped,
            },
        }
    }

    /// Number of bytes currently staged.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}
