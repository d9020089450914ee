//! Controller report types: Buttons, Hat, Stick, SwitchReport, OutputReport.
//!
//! The layout is the one a HORI Pokken Tournament Pro Pad reports to a
//! Nintendo Switch, which the console treats as a Pro Controller.

use core::ops::{BitOr, BitOrAssign};

/// Button state represented as a bitfield.
///
/// Bit positions follow the Switch HID report, so the raw value can be
/// written to the wire unchanged.
///
/// # Example
///
/// ```
/// use macro_core::Buttons;
///
/// let buttons = Buttons::A | Buttons::B;
/// assert!(buttons.contains(Buttons::A));
/// assert!(buttons.contains(Buttons::B));
/// assert!(!buttons.contains(Buttons::X));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u16);

impl Buttons {
    pub const Y: Self = Self(1 << 0);
    pub const B: Self = Self(1 << 1);
    pub const A: Self = Self(1 << 2);
    pub const X: Self = Self(1 << 3);
    pub const L: Self = Self(1 << 4);
    pub const R: Self = Self(1 << 5);
    pub const ZL: Self = Self(1 << 6);
    pub const ZR: Self = Self(1 << 7);
    pub const MINUS: Self = Self(1 << 8); // Select
    pub const PLUS: Self = Self(1 << 9); // Start
    pub const LCLICK: Self = Self(1 << 10);
    pub const RCLICK: Self = Self(1 << 11);
    pub const HOME: Self = Self(1 << 12);
    pub const CAPTURE: Self = Self(1 << 13);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Directional pad value. Eight directions clockwise from `Up`, then `Center`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hat {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
    #[default]
    Center = 8,
}

impl Hat {
    /// Decode a wire value. Anything outside `0..=7` reads as `Center`,
    /// which is how the host treats the null state.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Hat::Up,
            1 => Hat::UpRight,
            2 => Hat::Right,
            3 => Hat::DownRight,
            4 => Hat::Down,
            5 => Hat::DownLeft,
            6 => Hat::Left,
            7 => Hat::UpLeft,
            _ => Hat::Center,
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

pub const STICK_MIN: u8 = 0;
pub const STICK_CENTER: u8 = 128;
pub const STICK_MAX: u8 = 255;

/// Analog stick with unsigned X/Y axes, centered at [`STICK_CENTER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stick {
    pub x: u8,
    pub y: u8,
}

impl Stick {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const CENTER: Self = Self {
        x: STICK_CENTER,
        y: STICK_CENTER,
    };
}

impl Default for Stick {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Error type for decoding raw reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Buffer is not exactly one report long.
    Length,
}

/// Input report sent to the host on every poll.
///
/// Wire layout (8 bytes):
/// `[buttons_lo, buttons_hi, hat, lx, ly, rx, ry, vendor]`
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchReport {
    pub buttons: Buttons,
    pub hat: Hat,
    pub left_stick: Stick,
    pub right_stick: Stick,
    pub vendor: u8,
}

impl SwitchReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 8;

    /// No buttons pressed, pad and sticks centered.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::NONE,
            hat: Hat::Center,
            left_stick: Stick::CENTER,
            right_stick: Stick::CENTER,
            vendor: 0,
        }
    }

    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let buttons = self.buttons.raw().to_le_bytes();
        [
            buttons[0],
            buttons[1],
            self.hat.raw(),
            self.left_stick.x,
            self.left_stick.y,
            self.right_stick.x,
            self.right_stick.y,
            self.vendor,
        ]
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let bytes: &[u8; Self::SIZE] = bytes.try_into().map_err(|_| ReportError::Length)?;
        Ok(Self {
            buttons: Buttons(u16::from_le_bytes([bytes[0], bytes[1]])),
            hat: Hat::from_raw(bytes[2]),
            left_stick: Stick::new(bytes[3], bytes[4]),
            right_stick: Stick::new(bytes[5], bytes[6]),
            vendor: bytes[7],
        })
    }
}

/// Host-to-device report. The console sends these (rumble, LEDs) but
/// nothing in this device reacts to them.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputReport(pub [u8; OutputReport::SIZE]);

impl OutputReport {
    pub const SIZE: usize = 8;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        bytes
            .try_into()
            .map(OutputReport)
            .map_err(|_| ReportError::Length)
    }
}
