//! Engine configuration.

/// Extra polls each fresh frame is repeated for.
pub const DEFAULT_ECHOES: u8 = 2;

/// Extra hold applied to the `H` press frame, in milliseconds.
pub const DEFAULT_HOLD_DELAY_MS: u32 = 85;

/// Tunables for [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use macro_core::EngineConfig;
///
/// let config = EngineConfig {
///     optimize: true,
///     ..EngineConfig::DEFAULT
/// };
/// assert_eq!(config.echoes, 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Extra polls each fresh frame is repeated for.
    pub echoes: u8,
    /// Delay requested by the `H` code, in milliseconds.
    pub hold_delay_ms: u32,
    /// Insert one neutral frame when a script replaces one still playing.
    pub release_on_supersede: bool,
    /// Initial state of the merge optimization.
    pub optimize: bool,
}

impl EngineConfig {
    pub const DEFAULT: Self = Self {
        echoes: DEFAULT_ECHOES,
        hold_delay_ms: DEFAULT_HOLD_DELAY_MS,
        release_on_supersede: true,
        optimize: false,
    };
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
