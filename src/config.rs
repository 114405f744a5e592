//! Driver configuration types and builder

use crate::color::Rgb;

/// Default time the module needs after power-up before accepting frames (ms)
pub const DEFAULT_INIT_MS: u32 = 1000;
/// Default settle time after an ordinary command (ms)
pub const DEFAULT_COMMAND_MS: u32 = 5;
/// Default settle time after a clear (ms)
pub const DEFAULT_CLEAR_MS: u32 = 50;
/// Default time spent in the error state before reinitializing (ms)
pub const DEFAULT_ERROR_RESET_MS: u32 = 100;
/// Default number of failures absorbed before escalating
pub const DEFAULT_ERROR_THRESHOLD: u8 = 1;

/// Timing windows, all in milliseconds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Hold-off after [`SerLcd::begin`](crate::SerLcd::begin)
    pub init_ms: u32,
    /// Settle time after any command other than clear
    pub command_ms: u32,
    /// Settle time after a clear
    pub clear_ms: u32,
    /// Time spent in the error state before reinitializing
    pub error_reset_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            init_ms: DEFAULT_INIT_MS,
            command_ms: DEFAULT_COMMAND_MS,
            clear_ms: DEFAULT_CLEAR_MS,
            error_reset_ms: DEFAULT_ERROR_RESET_MS,
        }
    }
}

/// Driver configuration
///
/// Each driver instance owns its own copy; nothing is shared between
/// instances. Use [`Builder`] to create one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Timing windows
    pub timing: Timing,
    /// Failures since the last reinitialization absorbed before escalating
    /// to the error state
    pub error_threshold: u8,
    /// Emit diagnostic log output
    pub debug: bool,
    /// Backlight color restored by reinitialization
    pub default_backlight: Rgb,
}

impl Default for Config {
    fn default() -> Self {
        Builder::new().build()
    }
}

/// Builder for constructing driver configuration
///
/// # Example
///
/// ```
/// use serlcd::{Builder, Rgb};
///
/// let config = Builder::new()
///     .command_ms(10)
///     .error_threshold(3)
///     .default_backlight(Rgb::new(0, 64, 255))
///     .debug(true)
///     .build();
/// assert_eq!(config.timing.command_ms, 10);
/// assert_eq!(config.timing.clear_ms, 50);
/// assert_eq!(config.error_threshold, 3);
/// ```
#[must_use]
pub struct Builder {
    /// Timing windows
    timing: Timing,
    /// Failures absorbed before escalating
    error_threshold: u8,
    /// Diagnostic logging
    debug: bool,
    /// Backlight restored by reinitialization
    default_backlight: Rgb,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            // Escalate on the second failure since reinitialization
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            debug: false,
            // Module power-on color
            default_backlight: Rgb::WHITE,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all timing windows at once
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Set the power-up hold-off
    pub fn init_ms(mut self, ms: u32) -> Self {
        self.timing.init_ms = ms;
        self
    }

    /// Set the per-command settle time
    pub fn command_ms(mut self, ms: u32) -> Self {
        self.timing.command_ms = ms;
        self
    }

    /// Set the clear settle time
    pub fn clear_ms(mut self, ms: u32) -> Self {
        self.timing.clear_ms = ms;
        self
    }

    /// Set the error recovery time
    pub fn error_reset_ms(mut self, ms: u32) -> Self {
        self.timing.error_reset_ms = ms;
        self
    }

    /// Set how many failures since the last reinitialization are absorbed
    /// before escalating
    pub fn error_threshold(mut self, threshold: u8) -> Self {
        self.error_threshold = threshold;
        self
    }

    /// Enable or disable diagnostic logging
    pub fn debug(mut self, enable: bool) -> Self {
        self.debug = enable;
        self
    }

    /// Set the backlight color restored by reinitialization
    pub fn default_backlight(mut self, color: Rgb) -> Self {
        self.default_backlight = color;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        Config {
            timing: self.timing,
            error_threshold: self.error_threshold,
            debug: self.debug,
            default_backlight: self.default_backlight,
        }
    }
}
