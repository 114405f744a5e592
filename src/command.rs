//! SerLCD / OpenLCD command definitions
//!
//! This module defines the protocol bytes understood by the OpenLCD firmware
//! and the [`Command`] value type that the driver queues and later encodes.
//!
//! ## Command Structure
//!
//! OpenLCD interprets every byte it receives as a character to print unless
//! the byte is one of two prefixes:
//!
//! 1. [`SPECIAL_COMMAND`] (254): the next byte is an HD44780 instruction
//!    (clear, home, cursor address, display on/off, ...)
//! 2. [`SETTING_COMMAND`] (`|`): the next byte selects an OpenLCD setting,
//!    optionally followed by its arguments (e.g. RGB backlight)
//!
//! A literal character equal to either prefix is sent twice so the firmware
//! prints it instead of entering command mode.
//!
//! ## Example
//!
//! ```
//! use serlcd::{Command, CommandKind, Rgb};
//!
//! let cmd = Command::set_cursor(3, 1);
//! assert_eq!(cmd, Command::Special(0x80 | (0x40 + 3)));
//!
//! let cmd = Command::Backlight(Rgb::new(10, 20, 30));
//! assert_eq!(cmd.kind(), CommandKind::BacklightRgb);
//! assert_eq!(cmd.payload_len(), 3);
//! ```

use crate::color::Rgb;

// Prefixes

/// Special command prefix (254 / 0xFE)
///
/// The following byte is passed to the HD44780 controller as an instruction.
pub const SPECIAL_COMMAND: u8 = 254;

/// Setting command prefix (0x7C, `|`)
///
/// The following byte selects an OpenLCD firmware setting.
pub const SETTING_COMMAND: u8 = 0x7C;

// HD44780 instructions (sent after SPECIAL_COMMAND)

/// Clear display instruction (0x01)
///
/// Blanks the screen and homes the cursor. The module needs noticeably longer
/// to settle after this than after other instructions.
pub const CLEAR_COMMAND: u8 = 0x01;

/// Return home instruction (0x02)
pub const HOME_COMMAND: u8 = 0x02;

/// Display control: display on, cursor off, blink off (0x0C)
pub const DISPLAY_ON_COMMAND: u8 = 0x0C;

/// Display control: display off (0x08)
pub const DISPLAY_OFF_COMMAND: u8 = 0x08;

/// Set DDRAM address instruction (0x80)
///
/// OR-ed with the target address: `0x80 | (col + ROW_OFFSETS[row])`.
pub const SET_DDRAM_ADDRESS: u8 = 0x80;

/// DDRAM start address of each display row
///
/// 4-line HD44780 modules interleave rows 0/2 and 1/3 in memory.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// Highest addressable row
pub const MAX_ROW: u8 = 3;

// OpenLCD settings (sent after SETTING_COMMAND)

/// Set RGB backlight setting (0x2B, `+`)
///
/// Requires 3 bytes: red, green, blue (0-255 each).
pub const RGB_COMMAND: u8 = 0x2B;

/// Protocol-level category of a [`Command`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    /// A single character printed at the cursor
    CharacterWrite,
    /// An HD44780 instruction behind [`SPECIAL_COMMAND`]
    SpecialCommand,
    /// An OpenLCD setting behind [`SETTING_COMMAND`]
    SettingCommand,
    /// Backlight color behind [`SETTING_COMMAND`] + [`RGB_COMMAND`]
    BacklightRgb,
}

/// One protocol-level operation waiting to be sent to the display
///
/// Commands are small `Copy` values; the queue stores them inline. The
/// payload arity is fixed per variant, so a command can never carry the wrong
/// number of bytes for its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print one character (escaped on the wire if it collides with a prefix)
    Character(u8),
    /// Special command with its instruction byte
    Special(u8),
    /// Setting command with its setting byte
    Setting(u8),
    /// RGB backlight color
    Backlight(Rgb),
}

impl Command {
    /// Clear the display
    pub const fn clear() -> Self {
        Self::Special(CLEAR_COMMAND)
    }

    /// Move the cursor to column 0, row 0
    pub const fn home() -> Self {
        Self::Special(HOME_COMMAND)
    }

    /// Turn the display on
    pub const fn display_on() -> Self {
        Self::Special(DISPLAY_ON_COMMAND)
    }

    /// Turn the display off (content is kept)
    pub const fn display_off() -> Self {
        Self::Special(DISPLAY_OFF_COMMAND)
    }

    /// Move the cursor to `col`, `row`
    ///
    /// Rows past [`MAX_ROW`] are clamped to the last row.
    pub fn set_cursor(col: u8, row: u8) -> Self {
        let row = row.min(MAX_ROW);
        let address = col.wrapping_add(ROW_OFFSETS[row as usize]);
        Self::Special(SET_DDRAM_ADDRESS | address)
    }

    /// Set the RGB backlight
    pub const fn backlight(r: u8, g: u8, b: u8) -> Self {
        Self::Backlight(Rgb::new(r, g, b))
    }

    /// Print a single character
    pub const fn character(byte: u8) -> Self {
        Self::Character(byte)
    }

    /// Protocol category of this command
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Character(_) => CommandKind::CharacterWrite,
            Self::Special(_) => CommandKind::SpecialCommand,
            Self::Setting(_) => CommandKind::SettingCommand,
            Self::Backlight(_) => CommandKind::BacklightRgb,
        }
    }

    /// Number of payload bytes carried (1, or 3 for backlight)
    pub const fn payload_len(&self) -> usize {
        match self {
            Self::Backlight(_) => 3,
            _ => 1,
        }
    }

    /// Whether this is the clear-display instruction
    ///
    /// The display needs the longer clear settle time after it.
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Special(CLEAR_COMMAND))
    }
}
