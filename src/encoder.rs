//! Wire encoding of queued commands
//!
//! [`encode`] turns one [`Command`] into the exact bytes of one bus
//! transaction. It is pure: no state, no I/O.
//!
//! | Command            | Bytes on the wire                     |
//! |--------------------|---------------------------------------|
//! | `Character(c)`     | `c`, or `c c` if `c` is a prefix byte |
//! | `Special(x)`       | `0xFE x`                              |
//! | `Setting(x)`       | `0x7C x`                              |
//! | `Backlight(r,g,b)` | `0x7C 0x2B r g b`                     |
//!
//! ## Example
//!
//! ```
//! use serlcd::{encoder::encode, Command};
//!
//! assert_eq!(encode(&Command::character(b'A')).as_bytes(), b"A");
//! assert_eq!(encode(&Command::clear()).as_bytes(), &[0xFE, 0x01]);
//! assert_eq!(
//!     encode(&Command::backlight(10, 20, 30)).as_bytes(),
//!     &[0x7C, 0x2B, 10, 20, 30]
//! );
//! ```

use crate::command::{Command, RGB_COMMAND, SETTING_COMMAND, SPECIAL_COMMAND};

/// Longest frame any command encodes to (backlight: prefix + opcode + RGB)
pub const MAX_FRAME_LEN: usize = 5;

/// Encoded bytes of a single command, stored inline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    fn from_slice(src: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_FRAME_LEN];
        let len = src.len().min(MAX_FRAME_LEN);
        bytes[..len].copy_from_slice(&src[..len]);
        Self { bytes, len }
    }

    /// The bytes to place on the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Number of bytes in the frame
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the frame is empty (never true for an encoded command)
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Whether `byte` would be read by the firmware as a command prefix
pub const fn is_prefix(byte: u8) -> bool {
    byte == SPECIAL_COMMAND || byte == SETTING_COMMAND
}

/// Encode a command into the bytes of one bus transaction
pub fn encode(cmd: &Command) -> Frame {
    match *cmd {
        // The escape byte goes first, followed by the literal value.
        Command::Character(c) if is_prefix(c) => Frame::from_slice(&[c, c]),
        Command::Character(c) => Frame::from_slice(&[c]),
        Command::Special(x) => Frame::from_slice(&[SPECIAL_COMMAND, x]),
        Command::Setting(x) => Frame::from_slice(&[SETTING_COMMAND, x]),
        Command::Backlight(rgb) => {
            Frame::from_slice(&[SETTING_COMMAND, RGB_COMMAND, rgb.r, rgb.g, rgb.b])
        }
    }
}
