//! Error types for the driver
//!
//! This module defines error types for interface construction
//! ([`BuilderError`]) and queue/bus operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`Error::QueueFull`] - a command was offered with no free queue slot
//! - [`Error::Interface`] - the bus transport reported a failed transaction
//! - [`BuilderError`] - invalid interface parameters
//!
//! Neither is fatal. Both are also counted by the driver's failure tracker,
//! and once too many happen in a row the driver enters
//! [`State::Error`](crate::State::Error) on its own; that escalation is
//! observed through [`SerLcd::has_error`](crate::SerLcd::has_error), not
//! through an error value.
//!
//! ## Example
//!
//! ```
//! use serlcd::{BuilderError, I2cInterface};
//! # use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = ErrorKind; }
//! # impl I2c for MockI2c {
//! #     fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//!
//! // 0x78..=0x7F is reserved by the I2C specification
//! let result = I2cInterface::with_address(MockI2c, 0x7A);
//! assert!(matches!(result, Err(BuilderError::InvalidAddress { address: 0x7A })));
//! ```

use crate::interface::LcdInterface;

/// Errors that can occur when queueing or sending commands
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: LcdInterface> {
    /// The command queue had no free slot
    ///
    /// The command was not queued. The queue keeps one slot in reserve, so a
    /// queue of size `N` holds `N - 1` commands.
    QueueFull,
    /// Interface error (I2C/SPI)
    ///
    /// Wraps the underlying hardware error from the [`LcdInterface`] implementation.
    Interface(I::Error),
}

impl<I: LcdInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::QueueFull => write!(f, "Command queue full"),
            Self::Interface(e) => write!(f, "Interface error: {e:?}"),
        }
    }
}

impl<I: LcdInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Errors that can occur when building an interface
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// I2C address outside the usable 7-bit range
    ///
    /// Addresses 0x00-0x07 and 0x78-0x7F are reserved.
    InvalidAddress {
        /// Address requested
        address: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidAddress { address } => write!(
                f,
                "Invalid I2C address {address:#04x} (must be 0x08..=0x77)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
