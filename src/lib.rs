//! SerLCD / OpenLCD Character Display Driver
//!
//! A non-blocking driver for SparkFun SerLCD (OpenLCD firmware) character
//! displays. Drawing calls never touch the bus: they queue commands, and a
//! cheap [`SerLcd::tick`] called from the main loop sends them one at a time,
//! paced to the module's processing time.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocation
//! - `embedded-hal` v1.0 I2C and SPI transports
//! - Fixed-size FIFO command queue (`N - 1` usable slots, default `N = 32`)
//! - Timing gate per command, with a longer window after clear
//! - Failure counting with automatic reset-and-reinitialize recovery
//! - `core::fmt::Write` for formatted text
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::fmt::Write;
//! use serlcd::{Builder, I2cInterface, SerLcd};
//! # use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = ErrorKind; }
//! # impl I2c for MockI2c {
//! #     fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # let i2c = MockI2c;
//! # fn millis() -> u32 { 0 }
//! let interface = I2cInterface::new(i2c);
//! let config = Builder::new().error_threshold(2).build();
//!
//! let mut lcd: SerLcd<_, _> = SerLcd::new(interface, millis, config);
//! lcd.begin();
//!
//! let _ = lcd.set_backlight(0, 64, 255);
//! let _ = lcd.set_cursor(0, 1);
//! let _ = write!(lcd, "Temp {:>3}C", 21);
//!
//! loop {
//!     if lcd.needs_refresh() {
//!         // redraw the whole screen, then:
//!         lcd.clear_refresh_flag();
//!     }
//!     lcd.tick();
//! #   break;
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Millisecond time source
pub mod clock;
/// Backlight color type
pub mod color;
/// OpenLCD command definitions
pub mod command;
/// Driver configuration types and builder
pub mod config;
/// Core driver and dispatch state machine
pub mod display;
/// Command-to-bytes encoding
pub mod encoder;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Fixed-capacity command queue
pub mod queue;
/// Failure counting and escalation
pub mod recovery;
/// Dispatch states
pub mod state;

pub use clock::Clock;
pub use color::Rgb;
pub use command::{Command, CommandKind};
pub use config::{Builder, Config, Timing};
pub use display::SerLcd;
pub use encoder::{Frame, encode};
pub use error::{BuilderError, Error};
pub use interface::{DEFAULT_ADDRESS, I2cInterface, LcdInterface, SpiInterface};
pub use queue::{CommandQueue, DEFAULT_QUEUE_SIZE};
pub use recovery::Failure;
pub use state::State;
