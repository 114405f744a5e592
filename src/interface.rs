//! Hardware interface abstraction
//!
//! This module provides the [`LcdInterface`] trait and two embedded-hal v1.0
//! transports for talking to an OpenLCD module: [`I2cInterface`] and
//! [`SpiInterface`].
//!
//! The driver hands the interface one complete encoded command at a time.
//! Each call must be a single bus transaction (START ... STOP on I2C, one
//! chip-select assertion on SPI) that either succeeds or reports an error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use serlcd::{I2cInterface, LcdInterface};
//! # use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = ErrorKind; }
//! # impl I2c for MockI2c {
//! #     fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let mut interface = I2cInterface::new(MockI2c);
//!
//! // Clear display: special prefix + clear instruction
//! let _ = interface.write_frame(&[0xFE, 0x01]);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

use crate::error::BuilderError;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Factory I2C address of SerLCD / OpenLCD modules
pub const DEFAULT_ADDRESS: u8 = 0x72;

/// Trait for the bus transport to the display
///
/// This trait abstracts over different hardware implementations,
/// allowing [`SerLcd`](crate::SerLcd) to work with any transport that can
/// push a short byte string to the module in one transaction.
///
/// ## Implementing
///
/// For most cases, use [`I2cInterface`] or [`SpiInterface`]. Implement this
/// trait yourself for other links (e.g. a UART TX) or for test doubles.
pub trait LcdInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write one encoded command as a single transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction did not complete, e.g. the
    /// module did not acknowledge its address.
    fn write_frame(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error>;
}

/// I2C transport
///
/// ## Example
///
/// ```rust,no_run
/// use serlcd::{Config, I2cInterface, SerLcd};
/// # use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
/// # struct MockI2c;
/// # impl ErrorType for MockI2c { type Error = ErrorKind; }
/// # impl I2c for MockI2c {
/// #     fn transaction(&mut self, _: u8, _: &mut [Operation<'_>]) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// let interface = match I2cInterface::with_address(MockI2c, 0x72) {
///     Ok(interface) => interface,
///     Err(_) => return,
/// };
/// let _lcd: SerLcd<_, _> = SerLcd::new(interface, || 0u32, Config::default());
/// ```
pub struct I2cInterface<I2C> {
    /// I2C bus
    i2c: I2C,
    /// 7-bit device address
    address: u8,
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    /// Create an interface at the factory address [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Create an interface at a custom address
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::InvalidAddress`] for reserved addresses
    /// (0x00-0x07, 0x78-0x7F) and anything above 7 bits.
    pub fn with_address(i2c: I2C, address: u8) -> Result<Self, BuilderError> {
        if !(0x08..=0x77).contains(&address) {
            return Err(BuilderError::InvalidAddress { address });
        }
        Ok(Self { i2c, address })
    }

    /// Get the device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> LcdInterface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write_frame(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.i2c.write(self.address, bytes)
    }
}

/// SPI transport
///
/// Chip select is managed by the [`SpiDevice`]; each frame is written inside
/// one transaction.
pub struct SpiInterface<SPI> {
    /// SPI device for communication
    spi: SPI,
}

impl<SPI> SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    /// Create a new SPI interface
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Give back the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> LcdInterface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn write_frame(&mut self, bytes: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.spi.write(bytes)
    }
}
