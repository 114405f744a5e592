//! Backlight color type
//!
//! SerLCD RGB modules drive three backlight channels with 8-bit brightness
//! each. [`Rgb`] carries one such setting and is sent on the wire in
//! red, green, blue order.
//!
//! ## Example
//!
//! ```
//! use serlcd::Rgb;
//!
//! let amber = Rgb::new(255, 120, 0);
//! assert_eq!(amber.to_bytes(), [255, 120, 0]);
//! assert_eq!(Rgb::OFF.to_bytes(), [0, 0, 0]);
//! ```

/// RGB backlight color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel brightness
    pub r: u8,
    /// Green channel brightness
    pub g: u8,
    /// Blue channel brightness
    pub b: u8,
}

impl Rgb {
    /// Full white, the module's power-on backlight
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Backlight off
    pub const OFF: Self = Self::new(0, 0, 0);
    /// Red only
    pub const RED: Self = Self::new(255, 0, 0);
    /// Green only
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Blue only
    pub const BLUE: Self = Self::new(0, 0, 255);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in wire order (red, green, blue)
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}
