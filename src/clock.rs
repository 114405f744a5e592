//! Monotonic millisecond time source
//!
//! The driver never sleeps; it only compares the current time against the
//! moment it last acted. Timestamps are `u32` milliseconds and are expected
//! to wrap (after roughly 49.7 days), so every comparison goes through
//! [`elapsed_ms`], which subtracts with wrapping semantics.
//!
//! Any `FnMut() -> u32` closure is a [`Clock`], which is usually the easiest
//! way to hook up a HAL timer:
//!
//! ```
//! use serlcd::clock::{elapsed_ms, Clock};
//!
//! let mut ticks = 0u32;
//! let mut clock = move || {
//!     ticks += 10;
//!     ticks
//! };
//! assert_eq!(clock.now_ms(), 10);
//! assert_eq!(clock.now_ms(), 20);
//!
//! // Wraparound is handled by the difference, not the absolute values.
//! assert_eq!(elapsed_ms(5, u32::MAX - 4), 10);
//! ```

/// Source of monotonic millisecond timestamps
pub trait Clock {
    /// Current time in milliseconds since an arbitrary epoch
    fn now_ms(&mut self) -> u32;
}

impl<F> Clock for F
where
    F: FnMut() -> u32,
{
    fn now_ms(&mut self) -> u32 {
        self()
    }
}

/// Milliseconds from `since` to `now`, correct across timestamp wraparound
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Whether at least `window` milliseconds have passed since `since`
pub const fn has_elapsed(now: u32, since: u32, window: u32) -> bool {
    elapsed_ms(now, since) >= window
}
