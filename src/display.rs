//! Non-blocking display driver
//!
//! [`SerLcd`] never waits on the display. Drawing calls only append
//! [`Command`]s to a fixed-size queue; the caller's main loop calls
//! [`SerLcd::tick`], which sends at most one command per call and otherwise
//! returns immediately while the module works through the last one.
//!
//! ## Dispatch states
//!
//! | State        | On tick                                                     |
//! |--------------|-------------------------------------------------------------|
//! | `Ready`      | send the head command, if any, then enter `Processing`      |
//! | `Processing` | once the settle time has passed, become `Ready` and send    |
//! | `Error`      | once the recovery time has passed, reinitialize to `Ready`  |
//!
//! Failed transactions and refused enqueues are counted. Up to the configured
//! threshold they are absorbed (the failed command is dropped); past it the
//! queue is emptied and the driver sits in `Error` for the recovery time,
//! then queues a clear and the default backlight ahead of anything issued in
//! the meantime.

use log::{debug, info, warn};

use crate::clock::{Clock, has_elapsed};
use crate::color::Rgb;
use crate::command::Command;
use crate::config::Config;
use crate::encoder::encode;
use crate::error::Error;
use crate::interface::LcdInterface;
use crate::queue::{CommandQueue, DEFAULT_QUEUE_SIZE};
use crate::recovery::{ErrorTracker, Failure, Verdict};
use crate::state::State;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Non-blocking SerLCD / OpenLCD driver
///
/// ## Type Parameters
///
/// * `I` - Bus transport implementing [`LcdInterface`]
/// * `C` - Millisecond time source implementing [`Clock`]
/// * `N` - Queue size; `N - 1` commands can be pending at once
///
/// ## Example
///
/// ```rust,no_run
/// use core::fmt::Write;
/// use serlcd::{Config, LcdInterface, SerLcd};
///
/// # struct Bus;
/// # impl LcdInterface for Bus {
/// #     type Error = ();
/// #     fn write_frame(&mut self, _bytes: &[u8]) -> Result<(), ()> { Ok(()) }
/// # }
/// # fn millis() -> u32 { 0 }
/// let mut lcd: SerLcd<_, _> = SerLcd::new(Bus, millis, Config::default());
/// lcd.begin();
///
/// let _ = lcd.set_cursor(0, 1);
/// let _ = write!(lcd, "T={}C", 21);
///
/// loop {
///     lcd.tick();
///     // ... rest of the control loop
/// #   break;
/// }
/// ```
pub struct SerLcd<I, C, const N: usize = DEFAULT_QUEUE_SIZE>
where
    I: LcdInterface,
    C: Clock,
{
    /// Bus transport
    interface: I,
    /// Millisecond time source
    clock: C,
    /// Driver configuration
    config: Config,
    /// Pending commands
    queue: CommandQueue<N>,
    /// Dispatch state
    state: State,
    /// When the current Processing or Error window started
    since_ms: u32,
    /// Length of the current Processing window
    settle_ms: u32,
    /// Failure counter
    errors: ErrorTracker,
    /// Display content was lost and should be redrawn
    needs_refresh: bool,
}

impl<I, C, const N: usize> SerLcd<I, C, N>
where
    I: LcdInterface,
    C: Clock,
{
    // Reinitialization queues two commands; the queue holds N - 1.
    const VALID: () = assert!(N >= 3, "SerLcd needs a queue of at least 3 slots");

    /// Create a new driver in the `Ready` state with an empty queue
    ///
    /// Nothing is sent until [`tick`](Self::tick) is called. Call
    /// [`begin`](Self::begin) first when the module has just been powered up.
    ///
    /// `N` must be at least 3; smaller queues fail to compile.
    pub fn new(interface: I, clock: C, config: Config) -> Self {
        let () = Self::VALID;
        Self {
            interface,
            clock,
            config,
            queue: CommandQueue::new(),
            state: State::Ready,
            since_ms: 0,
            settle_ms: 0,
            errors: ErrorTracker::new(),
            needs_refresh: true,
        }
    }

    /// Reinitialize, then hold off for the init time while the module boots
    pub fn begin(&mut self) {
        self.reinitialize();
        self.since_ms = self.clock.now_ms();
        self.settle_ms = self.config.timing.init_ms;
        self.state = State::Processing;
    }

    /// Reset the display to a known baseline
    ///
    /// Discards everything queued, re-arms the failure counter, raises the
    /// refresh flag and queues a clear followed by the default backlight.
    pub fn reinitialize(&mut self) {
        self.queue.reset();
        self.errors.reset();
        self.needs_refresh = true;
        self.state = State::Ready;

        // A refusal here is counted like any other.
        let _ = self.enqueue(Command::clear());
        let _ = self.enqueue(Command::Backlight(self.config.default_backlight));
    }

    /// Advance the state machine by one step
    ///
    /// Sends at most one command. Returns whether the driver is `Ready`
    /// afterwards; this is a readiness gate, not the outcome of any particular
    /// command.
    pub fn tick(&mut self) -> bool {
        match self.try_tick() {
            Ok(ready) => ready,
            Err(_) => self.is_ready(),
        }
    }

    /// Like [`tick`](Self::tick), but also reports a failed transaction
    ///
    /// The failure has already been counted (and possibly escalated) when this
    /// returns; the failed command is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] if this step's transaction failed.
    pub fn try_tick(&mut self) -> Result<bool, Error<I>> {
        let now = self.clock.now_ms();

        match self.state {
            State::Processing => {
                if has_elapsed(now, self.since_ms, self.settle_ms) {
                    self.state = State::Ready;
                    self.dispatch(now)?;
                }
            }
            State::Error => {
                if has_elapsed(now, self.since_ms, self.config.timing.error_reset_ms) {
                    self.recover();
                }
                return Ok(false);
            }
            State::Ready => self.dispatch(now)?,
            State::AwaitingResponse => {}
        }

        Ok(self.is_ready())
    }

    /// Send the head command, if any
    fn dispatch(&mut self, now: u32) -> DisplayResult<I> {
        let Some(cmd) = self.queue.peek() else {
            return Ok(());
        };

        let frame = encode(&cmd);
        match self.interface.write_frame(frame.as_bytes()) {
            Ok(()) => {
                self.queue.advance_head();
                self.since_ms = now;
                self.settle_ms = if cmd.is_clear() {
                    self.config.timing.clear_ms
                } else {
                    self.config.timing.command_ms
                };
                self.state = State::Processing;
                Ok(())
            }
            Err(e) => {
                if self.config.debug {
                    debug!("serlcd: transaction failed for {cmd:?}: {e:?}");
                }
                // Dropped, not retried.
                self.queue.advance_head();
                self.record_failure(Failure::Transaction, now);
                Err(Error::Interface(e))
            }
        }
    }

    /// Count a failure and escalate past the threshold
    fn record_failure(&mut self, failure: Failure, now: u32) {
        let threshold = self.config.error_threshold;
        let verdict = self.errors.record(failure, threshold, now);

        if self.config.debug && self.errors.count() >= threshold {
            debug!(
                "serlcd: error #{} ({}) in state {}",
                self.errors.count(),
                failure.as_str(),
                self.state
            );
        }

        if verdict == Verdict::Escalate {
            self.queue.reset();
            self.needs_refresh = true;
            self.state = State::Error;
            self.since_ms = now;
            warn!(
                "serlcd: {} failures (threshold {threshold}), entering error state",
                self.errors.count()
            );
        }
    }

    /// Leave the error state: re-arm and queue the baseline ahead of pending work
    fn recover(&mut self) {
        self.errors.reset();
        self.needs_refresh = true;
        self.state = State::Ready;

        let sequence = [
            Command::clear(),
            Command::Backlight(self.config.default_backlight),
        ];
        if self.queue.free() < sequence.len() {
            warn!(
                "serlcd: dropping {} commands queued during recovery",
                self.queue.len()
            );
            self.queue.reset();
        }
        for cmd in sequence.into_iter().rev() {
            let _ = self.queue.push_front(cmd);
        }
        info!("serlcd: recovered, reinitializing display");
    }

    /// Queue a command
    ///
    /// Accepted in every state; commands queued while in `Error` are sent
    /// after recovery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueFull`] if no slot is free. The refusal is
    /// counted towards the error threshold.
    pub fn enqueue(&mut self, cmd: Command) -> DisplayResult<I> {
        if self.queue.push(cmd).is_err() {
            let now = self.clock.now_ms();
            self.record_failure(Failure::QueueFull, now);
            return Err(Error::QueueFull);
        }
        Ok(())
    }

    /// Clear the display and home the cursor
    pub fn clear(&mut self) -> DisplayResult<I> {
        self.enqueue(Command::clear())
    }

    /// Move the cursor to column 0, row 0
    pub fn home(&mut self) -> DisplayResult<I> {
        self.enqueue(Command::home())
    }

    /// Move the cursor to `col`, `row` (row clamped to 0-3)
    pub fn set_cursor(&mut self, col: u8, row: u8) -> DisplayResult<I> {
        self.enqueue(Command::set_cursor(col, row))
    }

    /// Set the RGB backlight
    pub fn set_backlight(&mut self, r: u8, g: u8, b: u8) -> DisplayResult<I> {
        self.set_backlight_rgb(Rgb::new(r, g, b))
    }

    /// Set the RGB backlight from an [`Rgb`] value
    pub fn set_backlight_rgb(&mut self, color: Rgb) -> DisplayResult<I> {
        if self.config.debug {
            debug!("serlcd: queueing backlight {color:?}");
        }
        let result = self.enqueue(Command::Backlight(color));
        if self.config.debug {
            debug!(
                "serlcd: backlight command {}",
                if result.is_ok() { "queued" } else { "failed to queue" }
            );
        }
        result
    }

    /// Turn the backlight off
    pub fn no_backlight(&mut self) -> DisplayResult<I> {
        self.set_backlight_rgb(Rgb::OFF)
    }

    /// Turn the display on
    pub fn display_on(&mut self) -> DisplayResult<I> {
        self.enqueue(Command::display_on())
    }

    /// Turn the display off (content is kept)
    pub fn display_off(&mut self) -> DisplayResult<I> {
        self.enqueue(Command::display_off())
    }

    /// Print one character at the cursor
    pub fn write_byte(&mut self, byte: u8) -> DisplayResult<I> {
        self.enqueue(Command::character(byte))
    }

    /// Print characters until one is refused
    ///
    /// Returns how many were queued.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in bytes {
            if self.write_byte(byte).is_err() {
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Set the power-up hold-off used by [`begin`](Self::begin)
    pub fn set_init_time(&mut self, ms: u32) -> &mut Self {
        self.config.timing.init_ms = ms;
        self
    }

    /// Set the settle time after ordinary commands
    pub fn set_command_time(&mut self, ms: u32) -> &mut Self {
        self.config.timing.command_ms = ms;
        self
    }

    /// Set the settle time after a clear
    pub fn set_clear_time(&mut self, ms: u32) -> &mut Self {
        self.config.timing.clear_ms = ms;
        self
    }

    /// Set the time spent in the error state before reinitializing
    pub fn set_error_reset_time(&mut self, ms: u32) -> &mut Self {
        self.config.timing.error_reset_ms = ms;
        self
    }

    /// Set how many failures are absorbed before escalating
    pub fn set_error_threshold(&mut self, threshold: u8) -> &mut Self {
        self.config.error_threshold = threshold;
        self
    }

    /// Enable or disable diagnostic logging for this instance
    pub fn set_debug(&mut self, enable: bool) -> &mut Self {
        self.config.debug = enable;
        self
    }

    /// Access the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Total queue slots (`N`)
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Commands waiting to be sent
    pub fn queue_count(&self) -> usize {
        self.queue.len()
    }

    /// Queue occupancy as a percentage of `N`
    pub fn queue_percent_full(&self) -> f32 {
        self.queue.percent_full()
    }

    /// Failures counted since the last reinitialization
    pub fn error_count(&self) -> u8 {
        self.errors.count()
    }

    /// Most recent failure and the clock reading when it happened
    ///
    /// Kept across recovery and reinitialization.
    pub fn last_failure(&self) -> Option<(Failure, u32)> {
        self.errors.last_failure()
    }

    /// Current dispatch state
    pub fn state(&self) -> State {
        self.state
    }

    /// Current dispatch state as an upper-case name
    pub fn state_name(&self) -> &'static str {
        self.state.as_str()
    }

    /// Whether the next tick may send
    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    /// Whether the driver is waiting (settling, booting or recovering)
    pub fn is_busy(&self) -> bool {
        self.state != State::Ready
    }

    /// Whether the driver is in the error state
    pub fn has_error(&self) -> bool {
        self.state.is_error()
    }

    /// Whether the display content was lost and should be redrawn
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Acknowledge the refresh flag after redrawing
    pub fn clear_refresh_flag(&mut self) {
        self.needs_refresh = false;
    }

    /// Access the bus transport
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Mutably access the bus transport
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Mutably access the clock
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Give back the transport and clock
    pub fn release(self) -> (I, C) {
        (self.interface, self.clock)
    }
}

impl<I, C, const N: usize> core::fmt::Write for SerLcd<I, C, N>
where
    I: LcdInterface,
    C: Clock,
{
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        if self.write_bytes(s.as_bytes()) == s.len() {
            Ok(())
        } else {
            Err(core::fmt::Error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{RGB_COMMAND, SETTING_COMMAND, SPECIAL_COMMAND};
    use crate::config::Builder;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockInterface {
        frames: Vec<Vec<u8>>,
        fail: bool,
    }

    impl LcdInterface for MockInterface {
        type Error = &'static str;

        fn write_frame(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.frames.push(bytes.to_vec());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockClock {
        now: u32,
    }

    impl Clock for MockClock {
        fn now_ms(&mut self) -> u32 {
            self.now
        }
    }

    fn test_lcd<const N: usize>(config: Config) -> SerLcd<MockInterface, MockClock, N> {
        SerLcd::new(MockInterface::default(), MockClock::default(), config)
    }

    fn set_time<const N: usize>(lcd: &mut SerLcd<MockInterface, MockClock, N>, now: u32) {
        lcd.clock_mut().now = now;
    }

    fn queued<const N: usize>(lcd: &SerLcd<MockInterface, MockClock, N>) -> Vec<Command> {
        lcd.queue.iter().collect()
    }

    fn fast_config() -> Config {
        Builder::new().command_ms(5).clear_ms(50).error_reset_ms(100).build()
    }

    #[test]
    fn test_new_driver_is_ready_and_empty() {
        let lcd = test_lcd::<32>(Config::default());
        assert!(lcd.is_ready());
        assert!(!lcd.is_busy());
        assert_eq!(lcd.state_name(), "READY");
        assert_eq!(lcd.queue_count(), 0);
        assert_eq!(lcd.queue_capacity(), 32);
        assert_eq!(lcd.error_count(), 0);
        assert!(lcd.needs_refresh());
    }

    #[test]
    fn test_capacity_is_n_minus_one_and_overflow_counts() {
        let mut lcd = test_lcd::<32>(Config::default());
        for i in 0..31u8 {
            assert!(lcd.write_byte(b'a' + (i % 26)).is_ok(), "enqueue {i}");
        }
        assert!(matches!(lcd.write_byte(b'z'), Err(Error::QueueFull)));
        assert_eq!(lcd.error_count(), 1);
        assert_eq!(lcd.queue_count(), 31);
        // One failure is within the default threshold of 1.
        assert!(lcd.is_ready());
    }

    #[test]
    fn test_fifo_order_on_the_wire() {
        let mut lcd = test_lcd::<32>(fast_config());
        lcd.home().unwrap();
        lcd.write_byte(b'H').unwrap();
        lcd.set_cursor(4, 1).unwrap();
        lcd.write_byte(b'i').unwrap();

        let mut now = 0;
        while lcd.queue_count() > 0 {
            set_time(&mut lcd, now);
            lcd.tick();
            now += 5;
        }

        assert_eq!(
            lcd.interface().frames,
            alloc::vec![
                alloc::vec![SPECIAL_COMMAND, 0x02],
                alloc::vec![b'H'],
                alloc::vec![SPECIAL_COMMAND, 0x80 | 0x44],
                alloc::vec![b'i'],
            ]
        );
    }

    #[test]
    fn test_prefix_character_is_escaped_on_the_wire() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.write_byte(SPECIAL_COMMAND).unwrap();
        lcd.tick();
        assert_eq!(
            lcd.interface().frames,
            alloc::vec![alloc::vec![SPECIAL_COMMAND, SPECIAL_COMMAND]]
        );
    }

    #[test]
    fn test_scenario_clear_then_backlight() {
        let mut lcd = test_lcd::<32>(fast_config());
        lcd.clear().unwrap();
        lcd.set_backlight(10, 20, 30).unwrap();

        set_time(&mut lcd, 1_000);
        assert!(!lcd.tick());
        assert_eq!(lcd.state(), State::Processing);
        assert_eq!(
            lcd.interface().frames,
            alloc::vec![alloc::vec![SPECIAL_COMMAND, 0x01]]
        );

        set_time(&mut lcd, 1_049);
        assert!(!lcd.tick());
        assert_eq!(lcd.interface().frames.len(), 1);

        set_time(&mut lcd, 1_050);
        lcd.tick();
        assert_eq!(
            lcd.interface().frames[1],
            alloc::vec![SETTING_COMMAND, RGB_COMMAND, 10, 20, 30]
        );
        assert_eq!(lcd.queue_count(), 0);
    }

    #[test]
    fn test_timing_gate_holds_for_settle_time() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();

        set_time(&mut lcd, 100);
        lcd.tick();
        for t in 100..105 {
            set_time(&mut lcd, t);
            assert!(!lcd.tick(), "tick at {t} must not dispatch");
            assert_eq!(lcd.interface().frames.len(), 1);
        }

        set_time(&mut lcd, 105);
        lcd.tick();
        assert_eq!(lcd.interface().frames.len(), 2);
    }

    #[test]
    fn test_processing_without_work_becomes_ready() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.write_byte(b'a').unwrap();
        set_time(&mut lcd, 0);
        assert!(!lcd.tick());
        set_time(&mut lcd, 5);
        assert!(lcd.tick());
        assert!(lcd.tick());
    }

    #[test]
    fn test_timing_gate_across_clock_wrap() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();

        set_time(&mut lcd, u32::MAX - 2);
        lcd.tick();
        set_time(&mut lcd, 1);
        lcd.tick();
        assert_eq!(lcd.interface().frames.len(), 1);
        set_time(&mut lcd, 2);
        lcd.tick();
        assert_eq!(lcd.interface().frames.len(), 2);
    }

    #[test]
    fn test_threshold_escalation() {
        let config = Builder::new().error_threshold(3).build();
        let mut lcd = test_lcd::<8>(config);
        for c in b"abcde" {
            lcd.write_byte(*c).unwrap();
        }
        lcd.interface_mut().fail = true;

        for n in 1..=3u8 {
            assert!(matches!(lcd.try_tick(), Err(Error::Interface("nack"))));
            assert_eq!(lcd.state(), State::Ready);
            assert_eq!(lcd.error_count(), n);
        }
        assert_eq!(lcd.queue_count(), 2);

        assert!(!lcd.tick());
        assert!(lcd.has_error());
        assert_eq!(lcd.state_name(), "ERROR");
        assert_eq!(lcd.queue_count(), 0);
    }

    #[test]
    fn test_failed_command_is_dropped_not_retried() {
        let config = Builder::new().error_threshold(5).build();
        let mut lcd = test_lcd::<8>(config);
        lcd.write_byte(b'x').unwrap();
        lcd.write_byte(b'y').unwrap();

        lcd.interface_mut().fail = true;
        assert!(lcd.tick(), "absorbed failure leaves the driver ready");
        lcd.interface_mut().fail = false;
        lcd.tick();

        assert_eq!(lcd.interface().frames, alloc::vec![alloc::vec![b'y']]);
    }

    #[test]
    fn test_error_state_refuses_to_dispatch() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.interface_mut().fail = true;
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        set_time(&mut lcd, 10);
        lcd.tick();
        lcd.tick();
        assert!(lcd.has_error());

        lcd.interface_mut().fail = false;
        lcd.write_byte(b'c').unwrap();
        set_time(&mut lcd, 109);
        assert!(!lcd.tick());
        assert!(lcd.has_error());
        assert!(lcd.interface().frames.is_empty());
    }

    #[test]
    fn test_recovery_replays_reinit_sequence() {
        let mut lcd = test_lcd::<8>(fast_config());
        lcd.interface_mut().fail = true;
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        set_time(&mut lcd, 10);
        lcd.tick();
        lcd.tick();
        assert!(lcd.has_error());
        lcd.clear_refresh_flag();

        set_time(&mut lcd, 110);
        assert!(!lcd.tick(), "recovery tick reports not ready");
        assert_eq!(lcd.state(), State::Ready);
        assert_eq!(lcd.error_count(), 0);
        assert!(lcd.needs_refresh());
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );
    }

    #[test]
    fn test_commands_issued_during_error_follow_reinit_sequence() {
        let config = Builder::new()
            .error_reset_ms(100)
            .default_backlight(Rgb::BLUE)
            .build();
        let mut lcd = test_lcd::<8>(config);
        lcd.interface_mut().fail = true;
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        lcd.write_byte(b'c').unwrap();
        lcd.tick();
        lcd.tick();
        assert!(lcd.has_error());
        assert_eq!(lcd.queue_count(), 0, "queued work is lost on escalation");

        lcd.write_byte(b'd').unwrap();
        set_time(&mut lcd, 100);
        lcd.tick();

        assert_eq!(
            queued(&lcd),
            alloc::vec![
                Command::clear(),
                Command::Backlight(Rgb::BLUE),
                Command::character(b'd')
            ]
        );
    }

    #[test]
    fn test_recovery_discards_error_window_commands_when_short_of_room() {
        let mut lcd = test_lcd::<4>(fast_config());
        lcd.interface_mut().fail = true;
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        lcd.tick();
        lcd.tick();
        assert!(lcd.has_error());
        for c in b"xyz" {
            lcd.write_byte(*c).unwrap();
        }
        set_time(&mut lcd, 100);
        lcd.tick();
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );
    }

    #[test]
    fn test_queue_full_escalates_with_zero_threshold() {
        let config = Builder::new().error_threshold(0).build();
        let mut lcd = test_lcd::<3>(config);
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        assert!(matches!(lcd.write_byte(b'c'), Err(Error::QueueFull)));
        assert!(lcd.has_error());
        assert_eq!(lcd.queue_count(), 0);
    }

    #[test]
    fn test_begin_holds_for_init_time() {
        let config = Builder::new().init_ms(1000).build();
        let mut lcd = test_lcd::<8>(config);
        set_time(&mut lcd, 20);
        lcd.begin();
        assert_eq!(lcd.state(), State::Processing);
        assert_eq!(lcd.queue_count(), 2);

        set_time(&mut lcd, 1_019);
        lcd.tick();
        assert!(lcd.interface().frames.is_empty());

        set_time(&mut lcd, 1_020);
        lcd.tick();
        assert_eq!(
            lcd.interface().frames,
            alloc::vec![alloc::vec![SPECIAL_COMMAND, 0x01]]
        );
    }

    #[test]
    fn test_reinitialize_discards_queue_and_rearms() {
        let mut lcd = test_lcd::<8>(Config::default());
        lcd.write_byte(b'q').unwrap();
        lcd.interface_mut().fail = true;
        lcd.tick();
        assert_eq!(lcd.error_count(), 1);
        lcd.write_byte(b'r').unwrap();
        lcd.clear_refresh_flag();

        lcd.reinitialize();
        assert_eq!(lcd.error_count(), 0);
        assert!(lcd.needs_refresh());
        assert!(lcd.is_ready());
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );
    }

    #[test]
    fn test_smallest_queue_holds_reinit_sequence() {
        let config = Builder::new().error_threshold(0).error_reset_ms(100).build();
        let mut lcd = test_lcd::<3>(config);

        lcd.begin();
        assert_eq!(lcd.state(), State::Processing);
        assert_eq!(lcd.error_count(), 0);
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );

        lcd.reinitialize();
        assert_eq!(lcd.error_count(), 0);
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );

        lcd.interface_mut().fail = true;
        set_time(&mut lcd, 10);
        lcd.tick();
        assert!(lcd.has_error());
        lcd.interface_mut().fail = false;
        lcd.write_byte(b'x').unwrap();
        lcd.write_byte(b'y').unwrap();

        set_time(&mut lcd, 110);
        lcd.tick();
        assert_eq!(lcd.error_count(), 0);
        assert_eq!(
            queued(&lcd),
            alloc::vec![Command::clear(), Command::Backlight(Rgb::WHITE)]
        );
    }

    #[test]
    fn test_enqueue_while_processing() {
        let mut lcd = test_lcd::<4>(fast_config());
        lcd.write_byte(b'a').unwrap();
        set_time(&mut lcd, 0);
        lcd.tick();
        assert_eq!(lcd.state(), State::Processing);

        for c in b"bcd" {
            lcd.write_byte(*c).unwrap();
        }
        set_time(&mut lcd, 4);
        assert!(!lcd.tick());
        assert_eq!(lcd.interface().frames, alloc::vec![alloc::vec![b'a']]);
        assert_eq!(lcd.queue_count(), 3);

        assert!(matches!(lcd.write_byte(b'e'), Err(Error::QueueFull)));
        assert_eq!(lcd.state(), State::Processing);
        assert_eq!(lcd.queue_count(), 3);

        set_time(&mut lcd, 6);
        assert!(matches!(lcd.write_byte(b'f'), Err(Error::QueueFull)));
        assert!(lcd.has_error());
        assert_eq!(lcd.queue_count(), 0);
        assert_eq!(lcd.last_failure(), Some((Failure::QueueFull, 6)));
        assert_eq!(lcd.interface().frames.len(), 1);
    }

    #[test]
    fn test_last_failure_survives_recovery() {
        let mut lcd = test_lcd::<8>(fast_config());
        assert_eq!(lcd.last_failure(), None);
        lcd.interface_mut().fail = true;
        lcd.write_byte(b'a').unwrap();
        lcd.write_byte(b'b').unwrap();
        set_time(&mut lcd, 7);
        lcd.tick();
        lcd.tick();
        assert!(lcd.has_error());

        set_time(&mut lcd, 107);
        lcd.tick();
        assert_eq!(lcd.error_count(), 0);
        assert_eq!(lcd.last_failure(), Some((Failure::Transaction, 7)));
    }

    #[test]
    fn test_fmt_write_queues_characters() {
        use core::fmt::Write;

        let mut lcd = test_lcd::<32>(Config::default());
        write!(lcd, "T={}|", 7).unwrap();
        assert_eq!(
            queued(&lcd),
            alloc::vec![
                Command::character(b'T'),
                Command::character(b'='),
                Command::character(b'7'),
                Command::character(b'|'),
            ]
        );
    }

    #[test]
    fn test_write_bytes_stops_at_first_refusal() {
        let config = Builder::new().error_threshold(10).build();
        let mut lcd = test_lcd::<4>(config);
        assert_eq!(lcd.write_bytes(b"hello"), 3);
        assert_eq!(lcd.error_count(), 1);

        use core::fmt::Write;
        assert!(write!(lcd, "x").is_err());
    }

    #[test]
    fn test_convenience_commands_encode() {
        let mut lcd = test_lcd::<16>(Builder::new().command_ms(0).build());
        lcd.no_backlight().unwrap();
        lcd.display_off().unwrap();
        lcd.display_on().unwrap();
        lcd.set_backlight_rgb(Rgb::RED).unwrap();
        lcd.set_cursor(0, 7).unwrap();
        while lcd.queue_count() > 0 {
            lcd.tick();
        }
        assert_eq!(
            lcd.interface().frames,
            alloc::vec![
                alloc::vec![SETTING_COMMAND, RGB_COMMAND, 0, 0, 0],
                alloc::vec![SPECIAL_COMMAND, 0x08],
                alloc::vec![SPECIAL_COMMAND, 0x0C],
                alloc::vec![SETTING_COMMAND, RGB_COMMAND, 255, 0, 0],
                alloc::vec![SPECIAL_COMMAND, 0x80 | 0x54],
            ]
        );
    }

    #[test]
    fn test_status_accessors() {
        let mut lcd = test_lcd::<4>(Config::default());
        lcd.write_byte(b'a').unwrap();
        assert!((lcd.queue_percent_full() - 25.0).abs() < f32::EPSILON);
        assert!(lcd.needs_refresh());
        lcd.clear_refresh_flag();
        assert!(!lcd.needs_refresh());
    }

    #[test]
    fn test_runtime_setters() {
        let mut lcd = test_lcd::<4>(Config::default());
        lcd.set_init_time(350)
            .set_command_time(2)
            .set_clear_time(20)
            .set_error_reset_time(250)
            .set_error_threshold(4)
            .set_debug(true);
        let config = lcd.config();
        assert_eq!(config.timing.init_ms, 350);
        assert_eq!(config.timing.command_ms, 2);
        assert_eq!(config.timing.clear_ms, 20);
        assert_eq!(config.timing.error_reset_ms, 250);
        assert_eq!(config.error_threshold, 4);
        assert!(config.debug);
    }

    #[test]
    fn test_release_returns_parts() {
        let mut lcd = test_lcd::<4>(fast_config());
        lcd.write_byte(b'k').unwrap();
        lcd.tick();
        let (interface, clock) = lcd.release();
        assert_eq!(interface.frames, alloc::vec![alloc::vec![b'k']]);
        assert_eq!(clock.now, 0);
    }
}
