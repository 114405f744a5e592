//! Fixed-capacity command queue
//!
//! [`CommandQueue`] is a circular buffer of [`Command`] slots indexed by
//! `head` (next to send) and `tail` (next free slot). One slot is always left
//! unused so that `head == tail` unambiguously means empty; a queue of
//! capacity `N` therefore holds at most `N - 1` commands.
//!
//! ## Example
//!
//! ```
//! use serlcd::{Command, CommandQueue};
//!
//! let mut queue: CommandQueue<4> = CommandQueue::new();
//! assert!(queue.push(Command::clear()).is_ok());
//! assert!(queue.push(Command::home()).is_ok());
//! assert!(queue.push(Command::character(b'!')).is_ok());
//! assert!(queue.push(Command::character(b'?')).is_err()); // N - 1 = 3 usable
//!
//! assert_eq!(queue.peek(), Some(Command::clear()));
//! queue.advance_head();
//! assert_eq!(queue.len(), 2);
//! ```

use crate::command::Command;

/// Queue capacity used by the driver unless overridden
pub const DEFAULT_QUEUE_SIZE: usize = 32;

/// Circular buffer of pending commands
#[derive(Clone, Debug)]
pub struct CommandQueue<const N: usize> {
    slots: [Option<Command>; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CommandQueue<N> {
    const VALID: () = assert!(N >= 2, "CommandQueue needs at least 2 slots");

    /// Create an empty queue
    pub const fn new() -> Self {
        let () = Self::VALID;
        Self {
            slots: [None; N],
            head: 0,
            tail: 0,
        }
    }

    /// Total number of slots, including the reserved one
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        if self.tail >= self.head {
            self.tail - self.head
        } else {
            N - (self.head - self.tail)
        }
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Whether the next push would fail
    pub fn is_full(&self) -> bool {
        (self.tail + 1) % N == self.head
    }

    /// Number of commands that can still be pushed
    pub fn free(&self) -> usize {
        N - 1 - self.len()
    }

    /// Occupancy as a percentage of `N`
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_full(&self) -> f32 {
        (self.len() as f32 * 100.0) / N as f32
    }

    /// Append a command at the tail
    ///
    /// Hands the command back if no slot is free.
    pub fn push(&mut self, cmd: Command) -> Result<(), Command> {
        let next_tail = (self.tail + 1) % N;
        if next_tail == self.head {
            return Err(cmd);
        }
        self.slots[self.tail] = Some(cmd);
        self.tail = next_tail;
        Ok(())
    }

    /// Insert a command ahead of everything already queued
    ///
    /// Hands the command back if no slot is free.
    pub fn push_front(&mut self, cmd: Command) -> Result<(), Command> {
        if self.is_full() {
            return Err(cmd);
        }
        self.head = (self.head + N - 1) % N;
        self.slots[self.head] = Some(cmd);
        Ok(())
    }

    /// The command at the head, without removing it
    pub fn peek(&self) -> Option<Command> {
        if self.is_empty() {
            None
        } else {
            self.slots[self.head]
        }
    }

    /// Drop the head command
    ///
    /// Does nothing on an empty queue.
    pub fn advance_head(&mut self) {
        if !self.is_empty() {
            self.head = (self.head + 1) % N;
        }
    }

    /// Discard everything by rewinding both indices to 0
    ///
    /// Slots are left as they are and get overwritten by later pushes.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Iterate over queued commands from head to tail
    pub fn iter(&self) -> impl Iterator<Item = Command> + '_ {
        (0..self.len()).filter_map(move |i| self.slots[(self.head + i) % N])
    }
}
