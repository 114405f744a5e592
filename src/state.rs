//! Dispatch states

/// State of the dispatch state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum State {
    /// Idle; the next tick may send the head command
    #[default]
    Ready,
    /// A frame was sent (or the module is booting); waiting out its settle time
    Processing,
    /// Waiting for a reply from the display
    ///
    /// Reserved: the protocol has no read-back, so no transition enters it.
    AwaitingResponse,
    /// Failures passed the threshold; waiting out the recovery time
    Error,
}

impl State {
    /// Upper-case name for status output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Processing => "PROCESSING",
            Self::AwaitingResponse => "AWAITING_RESPONSE",
            Self::Error => "ERROR",
        }
    }

    /// Check if this is the error state
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl core::fmt::Display for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
