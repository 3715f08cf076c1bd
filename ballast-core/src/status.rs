//! ViewModel lifecycle and side-job restart bookkeeping.

use std::fmt;

/// Lifecycle of a ViewModel.
///
/// ```text
/// Created → Started → Running → ShuttingDown → Closed
/// ```
///
/// An immediate shutdown may jump from any state straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Status {
    /// Configured, but no loops are running yet. Inputs sent now are buffered.
    Created = 0,
    /// Processing loops have been spawned.
    Started = 1,
    /// Interceptors have been started and the ViewModel is fully operational.
    Running = 2,
    /// A graceful shutdown is draining the queues.
    ShuttingDown = 3,
    /// Everything has been cancelled; nothing more will be processed.
    Closed = 4,
}

impl Status {
    /// Decode a status stored as its discriminant.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Status::Created,
            1 => Status::Started,
            2 => Status::Running,
            3 => Status::ShuttingDown,
            _ => Status::Closed,
        }
    }

    /// Whether new inputs are still accepted.
    pub const fn is_accepting(self) -> bool {
        matches!(self, Status::Created | Status::Started | Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Created => "Created",
            Status::Started => "Started",
            Status::Running => "Running",
            Status::ShuttingDown => "ShuttingDown",
            Status::Closed => "Closed",
        };
        f.write_str(name)
    }
}

/// Whether a side job is running for the first time under its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestartState {
    /// No side job had previously been launched with this key.
    Initial,
    /// A side job with this key had been launched `n` times before.
    Restarted(u32),
}

impl RestartState {
    /// How many times the key had been launched before this run.
    pub const fn restart_count(self) -> u32 {
        match self {
            RestartState::Initial => 0,
            RestartState::Restarted(count) => count,
        }
    }

    /// The restart state of the next launch under the same key.
    pub const fn next(self) -> Self {
        RestartState::Restarted(self.restart_count() + 1)
    }
}

impl fmt::Display for RestartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartState::Initial => f.write_str("Initial"),
            RestartState::Restarted(count) => write!(f, "Restarted({count})"),
        }
    }
}
