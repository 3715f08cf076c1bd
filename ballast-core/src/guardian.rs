//! # Guardian (handler usage contract)
//!
//! A guardian watches exactly one Input handler invocation. Every scope
//! operation asks the guardian first, and the coordinator closes it once the
//! handler returns.
//!
//! The rule being enforced: an invocation does one primary thing (read the
//! state, update the state, post an event, or explicitly do nothing) and may
//! then launch side jobs, which must be its trailing statements.
//!
//! ```text
//! Open { touched, side_jobs, used } ──close()──▶ Closed
//!      │                                         │
//!      └─ check_*() after a side job ──▶ error   └─ anything ──▶ error
//! ```

use crate::error::GuardianError;

/// Runtime checker for a single Input handler invocation.
///
/// Each `check_*` method validates that the operation is allowed at this
/// point of the invocation and records it. [`close`](Self::close) is called
/// once by the coordinator after the handler returns.
pub trait InputStrategyGuardian: Send {
    /// Called before the handler reads the current state.
    fn check_state_access(&mut self) -> Result<(), GuardianError>;

    /// Called before the handler replaces the current state.
    fn check_state_update(&mut self) -> Result<(), GuardianError>;

    /// Called before the handler posts an Event.
    fn check_post_event(&mut self) -> Result<(), GuardianError>;

    /// Called when the handler explicitly does nothing.
    fn check_no_op(&mut self) -> Result<(), GuardianError>;

    /// Called when the handler posts a side job.
    fn check_side_job(&mut self) -> Result<(), GuardianError>;

    /// Finish the invocation, verifying a primary action happened.
    fn close(&mut self) -> Result<(), GuardianError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Usage {
    state_accessed: bool,
    side_jobs_posted: bool,
    used_properly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open(Usage),
    Closed,
}

/// The guardian used by the FIFO and LIFO strategies.
///
/// The state may be read and written any number of times, since those
/// strategies never run two handler bodies at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultGuardian {
    phase: Phase,
}

impl Default for DefaultGuardian {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultGuardian {
    /// Create a guardian for a fresh invocation.
    pub fn new() -> Self {
        Self {
            phase: Phase::Open(Usage::default()),
        }
    }

    /// Whether the invocation has read or written the state.
    pub fn state_accessed(&self) -> bool {
        matches!(self.phase, Phase::Open(usage) if usage.state_accessed)
    }

    /// Whether the invocation has been closed.
    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    fn open_usage(&mut self) -> Result<&mut Usage, GuardianError> {
        match &mut self.phase {
            Phase::Open(usage) => Ok(usage),
            Phase::Closed => Err(GuardianError::Closed),
        }
    }

    fn primary_action(&mut self, touches_state: bool) -> Result<(), GuardianError> {
        let usage = self.open_usage()?;
        if usage.side_jobs_posted {
            return Err(GuardianError::SideJobsMustBeLast);
        }
        usage.used_properly = true;
        if touches_state {
            usage.state_accessed = true;
        }
        Ok(())
    }
}

impl InputStrategyGuardian for DefaultGuardian {
    fn check_state_access(&mut self) -> Result<(), GuardianError> {
        self.primary_action(true)
    }

    fn check_state_update(&mut self) -> Result<(), GuardianError> {
        self.primary_action(true)
    }

    fn check_post_event(&mut self) -> Result<(), GuardianError> {
        self.primary_action(false)
    }

    fn check_no_op(&mut self) -> Result<(), GuardianError> {
        self.primary_action(false)
    }

    fn check_side_job(&mut self) -> Result<(), GuardianError> {
        let usage = self.open_usage()?;
        usage.side_jobs_posted = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), GuardianError> {
        let usage = *self.open_usage()?;
        self.phase = Phase::Closed;
        if usage.used_properly {
            Ok(())
        } else {
            Err(GuardianError::NotHandledProperly)
        }
    }
}

/// The guardian used by the Parallel strategy.
///
/// Parallel invocations share the state without mutual exclusion, so each one
/// may touch it (read or write) at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelGuardian {
    inner: DefaultGuardian,
}

impl ParallelGuardian {
    /// Create a guardian for a fresh parallel invocation.
    pub fn new() -> Self {
        Self::default()
    }

    fn single_state_touch(&mut self) -> Result<(), GuardianError> {
        if self.inner.state_accessed() {
            return Err(GuardianError::StateAccessedMoreThanOnce);
        }
        self.inner.primary_action(true)
    }
}

impl InputStrategyGuardian for ParallelGuardian {
    fn check_state_access(&mut self) -> Result<(), GuardianError> {
        self.single_state_touch()
    }

    fn check_state_update(&mut self) -> Result<(), GuardianError> {
        self.single_state_touch()
    }

    fn check_post_event(&mut self) -> Result<(), GuardianError> {
        self.inner.check_post_event()
    }

    fn check_no_op(&mut self) -> Result<(), GuardianError> {
        self.inner.check_no_op()
    }

    fn check_side_job(&mut self) -> Result<(), GuardianError> {
        self.inner.check_side_job()
    }

    fn close(&mut self) -> Result<(), GuardianError> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_primary_action_closes_cleanly() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_state_update().unwrap();
        assert!(guardian.close().is_ok());
        assert!(guardian.is_closed());
    }

    #[test]
    fn test_state_can_be_touched_repeatedly() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_state_access().unwrap();
        guardian.check_state_update().unwrap();
        guardian.check_post_event().unwrap();
        assert!(guardian.close().is_ok());
    }

    #[test]
    fn test_side_job_followed_by_state_access_is_rejected() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_no_op().unwrap();
        guardian.check_side_job().unwrap();
        let err = guardian.check_state_access().unwrap_err();
        assert_eq!(err, GuardianError::SideJobsMustBeLast);
        assert_eq!(
            err.to_string(),
            "Side-Jobs must be the last statements of the InputHandler"
        );
    }

    #[test]
    fn test_every_primary_action_is_rejected_after_side_job() {
        let checks: [fn(&mut DefaultGuardian) -> Result<(), GuardianError>; 4] = [
            |g| g.check_state_access(),
            |g| g.check_state_update(),
            |g| g.check_post_event(),
            |g| g.check_no_op(),
        ];
        for check in checks {
            let mut guardian = DefaultGuardian::new();
            guardian.check_side_job().unwrap();
            assert_eq!(check(&mut guardian), Err(GuardianError::SideJobsMustBeLast));
        }
    }

    #[test]
    fn test_multiple_side_jobs_are_allowed() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_post_event().unwrap();
        guardian.check_side_job().unwrap();
        guardian.check_side_job().unwrap();
        assert!(guardian.close().is_ok());
    }

    #[test]
    fn test_close_without_primary_action_fails() {
        let mut guardian = DefaultGuardian::new();
        let err = guardian.close().unwrap_err();
        assert_eq!(err, GuardianError::NotHandledProperly);
        assert!(err.to_string().starts_with("Input was not handled properly"));
    }

    #[test]
    fn test_side_job_alone_is_not_proper_handling() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_side_job().unwrap();
        assert_eq!(guardian.close(), Err(GuardianError::NotHandledProperly));
    }

    #[test]
    fn test_nothing_allowed_after_close() {
        let mut guardian = DefaultGuardian::new();
        guardian.check_no_op().unwrap();
        guardian.close().unwrap();

        assert_eq!(guardian.check_state_access(), Err(GuardianError::Closed));
        assert_eq!(guardian.check_side_job(), Err(GuardianError::Closed));
        assert_eq!(guardian.close(), Err(GuardianError::Closed));
    }

    #[test]
    fn test_parallel_allows_one_state_touch() {
        let mut guardian = ParallelGuardian::new();
        guardian.check_state_update().unwrap();
        assert!(guardian.close().is_ok());
    }

    #[test]
    fn test_parallel_rejects_second_state_touch() {
        let mut guardian = ParallelGuardian::new();
        guardian.check_state_update().unwrap();
        assert_eq!(
            guardian.check_state_update(),
            Err(GuardianError::StateAccessedMoreThanOnce)
        );

        let mut guardian = ParallelGuardian::new();
        guardian.check_state_access().unwrap();
        assert_eq!(
            guardian.check_state_update(),
            Err(GuardianError::StateAccessedMoreThanOnce)
        );
    }

    #[test]
    fn test_parallel_still_requires_side_jobs_last() {
        let mut guardian = ParallelGuardian::new();
        guardian.check_side_job().unwrap();
        assert_eq!(
            guardian.check_post_event(),
            Err(GuardianError::SideJobsMustBeLast)
        );
    }
}
