//! Kill switch: graceful shutdown requested from outside the ViewModel.

use super::Interceptor;
use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

/// Shuts the ViewModel down gracefully when its [`KillSwitchTrigger`] fires.
///
/// Dropping the trigger without firing leaves the ViewModel running.
///
/// # Example
///
/// ```rust,ignore
/// let (kill_switch, trigger) = KillSwitch::new(Duration::from_secs(1));
/// let view_model = ViewModel::builder(state, handler)
///     .interceptor(kill_switch)
///     .build();
/// view_model.start();
///
/// trigger.shut_down();
/// ```
pub struct KillSwitch {
    grace: Duration,
    signal: Mutex<Option<oneshot::Receiver<()>>>,
}

/// Fires a [`KillSwitch`].
#[derive(Debug)]
pub struct KillSwitchTrigger {
    signal: oneshot::Sender<()>,
}

impl KillSwitch {
    /// Create a kill switch that allows `grace` for draining queued work.
    pub fn new(grace: Duration) -> (Self, KillSwitchTrigger) {
        let (signal, receiver) = oneshot::channel();
        (
            Self {
                grace,
                signal: Mutex::new(Some(receiver)),
            },
            KillSwitchTrigger { signal },
        )
    }
}

impl KillSwitchTrigger {
    /// Request a graceful shutdown.
    pub fn shut_down(self) {
        // The ViewModel may already be gone; nothing left to stop then.
        let _ = self.signal.send(());
    }
}

impl<I: Message, E: Message, S: Message> Interceptor<I, E, S> for KillSwitch {
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        let Some(signal) = self.signal.lock().take() else {
            return;
        };
        let grace = self.grace;
        let target = view_model.clone();
        view_model.spawn(async move {
            if signal.await.is_ok() {
                target.logger().info("kill switch fired");
                target.shut_down_gracefully(grace).await;
            }
        });
    }

    async fn on_notification(
        &self,
        _notification: &BallastNotification<I, E, S>,
        _view_model: &ViewModelHandle<I, E, S>,
    ) {
    }
}
