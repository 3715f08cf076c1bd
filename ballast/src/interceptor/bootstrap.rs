//! Bootstrap interceptor: one initial Input per ViewModel.

use super::Interceptor;
use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message, Status};
use parking_lot::Mutex;

/// Sends one Input as soon as the ViewModel reports [`Status::Running`].
///
/// Typically used to kick off an initial load. The Input is produced lazily,
/// so it can capture whatever it needs at that moment.
pub struct BootstrapInterceptor<F> {
    initial_input: Mutex<Option<F>>,
}

impl<F> BootstrapInterceptor<F> {
    /// Send `initial_input()` once the ViewModel is running.
    pub fn new(initial_input: F) -> Self {
        Self {
            initial_input: Mutex::new(Some(initial_input)),
        }
    }
}

impl<I, E, S, F> Interceptor<I, E, S> for BootstrapInterceptor<F>
where
    I: Message,
    E: Message,
    S: Message,
    F: FnOnce() -> I + Send + 'static,
{
    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        if !matches!(
            notification,
            BallastNotification::ViewModelStatusChanged(Status::Running)
        ) {
            return;
        }
        let Some(initial_input) = self.initial_input.lock().take() else {
            return;
        };
        if let Err(err) = view_model.send(initial_input()).await {
            view_model
                .logger()
                .debug(&format!("bootstrap input not delivered: {err}"));
        }
    }
}
