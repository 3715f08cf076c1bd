//! Logging interceptor.

use super::Interceptor;
use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message};

/// Logs every notification through the ViewModel's [`BallastLogger`](ballast_core::BallastLogger).
///
/// Failures go to `error`, everything else to `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl LoggingInterceptor {
    /// Create a logging interceptor.
    pub fn new() -> Self {
        Self
    }
}

impl<I: Message, E: Message, S: Message> Interceptor<I, E, S> for LoggingInterceptor {
    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        let logger = view_model.logger();
        match notification.error() {
            Some(err) => {
                logger.info(&format!("[{}] {}", view_model.name(), notification.kind()));
                logger.error(err.as_ref());
            }
            None => logger.debug(&format!("[{}] {notification:?}", view_model.name())),
        }
    }
}
