//! Predicate filter in front of another interceptor.

use super::Interceptor;
use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message};

/// Forwards only the notifications accepted by a predicate.
///
/// # Example
///
/// ```rust,ignore
/// // Only errors reach the reporter.
/// let errors_only = FilterInterceptor::new(ErrorReporter, |n| n.error().is_some());
/// ```
pub struct FilterInterceptor<T, F> {
    inner: T,
    predicate: F,
}

impl<T, F> FilterInterceptor<T, F> {
    /// Wrap `inner`, forwarding notifications for which `predicate` is true.
    pub fn new(inner: T, predicate: F) -> Self {
        Self { inner, predicate }
    }
}

impl<I, E, S, T, F> Interceptor<I, E, S> for FilterInterceptor<T, F>
where
    I: Message,
    E: Message,
    S: Message,
    T: Interceptor<I, E, S>,
    F: Fn(&BallastNotification<I, E, S>) -> bool + Send + Sync + 'static,
{
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        self.inner.start(view_model);
    }

    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        if (self.predicate)(notification) {
            self.inner.on_notification(notification, view_model).await;
        }
    }
}
