//! Fan-out to several interceptors as one.

use super::{DynInterceptor, Interceptor};
use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message};
use futures::future::join_all;
use std::sync::Arc;

/// Delivers each notification to every wrapped interceptor concurrently.
///
/// Useful for packaging a set of interceptors behind one registration, or
/// behind a [`FilterInterceptor`](super::FilterInterceptor).
pub struct DelegatingInterceptor<I: Message, E: Message, S: Message> {
    delegates: Vec<Arc<dyn DynInterceptor<I, E, S>>>,
}

impl<I: Message, E: Message, S: Message> Default for DelegatingInterceptor<I, E, S> {
    fn default() -> Self {
        Self {
            delegates: Vec::new(),
        }
    }
}

impl<I: Message, E: Message, S: Message> DelegatingInterceptor<I, E, S> {
    /// Create an empty delegating interceptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delegate.
    pub fn with(mut self, interceptor: impl Interceptor<I, E, S>) -> Self {
        self.delegates.push(Arc::new(interceptor));
        self
    }

    /// Number of delegates.
    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    /// Whether there are no delegates.
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl<I: Message, E: Message, S: Message> Interceptor<I, E, S> for DelegatingInterceptor<I, E, S> {
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        for delegate in &self.delegates {
            (**delegate).start_dyn(view_model);
        }
    }

    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        join_all(
            self.delegates
                .iter()
                .map(|delegate| (**delegate).on_notification_dyn(notification, view_model)),
        )
        .await;
    }
}
