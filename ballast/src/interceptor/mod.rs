//! # Interceptors
//!
//! Observers of a ViewModel's notification stream.
//!
//! Every interceptor receives every [`BallastNotification`] in the order the
//! effects happened. Each interceptor is fed from its own lane on the
//! interceptor dispatcher, so a slow interceptor delays only itself and never
//! the coordinator.
//!
//! Interceptors cannot change what the ViewModel does with a notification.
//! They can act on the ViewModel through the [`ViewModelHandle`] they are
//! given, the way [`BootstrapInterceptor`] and [`KillSwitch`] do.
//!
//! # Built-ins
//!
//! | Interceptor | Purpose |
//! |-------------|---------|
//! | [`BootstrapInterceptor`] | Sends one initial Input once the ViewModel is running |
//! | [`KillSwitch`] | Lets outside code request a graceful shutdown |
//! | [`LoggingInterceptor`] | Logs every notification through the ViewModel's logger |
//! | [`DelegatingInterceptor`] | Fans out to a list of interceptors |
//! | [`FilterInterceptor`] | Forwards only matching notifications |
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Interceptor`] uses native `async fn`. The coordinator stores
//! [`DynInterceptor`] trait objects, implemented automatically.

mod bootstrap;
mod delegating;
mod filter;
mod kill_switch;
mod logging;

pub use bootstrap::BootstrapInterceptor;
pub use delegating::DelegatingInterceptor;
pub use filter::FilterInterceptor;
pub use kill_switch::{KillSwitch, KillSwitchTrigger};
pub use logging::LoggingInterceptor;

use crate::view_model::ViewModelHandle;
use ballast_core::{BallastNotification, Message};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};

/// An observer of a ViewModel's notifications.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Interceptor<{I}, {E}, {S}>`",
    label = "missing `Interceptor` implementation",
    note = "Interceptors must implement `on_notification` for the ViewModel's Input, Event and State types."
)]
pub trait Interceptor<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Called once when the ViewModel starts, before it reports `Running`.
    ///
    /// Long-running work belongs in a task spawned with
    /// [`ViewModelHandle::spawn`], which is cancelled with the ViewModel.
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        let _ = view_model;
    }

    /// Called for every notification, in order.
    ///
    /// Must not await a graceful shutdown of the same ViewModel: shutdown
    /// waits for interceptors to drain.
    fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) -> impl Future<Output = ()> + Send;
}

/// Dynamic object-safe version of [`Interceptor`].
pub trait DynInterceptor<I: Message, E: Message, S: Message>: Send + Sync + 'static {
    /// Called once when the ViewModel starts (dynamic dispatch version).
    fn start_dyn(&self, view_model: &ViewModelHandle<I, E, S>);

    /// Called for every notification (dynamic dispatch version).
    fn on_notification_dyn<'a>(
        &'a self,
        notification: &'a BallastNotification<I, E, S>,
        view_model: &'a ViewModelHandle<I, E, S>,
    ) -> BoxFuture<'a, ()>;
}

impl<I: Message, E: Message, S: Message, T: Interceptor<I, E, S>> DynInterceptor<I, E, S> for T {
    fn start_dyn(&self, view_model: &ViewModelHandle<I, E, S>) {
        self.start(view_model);
    }

    fn on_notification_dyn<'a>(
        &'a self,
        notification: &'a BallastNotification<I, E, S>,
        view_model: &'a ViewModelHandle<I, E, S>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.on_notification(notification, view_model))
    }
}

// Allow shared trait objects to be registered and composed like any interceptor.
impl<I: Message, E: Message, S: Message> Interceptor<I, E, S> for Arc<dyn DynInterceptor<I, E, S>> {
    fn start(&self, view_model: &ViewModelHandle<I, E, S>) {
        (**self).start_dyn(view_model);
    }

    async fn on_notification(
        &self,
        notification: &BallastNotification<I, E, S>,
        view_model: &ViewModelHandle<I, E, S>,
    ) {
        (**self).on_notification_dyn(notification, view_model).await;
    }
}
