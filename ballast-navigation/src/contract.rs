//! # Router ViewModel
//!
//! Hosts a [`Backstack`] as the state of a Ballast ViewModel, so navigation
//! goes through the same Input queue, interceptors and tooling as the rest of
//! the application.
//!
//! ```rust,ignore
//! let router = ViewModel::builder(Backstack::new(), RouterInputHandler::new(table))
//!     .name("Router")
//!     .input_strategy(FifoInputStrategy)
//!     .event_handler(on_backstack_emptied)
//!     .build();
//! router.start();
//! router.send(RouterInput::GoToDestination("/posts/42".into())).await?;
//! ```
//!
//! Every Input touches the state exactly once, so any input strategy works.

use crate::{
    backstack::Backstack,
    route::{Annotation, Route},
    table::RoutingTable,
};
use ballast::{BoxError, InputHandler, InputHandlerScope};

/// Navigation requests.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterInput<T> {
    /// Resolve the URL and push it.
    GoToDestination(String),
    /// Resolve the URL and swap it for the top entry.
    ReplaceTopDestination(String),
    /// Resolve the URL and make it the only entry.
    ClearAndGoToDestination(String),
    /// Pop the top entry. From a single entry, emits [`RouterEvent::BackstackEmptied`] instead.
    GoBack,
    /// Pop back to the topmost entry for the route.
    PopUntilRoute(T),
    /// Pop back to the topmost entry carrying the annotation.
    PopUntilAnnotation(Annotation),
}

/// Things the router cannot handle on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterEvent {
    /// Going back was requested with nothing left to go back to; usually the
    /// application should exit.
    BackstackEmptied,
}

/// The Input handler of a router ViewModel.
pub struct RouterInputHandler<T> {
    table: RoutingTable<T>,
}

impl<T: Route> RouterInputHandler<T> {
    /// Route URLs through `table`.
    pub fn new(table: RoutingTable<T>) -> Self {
        Self { table }
    }
}

impl<T: Route> InputHandler<RouterInput<T>, RouterEvent, Backstack<T>> for RouterInputHandler<T> {
    async fn handle_input(
        &self,
        input: RouterInput<T>,
        scope: &mut InputHandlerScope<RouterInput<T>, RouterEvent, Backstack<T>>,
    ) -> Result<(), BoxError> {
        match input {
            RouterInput::GoToDestination(url) => {
                let destination = self.table.find_match(&url);
                scope.update_state(|mut backstack| {
                    backstack.go_to_destination(destination);
                    backstack
                });
            }
            RouterInput::ReplaceTopDestination(url) => {
                let destination = self.table.find_match(&url);
                scope.update_state(|mut backstack| {
                    backstack.replace_top_destination(destination);
                    backstack
                });
            }
            RouterInput::ClearAndGoToDestination(url) => {
                let destination = self.table.find_match(&url);
                scope.update_state(|mut backstack| {
                    backstack.clear_and_go_to_destination(destination);
                    backstack
                });
            }
            RouterInput::GoBack => {
                let previous = scope.get_and_update_state(|mut backstack| {
                    if backstack.len() > 1 {
                        backstack.go_back();
                    }
                    backstack
                });
                if previous.len() <= 1 {
                    scope.post_event(RouterEvent::BackstackEmptied).await?;
                }
            }
            RouterInput::PopUntilRoute(route) => {
                scope.update_state(|mut backstack| {
                    backstack.pop_until_route(&route);
                    backstack
                });
            }
            RouterInput::PopUntilAnnotation(annotation) => {
                scope.update_state(|mut backstack| {
                    backstack.pop_until_annotation(&annotation);
                    backstack
                });
            }
        }
        Ok(())
    }
}
