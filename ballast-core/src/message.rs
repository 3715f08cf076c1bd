//! Message trait for Input, Event and State types.

use std::fmt::Debug;

/// A marker trait for the values flowing through a ViewModel.
///
/// Inputs, Events and State are all immutable values: the coordinator clones
/// them into notifications, keeps snapshots of the state for rollback, and
/// moves them between tasks. Any `Clone + Debug + Send + Sync + 'static` type
/// qualifies automatically.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// enum CounterInput {
///     Increment,
///     Decrement,
/// }
///
/// // `CounterInput` is a `Message` through the blanket impl.
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Clone + Debug + Send + Sync + 'static`",
    note = "Inputs, Events and State in Ballast must be cloneable, debuggable and thread-safe."
)]
pub trait Message: Clone + Debug + Send + Sync + 'static {}

impl<T> Message for T where T: Clone + Debug + Send + Sync + 'static {}
