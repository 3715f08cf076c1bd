//! # Routes
//!
//! A [`Route`] is an application-defined identity (usually an enum) that
//! knows its parsed [`RouteMatcher`] and its [`Annotation`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::LazyLock;
//!
//! static HOME: LazyLock<RouteMatcher> = LazyLock::new(|| RouteMatcher::create("/").unwrap());
//! static POST: LazyLock<RouteMatcher> =
//!     LazyLock::new(|| RouteMatcher::create("/posts/:id").unwrap());
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum AppRoute {
//!     Home,
//!     Post,
//! }
//!
//! impl Route for AppRoute {
//!     fn matcher(&self) -> &RouteMatcher {
//!         match self {
//!             AppRoute::Home => &HOME,
//!             AppRoute::Post => &POST,
//!         }
//!     }
//! }
//!
//! let url = AppRoute::Post.directions().path_parameter("id", "42").build()?;
//! assert_eq!(url, "/posts/42");
//! ```

use crate::{directions::Directions, matcher::RouteMatcher};
use std::{borrow::Cow, fmt::Debug};

/// A navigable route.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a Route",
    label = "missing `Route` implementation",
    note = "Implement `Route` and return a `RouteMatcher` created from the route's format string."
)]
pub trait Route: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The parsed format of this route.
    fn matcher(&self) -> &RouteMatcher;

    /// Opaque markers consulted by the backstack and by applications.
    fn annotations(&self) -> &[Annotation] {
        &[]
    }

    /// Start building a URL for this route.
    fn directions(&self) -> Directions<'_> {
        Directions::new(self.matcher())
    }
}

/// An opaque marker attached to a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation(Cow<'static, str>);

impl Annotation {
    const FLOATING: &'static str = "Floating";

    /// An annotation with the given name.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// An annotation with a name built at runtime.
    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Marks a destination that is popped as soon as another one is pushed
    /// on top of it, like a dialog.
    pub const fn floating() -> Self {
        Self::new(Self::FLOATING)
    }

    /// The annotation's name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this is [`Annotation::floating`].
    pub fn is_floating(&self) -> bool {
        self.0 == Self::FLOATING
    }
}
