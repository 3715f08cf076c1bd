//! # Ballast Navigation
//!
//! Declarative URL routing and backstack management.
//!
//! # Architecture
//!
//! ```text
//! "/posts/:id?tab={?}" ──RouteMatcher::create──▶ RouteMatcher (segments + weight)
//!                                                      │
//! "/posts/42?tab=top" ──UnmatchedDestination::parse──▶ RoutingTable::find_match
//!                                                      │
//!                                   Destination::Match / Destination::Mismatch
//!                                                      │
//!                                                 Backstack<T>
//! ```
//!
//! The inverse direction, from a route and its parameters back to a URL, is
//! [`Directions`].
//!
//! # Route format
//!
//! | Path token | Meaning |
//! |------------|---------|
//! | `text` | Literal component |
//! | `:name`, `{name}` | Required parameter |
//! | `{name?}` | Optional parameter (last segment only) |
//! | `*` | Any single component |
//! | `{...}`, `{name...}` | All remaining components (last segment only) |
//!
//! | Query clause | Meaning |
//! |--------------|---------|
//! | `key=value` | `key` must be exactly `value` |
//! | `key={!}`, `key={[!]}` | Required, single or repeated |
//! | `key={?}`, `key={[?]}` | Optional, single or repeated |
//! | `{...}` | Any other keys |
//!
//! # Features
//!
//! - `viewmodel` (default): [`contract`] hosts a [`Backstack`] in a Ballast ViewModel.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod backstack;
mod destination;
mod directions;
mod error;
mod matcher;
mod route;
mod table;

#[cfg(feature = "viewmodel")]
pub mod contract;

pub use backstack::Backstack;
pub use destination::{Destination, DestinationMatch, UnmatchedDestination};
pub use directions::Directions;
pub use error::{DirectionsError, ParameterError, RouteFormatError};
pub use matcher::{Parameters, PathSegment, QueryParameter, RouteMatch, RouteMatcher};
pub use route::{Annotation, Route};
pub use table::RoutingTable;
