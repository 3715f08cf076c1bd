//! Error types for Ballast navigation.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RouteFormatError`] - A route format string is malformed (a bad route definition)
//! - [`DirectionsError`] - A URL could not be built from the supplied parameters
//! - [`ParameterError`] - A matched parameter is missing, repeated or unparseable

use thiserror::Error;

/// A route format string could not be turned into a [`RouteMatcher`](crate::RouteMatcher).
///
/// These indicate a bug in the route definitions, not in the URL being matched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteFormatError {
    /// Two path segments or query parameters capture the same name.
    #[error("parameter names must be unique: `{0}` is used more than once")]
    DuplicateParameter(String),

    /// A path has more than one optional parameter or tailcard.
    #[error("a route may have at most one optional parameter or tailcard, found more in `{0}`")]
    MultipleOptionalSegments(String),

    /// A segment follows an optional parameter or tailcard.
    #[error("path segment `{0}` cannot follow an optional parameter or tailcard")]
    SegmentAfterOptional(String),

    /// A path segment is not a recognised token.
    #[error("invalid path segment `{0}`")]
    InvalidPathSegment(String),

    /// A query clause is not a recognised token.
    #[error("invalid query parameter `{0}`")]
    InvalidQueryParameter(String),

    /// A query has more than one `{...}` remainder.
    #[error("a route may have at most one query remainder")]
    MultipleRemainders,
}

/// A URL could not be built from [`Directions`](crate::Directions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectionsError {
    /// A required parameter was not supplied.
    #[error("missing required parameter `{0}`")]
    MissingParameter(String),

    /// A single-valued parameter was given several values.
    #[error("parameter `{0}` accepts a single value")]
    TooManyValues(String),

    /// A parameter was supplied that the route does not declare.
    #[error("route has no parameter named `{0}`")]
    UnknownParameter(String),

    /// An empty value was given for a path parameter. It would leave an empty
    /// path component, which no route matches.
    #[error("path parameter `{0}` cannot be empty")]
    EmptyPathValue(String),

    /// The route contains a `*` wildcard, which has no name to fill it by.
    #[error("routes containing a `*` wildcard cannot be built from directions")]
    Wildcard,
}

/// A parameter of a matched destination could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// The parameter is absent.
    #[error("parameter `{0}` is missing")]
    Missing(String),

    /// A single value was requested but several are present.
    #[error("parameter `{0}` has more than one value")]
    Multiple(String),

    /// The value did not parse into the requested type.
    #[error("parameter `{name}` has invalid value `{value}`: {reason}")]
    Invalid {
        /// Name of the parameter.
        name: String,
        /// The raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}
