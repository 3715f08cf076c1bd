//! # Route matching
//!
//! A [`RouteMatcher`] is the parsed form of a route format string:
//!
//! ```text
//! /posts/:id/{tab?}?sort={?}&{...}
//! └───────┬───────┘ └──────┬──────┘
//!   PathSegments     QueryParameters
//! ```
//!
//! Matching runs the path first and the query second:
//!
//! | Path | Query | Result |
//! |------|-------|--------|
//! | no fit | - | [`RouteMatch::NoMatch`] |
//! | fits | no fit | [`RouteMatch::PartialMatch`] |
//! | fits | fits | [`RouteMatch::CompleteMatch`] |
//!
//! # Weights
//!
//! Routes are tried in descending [`weight`](RouteMatcher::weight) order and
//! the first complete match wins. The weight compares paths position by
//! position, so a static segment outranks a parameter at the same position
//! regardless of what follows; the query only breaks ties between equal
//! paths. Two different routes may still end up with the same weight, in
//! which case either may be selected. Use
//! [`with_weight`](RouteMatcher::with_weight) when the order matters.

mod path;
mod query;

pub use path::PathSegment;
pub use query::QueryParameter;

use crate::{destination::UnmatchedDestination, error::RouteFormatError};
use std::{collections::BTreeMap, collections::BTreeSet, fmt};

/// Captured parameter values by name.
pub type Parameters = BTreeMap<String, Vec<String>>;

/// Path positions taken into account by the weight.
const WEIGHTED_POSITIONS: u32 = 12;

/// Digit used for positions past the end of a path.
///
/// Sits between a wildcard and an optional parameter: a route that ends is
/// more specific than one that could continue optionally, less specific than
/// one that requires another component.
const END_OF_PATH_DIGIT: u64 = 5;

/// Upper bound of the query part of the weight.
const MAX_QUERY_WEIGHT: u64 = 999;

/// The outcome of matching a URL against one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    /// The path did not fit.
    NoMatch,
    /// The path fit but the query did not. Not a match for routing purposes.
    PartialMatch {
        /// Parameters captured from the path.
        path_parameters: Parameters,
    },
    /// Both path and query fit.
    CompleteMatch {
        /// Parameters captured from the path.
        path_parameters: Parameters,
        /// Parameters captured from the query.
        query_parameters: Parameters,
    },
}

impl RouteMatch {
    /// Whether this is a [`RouteMatch::CompleteMatch`].
    pub fn is_complete(&self) -> bool {
        matches!(self, RouteMatch::CompleteMatch { .. })
    }
}

/// A parsed route format: path segments, query parameters and a weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    format: String,
    path: Vec<PathSegment>,
    query: Vec<QueryParameter>,
    weight: u64,
}

impl RouteMatcher {
    /// Parse and validate a route format string.
    ///
    /// # Errors
    ///
    /// Fails when a token is malformed, when a parameter name is used twice,
    /// when the path has more than one optional parameter or tailcard, or
    /// when anything follows one.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let matcher = RouteMatcher::create("/posts/:id/{tab?}?sort={?}")?;
    /// assert_eq!(matcher.path().len(), 3);
    /// ```
    pub fn create(format: &str) -> Result<Self, RouteFormatError> {
        let (path_format, query_format) = match format.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (format, None),
        };

        let path = path_format
            .split('/')
            .filter(|token| !token.is_empty())
            .map(PathSegment::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let query = query_format
            .into_iter()
            .flat_map(|query| query.split('&'))
            .filter(|clause| !clause.is_empty())
            .map(QueryParameter::parse)
            .collect::<Result<Vec<_>, _>>()?;

        validate(format, &path, &query)?;

        let weight = compute_weight(&path, &query);
        Ok(Self {
            format: format.to_string(),
            path,
            query,
            weight,
        })
    }

    /// Replace the computed weight.
    pub fn with_weight(mut self, weight: u64) -> Self {
        self.weight = weight;
        self
    }

    /// The format string this matcher was created from.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The path segments, in order.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// The query clauses, in order.
    pub fn query(&self) -> &[QueryParameter] {
        &self.query
    }

    /// Priority among routes; higher is tried first.
    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Match a parsed URL against this route.
    pub fn match_destination(&self, destination: &UnmatchedDestination) -> RouteMatch {
        let Some(path_parameters) = path::match_path(&self.path, destination.path_segments())
        else {
            return RouteMatch::NoMatch;
        };
        match query::match_query(&self.query, destination.query_parameters()) {
            Some(query_parameters) => RouteMatch::CompleteMatch {
                path_parameters,
                query_parameters,
            },
            None => RouteMatch::PartialMatch { path_parameters },
        }
    }
}

impl fmt::Display for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format)
    }
}

fn validate(
    format: &str,
    path: &[PathSegment],
    query: &[QueryParameter],
) -> Result<(), RouteFormatError> {
    let mut names = BTreeSet::new();
    let captured = path
        .iter()
        .filter_map(PathSegment::name)
        .chain(query.iter().filter_map(QueryParameter::key));
    for name in captured {
        if !names.insert(name) {
            return Err(RouteFormatError::DuplicateParameter(name.to_string()));
        }
    }

    if path.iter().filter(|segment| segment.is_optional()).count() > 1 {
        return Err(RouteFormatError::MultipleOptionalSegments(
            format.to_string(),
        ));
    }
    if let Some(position) = path.iter().position(PathSegment::is_optional) {
        if let Some(after) = path.get(position + 1) {
            return Err(RouteFormatError::SegmentAfterOptional(after.to_string()));
        }
    }

    let remainders = query
        .iter()
        .filter(|clause| matches!(clause, QueryParameter::Remainder))
        .count();
    if remainders > 1 {
        return Err(RouteFormatError::MultipleRemainders);
    }
    Ok(())
}

/// Combine segment weights into one comparable number.
///
/// The path reads as a base-11 number with one digit per position (twice the
/// segment weight, or [`END_OF_PATH_DIGIT`] past the end); the summed query
/// weight fills the three lowest decimal digits.
fn compute_weight(path: &[PathSegment], query: &[QueryParameter]) -> u64 {
    let path_weight = (0..WEIGHTED_POSITIONS as usize).fold(0_u64, |acc, position| {
        let digit = path
            .get(position)
            .map_or(END_OF_PATH_DIGIT, |segment| segment.weight() * 2);
        acc * 11 + digit
    });
    let query_weight: u64 = query.iter().map(QueryParameter::weight).sum();
    path_weight * 1000 + query_weight.min(MAX_QUERY_WEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weight(format: &str) -> u64 {
        RouteMatcher::create(format).unwrap().weight()
    }

    #[test]
    fn test_create_parses_path_and_query() {
        let matcher = RouteMatcher::create("/one/:two/{three?}?one=two").unwrap();
        assert_eq!(
            matcher.path(),
            &[
                PathSegment::Static("one".into()),
                PathSegment::Parameter {
                    name: "two".into(),
                    optional: false
                },
                PathSegment::Parameter {
                    name: "three".into(),
                    optional: true
                },
            ]
        );
        assert_eq!(
            matcher.query(),
            &[QueryParameter::Static {
                key: "one".into(),
                value: "two".into()
            }]
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = RouteMatcher::create("/:id/{id?}").unwrap_err();
        assert!(err.to_string().contains("parameter names must be unique"));

        let err = RouteMatcher::create("/posts/:id?id={?}").unwrap_err();
        assert_eq!(err, RouteFormatError::DuplicateParameter("id".into()));
    }

    #[test]
    fn test_misplaced_optional_segments_are_rejected() {
        assert!(matches!(
            RouteMatcher::create("/{a?}/{b?}"),
            Err(RouteFormatError::MultipleOptionalSegments(_))
        ));
        assert!(matches!(
            RouteMatcher::create("/{a?}/{...}"),
            Err(RouteFormatError::MultipleOptionalSegments(_))
        ));
        assert_eq!(
            RouteMatcher::create("/{a?}/b"),
            Err(RouteFormatError::SegmentAfterOptional("b".into()))
        );
        assert_eq!(
            RouteMatcher::create("/{rest...}/:id"),
            Err(RouteFormatError::SegmentAfterOptional("{id}".into()))
        );
    }

    #[test]
    fn test_multiple_remainders_are_rejected() {
        assert_eq!(
            RouteMatcher::create("/a?{...}&{...}"),
            Err(RouteFormatError::MultipleRemainders)
        );
    }

    #[test]
    fn test_static_outranks_parameter_outranks_wildcard() {
        assert!(weight("/posts/new") > weight("/posts/:id"));
        assert!(weight("/posts/:id") > weight("/posts/*"));
        assert!(weight("/posts/*") > weight("/posts"));
        assert!(weight("/posts") > weight("/posts/{id?}"));
        assert!(weight("/posts/{id?}") > weight("/posts/{...}"));
    }

    #[test]
    fn test_earlier_positions_dominate() {
        assert!(weight("/posts/:id/{...}") > weight("/:section/new/edit"));
    }

    #[test]
    fn test_query_breaks_path_ties() {
        assert!(weight("/search?q=rust") > weight("/search?q={!}"));
        assert!(weight("/search?q={!}") > weight("/search?q={?}"));
        assert!(weight("/search?q={?}") > weight("/search"));
    }

    #[test]
    fn test_root_route() {
        let matcher = RouteMatcher::create("/").unwrap();
        assert!(matcher.path().is_empty());
        let root = UnmatchedDestination::parse("/");
        assert!(matcher.match_destination(&root).is_complete());
    }

    #[test]
    fn test_with_weight_overrides() {
        let matcher = RouteMatcher::create("/a").unwrap().with_weight(7);
        assert_eq!(matcher.weight(), 7);
    }

    #[test]
    fn test_partial_match_when_query_fails() {
        let matcher = RouteMatcher::create("/search?q={!}").unwrap();
        let destination = UnmatchedDestination::parse("/search");
        assert_eq!(
            matcher.match_destination(&destination),
            RouteMatch::PartialMatch {
                path_parameters: Parameters::new()
            }
        );
    }
}
