//! Destinations: URLs before and after matching.

use crate::{
    error::ParameterError,
    matcher::Parameters,
    route::{Annotation, Route},
};
use percent_encoding::percent_decode_str;
use std::str::FromStr;

/// A URL split into decoded path components and query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedDestination {
    original_url: String,
    path_segments: Vec<String>,
    query_parameters: Parameters,
}

impl UnmatchedDestination {
    /// Parse a URL or path.
    ///
    /// Scheme, authority and fragment are ignored. Path components and query
    /// pairs are percent-decoded; a key without `=` gets an empty value.
    ///
    /// ```rust,ignore
    /// let destination = UnmatchedDestination::parse("app://host/posts/42?tag=a&tag=b#top");
    /// assert_eq!(destination.path_segments(), ["posts", "42"]);
    /// assert_eq!(destination.query_parameters()["tag"], ["a", "b"]);
    /// ```
    pub fn parse(url: &str) -> Self {
        let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };
        let path = match path.split_once("://") {
            Some((_, rest)) => rest.find('/').map_or("", |slash| &rest[slash..]),
            None => path,
        };

        let path_segments = path
            .split('/')
            .filter(|component| !component.is_empty())
            .map(decode)
            .collect();

        let mut query_parameters = Parameters::new();
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            query_parameters
                .entry(decode(key))
                .or_default()
                .push(decode(value));
        }

        Self {
            original_url: url.to_string(),
            path_segments,
            query_parameters,
        }
    }

    /// The URL as given to [`parse`](Self::parse).
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Decoded path components.
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    /// Decoded query values by key, in the order they appeared.
    pub fn query_parameters(&self) -> &Parameters {
        &self.query_parameters
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// A URL resolved against a routing table.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination<T> {
    /// A route matched completely.
    Match(DestinationMatch<T>),
    /// No route matched; render as "not found".
    Mismatch(UnmatchedDestination),
}

impl<T: Route> Destination<T> {
    /// The URL this destination was resolved from.
    pub fn original_url(&self) -> &str {
        match self {
            Destination::Match(matched) => matched.original_url(),
            Destination::Mismatch(unmatched) => unmatched.original_url(),
        }
    }

    /// The matched route, if any.
    pub fn route(&self) -> Option<&T> {
        self.as_match().map(DestinationMatch::route)
    }

    /// The match details, if any.
    pub fn as_match(&self) -> Option<&DestinationMatch<T>> {
        match self {
            Destination::Match(matched) => Some(matched),
            Destination::Mismatch(_) => None,
        }
    }

    /// Whether a route matched.
    pub fn is_match(&self) -> bool {
        matches!(self, Destination::Match(_))
    }

    /// Annotations of the matched route; none for a mismatch.
    pub fn annotations(&self) -> &[Annotation] {
        self.route().map(Route::annotations).unwrap_or_default()
    }

    /// Whether the matched route carries `annotation`.
    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.annotations().contains(annotation)
    }
}

/// A route together with the parameters captured from a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationMatch<T> {
    route: T,
    original_url: String,
    path_parameters: Parameters,
    query_parameters: Parameters,
}

impl<T> DestinationMatch<T> {
    pub(crate) fn new(
        route: T,
        original_url: String,
        path_parameters: Parameters,
        query_parameters: Parameters,
    ) -> Self {
        Self {
            route,
            original_url,
            path_parameters,
            query_parameters,
        }
    }

    /// The matched route.
    pub fn route(&self) -> &T {
        &self.route
    }

    /// The URL that matched.
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Every path parameter.
    pub fn path_parameter_map(&self) -> &Parameters {
        &self.path_parameters
    }

    /// Every query parameter.
    pub fn query_parameter_map(&self) -> &Parameters {
        &self.query_parameters
    }

    /// The single value of a path parameter.
    pub fn path_parameter(&self, name: &str) -> Result<&str, ParameterError> {
        required(&self.path_parameters, name)
    }

    /// The value of an optional path parameter.
    pub fn optional_path_parameter(&self, name: &str) -> Result<Option<&str>, ParameterError> {
        optional(&self.path_parameters, name)
    }

    /// All values of a path parameter (a tailcard captures several).
    pub fn path_parameters(&self, name: &str) -> &[String] {
        self.path_parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parse the single value of a path parameter.
    pub fn path_parameter_as<V>(&self, name: &str) -> Result<V, ParameterError>
    where
        V: FromStr,
        V::Err: std::fmt::Display,
    {
        parse_value(name, self.path_parameter(name)?)
    }

    /// The single value of a query parameter.
    pub fn query_parameter(&self, name: &str) -> Result<&str, ParameterError> {
        required(&self.query_parameters, name)
    }

    /// The value of an optional query parameter.
    pub fn optional_query_parameter(&self, name: &str) -> Result<Option<&str>, ParameterError> {
        optional(&self.query_parameters, name)
    }

    /// All values of a query parameter.
    pub fn query_parameters(&self, name: &str) -> &[String] {
        self.query_parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parse the single value of a query parameter.
    pub fn query_parameter_as<V>(&self, name: &str) -> Result<V, ParameterError>
    where
        V: FromStr,
        V::Err: std::fmt::Display,
    {
        parse_value(name, self.query_parameter(name)?)
    }
}

fn optional<'a>(parameters: &'a Parameters, name: &str) -> Result<Option<&'a str>, ParameterError> {
    match parameters.get(name).map(Vec::as_slice) {
        None | Some([]) => Ok(None),
        Some([value]) => Ok(Some(value.as_str())),
        Some(_) => Err(ParameterError::Multiple(name.to_string())),
    }
}

fn required<'a>(parameters: &'a Parameters, name: &str) -> Result<&'a str, ParameterError> {
    optional(parameters, name)?.ok_or_else(|| ParameterError::Missing(name.to_string()))
}

fn parse_value<V>(name: &str, value: &str) -> Result<V, ParameterError>
where
    V: FromStr,
    V::Err: std::fmt::Display,
{
    value.parse().map_err(|err: V::Err| ParameterError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    })
}
