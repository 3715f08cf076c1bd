//! Building URLs from a route and its parameters.

use crate::{
    error::DirectionsError,
    matcher::{Parameters, PathSegment, QueryParameter, RouteMatcher},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::collections::BTreeSet;

/// Characters escaped inside a path component or a query key or value.
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// A URL under construction for one route.
///
/// Walks the route's segments in order: static text is copied, parameters are
/// filled from what was supplied, a named tailcard takes all of its values and
/// a query remainder takes every query parameter the route does not name.
///
/// # Example
///
/// ```rust,ignore
/// let matcher = RouteMatcher::create("/one/:two/{three?}?one=two")?;
/// let url = Directions::new(&matcher)
///     .path_parameter("two", "three")
///     .build()?;
/// assert_eq!(url, "/one/three?one=two");
/// ```
#[derive(Debug, Clone)]
pub struct Directions<'a> {
    matcher: &'a RouteMatcher,
    path: Parameters,
    query: Parameters,
}

impl<'a> Directions<'a> {
    /// Start building a URL for `matcher`.
    pub fn new(matcher: &'a RouteMatcher) -> Self {
        Self {
            matcher,
            path: Parameters::new(),
            query: Parameters::new(),
        }
    }

    /// Supply a path parameter value. Repeat for a tailcard.
    pub fn path_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Supply several path parameter values at once.
    pub fn path_parameters<V: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.path
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Supply a query parameter value. Repeat for multi-valued parameters.
    pub fn query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Supply several query parameter values at once.
    pub fn query_parameters<V: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.query
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Build the URL.
    ///
    /// # Errors
    ///
    /// Fails when a required parameter is missing, when a single-valued one
    /// gets several values, when a path value is empty, when a supplied
    /// parameter is not part of the route, or when the route has a `*`
    /// wildcard.
    pub fn build(self) -> Result<String, DirectionsError> {
        let mut url = String::new();
        let mut used_path = BTreeSet::new();

        for segment in self.matcher.path() {
            match segment {
                PathSegment::Static(text) => push_component(&mut url, text),
                PathSegment::Parameter { name, optional } => {
                    used_path.insert(name.as_str());
                    if let Some(value) = single(&self.path, name, *optional)? {
                        push_component(&mut url, path_value(name, value)?);
                    }
                }
                PathSegment::Wildcard => return Err(DirectionsError::Wildcard),
                PathSegment::Tailcard { name: Some(name) } => {
                    used_path.insert(name.as_str());
                    for value in self.path.get(name).into_iter().flatten() {
                        push_component(&mut url, path_value(name, value)?);
                    }
                }
                PathSegment::Tailcard { name: None } => {}
            }
        }
        if let Some(unknown) = self
            .path
            .keys()
            .find(|name| !used_path.contains(name.as_str()))
        {
            return Err(DirectionsError::UnknownParameter(unknown.clone()));
        }
        if url.is_empty() {
            url.push('/');
        }

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let mut used_query = BTreeSet::new();
        let mut remainder = false;
        for clause in self.matcher.query() {
            match clause {
                QueryParameter::Static { key, value } => {
                    pairs.push((key.as_str(), value.as_str()));
                }
                QueryParameter::Parameter {
                    key,
                    optional,
                    allow_multiple: false,
                } => {
                    used_query.insert(key.as_str());
                    if let Some(value) = single(&self.query, key, *optional)? {
                        pairs.push((key.as_str(), value));
                    }
                }
                QueryParameter::Parameter {
                    key,
                    optional,
                    allow_multiple: true,
                } => {
                    used_query.insert(key.as_str());
                    let values = self.query.get(key).map(Vec::as_slice).unwrap_or_default();
                    if values.is_empty() && !*optional {
                        return Err(DirectionsError::MissingParameter(key.clone()));
                    }
                    pairs.extend(values.iter().map(|value| (key.as_str(), value.as_str())));
                }
                QueryParameter::Remainder => remainder = true,
            }
        }
        for (key, values) in &self.query {
            if used_query.contains(key.as_str()) {
                continue;
            }
            if !remainder {
                return Err(DirectionsError::UnknownParameter(key.clone()));
            }
            pairs.extend(values.iter().map(|value| (key.as_str(), value.as_str())));
        }

        for (index, (key, value)) in pairs.into_iter().enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            url.extend(utf8_percent_encode(key, COMPONENT));
            url.push('=');
            url.extend(utf8_percent_encode(value, COMPONENT));
        }
        Ok(url)
    }
}

fn push_component(url: &mut String, component: &str) {
    url.push('/');
    url.extend(utf8_percent_encode(component, COMPONENT));
}

fn path_value<'v>(name: &str, value: &'v str) -> Result<&'v str, DirectionsError> {
    if value.is_empty() {
        return Err(DirectionsError::EmptyPathValue(name.to_string()));
    }
    Ok(value)
}

/// The value of a single-valued parameter, enforcing its arity.
fn single<'p>(
    parameters: &'p Parameters,
    name: &str,
    optional: bool,
) -> Result<Option<&'p str>, DirectionsError> {
    match parameters.get(name).map(Vec::as_slice).unwrap_or_default() {
        [] if optional => Ok(None),
        [] => Err(DirectionsError::MissingParameter(name.to_string())),
        [value] => Ok(Some(value.as_str())),
        _ => Err(DirectionsError::TooManyValues(name.to_string())),
    }
}
