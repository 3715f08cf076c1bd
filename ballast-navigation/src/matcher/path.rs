//! Path segment grammar.
//!
//! | Token | Segment | Weight |
//! |-------|---------|--------|
//! | `text` | [`PathSegment::Static`] | 5 |
//! | `:name`, `{name}` | required [`PathSegment::Parameter`] | 4 |
//! | `*` | [`PathSegment::Wildcard`] | 3 |
//! | `{name?}` | optional [`PathSegment::Parameter`] | 2 |
//! | `{...}`, `{name...}` | [`PathSegment::Tailcard`] | 1 |

use super::Parameters;
use crate::error::RouteFormatError;
use std::fmt;

/// One `/`-separated piece of a route's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Matches exactly this text.
    Static(String),
    /// Captures one component under `name`; an optional parameter may be absent.
    Parameter {
        /// Capture name.
        name: String,
        /// Whether the component may be missing.
        optional: bool,
    },
    /// Matches any single component without capturing it.
    Wildcard,
    /// Matches every remaining component, capturing them when named.
    Tailcard {
        /// Capture name, if any.
        name: Option<String>,
    },
}

impl PathSegment {
    pub(crate) fn parse(token: &str) -> Result<Self, RouteFormatError> {
        let invalid = || RouteFormatError::InvalidPathSegment(token.to_string());

        if token == "*" {
            return Ok(PathSegment::Wildcard);
        }
        if let Some(name) = token.strip_prefix(':') {
            return if is_name(name) {
                Ok(PathSegment::Parameter {
                    name: name.to_string(),
                    optional: false,
                })
            } else {
                Err(invalid())
            };
        }
        if let Some(inner) = token.strip_prefix('{') {
            let inner = inner.strip_suffix('}').ok_or_else(invalid)?;
            if let Some(name) = inner.strip_suffix("...") {
                return match name {
                    "" => Ok(PathSegment::Tailcard { name: None }),
                    name if is_name(name) => Ok(PathSegment::Tailcard {
                        name: Some(name.to_string()),
                    }),
                    _ => Err(invalid()),
                };
            }
            let (name, optional) = match inner.strip_suffix('?') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            return if is_name(name) {
                Ok(PathSegment::Parameter {
                    name: name.to_string(),
                    optional,
                })
            } else {
                Err(invalid())
            };
        }
        if token.is_empty() || token.contains(['{', '}']) {
            return Err(invalid());
        }
        Ok(PathSegment::Static(token.to_string()))
    }

    /// Specificity of this segment; higher is more specific.
    pub fn weight(&self) -> u64 {
        match self {
            PathSegment::Static(_) => 5,
            PathSegment::Parameter {
                optional: false, ..
            } => 4,
            PathSegment::Wildcard => 3,
            PathSegment::Parameter { optional: true, .. } => 2,
            PathSegment::Tailcard { .. } => 1,
        }
    }

    /// The capture name, if this segment captures.
    pub fn name(&self) -> Option<&str> {
        match self {
            PathSegment::Parameter { name, .. } => Some(name),
            PathSegment::Tailcard { name } => name.as_deref(),
            PathSegment::Static(_) | PathSegment::Wildcard => None,
        }
    }

    /// Whether the segment can match zero components.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            PathSegment::Parameter { optional: true, .. } | PathSegment::Tailcard { .. }
        )
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Static(text) => f.write_str(text),
            PathSegment::Parameter {
                name,
                optional: false,
            } => write!(f, "{{{name}}}"),
            PathSegment::Parameter {
                name,
                optional: true,
            } => write!(f, "{{{name}?}}"),
            PathSegment::Wildcard => f.write_str("*"),
            PathSegment::Tailcard { name } => {
                write!(f, "{{{}...}}", name.as_deref().unwrap_or_default())
            }
        }
    }
}

pub(crate) fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Match `segments` against the components of a path, left to right.
///
/// Returns the captured parameters, or `None` when the path does not fit.
pub(crate) fn match_path(segments: &[PathSegment], components: &[String]) -> Option<Parameters> {
    let mut captured = Parameters::new();
    let mut remaining = components;

    for segment in segments {
        match segment {
            PathSegment::Static(text) => {
                let (first, rest) = remaining.split_first()?;
                if first != text {
                    return None;
                }
                remaining = rest;
            }
            PathSegment::Parameter { name, optional } => match remaining.split_first() {
                Some((first, rest)) => {
                    captured.insert(name.clone(), vec![first.clone()]);
                    remaining = rest;
                }
                None if *optional => {}
                None => return None,
            },
            PathSegment::Wildcard => {
                let (_, rest) = remaining.split_first()?;
                remaining = rest;
            }
            PathSegment::Tailcard { name } => {
                if let Some(name) = name {
                    if !remaining.is_empty() {
                        captured.insert(name.clone(), remaining.to_vec());
                    }
                }
                remaining = &[];
            }
        }
    }

    remaining.is_empty().then_some(captured)
}
