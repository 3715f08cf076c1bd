//! Query parameter grammar.
//!
//! | Clause | Parameter | Weight |
//! |--------|-----------|--------|
//! | `key=value` | [`QueryParameter::Static`] | 5 |
//! | `key={!}` | required, single value | 4 |
//! | `key={[!]}` | required, one or more values | 3 |
//! | `key={?}`, `key={[?]}` | optional | 2 |
//! | `{...}` | [`QueryParameter::Remainder`] | 1 |

use super::{Parameters, path::is_name};
use crate::error::RouteFormatError;
use std::{collections::BTreeSet, fmt};

/// One `&`-separated clause of a route's query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParameter {
    /// Requires `key` to carry exactly `value`; captures nothing.
    Static {
        /// Query key.
        key: String,
        /// Required value.
        value: String,
    },
    /// Captures the values of `key`.
    Parameter {
        /// Query key and capture name.
        key: String,
        /// Whether the key may be absent.
        optional: bool,
        /// Whether the key may repeat.
        allow_multiple: bool,
    },
    /// Captures every key not claimed by another clause.
    Remainder,
}

impl QueryParameter {
    pub(crate) fn parse(clause: &str) -> Result<Self, RouteFormatError> {
        let invalid = || RouteFormatError::InvalidQueryParameter(clause.to_string());

        if clause == "{...}" {
            return Ok(QueryParameter::Remainder);
        }
        let (key, value) = clause.split_once('=').ok_or_else(invalid)?;
        if !is_name(key) {
            return Err(invalid());
        }
        let (optional, allow_multiple) = match value {
            "{!}" => (false, false),
            "{[!]}" => (false, true),
            "{?}" => (true, false),
            "{[?]}" => (true, true),
            value if !value.is_empty() && !value.contains(['{', '}']) => {
                return Ok(QueryParameter::Static {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            _ => return Err(invalid()),
        };
        Ok(QueryParameter::Parameter {
            key: key.to_string(),
            optional,
            allow_multiple,
        })
    }

    /// Specificity of this clause; higher is more specific.
    pub fn weight(&self) -> u64 {
        match self {
            QueryParameter::Static { .. } => 5,
            QueryParameter::Parameter {
                optional: false,
                allow_multiple: false,
                ..
            } => 4,
            QueryParameter::Parameter {
                optional: false,
                allow_multiple: true,
                ..
            } => 3,
            QueryParameter::Parameter { optional: true, .. } => 2,
            QueryParameter::Remainder => 1,
        }
    }

    /// The query key this clause claims.
    pub fn key(&self) -> Option<&str> {
        match self {
            QueryParameter::Static { key, .. } | QueryParameter::Parameter { key, .. } => {
                Some(key)
            }
            QueryParameter::Remainder => None,
        }
    }
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParameter::Static { key, value } => write!(f, "{key}={value}"),
            QueryParameter::Parameter {
                key,
                optional,
                allow_multiple,
            } => {
                let mark = if *optional { '?' } else { '!' };
                if *allow_multiple {
                    write!(f, "{key}={{[{mark}]}}")
                } else {
                    write!(f, "{key}={{{mark}}}")
                }
            }
            QueryParameter::Remainder => f.write_str("{...}"),
        }
    }
}

/// Match `clauses` against a parsed query.
///
/// Returns the captured parameters, or `None` when the query does not fit.
/// Without a [`QueryParameter::Remainder`], unclaimed keys fail the match.
pub(crate) fn match_query(clauses: &[QueryParameter], query: &Parameters) -> Option<Parameters> {
    let mut captured = Parameters::new();
    let mut claimed = BTreeSet::new();
    let mut remainder = false;

    for clause in clauses {
        match clause {
            QueryParameter::Static { key, value } => {
                if query.get(key).map(Vec::as_slice) != Some(std::slice::from_ref(value)) {
                    return None;
                }
                claimed.insert(key.as_str());
            }
            QueryParameter::Parameter {
                key,
                optional,
                allow_multiple,
            } => {
                claimed.insert(key.as_str());
                match query.get(key).filter(|values| !values.is_empty()) {
                    None if *optional => {}
                    None => return None,
                    Some(values) if values.len() > 1 && !allow_multiple => return None,
                    Some(values) => {
                        captured.insert(key.clone(), values.clone());
                    }
                }
            }
            QueryParameter::Remainder => remainder = true,
        }
    }

    for (key, values) in query {
        if claimed.contains(key.as_str()) {
            continue;
        }
        if !remainder {
            return None;
        }
        captured.insert(key.clone(), values.clone());
    }
    Some(captured)
}
