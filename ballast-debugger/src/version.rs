//! # Client version negotiation
//!
//! A debugger client announces its version as `major.minor.patch`, optionally
//! followed by a pre-release suffix such as `-SNAPSHOT`. The suffix is ignored,
//! and the version is mapped onto the serializer that speaks its protocol:
//!
//! | Client version | Serializer |
//! |----------------|------------|
//! | below `3.0.0` | [`SerializerMapping::Unsupported`] |
//! | `3.x.y` | [`SerializerMapping::V3`] |
//! | `4.x.y` | [`SerializerMapping::V4`] |
//! | `5.0.0` and above | [`SerializerMapping::Unsupported`] |

use crate::{
    error::DebuggerError,
    model::{BallastDebuggerAction, BallastDebuggerEvent},
};
use std::{fmt, str::FromStr};

/// A parsed `major.minor.patch` version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientVersion {
    /// Incompatible protocol changes.
    pub major: u32,
    /// Compatible additions.
    pub minor: u32,
    /// Fixes.
    pub patch: u32,
}

impl ClientVersion {
    /// Create a version from its parts.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `"3.2.2"` or `"4.0.0-SNAPSHOT"`.
    pub fn parse(version: &str) -> Result<Self, DebuggerError> {
        let invalid = || DebuggerError::InvalidVersion(version.to_string());
        let numbers = version
            .trim()
            .split_once(['-', '+'])
            .map_or(version.trim(), |(numbers, _)| numbers);

        let mut parts = numbers.split('.').map(|part| part.parse::<u32>());
        let (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(Self::new(major, minor, patch))
    }
}

impl FromStr for ClientVersion {
    type Err = DebuggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The serializer a client version is served with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializerMapping {
    /// Protocol 3: payloads carry `serialized*` text plus a content type.
    V3,
    /// Protocol 4: same envelope as protocol 3.
    V4,
    /// No serializer speaks this client's protocol.
    Unsupported,
}

impl SerializerMapping {
    /// Oldest client version still served.
    pub const MINIMUM: ClientVersion = ClientVersion::new(3, 0, 0);
    /// First client version too new to be served.
    pub const CEILING: ClientVersion = ClientVersion::new(5, 0, 0);

    /// Pick the serializer for `version`.
    pub fn resolve(version: ClientVersion) -> Self {
        if version < Self::MINIMUM || version >= Self::CEILING {
            return SerializerMapping::Unsupported;
        }
        match version.major {
            3 => SerializerMapping::V3,
            _ => SerializerMapping::V4,
        }
    }

    /// Parse and resolve a version string, rejecting unsupported clients.
    ///
    /// ```rust,ignore
    /// assert_eq!(SerializerMapping::negotiate("3.2.2")?, SerializerMapping::V3);
    /// assert!(SerializerMapping::negotiate("5.0.0").is_err());
    /// ```
    pub fn negotiate(version: &str) -> Result<Self, DebuggerError> {
        let parsed = ClientVersion::parse(version)?;
        match Self::resolve(parsed) {
            SerializerMapping::Unsupported => {
                Err(DebuggerError::UnsupportedVersion(parsed.to_string()))
            }
            mapping => Ok(mapping),
        }
    }

    /// Whether a serializer exists for this mapping.
    pub fn is_supported(self) -> bool {
        self != SerializerMapping::Unsupported
    }

    /// Encode an event for the wire.
    pub fn encode_event(self, event: &BallastDebuggerEvent) -> Result<String, DebuggerError> {
        match self {
            SerializerMapping::V3 | SerializerMapping::V4 => Ok(serde_json::to_string(event)?),
            SerializerMapping::Unsupported => Err(DebuggerError::NoSerializer),
        }
    }

    /// Decode an action received from the wire.
    pub fn decode_action(self, text: &str) -> Result<BallastDebuggerAction, DebuggerError> {
        match self {
            SerializerMapping::V3 | SerializerMapping::V4 => Ok(serde_json::from_str(text)?),
            SerializerMapping::Unsupported => Err(DebuggerError::NoSerializer),
        }
    }
}
