// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types shared by every stage of the conversion.

use std::fmt;

use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the input an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The document root (root `"type"`, `"features"` member).
    Root,
    /// A position in the raw text, as reported by the JSON parser (1-based).
    Document { line: usize, column: usize },
    /// A feature, by its 0-based offset in document order.
    Feature { index: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Root => write!(f, "document root"),
            Location::Document { line, column } => write!(f, "line {}, column {}", line, column),
            Location::Feature { index } => write!(f, "feature {}", index),
        }
    }
}

/// Errors that can occur while reading and converting a GeoJSON document
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Malformed document at {location}: {message}")]
    MalformedDocument { message: String, location: Location },

    #[error("Unsupported geometry type {type_name:?} at {location}")]
    UnsupportedGeometryType { type_name: String, location: Location },

    #[error("Invalid property declaration: {0}")]
    InvalidPropertyDeclaration(String),

    #[error("Property {property:?} at {location} cannot be read as {expected}")]
    TypeCoercionFailure {
        property: String,
        expected: &'static str,
        location: Location,
    },
}

impl Error {
    /// Malformed-document error located at the document root
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedDocument {
            message: message.into(),
            location: Location::Root,
        }
    }

    /// Unsupported-type error located at the document root
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Error::UnsupportedGeometryType {
            type_name: type_name.into(),
            location: Location::Root,
        }
    }

    /// The location attached to this error, if it carries one
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::MalformedDocument { location, .. }
            | Error::UnsupportedGeometryType { location, .. }
            | Error::TypeCoercionFailure { location, .. } => Some(*location),
            Error::SourceUnavailable(_) | Error::InvalidPropertyDeclaration(_) => None,
        }
    }

    /// Re-tag a located error with the feature it occurred in.
    ///
    /// Positions from the JSON parser are kept; they are more precise.
    pub fn at_feature(self, index: usize) -> Self {
        let retag = |location: Location| match location {
            Location::Document { .. } => location,
            _ => Location::Feature { index },
        };
        match self {
            Error::MalformedDocument { message, location } => Error::MalformedDocument {
                message,
                location: retag(location),
            },
            Error::UnsupportedGeometryType {
                type_name,
                location,
            } => Error::UnsupportedGeometryType {
                type_name,
                location: retag(location),
            },
            Error::TypeCoercionFailure {
                property,
                expected,
                location,
            } => Error::TypeCoercionFailure {
                property,
                expected,
                location: retag(location),
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedDocument {
            message: err.to_string(),
            location: Location::Document {
                line: err.line(),
                column: err.column(),
            },
        }
    }
}
