// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for a conversion run.

use geojson_mesh_core::Location;
use thiserror::Error;

use crate::driver::RunState;

/// Result type for conversion runs
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the conversion driver
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] geojson_mesh_core::Error),

    #[error("Conversion already ran (state: {0:?}); start a new driver")]
    AlreadyRun(RunState),
}

/// Error kinds, independent of the layer that raised them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnavailable,
    MalformedDocument,
    UnsupportedGeometryType,
    InvalidPropertyDeclaration,
    TypeCoercionFailure,
    AlreadyRun,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use geojson_mesh_core::Error as Core;

        match self {
            Error::Document(Core::SourceUnavailable(_)) => ErrorKind::SourceUnavailable,
            Error::Document(Core::MalformedDocument { .. }) => ErrorKind::MalformedDocument,
            Error::Document(Core::UnsupportedGeometryType { .. }) => ErrorKind::UnsupportedGeometryType,
            Error::Document(Core::InvalidPropertyDeclaration(_)) => ErrorKind::InvalidPropertyDeclaration,
            Error::Document(Core::TypeCoercionFailure { .. }) => ErrorKind::TypeCoercionFailure,
            Error::AlreadyRun(_) => ErrorKind::AlreadyRun,
        }
    }

    /// Where in the input the error occurred, if known
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::Document(e) => e.location(),
            Error::AlreadyRun(_) => None,
        }
    }
}
