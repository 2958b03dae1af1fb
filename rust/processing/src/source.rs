// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document sources

use std::borrow::Cow;
use std::path::Path;

use geojson_mesh_core::Error as CoreError;

use crate::error::Result;

/// Where the document text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource<'a> {
    File(&'a Path),
    Literal(&'a str),
}

impl<'a> DocumentSource<'a> {
    /// Read the whole document text
    pub fn read(&self) -> Result<Cow<'a, str>> {
        match *self {
            DocumentSource::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CoreError::SourceUnavailable(format!("{}: {}", path.display(), e))
                })?;
                tracing::debug!(path = %path.display(), bytes = text.len(), "Read document file");
                Ok(Cow::Owned(text))
            }
            DocumentSource::Literal(text) => {
                if text.is_empty() {
                    return Err(CoreError::SourceUnavailable("string input is empty".to_string()).into());
                }
                tracing::debug!(bytes = text.len(), "Using string input");
                Ok(Cow::Borrowed(text))
            }
        }
    }
}
