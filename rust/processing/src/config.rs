// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reader configuration

use std::path::PathBuf;

use geojson_mesh_core::{Error as CoreError, FeatureProperties};
use geojson_mesh_geometry::PolygonMode;

use crate::error::Result;
use crate::source::DocumentSource;

/// Default name of the serialized properties column
pub const DEFAULT_PROPERTIES_ARRAY_NAME: &str = "properties";

/// Name of the feature id column
pub const FEATURE_ID_COLUMN: &str = "feature-id";

/// What to do when one feature cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryErrorPolicy {
    /// Fail the run with the feature's error
    #[default]
    Abort,
    /// Drop the feature, log a warning and continue
    Skip,
}

/// What to do when a declared property cannot be read as its declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Use the declared default and log a warning
    #[default]
    FallbackToDefault,
    /// Fail with `TypeCoercionFailure`
    Strict,
}

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub file_name: Option<PathBuf>,
    pub string_input: Option<String>,
    /// Read `string_input` instead of `file_name`
    pub string_input_mode: bool,
    pub triangulate_polygons: bool,
    pub outline_polygons: bool,
    /// Attach each feature's properties as one serialized JSON string column
    pub serialized_properties_array: bool,
    pub serialized_properties_array_name: String,
    pub feature_properties: FeatureProperties,
    /// Attach a `feature-id` string column
    pub feature_ids: bool,
    pub geometry_errors: GeometryErrorPolicy,
    pub coercion: CoercionPolicy,
    /// Build features on the rayon pool
    pub parallel: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            file_name: None,
            string_input: None,
            string_input_mode: false,
            triangulate_polygons: false,
            outline_polygons: false,
            serialized_properties_array: false,
            serialized_properties_array_name: DEFAULT_PROPERTIES_ARRAY_NAME.to_string(),
            feature_properties: FeatureProperties::new(),
            feature_ids: false,
            geometry_errors: GeometryErrorPolicy::default(),
            coercion: CoercionPolicy::default(),
            parallel: false,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from a file
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::default().with_file_name(path)
    }

    /// Read from an in-memory string
    pub fn from_string(text: impl Into<String>) -> Self {
        Self::default().with_string_input(text)
    }

    pub fn with_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_name = Some(path.into());
        self.string_input_mode = false;
        self
    }

    pub fn with_string_input(mut self, text: impl Into<String>) -> Self {
        self.string_input = Some(text.into());
        self.string_input_mode = true;
        self
    }

    pub fn with_string_input_mode(mut self, enabled: bool) -> Self {
        self.string_input_mode = enabled;
        self
    }

    pub fn with_triangulate_polygons(mut self, enabled: bool) -> Self {
        self.triangulate_polygons = enabled;
        self
    }

    pub fn with_outline_polygons(mut self, enabled: bool) -> Self {
        self.outline_polygons = enabled;
        self
    }

    pub fn with_serialized_properties(mut self, enabled: bool) -> Self {
        self.serialized_properties_array = enabled;
        self
    }

    pub fn with_serialized_properties_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_properties_array_name = name.into();
        self
    }

    pub fn with_feature_properties(mut self, properties: FeatureProperties) -> Self {
        self.feature_properties = properties;
        self
    }

    /// Declare properties from the compact `name:default,...` syntax
    pub fn with_declarations(mut self, declarations: &str) -> Result<Self> {
        self.feature_properties.add_from_str(declarations)?;
        Ok(self)
    }

    pub fn with_feature_ids(mut self, enabled: bool) -> Self {
        self.feature_ids = enabled;
        self
    }

    pub fn with_geometry_errors(mut self, policy: GeometryErrorPolicy) -> Self {
        self.geometry_errors = policy;
        self
    }

    pub fn with_coercion(mut self, policy: CoercionPolicy) -> Self {
        self.coercion = policy;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    #[inline]
    pub fn polygon_mode(&self) -> PolygonMode {
        PolygonMode::from_flags(self.triangulate_polygons, self.outline_polygons)
    }

    /// The source selected by `string_input_mode`
    pub fn source(&self) -> Result<DocumentSource<'_>> {
        if self.string_input_mode {
            match self.string_input.as_deref() {
                Some(text) if !text.is_empty() => Ok(DocumentSource::Literal(text)),
                _ => Err(CoreError::SourceUnavailable("string input is empty".to_string()).into()),
            }
        } else {
            match self.file_name.as_deref() {
                Some(path) if !path.as_os_str().is_empty() => Ok(DocumentSource::File(path)),
                _ => Err(CoreError::SourceUnavailable("no file name set".to_string()).into()),
            }
        }
    }
}
