// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoJSON-Mesh Processing
//!
//! Converts a GeoJSON document into an indexed mesh with per-cell
//! attribute columns.
//!
//! ## Overview
//!
//! - **Configuration**: [`ReaderConfig`] selects the source, the polygon
//!   mode, the attribute columns and the error policies
//! - **Driver**: [`ConversionDriver`] runs one conversion and reports
//!   [`RunStats`]; [`convert_str`] and [`convert_file`] are one-shot helpers
//! - **Attributes**: one [`AttributeTable`] per cell table, one entry per
//!   cell in every column
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geojson_mesh_processing::{convert_str, ReaderConfig};
//!
//! let config = ReaderConfig::new()
//!     .with_triangulate_polygons(true)
//!     .with_declarations("height:0.0,label:\"none\"")?;
//! let out = convert_str(text, config)?;
//!
//! println!("{} triangles", out.mesh.polygons.len());
//! println!("{:?}", out.polygon_data.column("height"));
//! ```
//!
//! ## Logging
//!
//! Progress is reported through [tracing](https://docs.rs/tracing); install
//! a subscriber to see it.

pub mod attributes;
pub mod config;
pub mod driver;
pub mod error;
pub mod projector;
pub mod source;

pub use attributes::{AttributeTable, Column, ColumnData, ColumnSpec};
pub use config::{
    CoercionPolicy, GeometryErrorPolicy, ReaderConfig, DEFAULT_PROPERTIES_ARRAY_NAME,
    FEATURE_ID_COLUMN,
};
pub use driver::{convert_file, convert_str, ConversionDriver, GeoMesh, RunState, RunStats};
pub use error::{Error, ErrorKind, Result};
pub use projector::PropertyProjector;
pub use source::DocumentSource;

pub use geojson_mesh_core::{AttributeValue, FeatureProperties, Location, ValueType};
pub use geojson_mesh_geometry::{CellArray, CellKind, PolyMesh, PolygonCell, PolygonCells, PolygonMode};
