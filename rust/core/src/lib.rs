// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # GeoJSON-Mesh Core
//!
//! Document model for the GeoJSON to mesh conversion.
//!
//! ## Overview
//!
//! - **Document**: root validation over a [serde_json](https://docs.rs/serde_json)
//!   value tree; FeatureCollection, Feature or a bare geometry
//! - **Geometry**: one tagged variant per GeoJSON geometry type, read with
//!   strict coordinate checks
//! - **Attribute values**: typed values and lossless coercion from JSON
//! - **Declarations**: feature property declarations, including the compact
//!   `name:default,...` syntax parsed with [nom](https://docs.rs/nom)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geojson_mesh_core::{Document, FeatureProperties};
//!
//! let doc = Document::parse(r#"{"type":"Point","coordinates":[1,2]}"#)?;
//! for feature in doc.features() {
//!     let feature = feature?;
//!     println!("{:?}", feature.geometry()?);
//! }
//!
//! let declared: FeatureProperties = "height:0.0,label:\"none\"".parse()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for attribute values

pub mod declarations;
pub mod document;
pub mod error;
pub mod geometry;
pub mod value;

pub use declarations::{parse_declarations, FeatureProperties, PropertyDeclaration};
pub use document::{Document, DocumentKind, FeatureNode};
pub use error::{Error, Location, Result};
pub use geometry::{is_geometry_type, Geometry, PolygonRings, Position, Ring, GEOMETRY_TYPES};
pub use value::{AttributeValue, ValueType};
