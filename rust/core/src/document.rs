// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! GeoJSON document root and feature access
//!
//! The raw text is parsed into a `serde_json::Value` tree once; features are
//! then read lazily so that an error in one feature can be attributed to
//! (and, if the caller wants, skipped at) that feature.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::geometry::{is_geometry_type, kind_of, type_of, Geometry};

/// What the document root is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    FeatureCollection,
    Feature,
    /// A bare geometry object at the root
    Geometry,
}

/// A parsed document whose root `"type"` has been validated.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    kind: DocumentKind,
}

impl Document {
    /// Parse raw text and validate the root.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(root)
    }

    /// Validate an already-parsed value tree as a document root.
    pub fn from_value(root: Value) -> Result<Self> {
        let kind = match type_of(&root)? {
            "FeatureCollection" => {
                match root.get("features") {
                    Some(Value::Array(_)) => {}
                    Some(other) => {
                        return Err(Error::malformed(format!(
                            "\"features\" must be an array, found {}",
                            kind_of(other)
                        )))
                    }
                    None => return Err(Error::malformed("FeatureCollection without \"features\"")),
                }
                DocumentKind::FeatureCollection
            }
            "Feature" => DocumentKind::Feature,
            name if is_geometry_type(name) => DocumentKind::Geometry,
            other => return Err(Error::unsupported(other)),
        };
        Ok(Self { root, kind })
    }

    #[inline]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Number of features the document holds (1 for a bare Feature or Geometry)
    pub fn feature_count(&self) -> usize {
        self.feature_nodes().len()
    }

    /// Features in document order. Errors are tagged with the feature index.
    pub fn features(&self) -> impl Iterator<Item = Result<FeatureNode<'_>>> + '_ {
        let kind = self.kind;
        self.feature_nodes()
            .iter()
            .enumerate()
            .map(move |(index, node)| match kind {
                DocumentKind::Geometry => Ok(FeatureNode {
                    index,
                    id: None,
                    geometry: Some(node),
                    properties: None,
                }),
                _ => FeatureNode::read(index, node).map_err(|e| e.at_feature(index)),
            })
    }

    fn feature_nodes(&self) -> &[Value] {
        match self.kind {
            DocumentKind::FeatureCollection => self
                .root
                .get("features")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            DocumentKind::Feature | DocumentKind::Geometry => std::slice::from_ref(&self.root),
        }
    }
}

/// One feature: a geometry node plus its property bag, borrowed from the tree.
#[derive(Debug, Clone, Copy)]
pub struct FeatureNode<'a> {
    /// 0-based offset in document order
    pub index: usize,
    pub id: Option<&'a Value>,
    /// `None` for a feature whose `"geometry"` is `null`
    pub geometry: Option<&'a Value>,
    /// `None` when `"properties"` is missing or `null`
    pub properties: Option<&'a Value>,
}

impl<'a> FeatureNode<'a> {
    fn read(index: usize, node: &'a Value) -> Result<Self> {
        match type_of(node)? {
            "Feature" => {}
            other => {
                return Err(Error::malformed(format!(
                    "expected a Feature, found {:?}",
                    other
                )))
            }
        }
        let geometry = match node.get("geometry") {
            Some(Value::Null) => None,
            Some(g) => Some(g),
            None => return Err(Error::malformed("Feature without \"geometry\"")),
        };
        let properties = node.get("properties").filter(|p| !p.is_null());
        Ok(Self {
            index,
            id: node.get("id").filter(|id| !id.is_null()),
            geometry,
            properties,
        })
    }

    /// Read this feature's geometry; `Ok(None)` for a null geometry.
    pub fn geometry(&self) -> Result<Option<Geometry>> {
        self.geometry
            .map(Geometry::from_json)
            .transpose()
            .map_err(|e| e.at_feature(self.index))
    }

    /// Look up a member of the properties object
    pub fn property(&self, name: &str) -> Option<&'a Value> {
        self.properties.and_then(|p| p.get(name))
    }

    /// The feature's `"id"` as text, or `feature-<index>` when it has none
    pub fn id_string(&self) -> String {
        match self.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("feature-{}", self.index),
        }
    }

    /// Compact serialization of the properties object (`null` when absent).
    ///
    /// Object keys come out in lexical order.
    pub fn serialized_properties(&self) -> String {
        match self.properties {
            Some(p) => p.to_string(),
            None => Value::Null.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Location;

    #[test]
    fn test_empty_collection() {
        let doc = Document::parse(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert_eq!(doc.kind(), DocumentKind::FeatureCollection);
        assert_eq!(doc.feature_count(), 0);
        assert_eq!(doc.features().count(), 0);
    }

    #[test]
    fn test_bare_geometry_root() {
        let doc = Document::parse(r#"{"type":"Point","coordinates":[1,2]}"#).unwrap();
        assert_eq!(doc.kind(), DocumentKind::Geometry);
        let features: Vec<_> = doc.features().collect::<Result<_>>().unwrap();
        assert_eq!(features.len(), 1);
        assert!(features[0].properties.is_none());
        assert!(features[0].geometry().unwrap().is_some());
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let err = Document::parse("{\"type\": \"Feature\",\n  \"geometry\": nul }").unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedDocument {
                location: Location::Document { line: 2, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_root_type_checks() {
        assert!(matches!(
            Document::parse(r#"{"features":[]}"#),
            Err(Error::MalformedDocument { .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"type":"Topology"}"#),
            Err(Error::UnsupportedGeometryType { .. })
        ));
        assert!(matches!(
            Document::parse(r#"{"type":"FeatureCollection"}"#),
            Err(Error::MalformedDocument { .. })
        ));
        assert!(Document::parse("[]").is_err());
    }

    #[test]
    fn test_feature_errors_carry_index() {
        let doc = Document::parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":null},
                {"type":"Feature","properties":{}},
                {"type":"Feature","geometry":{"type":"Blob"},"properties":{}}
            ]}"#,
        )
        .unwrap();
        let features: Vec<_> = doc.features().collect();
        assert!(features[0].as_ref().unwrap().geometry().unwrap().is_none());
        assert_eq!(
            features[1].as_ref().unwrap_err().location(),
            Some(Location::Feature { index: 1 })
        );
        let err = features[2].as_ref().unwrap().geometry().unwrap_err();
        assert_eq!(err.location(), Some(Location::Feature { index: 2 }));
    }

    #[test]
    fn test_feature_id_and_serialized_properties() {
        let doc = Document::parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"road-7","geometry":null,"properties":{"b":1,"a":"x"}},
                {"type":"Feature","id":42,"geometry":null},
                {"type":"Feature","geometry":null,"properties":null}
            ]}"#,
        )
        .unwrap();
        let features: Vec<_> = doc.features().collect::<Result<_>>().unwrap();
        assert_eq!(features[0].id_string(), "road-7");
        assert_eq!(features[1].id_string(), "42");
        assert_eq!(features[2].id_string(), "feature-2");
        assert_eq!(features[0].serialized_properties(), r#"{"a":"x","b":1}"#);
        assert_eq!(features[2].serialized_properties(), "null");
        assert_eq!(features[0].property("b"), Some(&serde_json::json!(1)));
    }
}
