// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use geojson_mesh_core::{
    AttributeValue, Document, DocumentKind, Error, FeatureProperties, Geometry, Location, ValueType,
};

const PARCELS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "p1",
     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[4,0],[4,3],[0,0]]]},
     "properties": {"area": 6.0, "zone": "R1"}},
    {"type": "Feature",
     "geometry": {"type": "MultiPoint", "coordinates": [[1.5, 2.5, 10.25]]},
     "properties": {"area": 0}}
  ]
}"#;

#[test]
fn reads_features_in_document_order() {
    let doc = Document::parse(PARCELS).unwrap();
    assert_eq!(doc.kind(), DocumentKind::FeatureCollection);
    assert_eq!(doc.feature_count(), 2);

    let features: Vec<_> = doc.features().collect::<Result<_, _>>().unwrap();
    assert_eq!(features[0].index, 0);
    assert_eq!(features[1].index, 1);

    match features[0].geometry().unwrap() {
        Some(Geometry::Polygon(rings)) => {
            assert_eq!(rings.len(), 1);
            // Closing vertex dropped
            assert_eq!(rings[0].len(), 3);
        }
        other => panic!("expected a polygon, got {:?}", other),
    }
    match features[1].geometry().unwrap() {
        Some(Geometry::MultiPoint(points)) => {
            assert_relative_eq!(points[0].x, 1.5);
            assert_relative_eq!(points[0].z, 10.25);
        }
        other => panic!("expected a multipoint, got {:?}", other),
    }
}

#[test]
fn declared_values_coerce_from_properties() {
    let declared: FeatureProperties = "area:0.0, zone:'none', lots:1".parse().unwrap();
    let doc = Document::parse(PARCELS).unwrap();
    let feature = doc.features().nth(1).unwrap().unwrap();

    let area = declared.get("area").unwrap();
    assert_eq!(area.value_type(), ValueType::Double);
    let value = AttributeValue::coerce(feature.property("area").unwrap(), area.value_type());
    assert_eq!(value.and_then(|v| v.as_f64()), Some(0.0));

    assert_eq!(declared.get("zone").unwrap().default.as_str(), Some("none"));
    assert_eq!(declared.get("lots").unwrap().default, AttributeValue::Int(1));
    assert!(feature.property("zone").is_none());
}

#[test]
fn bad_coordinates_are_located_at_feature() {
    let doc = Document::parse(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Point","coordinates":[1]},"properties":{}}
        ]}"#,
    )
    .unwrap();
    let feature = doc.features().next().unwrap().unwrap();
    let err = feature.geometry().unwrap_err();
    assert!(matches!(err, Error::MalformedDocument { .. }));
    assert_eq!(err.location(), Some(Location::Feature { index: 0 }));
}

#[test]
fn invalid_declarations_are_rejected() {
    for input in ["height", ":1", "height:abc", "label:\"open"] {
        let err = input.parse::<FeatureProperties>().unwrap_err();
        assert!(
            matches!(err, Error::InvalidPropertyDeclaration(_)),
            "{:?} gave {:?}",
            input,
            err
        );
    }
}
