// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use geojson_mesh_processing::{
    convert_file, convert_str, AttributeValue, CellKind, CoercionPolicy, ConversionDriver,
    ErrorKind, GeoMesh, GeometryErrorPolicy, Location, PolygonCells, ReaderConfig, RunState,
};
use std::path::PathBuf;

fn city_block_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("city_block.geojson")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Every attribute column of every table has one entry per cell
fn assert_columns_match_cells(out: &GeoMesh) {
    for kind in [CellKind::Point, CellKind::Line, CellKind::Polygon] {
        let table = out.cell_data(kind);
        assert_eq!(table.len(), out.mesh.cell_count(kind), "{:?} table", kind);
        for column in table.columns() {
            assert_eq!(column.data.len(), table.len(), "column {}", column.name);
        }
    }
}

const SQUARE: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Polygon",
     "coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]},"properties":{"name":"A"}}
]}"#;

#[test]
fn empty_collection_gives_empty_mesh() {
    let mut driver = ConversionDriver::new(ReaderConfig::from_string(
        r#"{"type":"FeatureCollection","features":[]}"#,
    ));
    let out = driver.run().unwrap();
    assert!(out.mesh.is_empty());
    assert_eq!(out.mesh.total_cells(), 0);
    assert_eq!(driver.state(), RunState::Done);
}

#[test]
fn square_triangulates_to_two_triangles() {
    let config = ReaderConfig::new()
        .with_triangulate_polygons(true)
        .with_serialized_properties(true);
    let out = convert_str(SQUARE, config).unwrap();

    assert_eq!(out.mesh.vertex_count(), 4);
    match &out.mesh.polygons {
        PolygonCells::Triangles(triangles) => {
            assert_eq!(triangles.len(), 2);
            let mut corners: Vec<u32> = triangles.iter().flatten().copied().collect();
            corners.sort_unstable();
            corners.dedup();
            assert_eq!(corners, vec![0, 1, 2, 3]);
        }
        other => panic!("expected triangles, got {:?}", other),
    }
    let names = out.polygon_data.column("properties").unwrap().as_strings().unwrap();
    assert_eq!(names, &[r#"{"name":"A"}"#, r#"{"name":"A"}"#]);
}

#[test]
fn filled_polygon_drops_closing_vertex() {
    let out = convert_str(SQUARE, ReaderConfig::new()).unwrap();
    match &out.mesh.polygons {
        PolygonCells::Filled(cells) => assert_eq!(cells[0].exterior(), &[0, 1, 2, 3]),
        other => panic!("expected filled polygons, got {:?}", other),
    }
}

#[test]
fn outline_walks_each_ring_once() {
    let config = ReaderConfig::new()
        .with_outline_polygons(true)
        .with_triangulate_polygons(true);
    let out = convert_str(SQUARE, config).unwrap();

    let outlines = match &out.mesh.polygons {
        PolygonCells::Outlines(lines) => lines,
        other => panic!("expected outlines, got {:?}", other),
    };
    assert_eq!(outlines.len(), 1);
    let ring = outlines.get(0).unwrap();
    assert_eq!(ring.first(), ring.last());
    let mut visited = ring[..ring.len() - 1].to_vec();
    visited.sort_unstable();
    assert_eq!(visited, vec![0, 1, 2, 3]);
}

#[test]
fn triangle_input_is_kept_by_triangulation() {
    let text = r#"{"type":"Feature","geometry":{"type":"Polygon",
        "coordinates":[[[0,0],[2,0],[1,2],[0,0]]]},"properties":{}}"#;
    let out = convert_str(text, ReaderConfig::new().with_triangulate_polygons(true)).unwrap();
    assert_eq!(out.mesh.polygons, PolygonCells::Triangles(vec![[0, 1, 2]]));
}

#[test]
fn declared_properties_use_defaults_and_coercion() {
    let text = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},
        "properties":{"height":12}}"#;
    let config = ReaderConfig::new()
        .with_declarations("height:0.0,label:\"none\"")
        .unwrap();
    let out = convert_str(text, config).unwrap();

    assert_eq!(out.point_data.value("height", 0), Some(AttributeValue::Double(12.0)));
    assert_eq!(out.point_data.value("label", 0), Some(AttributeValue::from("none")));
}

#[test]
fn city_block_file() {
    init_tracing();
    let config = ReaderConfig::new()
        .with_feature_ids(true)
        .with_declarations("height:0.0,label:'',floors:0")
        .unwrap();
    let out = convert_file(city_block_path(), config).unwrap();

    // Polygon with hole, two-member MultiPolygon, LineString, Point + MultiPoint
    assert_eq!(out.mesh.cell_count(CellKind::Polygon), 3);
    assert_eq!(out.mesh.cell_count(CellKind::Line), 1);
    assert_eq!(out.mesh.cell_count(CellKind::Point), 3);
    assert_eq!(out.mesh.vertex_count(), 8 + 4 + 3 + 2 + 3);
    assert_columns_match_cells(&out);

    let ids = out.polygon_data.column("feature-id").unwrap().as_strings().unwrap();
    assert_eq!(ids, &["hall", "feature-1", "feature-1"]);
    assert_eq!(
        out.line_data.value("feature-id", 0),
        Some(AttributeValue::from("17"))
    );

    // "tall" cannot be read as a double and falls back to the default
    let heights = out.polygon_data.column("height").unwrap().as_doubles().unwrap();
    assert_eq!(heights, &[12.5, 0.0, 0.0]);
    let floors = out.polygon_data.column("floors").unwrap().as_ints().unwrap();
    assert_eq!(floors, &[3, 2, 2]);
    assert_eq!(
        out.point_data.column("label").unwrap().as_strings().unwrap(),
        &["", "", ""]
    );

    let (min, max) = out.mesh.bounds();
    assert_relative_eq!(min.y, -5.0);
    assert_relative_eq!(max.x, 50.0);
    assert_relative_eq!(max.z, 1.5);
}

#[test]
fn total_cells_match_triangulated_input() {
    let config = ReaderConfig::new().with_triangulate_polygons(true);
    let out = convert_file(city_block_path(), config).unwrap();

    // 2 points of MultiPoint + 1 Point, 1 line, triangles for every polygon
    let triangles = out.mesh.cell_count(CellKind::Polygon);
    assert!(triangles >= 2 + 2 + 1);
    assert_eq!(out.mesh.total_cells(), 3 + 1 + triangles);
    assert_columns_match_cells(&out);
}

#[test]
fn strict_coercion_reports_feature() {
    let config = ReaderConfig::new()
        .with_declarations("height:0.0")
        .unwrap()
        .with_coercion(CoercionPolicy::Strict);
    let err = convert_file(city_block_path(), config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeCoercionFailure);
    assert_eq!(err.location(), Some(Location::Feature { index: 1 }));
}

const ONE_BAD_FEATURE: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"k":1}},
    {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0]]},"properties":{"k":2}},
    {"type":"Feature","geometry":{"type":"Point","coordinates":[5,5]},"properties":{"k":3}}
]}"#;

#[test]
fn malformed_feature_aborts_by_default() {
    let mut driver = ConversionDriver::new(ReaderConfig::from_string(ONE_BAD_FEATURE));
    let err = driver.run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    assert_eq!(err.location(), Some(Location::Feature { index: 1 }));
    assert_eq!(driver.state(), RunState::Failed);
}

#[test]
fn skip_policy_drops_whole_feature() {
    let config = ReaderConfig::from_string(ONE_BAD_FEATURE)
        .with_geometry_errors(GeometryErrorPolicy::Skip)
        .with_declarations("k:0")
        .unwrap();
    let mut driver = ConversionDriver::new(config);
    let out = driver.run().unwrap();

    assert_eq!(out.mesh.vertex_count(), 2);
    assert_eq!(out.mesh.points, vec![0, 1]);
    assert_eq!(out.point_data.column("k").unwrap().as_ints(), Some(&[1, 3][..]));
    assert_eq!(driver.stats().features_read, 2);
    assert_eq!(driver.stats().features_skipped, 1);
}

#[test]
fn unsupported_geometry_type() {
    let text = r#"{"type":"Feature","geometry":{"type":"Circle","coordinates":[0,0]},"properties":{}}"#;
    let err = convert_str(text, ReaderConfig::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedGeometryType);
}

#[test]
fn parallel_matches_sequential() {
    let mut features = Vec::new();
    for i in 0..700 {
        let x = i as f64;
        features.push(format!(
            r#"{{"type":"Feature","id":{i},"geometry":{{"type":"GeometryCollection","geometries":[
                {{"type":"Polygon","coordinates":[[[{x},0],[{x1},0],[{x1},1],[{x},2],[{x},0]]]}},
                {{"type":"LineString","coordinates":[[{x},0],[{x},5]]}}]}},
              "properties":{{"rank":{i}}}}}"#,
            i = i,
            x = x,
            x1 = x + 0.5
        ));
    }
    let text = format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    );

    let config = ReaderConfig::new()
        .with_triangulate_polygons(true)
        .with_feature_ids(true)
        .with_declarations("rank:-1")
        .unwrap();
    let sequential = convert_str(&text, config.clone()).unwrap();
    let parallel = convert_str(&text, config.with_parallel(true)).unwrap();

    assert_eq!(parallel.mesh, sequential.mesh);
    assert_eq!(parallel.polygon_data, sequential.polygon_data);
    assert_eq!(parallel.line_data, sequential.line_data);
    assert_eq!(
        parallel.line_data.column("rank").unwrap().as_ints().unwrap()[699],
        699
    );
}

#[test]
fn missing_source() {
    let err = ConversionDriver::new(ReaderConfig::new()).run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);

    let err = convert_file("/nonexistent/city.geojson", ReaderConfig::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
}

#[test]
fn driver_runs_once() {
    let mut driver = ConversionDriver::new(ReaderConfig::from_string(SQUARE));
    driver.run().unwrap();
    assert_eq!(driver.run().unwrap_err().kind(), ErrorKind::AlreadyRun);
    assert_eq!(driver.into_output().unwrap().mesh.total_cells(), 1);
}
