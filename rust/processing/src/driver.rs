// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion driver
//!
//! One run: acquire the source, parse the document, build every feature
//! into the mesh, post-process polygons and attach the attribute tables.
//!
//! ```text
//! Idle -> Parsing -> Converting -> Done
//!            \            \
//!             +------------+--> Failed
//! ```

use std::path::Path;

use geojson_mesh_core::{AttributeValue, Document, FeatureNode, Geometry};
use geojson_mesh_geometry::{build_geometry, CellKind, MeshAccumulator, PolyMesh};
use rayon::prelude::*;
use serde::Serialize;

use crate::attributes::AttributeTable;
use crate::config::{GeometryErrorPolicy, ReaderConfig};
use crate::error::{Error, Result};
use crate::projector::PropertyProjector;

/// Features handed to one rayon task in parallel mode
const FEATURE_CHUNK_SIZE: usize = 256;

/// Lifecycle of a [`ConversionDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Parsing,
    Converting,
    Done,
    Failed,
}

/// Run summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub features_read: usize,
    pub features_skipped: usize,
    pub vertices: usize,
    pub points: usize,
    pub lines: usize,
    pub polygons: usize,
}

/// Output of a run: the mesh plus one attribute table per cell table
#[derive(Debug, Clone)]
pub struct GeoMesh {
    pub mesh: PolyMesh,
    pub point_data: AttributeTable,
    pub line_data: AttributeTable,
    pub polygon_data: AttributeTable,
}

impl GeoMesh {
    pub fn cell_data(&self, kind: CellKind) -> &AttributeTable {
        match kind {
            CellKind::Point => &self.point_data,
            CellKind::Line => &self.line_data,
            CellKind::Polygon => &self.polygon_data,
        }
    }
}

/// Runs one conversion. A driver is single-use.
pub struct ConversionDriver {
    config: ReaderConfig,
    state: RunState,
    stats: RunStats,
    output: Option<GeoMesh>,
}

impl ConversionDriver {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            stats: RunStats::default(),
            output: None,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// The output of a successful run
    pub fn output(&self) -> Option<&GeoMesh> {
        self.output.as_ref()
    }

    pub fn into_output(self) -> Option<GeoMesh> {
        self.output
    }

    /// Run the conversion. Fails with `AlreadyRun` unless the driver is idle.
    pub fn run(&mut self) -> Result<&GeoMesh> {
        if self.state != RunState::Idle {
            return Err(Error::AlreadyRun(self.state));
        }

        match convert(&self.config, &mut self.state, &mut self.stats) {
            Ok(output) => {
                transition(&mut self.state, RunState::Done);
                Ok(&*self.output.insert(output))
            }
            Err(e) => {
                transition(&mut self.state, RunState::Failed);
                tracing::debug!(error = %e, "Conversion failed");
                Err(e)
            }
        }
    }
}

/// Convert an in-memory document
pub fn convert_str(text: &str, config: ReaderConfig) -> Result<GeoMesh> {
    let config = config.with_string_input(text);
    let mut state = RunState::Idle;
    convert(&config, &mut state, &mut RunStats::default())
}

/// Convert a document file
pub fn convert_file(path: impl AsRef<Path>, config: ReaderConfig) -> Result<GeoMesh> {
    let config = config.with_file_name(path.as_ref());
    let mut state = RunState::Idle;
    convert(&config, &mut state, &mut RunStats::default())
}

fn transition(state: &mut RunState, next: RunState) {
    tracing::debug!(from = ?*state, to = ?next, "Conversion state");
    *state = next;
}

fn convert(config: &ReaderConfig, state: &mut RunState, stats: &mut RunStats) -> Result<GeoMesh> {
    // PHASE 1: Acquire and parse the document
    transition(state, RunState::Parsing);
    let projector = PropertyProjector::new(config)?;
    let text = config.source()?.read()?;
    let document = Document::parse(&text)?;
    tracing::info!(
        bytes = text.len(),
        features = document.feature_count(),
        kind = ?document.kind(),
        parallel = config.parallel,
        "Starting GeoJSON conversion"
    );

    // PHASE 2: Build every feature, in document order
    transition(state, RunState::Converting);
    let policy = config.geometry_errors;
    let batch = if config.parallel {
        let nodes: Vec<Result<FeatureNode<'_>>> = document
            .features()
            .map(|node| node.map_err(Error::from))
            .collect();
        let chunks: Vec<Result<Batch>> = nodes
            .par_chunks(FEATURE_CHUNK_SIZE)
            .map(|chunk| Batch::build(&projector, policy, chunk.iter().cloned()))
            .collect();

        let mut batch = Batch::default();
        for chunk in chunks {
            batch.append(chunk?);
        }
        batch
    } else {
        Batch::build(
            &projector,
            policy,
            document.features().map(|node| node.map_err(Error::from)),
        )?
    };

    // PHASE 3: Post-process polygons and attach attributes
    let Batch {
        mesh,
        rows,
        point_rows,
        line_rows,
        polygon_rows,
        read,
        skipped,
    } = batch;
    let (mesh, parents) = mesh.finish(config.polygon_mode());
    let polygon_rows: Vec<usize> = parents.iter().map(|&p| polygon_rows[p]).collect();

    let schema = projector.schema();
    let output = GeoMesh {
        point_data: AttributeTable::from_rows(schema, &rows, &point_rows),
        line_data: AttributeTable::from_rows(schema, &rows, &line_rows),
        polygon_data: AttributeTable::from_rows(schema, &rows, &polygon_rows),
        mesh,
    };

    *stats = RunStats {
        features_read: read,
        features_skipped: skipped,
        vertices: output.mesh.vertex_count(),
        points: output.mesh.cell_count(CellKind::Point),
        lines: output.mesh.cell_count(CellKind::Line),
        polygons: output.mesh.cell_count(CellKind::Polygon),
    };
    tracing::info!(
        features = stats.features_read,
        skipped = stats.features_skipped,
        vertices = stats.vertices,
        points = stats.points,
        lines = stats.lines,
        polygons = stats.polygons,
        "GeoJSON conversion complete"
    );

    Ok(output)
}

/// Mesh and attribute rows built from a run of consecutive features.
///
/// `rows[r]` is the attribute row of the r-th feature kept; the
/// `*_rows` vectors map each cell of a table to its feature row.
#[derive(Default)]
struct Batch {
    mesh: MeshAccumulator,
    rows: Vec<Vec<AttributeValue>>,
    point_rows: Vec<usize>,
    line_rows: Vec<usize>,
    polygon_rows: Vec<usize>,
    read: usize,
    skipped: usize,
}

impl Batch {
    fn build<'a, I>(projector: &PropertyProjector, policy: GeometryErrorPolicy, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<FeatureNode<'a>>>,
    {
        let mut batch = Batch::default();
        for node in nodes {
            match read_feature(projector, node) {
                Ok((geometry, row)) => batch.add(geometry.as_ref(), row),
                Err(e) => match policy {
                    GeometryErrorPolicy::Abort => return Err(e),
                    GeometryErrorPolicy::Skip => {
                        tracing::warn!(error = %e, "Skipping feature");
                        batch.skipped += 1;
                    }
                },
            }
        }
        Ok(batch)
    }

    fn add(&mut self, geometry: Option<&Geometry>, row: Vec<AttributeValue>) {
        let r = self.rows.len();
        self.rows.push(row);
        self.read += 1;

        let Some(geometry) = geometry else {
            return;
        };
        for cell in build_geometry(&mut self.mesh, geometry) {
            match cell.kind {
                CellKind::Point => self.point_rows.push(r),
                CellKind::Line => self.line_rows.push(r),
                CellKind::Polygon => self.polygon_rows.push(r),
            }
        }
    }

    /// Append a later batch, rebasing its vertex indices and rows
    fn append(&mut self, other: Batch) {
        let base = self.rows.len();
        self.mesh.append(&other.mesh);
        self.rows.extend(other.rows);
        self.point_rows.extend(other.point_rows.iter().map(|r| r + base));
        self.line_rows.extend(other.line_rows.iter().map(|r| r + base));
        self.polygon_rows.extend(other.polygon_rows.iter().map(|r| r + base));
        self.read += other.read;
        self.skipped += other.skipped;
    }
}

/// Read a feature's geometry and attribute row without touching the mesh
fn read_feature(
    projector: &PropertyProjector,
    node: Result<FeatureNode<'_>>,
) -> Result<(Option<Geometry>, Vec<AttributeValue>)> {
    let node = node?;
    let geometry = node.geometry()?;
    let row = projector.project(&node)?;
    Ok((geometry, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TWO_FEATURES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"n":1}},
        {"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[
            [[0,0],[1,1]],[[2,2],[3,3],[4,4]]]},"properties":{"n":2}}
    ]}"#;

    #[test]
    fn test_state_transitions() {
        let mut driver = ConversionDriver::new(ReaderConfig::from_string(TWO_FEATURES));
        assert_eq!(driver.state(), RunState::Idle);
        driver.run().unwrap();
        assert_eq!(driver.state(), RunState::Done);
        assert!(driver.output().is_some());

        let err = driver.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyRun);
        assert_eq!(driver.state(), RunState::Done);
    }

    #[test]
    fn test_failed_run() {
        let mut driver = ConversionDriver::new(ReaderConfig::from_string("{"));
        assert_eq!(driver.run().unwrap_err().kind(), ErrorKind::MalformedDocument);
        assert_eq!(driver.state(), RunState::Failed);
        assert!(driver.output().is_none());
        assert!(matches!(driver.run(), Err(Error::AlreadyRun(RunState::Failed))));
    }

    #[test]
    fn test_rows_follow_cells() {
        let config = ReaderConfig::new().with_declarations("n:0").unwrap();
        let out = convert_str(TWO_FEATURES, config).unwrap();
        assert_eq!(out.point_data.column("n").unwrap().as_ints(), Some(&[1][..]));
        assert_eq!(out.line_data.column("n").unwrap().as_ints(), Some(&[2, 2][..]));
        assert!(out.polygon_data.is_empty());
    }

    #[test]
    fn test_stats() {
        let mut driver = ConversionDriver::new(ReaderConfig::from_string(TWO_FEATURES));
        driver.run().unwrap();
        assert_eq!(
            driver.stats(),
            &RunStats {
                features_read: 2,
                features_skipped: 0,
                vertices: 6,
                points: 1,
                lines: 2,
                polygons: 0,
            }
        );
    }

    #[test]
    fn test_batch_append_rebases_rows() {
        let doc = Document::parse(TWO_FEATURES).unwrap();
        let projector = PropertyProjector::new(&ReaderConfig::new()).unwrap();
        let mut nodes = doc.features().map(|n| n.map_err(Error::from));

        let mut first = Batch::build(&projector, GeometryErrorPolicy::Abort, nodes.next()).unwrap();
        let second = Batch::build(&projector, GeometryErrorPolicy::Abort, nodes).unwrap();
        first.append(second);

        assert_eq!(first.rows.len(), 2);
        assert_eq!(first.point_rows, vec![0]);
        assert_eq!(first.line_rows, vec![1, 1]);
        assert_eq!(first.mesh.lines().get(0), Some(&[1, 2][..]));
    }
}
