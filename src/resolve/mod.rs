//! # Node Resolver
//!
//! Derives canonical network nodes from line endpoints that may differ by
//! floating-point jitter while denoting the same physical junction.
//!
//! ```text
//! endpoints → extent → quantization grid → first-seen cell ids
//!           → (optional) nearest canonical node snapping
//!           → node table + per-line (NODEA, NODEB)
//! ```
//!
//! Ids are sequential from 0 in first-seen order (line 0 start, line 0 end,
//! line 1 start, ...). They are stable within one run only.

pub mod grid;
pub mod snap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::*;
use crate::{Error, Result};

pub use grid::{Extent, Grid, GridCell, DEGENERATE_STEP};
pub use snap::NodeIndex;

/// Default number of quantization steps spanning each axis.
pub const DEFAULT_STEPS: u64 = 100_000_000;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Grid divisions per axis.
    pub steps: u64,
    /// Rebind every endpoint to its nearest canonical node after quantization.
    pub snap_to_nearest: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { steps: DEFAULT_STEPS, snap_to_nearest: true }
    }
}

// ============================================================================
// Resolution result
// ============================================================================

/// Output of a resolver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Canonical nodes; `nodes[i].id == NodeId(i)`.
    pub nodes: Vec<Node>,
    /// `(start, end)` node of every input line, in input order.
    pub line_nodes: Vec<(NodeId, NodeId)>,
    /// Grid used for quantization, `None` for an empty network.
    pub grid: Option<Grid>,
    /// Endpoints rebound to a different node by the snapping pass.
    pub snapped: usize,
}

impl Resolution {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn line_count(&self) -> usize {
        self.line_nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Copies of `lines` carrying `NODEA` / `NODEB`.
    ///
    /// `lines` must be the collection this resolution was computed from.
    pub fn annotate_lines(&self, lines: &[LineFeature]) -> Vec<LineFeature> {
        lines
            .iter()
            .zip(&self.line_nodes)
            .map(|(line, (a, b))| {
                line.clone()
                    .with_property(NODE_A_FIELD, a.0 as i64)
                    .with_property(NODE_B_FIELD, b.0 as i64)
            })
            .collect()
    }

    /// Node table as point features carrying `GID`.
    pub fn node_features(&self) -> Vec<PointFeature> {
        self.nodes
            .iter()
            .map(|n| PointFeature::new(n.coord).with_property(GID_FIELD, n.id.0 as i64))
            .collect()
    }
}

// ============================================================================
// Resolver
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct NodeResolver {
    config: ResolverConfig,
}

impl NodeResolver {
    pub fn new(config: ResolverConfig) -> Result<Self> {
        if config.steps == 0 {
            return Err(Error::InvalidConfig("resolver steps must be greater than 0".into()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the start and end node of every line.
    ///
    /// Geometry is validated before the extent is computed; an empty
    /// collection yields an empty resolution.
    pub fn resolve(&self, lines: &[LineFeature]) -> Result<Resolution> {
        validate_lines(lines)?;

        let endpoints: Vec<Coord> = lines
            .iter()
            .flat_map(|l| [l.coords[0], l.coords[l.coords.len() - 1]])
            .collect();

        let points = self.resolve_points(&endpoints);
        let line_nodes = points
            .assignment
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        info!(
            lines = lines.len(),
            nodes = points.nodes.len(),
            snapped = points.snapped,
            "resolved network nodes"
        );

        Ok(Resolution {
            nodes: points.nodes,
            line_nodes,
            grid: points.grid,
            snapped: points.snapped,
        })
    }

    /// Resolve an arbitrary point set to canonical nodes. The result's
    /// `assignment[i]` is the node of `coords[i]`.
    pub fn resolve_points(&self, coords: &[Coord]) -> PointResolution {
        let Some(extent) = Extent::enclosing(coords) else {
            return PointResolution::default();
        };

        let grid = Grid::new(&extent, self.config.steps);
        if grid.is_degenerate() {
            debug!(axes = ?grid.degenerate, step = DEGENERATE_STEP, "degenerate extent, using fallback step");
        }

        let mut cells: HashMap<GridCell, NodeId> = HashMap::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut assignment: Vec<NodeId> = Vec::with_capacity(coords.len());

        for c in coords {
            let cell = grid.cell(c);
            let id = *cells.entry(cell).or_insert_with(|| {
                let id = NodeId(nodes.len() as u64);
                nodes.push(Node::new(id, grid.position(cell)));
                id
            });
            assignment.push(id);
        }

        let mut snapped = 0;
        if self.config.snap_to_nearest {
            let index = NodeIndex::build(&nodes);
            for (c, id) in coords.iter().zip(assignment.iter_mut()) {
                if let Some(nearest) = index.nearest(c) {
                    if nearest != *id {
                        snapped += 1;
                        *id = nearest;
                    }
                }
            }
        }

        PointResolution { nodes, assignment, grid: Some(grid), snapped }
    }
}

/// Output of [`NodeResolver::resolve_points`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointResolution {
    pub nodes: Vec<Node>,
    pub assignment: Vec<NodeId>,
    pub grid: Option<Grid>,
    pub snapped: usize,
}
