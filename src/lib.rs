//! # fluvial-network: River Network Topology and Stream Order
//!
//! Prepares a hydrographic network for fluvial-corridor analysis: builds the
//! node graph of an unordered set of stream reaches and ranks every reach by
//! Strahler order.
//!
//! ## Design Principles
//!
//! 1. **Sink-first**: `FeatureSink` is the contract with whatever persists layers
//! 2. **Clean DTOs**: `LineFeature`, `PointFeature`, `Value` cross all boundaries
//! 3. **Pure stages**: resolution and ordering are functions over in-memory data
//! 4. **One write per layer**: results are accumulated, then flushed once
//!
//! ## Quick Start
//!
//! ```rust
//! use fluvial_network::{LineFeature, MemorySink, Network, NetworkConfig};
//!
//! # fn example() -> fluvial_network::Result<()> {
//! let network = Network::with_sink(MemorySink::new(), NetworkConfig::default())?;
//!
//! let lines = vec![
//!     LineFeature::new([(5.0, 5.0), (10.0, 10.0)]),
//!     LineFeature::new([(3.0, 3.0), (10.0, 10.0)]),
//!     LineFeature::new([(10.0, 10.0), (20.0, 10.0)]),
//! ];
//! let report = network.prepare(&lines)?;
//!
//! let ordered = network.sink().lines("network_strahler").unwrap_or_default();
//! assert_eq!(ordered[2].get("strahler").and_then(|v| v.as_int()), Some(2));
//! assert_eq!(report.max_order, 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Operation | Output layer |
//! |-------|-----------|--------------|
//! | Node resolution | [`Network::identify_nodes`] | `network_nodes`, `nodes` |
//! | Stream order | [`Network::strahler_order`] | `network_strahler` |
//! | Sources | [`Network::create_sources`] | `sources` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod resolve;
pub mod order;
pub mod sources;
pub mod sink;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Coord, LineFeature, PointFeature, Node, NodeId, Value, PropertyMap,
};
pub use config::{LayerNames, NetworkConfig, TopologySource};
pub use resolve::{NodeResolver, Resolution, ResolverConfig};
pub use order::{CycleDetected, OrderConfig, StrahlerEngine, StreamOrdering, Topology};
pub use sources::extract_sources;
pub use sink::{FeatureSink, MemorySink};

use tracing::info;

// ============================================================================
// Top-level Network handle
// ============================================================================

/// Result of one output stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The layer was (re)written with this many features.
    Written(usize),
    /// The layer existed and overwrite is disabled.
    Skipped,
}

/// Summary of [`Network::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareReport {
    pub nodes: Outcome,
    pub network_nodes: Outcome,
    pub strahler: Outcome,
    pub sources: Outcome,
    pub node_count: usize,
    pub max_order: u32,
    /// Lines dropped because no head reaches them.
    pub dropped: usize,
    /// Traversals aborted on a cycle. The rest of the network is still written.
    pub cycles: Vec<CycleDetected>,
}

/// The primary entry point. A `Network` wraps a feature sink and runs the
/// preparation stages against it.
pub struct Network<S: FeatureSink> {
    sink: S,
    config: NetworkConfig,
    resolver: NodeResolver,
    engine: StrahlerEngine,
}

impl<S: FeatureSink> Network<S> {
    /// Create a Network writing to `sink`.
    pub fn with_sink(sink: S, config: NetworkConfig) -> Result<Self> {
        let resolver = NodeResolver::new(config.resolver.clone())?;
        let engine = StrahlerEngine::new(config.order.clone());
        Ok(Self { sink, config, resolver, engine })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Access the underlying sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Resolve network nodes and write the annotated lines and node points.
    pub fn identify_nodes(&self, lines: &[LineFeature]) -> Result<(Outcome, Outcome)> {
        let layers = &self.config.layers;
        if self.skips(&layers.network_nodes) && self.skips(&layers.nodes) {
            return Ok((Outcome::Skipped, Outcome::Skipped));
        }

        let resolution = self.resolver.resolve(lines)?;
        let network_nodes = self.flush_lines(&layers.network_nodes, resolution.annotate_lines(lines))?;
        let nodes = self.flush_points(&layers.nodes, resolution.node_features())?;
        Ok((network_nodes, nodes))
    }

    /// Compute Strahler order and write the reached lines once.
    pub fn strahler_order(&self, lines: &[LineFeature]) -> Result<Outcome> {
        let layer = &self.config.layers.strahler;
        if self.skips(layer) {
            return Ok(Outcome::Skipped);
        }

        let topology = self.topology(lines)?;
        let ordering = self.engine.run(&topology)?;
        self.flush_lines(layer, ordering.ordered_lines(lines, &self.config.order.field))
    }

    /// Write a source point for every order-1 line of an ordered network.
    pub fn create_sources(&self, ordered: &[LineFeature]) -> Result<Outcome> {
        let layer = &self.config.layers.sources;
        if self.skips(layer) {
            return Ok(Outcome::Skipped);
        }

        let sources = sources::extract_sources(ordered, &self.config.order.field)?;
        self.flush_points(layer, sources)
    }

    /// Run every stage over `lines`.
    ///
    /// All results are computed in memory before the first layer is written,
    /// so a failing stage leaves the sink untouched.
    ///
    /// With [`TopologySource::NodeFields`] the ordered lines and sources keep
    /// the `NODEA`/`NODEB` values of the input, since those ids define the
    /// order. Only the `network_nodes` and `nodes` layers carry resolved ids.
    pub fn prepare(&self, lines: &[LineFeature]) -> Result<PrepareReport> {
        let resolution = self.resolver.resolve(lines)?;
        let topology = match self.config.topology {
            TopologySource::Resolve => Topology::from_resolution(&resolution),
            _ => self.topology(lines)?,
        };
        let ordering = self.engine.run(&topology)?;

        let annotated = resolution.annotate_lines(lines);
        let base: &[LineFeature] = match self.config.topology {
            TopologySource::NodeFields => lines,
            _ => &annotated,
        };
        let field = &self.config.order.field;
        let ordered = ordering.ordered_lines(base, field);
        let sources = sources::sources_from_ordering(base, &ordering, field);
        let layers = &self.config.layers;

        let report = PrepareReport {
            network_nodes: self.flush_lines(&layers.network_nodes, annotated)?,
            nodes: self.flush_points(&layers.nodes, resolution.node_features())?,
            strahler: self.flush_lines(&layers.strahler, ordered)?,
            sources: self.flush_points(&layers.sources, sources)?,
            node_count: resolution.node_count(),
            max_order: ordering.max_order(),
            dropped: ordering.dropped().len(),
            cycles: ordering.cycles,
        };
        info!(?report, "network prepared");
        Ok(report)
    }

    fn topology(&self, lines: &[LineFeature]) -> Result<Topology> {
        match self.config.topology {
            TopologySource::Resolve => Ok(Topology::from_resolution(&self.resolver.resolve(lines)?)),
            TopologySource::Coincidence => Topology::from_coincidence(lines),
            TopologySource::NodeFields => {
                Topology::from_node_fields(lines, model::NODE_A_FIELD, model::NODE_B_FIELD)
            }
        }
    }

    fn skips(&self, layer: &str) -> bool {
        let skip = !self.config.overwrite && self.sink.exists(layer);
        if skip {
            info!(layer, "output already exists");
        }
        skip
    }

    fn flush_lines(&self, layer: &str, features: Vec<LineFeature>) -> Result<Outcome> {
        if self.skips(layer) {
            return Ok(Outcome::Skipped);
        }
        let count = features.len();
        self.sink.write_lines(layer, features)?;
        Ok(Outcome::Written(count))
    }

    fn flush_points(&self, layer: &str, features: Vec<PointFeature>) -> Result<Outcome> {
        if self.skips(layer) {
            return Ok(Outcome::Skipped);
        }
        let count = features.len();
        self.sink.write_points(layer, features)?;
        Ok(Outcome::Written(count))
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed geometry on line {line}: {reason}")]
    MalformedGeometry { line: usize, reason: String },

    #[error("Cycle detected: traversal from head line {head} revisited line {line}")]
    CycleDetected { head: usize, line: usize },

    #[error("Line {line}: missing or invalid property '{key}'")]
    MissingProperty { line: usize, key: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, Error>;
