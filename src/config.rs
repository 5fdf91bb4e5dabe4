//! Pipeline configuration.
//!
//! Every section deserializes with defaults, so a partial document (or none
//! at all) is valid:
//!
//! ```json
//! { "overwrite": false, "resolver": { "steps": 1000000 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::order::OrderConfig;
use crate::resolve::ResolverConfig;
use crate::Result;

/// How the order stage derives line adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologySource {
    /// Run the node resolver on the input lines.
    #[default]
    Resolve,
    /// Exact equality of raw endpoint coordinates.
    Coincidence,
    /// `NODEA` / `NODEB` fields already present on the lines.
    NodeFields,
}

/// Output layer names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerNames {
    /// Lines annotated with `NODEA` / `NODEB`.
    pub network_nodes: String,
    /// Node points with `GID`.
    pub nodes: String,
    /// Lines with Strahler order.
    pub strahler: String,
    /// Head-water source points.
    pub sources: String,
}

impl Default for LayerNames {
    fn default() -> Self {
        Self {
            network_nodes: "network_nodes".into(),
            nodes: "nodes".into(),
            strahler: "network_strahler".into(),
            sources: "sources".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Replace existing output layers; when false an existing layer is left
    /// untouched and the stage reports a skip.
    pub overwrite: bool,
    pub topology: TopologySource,
    pub resolver: ResolverConfig,
    pub order: OrderConfig,
    pub layers: LayerNames,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            overwrite: true,
            topology: TopologySource::default(),
            resolver: ResolverConfig::default(),
            order: OrderConfig::default(),
            layers: LayerNames::default(),
        }
    }
}

impl NetworkConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
