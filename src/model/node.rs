//! Canonical network node.

use serde::{Deserialize, Serialize};
use super::Coord;

/// Node identifier, unique within one resolution run only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A junction or endpoint of the network after quantization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// De-quantized grid position.
    pub coord: Coord,
}

impl Node {
    pub fn new(id: NodeId, coord: Coord) -> Self {
        Self { id, coord }
    }
}
