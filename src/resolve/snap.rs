//! Nearest canonical node lookup (R-tree).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::model::{Coord, Node, NodeId};

#[derive(Debug, Clone)]
struct IndexedNode {
    id: NodeId,
    pos: [f64; 2],
}

impl RTreeObject for IndexedNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for IndexedNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over the canonical node table.
pub struct NodeIndex {
    tree: RTree<IndexedNode>,
}

impl NodeIndex {
    pub fn build(nodes: &[Node]) -> Self {
        let entries = nodes
            .iter()
            .map(|n| IndexedNode { id: n.id, pos: [n.coord.x, n.coord.y] })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Id of the canonical node nearest to `c`. Equidistant candidates
    /// resolve to the lowest id, i.e. the first one created.
    pub fn nearest(&self, c: &Coord) -> Option<NodeId> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&[c.x, c.y]);
        let (first, best) = candidates.next()?;
        let mut id = first.id;
        for (node, d2) in candidates {
            if d2 > best {
                break;
            }
            id = id.min(node.id);
        }
        Some(id)
    }
}
