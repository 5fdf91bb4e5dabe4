//! Directed line adjacency keyed by node.
//!
//! Every lookup walks incident lines in input order, so "first match" is
//! always the lowest line index, whichever way the topology was built.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::model::*;
use crate::resolve::Resolution;
use crate::{Error, Result};

type Incident = SmallVec<[usize; 4]>;

/// Line-to-line adjacency of a river network.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    line_nodes: Vec<(NodeId, NodeId)>,
    /// node → lines whose upstream end is the node
    starts_at: HashMap<NodeId, Incident>,
    /// node → lines whose downstream end is the node
    ends_at: HashMap<NodeId, Incident>,
}

/// Junctions where the first-match rule picked one of several candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ambiguity {
    /// Nodes with more than one outgoing line.
    pub next: usize,
    /// Nodes with more than two incoming lines.
    pub sibling: usize,
}

impl Topology {
    /// Build from `(start, end)` node pairs, one per line.
    pub fn new(line_nodes: Vec<(NodeId, NodeId)>) -> Self {
        let mut starts_at: HashMap<NodeId, Incident> = HashMap::new();
        let mut ends_at: HashMap<NodeId, Incident> = HashMap::new();
        for (i, &(a, b)) in line_nodes.iter().enumerate() {
            starts_at.entry(a).or_default().push(i);
            ends_at.entry(b).or_default().push(i);
        }
        Self { line_nodes, starts_at, ends_at }
    }

    pub fn from_resolution(resolution: &Resolution) -> Self {
        Self::new(resolution.line_nodes.clone())
    }

    /// Build from exact coincidence of raw endpoint coordinates.
    pub fn from_coincidence(lines: &[LineFeature]) -> Result<Self> {
        validate_lines(lines)?;
        let mut ids: HashMap<CoordKey, NodeId> = HashMap::new();
        let mut intern = |c: &Coord| {
            let next = NodeId(ids.len() as u64);
            *ids.entry(c.key()).or_insert(next)
        };
        let line_nodes = lines
            .iter()
            .map(|l| (intern(&l.coords[0]), intern(&l.coords[l.coords.len() - 1])))
            .collect();
        Ok(Self::new(line_nodes))
    }

    /// Build from node ids already stored on the lines (e.g. `NODEA`/`NODEB`).
    pub fn from_node_fields(lines: &[LineFeature], start_field: &str, end_field: &str) -> Result<Self> {
        validate_lines(lines)?;
        let read = |i: usize, line: &LineFeature, key: &str| -> Result<NodeId> {
            line.get(key)
                .and_then(Value::as_int)
                .and_then(|v| u64::try_from(v).ok())
                .map(NodeId)
                .ok_or_else(|| Error::MissingProperty { line: i, key: key.to_string() })
        };
        let line_nodes = lines
            .iter()
            .enumerate()
            .map(|(i, l)| Ok((read(i, l, start_field)?, read(i, l, end_field)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(line_nodes))
    }

    pub fn len(&self) -> usize {
        self.line_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_nodes.is_empty()
    }

    pub fn line_nodes(&self, line: usize) -> (NodeId, NodeId) {
        self.line_nodes[line]
    }

    /// A head has no other line ending at its start.
    pub fn is_head(&self, line: usize) -> bool {
        let (start, _) = self.line_nodes[line];
        first_other(self.ends_at.get(&start), line).is_none()
    }

    /// Head lines in input order.
    pub fn heads(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_head(i)).collect()
    }

    /// First other line starting where `line` ends.
    pub fn next_line(&self, line: usize) -> Option<usize> {
        let (_, end) = self.line_nodes[line];
        first_other(self.starts_at.get(&end), line)
    }

    /// First other line ending where `line` ends (its confluence partner).
    pub fn sibling_line(&self, line: usize) -> Option<usize> {
        let (_, end) = self.line_nodes[line];
        first_other(self.ends_at.get(&end), line)
    }

    pub fn ambiguity(&self) -> Ambiguity {
        Ambiguity {
            next: self.starts_at.values().filter(|v| v.len() > 1).count(),
            sibling: self.ends_at.values().filter(|v| v.len() > 2).count(),
        }
    }
}

fn first_other(candidates: Option<&Incident>, line: usize) -> Option<usize> {
    candidates?.iter().copied().find(|&j| j != line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topo(pairs: &[(u64, u64)]) -> Topology {
        Topology::new(pairs.iter().map(|&(a, b)| (NodeId(a), NodeId(b))).collect())
    }

    #[test]
    fn test_heads_next_sibling() {
        // 0: 1→3, 1: 2→3, 2: 3→4
        let t = topo(&[(1, 3), (2, 3), (3, 4)]);
        assert_eq!(t.heads(), vec![0, 1]);
        assert_eq!(t.next_line(0), Some(2));
        assert_eq!(t.next_line(2), None);
        assert_eq!(t.sibling_line(0), Some(1));
        assert_eq!(t.sibling_line(1), Some(0));
        assert_eq!(t.sibling_line(2), None);
    }

    #[test]
    fn test_first_match_is_lowest_index() {
        // three inflows into node 9, two outflows
        let t = topo(&[(1, 9), (2, 9), (3, 9), (9, 10), (9, 11)]);
        assert_eq!(t.sibling_line(2), Some(0));
        assert_eq!(t.sibling_line(0), Some(1));
        assert_eq!(t.next_line(1), Some(3));
        assert_eq!(t.ambiguity(), Ambiguity { next: 1, sibling: 1 });
    }

    #[test]
    fn test_self_loop_is_head_of_itself() {
        let t = topo(&[(5, 5)]);
        assert!(t.is_head(0));
        assert_eq!(t.next_line(0), None);
    }

    #[test]
    fn test_from_coincidence() {
        let lines = vec![
            LineFeature::new([(5.0, 5.0), (10.0, 10.0)]),
            LineFeature::new([(3.0, 3.0), (10.0, 10.0)]),
            LineFeature::new([(10.0, 10.0), (12.0, 0.0)]),
        ];
        let t = Topology::from_coincidence(&lines).unwrap();
        assert_eq!(t.heads(), vec![0, 1]);
        assert_eq!(t.next_line(1), Some(2));
    }

    #[test]
    fn test_coincidence_is_exact() {
        let lines = vec![
            LineFeature::new([(0.0, 0.0), (1.0, 1.0)]),
            LineFeature::new([(1.0, 1.0 + 1e-9), (2.0, 2.0)]),
        ];
        let t = Topology::from_coincidence(&lines).unwrap();
        assert_eq!(t.heads(), vec![0, 1]);
    }

    #[test]
    fn test_from_node_fields() {
        let lines = vec![
            LineFeature::new([(0.0, 0.0), (1.0, 1.0)])
                .with_property(NODE_A_FIELD, 0)
                .with_property(NODE_B_FIELD, 1),
            LineFeature::new([(1.0, 1.0), (2.0, 2.0)])
                .with_property(NODE_A_FIELD, 1)
                .with_property(NODE_B_FIELD, 2.0),
        ];
        let t = Topology::from_node_fields(&lines, NODE_A_FIELD, NODE_B_FIELD).unwrap();
        assert_eq!(t.line_nodes(1), (NodeId(1), NodeId(2)));
        assert_eq!(t.next_line(0), Some(1));
    }

    #[test]
    fn test_from_node_fields_missing() {
        let lines = vec![
            LineFeature::new([(0.0, 0.0), (1.0, 1.0)]).with_property(NODE_A_FIELD, -1).with_property(NODE_B_FIELD, 1),
        ];
        match Topology::from_node_fields(&lines, NODE_A_FIELD, NODE_B_FIELD) {
            Err(Error::MissingProperty { line, key }) => {
                assert_eq!(line, 0);
                assert_eq!(key, NODE_A_FIELD);
            }
            other => panic!("expected MissingProperty, got {other:?}"),
        }
    }
}
