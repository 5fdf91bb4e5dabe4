//! Head-seeded Strahler traversal.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::*;
use crate::{Error, Result};
use super::Topology;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Field receiving the order on output lines.
    pub field: String,
    /// Turn an aborted traversal into a run failure. Off by default: a
    /// cycle only aborts the chain of the head that reached it.
    pub fail_on_cycle: bool,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self { field: STRAHLER_FIELD.to_string(), fail_on_cycle: false }
    }
}

/// A traversal that came back to a line already on its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDetected {
    pub head: usize,
    pub line: usize,
}

impl From<CycleDetected> for Error {
    fn from(c: CycleDetected) -> Self {
        Error::CycleDetected { head: c.head, line: c.line }
    }
}

/// Order table produced by one engine run. `orders[i] == 0` means line `i`
/// was never reached from a head.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOrdering {
    pub orders: Vec<u32>,
    pub heads: Vec<usize>,
    pub cycles: Vec<CycleDetected>,
}

impl StreamOrdering {
    pub fn order(&self, line: usize) -> u32 {
        self.orders[line]
    }

    pub fn max_order(&self) -> u32 {
        self.orders.iter().copied().max().unwrap_or(0)
    }

    pub fn reached_count(&self) -> usize {
        self.orders.iter().filter(|&&o| o > 0).count()
    }

    /// Lines no head-seeded chain reached.
    pub fn dropped(&self) -> Vec<usize> {
        self.orders.iter().enumerate().filter(|(_, o)| **o == 0).map(|(i, _)| i).collect()
    }

    /// Fail with the first aborted traversal, if any.
    pub fn into_result(self) -> Result<Self> {
        match self.cycles.first() {
            Some(&c) => Err(c.into()),
            None => Ok(self),
        }
    }

    /// New features carrying `field`, in input order, without unreached lines.
    ///
    /// `lines` must be the collection the topology was built from.
    pub fn ordered_lines(&self, lines: &[LineFeature], field: &str) -> Vec<LineFeature> {
        lines
            .iter()
            .zip(&self.orders)
            .filter(|(_, o)| **o > 0)
            .map(|(line, &o)| line.clone().with_property(field, o))
            .collect()
    }
}

/// Strahler order engine.
#[derive(Debug, Clone, Default)]
pub struct StrahlerEngine {
    config: OrderConfig,
}

impl StrahlerEngine {
    pub fn new(config: OrderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrderConfig {
        &self.config
    }

    /// Run one downstream traversal per head, in head order, over a single
    /// shared order table.
    ///
    /// A traversal that revisits a line of its own chain is aborted; the
    /// orders it already wrote are kept and the cycle is recorded.
    pub fn compute(&self, topology: &Topology) -> StreamOrdering {
        let mut orders = vec![0_u32; topology.len()];
        let heads = topology.heads();
        let mut cycles = Vec::new();
        let mut chain = HashSet::new();

        let ambiguity = topology.ambiguity();
        if ambiguity.next > 0 || ambiguity.sibling > 0 {
            debug!(
                next = ambiguity.next,
                sibling = ambiguity.sibling,
                "ambiguous junctions resolved by lowest line index"
            );
        }

        for &head in &heads {
            if let Err(cycle) = traverse(topology, head, &mut orders, &mut chain) {
                warn!(head = cycle.head, line = cycle.line, "cycle detected, traversal aborted");
                cycles.push(cycle);
            }
        }

        let ordering = StreamOrdering { orders, heads, cycles };
        let dropped = ordering.orders.len() - ordering.reached_count();
        if dropped > 0 {
            warn!(dropped, "lines unreachable from any head");
        }
        info!(
            lines = topology.len(),
            heads = ordering.heads.len(),
            max_order = ordering.max_order(),
            "computed strahler order"
        );
        ordering
    }

    /// [`compute`](Self::compute), failing on a cycle when `fail_on_cycle` is set.
    pub fn run(&self, topology: &Topology) -> Result<StreamOrdering> {
        let ordering = self.compute(topology);
        if self.config.fail_on_cycle {
            ordering.into_result()
        } else {
            Ok(ordering)
        }
    }
}

/// Walk downstream from `head`, writing orders into the shared table.
fn traverse(
    topology: &Topology,
    head: usize,
    orders: &mut [u32],
    chain: &mut HashSet<usize>,
) -> std::result::Result<(), CycleDetected> {
    chain.clear();
    chain.insert(head);

    let mut curr = head;
    let mut order = 1;
    orders[head] = order;

    for _ in 0..topology.len() {
        let Some(next) = topology.next_line(curr) else {
            return Ok(());
        };
        if !chain.insert(next) {
            return Err(CycleDetected { head, line: next });
        }

        if let Some(sibling) = topology.sibling_line(curr) {
            let sibling_order = orders[sibling];
            if sibling_order > order {
                return Ok(());
            }
            if sibling_order < order {
                if orders[next] == order {
                    return Ok(());
                }
            } else {
                order += 1;
            }
        }

        orders[next] = order;
        curr = next;
    }

    Err(CycleDetected { head, line: curr })
}
