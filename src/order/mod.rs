//! # Stream Order Engine
//!
//! Strahler order by head-to-outlet traversal:
//!
//! 1. Heads (no other line ends at their start) are seeded with order 1.
//! 2. From each head, walk to the next line downstream. At a confluence the
//!    first other inflow (the sibling) decides:
//!    - sibling order greater → stop, that branch dominates;
//!    - sibling order smaller and next line already at the current order → stop;
//!    - sibling order equal → current order + 1.
//! 3. Write the current order onto the next line and continue.
//!
//! All traversals share one in-memory order table, flushed once by the
//! caller. Ties between several candidates resolve to the lowest line index.

pub mod topology;
pub mod strahler;

pub use topology::{Ambiguity, Topology};
pub use strahler::{CycleDetected, OrderConfig, StrahlerEngine, StreamOrdering};
