//! # Network Feature Model
//!
//! Plain DTOs exchanged with the vector I/O layer: coordinates, attribute
//! values, line and point features, canonical nodes.
//!
//! Design rule: no file formats, no CRS handling here.
//! This module is pure data: no I/O, no state.

pub mod coord;
pub mod feature;
pub mod node;
pub mod value;
pub mod property_map;

pub use coord::{Coord, CoordKey};
pub use feature::{LineFeature, PointFeature, validate_lines};
pub use node::{Node, NodeId};
pub use value::Value;
pub use property_map::{PropertyMap, properties};

/// Field written on resolved lines: upstream node id.
pub const NODE_A_FIELD: &str = "NODEA";
/// Field written on resolved lines: downstream node id.
pub const NODE_B_FIELD: &str = "NODEB";
/// Field written on node points.
pub const GID_FIELD: &str = "GID";
/// Default Strahler order field.
pub const STRAHLER_FIELD: &str = "strahler";
