//! # Feature Sink Trait
//!
//! The contract between the network pipeline and whatever persists its
//! layers (GeoPackage, shapefile, database...). Writing a layer replaces it
//! as a whole; the pipeline calls each write exactly once per stage.
//!
//! ## Implementations
//!
//! | Sink | Module | Description |
//! |------|--------|-------------|
//! | `MemorySink` | `memory` | In-memory layers for testing/embedding |

pub mod memory;

use crate::model::*;
use crate::Result;

pub use memory::MemorySink;

/// Destination for the pipeline's output layers.
pub trait FeatureSink: Send + Sync {
    /// Whether `layer` already holds output.
    fn exists(&self, layer: &str) -> bool;

    /// Replace `layer` with `features`.
    fn write_lines(&self, layer: &str, features: Vec<LineFeature>) -> Result<()>;

    /// Replace `layer` with `features`.
    fn write_points(&self, layer: &str, features: Vec<PointFeature>) -> Result<()>;
}
