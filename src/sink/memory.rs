//! In-memory feature sink.
//!
//! This is the reference implementation of `FeatureSink`.
//! Layers live in a HashMap protected by an RwLock; every write replaces the
//! target layer under a single lock acquisition, so readers never observe a
//! partially written layer.
//!
//! Use this sink for:
//! - Testing the resolver and order engine end to end
//! - Embedding the pipeline where an I/O layer collects the results itself

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use parking_lot::RwLock;

use crate::model::*;
use crate::{Error, Result};
use super::FeatureSink;

/// A stored layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Lines(Vec<LineFeature>),
    Points(Vec<PointFeature>),
}

impl Layer {
    pub fn len(&self) -> usize {
        match self {
            Layer::Lines(f) => f.len(),
            Layer::Points(f) => f.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory layer store.
#[derive(Clone, Default)]
pub struct MemorySink {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    layers: RwLock<HashMap<String, Layer>>,
    writes: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line features of `layer`, if it holds lines.
    pub fn lines(&self, layer: &str) -> Option<Vec<LineFeature>> {
        match self.inner.layers.read().get(layer) {
            Some(Layer::Lines(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Point features of `layer`, if it holds points.
    pub fn points(&self, layer: &str) -> Option<Vec<PointFeature>> {
        match self.inner.layers.read().get(layer) {
            Some(Layer::Points(f)) => Some(f.clone()),
            _ => None,
        }
    }

    /// Layer names, sorted.
    pub fn layers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.layers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of write calls served so far.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }

    fn store(&self, layer: &str, content: Layer) -> Result<()> {
        if layer.is_empty() {
            return Err(Error::Sink("layer name must not be empty".into()));
        }
        self.inner.layers.write().insert(layer.to_string(), content);
        self.inner.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl FeatureSink for MemorySink {
    fn exists(&self, layer: &str) -> bool {
        self.inner.layers.read().contains_key(layer)
    }

    fn write_lines(&self, layer: &str, features: Vec<LineFeature>) -> Result<()> {
        self.store(layer, Layer::Lines(features))
    }

    fn write_points(&self, layer: &str, features: Vec<PointFeature>) -> Result<()> {
        self.store(layer, Layer::Points(features))
    }
}
