//! Line and point features as handed over by the vector I/O layer.

use serde::{Deserialize, Serialize};
use super::{Coord, PropertyMap, Value};
use crate::{Error, Result};

/// A stream reach: a polyline directed from its first coordinate (upstream)
/// to its last (downstream), plus its attribute row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub coords: Vec<Coord>,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl LineFeature {
    pub fn new(coords: impl IntoIterator<Item = impl Into<Coord>>) -> Self {
        Self {
            coords: coords.into_iter().map(Into::into).collect(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: PropertyMap) -> Self {
        self.properties = properties;
        self
    }

    /// Upstream endpoint.
    pub fn start(&self) -> Option<&Coord> {
        self.coords.first()
    }

    /// Downstream endpoint.
    pub fn end(&self) -> Option<&Coord> {
        self.coords.last()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Check that the reach has a usable geometry. `index` is the line's
    /// position in its collection, reported back in the error.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.coords.len() < 2 {
            return Err(Error::MalformedGeometry {
                line: index,
                reason: format!("{} coordinate(s), at least 2 required", self.coords.len()),
            });
        }
        for (role, c) in [("start", &self.coords[0]), ("end", &self.coords[self.coords.len() - 1])] {
            if !c.is_finite() {
                return Err(Error::MalformedGeometry {
                    line: index,
                    reason: format!("non-finite {role} coordinate {c:?}"),
                });
            }
        }
        Ok(())
    }
}

/// Validate every line of a collection, failing on the first malformed one.
pub fn validate_lines(lines: &[LineFeature]) -> Result<()> {
    lines.iter().enumerate().try_for_each(|(i, line)| line.validate(i))
}

/// A point feature (network node or head-water source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub coord: Coord,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl PointFeature {
    pub fn new(coord: impl Into<Coord>) -> Self {
        Self { coord: coord.into(), properties: PropertyMap::new() }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
