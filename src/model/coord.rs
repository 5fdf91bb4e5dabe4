//! Planar coordinates.

use serde::{Deserialize, Serialize};

/// A 2D or 3D coordinate in the network's (single) planar CRS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Coord {
    pub const fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub const fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Drop the elevation, keeping the planar position.
    pub fn planar(&self) -> Self {
        Self::xy(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_none_or(f64::is_finite)
    }

    /// Bit-exact identity used for raw endpoint coincidence.
    pub fn key(&self) -> CoordKey {
        CoordKey {
            x: canonical_bits(self.x),
            y: canonical_bits(self.y),
            z: self.z.map(canonical_bits),
        }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self { Self::xy(x, y) }
}

impl From<(f64, f64, f64)> for Coord {
    fn from((x, y, z): (f64, f64, f64)) -> Self { Self::xyz(x, y, z) }
}

/// Hashable form of a [`Coord`]. Two keys are equal exactly when the
/// coordinates compare equal component-wise (`-0.0 == 0.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    x: u64,
    y: u64,
    z: Option<u64>,
}

fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() }
}
