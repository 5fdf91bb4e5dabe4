//! Fixed-resolution quantization grid over the network extent.

use serde::{Deserialize, Serialize};
use crate::model::Coord;

/// Integer grid cell. Endpoints falling in the same cell are one node.
pub type GridCell = (i64, i64);

/// Axis-aligned bounding extent of a coordinate set (planar axes only).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Extent {
    /// Extent enclosing every coordinate, `None` for an empty set.
    pub fn enclosing<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Option<Self> {
        coords.into_iter().fold(None, |acc, c| {
            Some(match acc {
                None => Self { min: [c.x, c.y], max: [c.x, c.y] },
                Some(e) => Self {
                    min: [e.min[0].min(c.x), e.min[1].min(c.y)],
                    max: [e.max[0].max(c.x), e.max[1].max(c.y)],
                },
            })
        })
    }

    pub fn span(&self, axis: usize) -> f64 {
        self.max[axis] - self.min[axis]
    }
}

/// Step used on an axis whose extent is zero.
pub const DEGENERATE_STEP: f64 = 1.0;

/// Quantization grid: `cell = round((coord - origin) / step)` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub origin: [f64; 2],
    pub step: [f64; 2],
    /// Axes whose extent was zero and fell back to [`DEGENERATE_STEP`].
    pub degenerate: [bool; 2],
}

impl Grid {
    /// Grid of `steps` divisions spanning each axis of `extent`.
    ///
    /// `steps` must be non-zero; the resolver validates it upfront.
    pub fn new(extent: &Extent, steps: u64) -> Self {
        let mut step = [DEGENERATE_STEP; 2];
        let mut degenerate = [false; 2];
        for axis in 0..2 {
            let span = extent.span(axis);
            let s = span / steps as f64;
            if s > 0.0 && s.is_finite() {
                step[axis] = s;
            } else {
                degenerate[axis] = true;
            }
        }
        Self { origin: extent.min, step, degenerate }
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate.iter().any(|d| *d)
    }

    /// Map a raw coordinate to its grid cell (round half away from zero).
    pub fn cell(&self, c: &Coord) -> GridCell {
        (
            ((c.x - self.origin[0]) / self.step[0]).round() as i64,
            ((c.y - self.origin[1]) / self.step[1]).round() as i64,
        )
    }

    /// De-quantized position of a grid cell.
    pub fn position(&self, cell: GridCell) -> Coord {
        Coord::xy(
            self.origin[0] + cell.0 as f64 * self.step[0],
            self.origin[1] + cell.1 as f64 * self.step[1],
        )
    }
}
