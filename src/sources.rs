//! Head-water sources: a point at the upstream end of every order-1 line.

use tracing::debug;

use crate::model::*;
use crate::order::StreamOrdering;
use crate::Result;

/// Extract sources from lines that already carry an order in `field`.
///
/// The point is the planar first coordinate of the line; all properties are
/// carried over. Lines without a readable order are skipped.
pub fn extract_sources(lines: &[LineFeature], field: &str) -> Result<Vec<PointFeature>> {
    validate_lines(lines)?;
    let mut skipped = 0;
    let sources: Vec<PointFeature> = lines
        .iter()
        .filter(|line| match line.get(field).and_then(Value::as_int) {
            Some(order) => order == 1,
            None => {
                skipped += 1;
                false
            }
        })
        .map(source_point)
        .collect();

    if skipped > 0 {
        debug!(skipped, field, "lines without order skipped");
    }
    Ok(sources)
}

/// Extract sources straight from an in-memory ordering of `lines`.
///
/// Each point also carries the order in `field`, as it would when read back
/// from the ordered layer.
pub fn sources_from_ordering(lines: &[LineFeature], ordering: &StreamOrdering, field: &str) -> Vec<PointFeature> {
    lines
        .iter()
        .zip(&ordering.orders)
        .filter(|(_, o)| **o == 1)
        .map(|(line, &o)| {
            let mut point = source_point(line);
            point.properties.insert(field.to_string(), Value::from(o));
            point
        })
        .collect()
}

fn source_point(line: &LineFeature) -> PointFeature {
    PointFeature {
        coord: line.coords[0].planar(),
        properties: line.properties.clone(),
    }
}
