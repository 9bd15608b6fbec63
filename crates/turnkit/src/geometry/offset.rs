use crate::geometry::chain::FeatureChain;
use crate::geometry::element::{Arc, Element};
use anyhow::{anyhow, Result};
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use kurbo::Point;

/// Offset an open profile chain to the left of its traversal direction by
/// `delta`, preserving arcs. The largest resulting branch is returned; small
/// split-off slivers produced by the offset are discarded.
pub fn offset_chain(chain: &FeatureChain, delta: f64) -> Result<FeatureChain> {
    if chain.is_empty() {
        return Err(anyhow!("cannot offset an empty chain"));
    }

    let pline = to_polyline(chain);
    let offsets = pline.parallel_offset(delta);

    let best = offsets
        .into_iter()
        .map(|p| {
            let len = p.path_length();
            (p, len)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
        .ok_or_else(|| anyhow!("offset by {delta} collapsed the profile"))?;

    let result = from_polyline(&best);
    if result.is_empty() {
        return Err(anyhow!("offset by {delta} produced a degenerate profile"));
    }
    Ok(result)
}

fn to_polyline(chain: &FeatureChain) -> Polyline {
    let mut pline = Polyline::new();
    for el in chain.elements() {
        let start = el.start();
        let bulge = match el {
            Element::Segment(_) => 0.0,
            Element::Arc(arc) => (arc.sweep_angle / 4.0).tan(),
        };
        pline.add_vertex(PlineVertex::new(start.x, start.y, bulge));
    }
    if let Some(last) = chain.last() {
        let end = last.end();
        pline.add_vertex(PlineVertex::new(end.x, end.y, 0.0));
    }
    pline
}

fn from_polyline(pline: &Polyline) -> FeatureChain {
    let mut chain = FeatureChain::new();
    let count = pline.vertex_count();
    for i in 0..count.saturating_sub(1) {
        let v = pline.at(i);
        let w = pline.at(i + 1);
        let p0 = Point::new(v.x, v.y);
        let p1 = Point::new(w.x, w.y);
        if p0.distance(p1) < 1e-9 {
            continue;
        }
        if v.bulge.abs() > 1e-9 {
            chain.add(Element::Arc(arc_from_bulge(p0, p1, v.bulge)));
        } else {
            chain.add(Element::segment(p0, p1));
        }
    }
    chain
}

/// Reconstruct a circular arc from two endpoints and a bulge value
/// (bulge = tan(sweep / 4), positive counter-clockwise).
fn arc_from_bulge(p0: Point, p1: Point, bulge: f64) -> Arc {
    let chord = p0.distance(p1);
    let sweep = 4.0 * bulge.atan();
    let radius = (chord / 2.0) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());
    // Signed distance from chord midpoint to center along the left normal;
    // cot(2 atan b) = (1 - b^2) / (2 b).
    let d = (chord / 2.0) * (1.0 - bulge * bulge) / (2.0 * bulge);
    let mid = p0.midpoint(p1);
    let dir = (p1 - p0) / chord;
    let left = kurbo::Vec2::new(-dir.y, dir.x);
    let center = mid + left * d;
    let start_angle = (p0 - center).atan2();
    Arc::new(center, radius, start_angle, sweep)
}
