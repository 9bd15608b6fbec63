//! Pairwise curve intersection, and the chain-level queries built on it.
//!
//! The kernel trait is the seam to a host CAD system; [`AnalyticKernel`] is
//! the built-in closed-form implementation. Chain-level callers never see a
//! kernel failure: a degenerate operand or an out-of-range result simply
//! counts as "no intersection".

use crate::error::KernelError;
use crate::geometry::{Element, FeatureChain};
use kurbo::{Line, Point};

/// Parametric slack admitting extremity touches as intersections.
const PARAM_EPS: f64 = 1e-9;

/// Most chain-pair candidates retained per query.
pub const MAX_CHAIN_HITS: usize = 6;

/// Pairwise intersection of two curve primitives.
pub trait GeometryKernel {
    /// All intersection points of `a` and `b` that lie on both primitives.
    /// An empty vector means the curves do not meet.
    fn intersect(&self, a: &Element, b: &Element) -> Result<Vec<Point>, KernelError>;
}

/// Closed-form intersection of segments and circular arcs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticKernel;

impl GeometryKernel for AnalyticKernel {
    fn intersect(&self, a: &Element, b: &Element) -> Result<Vec<Point>, KernelError> {
        match (a, b) {
            (Element::Segment(s1), Element::Segment(s2)) => segment_segment(s1, s2),
            (Element::Segment(s), Element::Arc(arc)) => segment_arc(s, arc),
            (Element::Arc(arc), Element::Segment(s)) => segment_arc(s, arc),
            (Element::Arc(a1), Element::Arc(a2)) => arc_arc(a1, a2),
        }
    }
}

fn segment_segment(s1: &Line, s2: &Line) -> Result<Vec<Point>, KernelError> {
    let d1 = s1.p1 - s1.p0;
    let d2 = s2.p1 - s2.p0;
    if d1.hypot() < PARAM_EPS || d2.hypot() < PARAM_EPS {
        return Err(KernelError::Operand("zero-length segment".to_string()));
    }
    let cross = d1.cross(d2);
    if cross.abs() < 1e-12 {
        // Parallel or collinear; overlap does not count as a crossing.
        return Ok(Vec::new());
    }
    let w = s2.p0 - s1.p0;
    let t = w.cross(d2) / cross;
    let u = w.cross(d1) / cross;
    if !(on_unit_range(t) && on_unit_range(u)) {
        return Ok(Vec::new());
    }
    Ok(vec![s1.p0 + d1 * t])
}

fn segment_arc(s: &Line, arc: &crate::geometry::Arc) -> Result<Vec<Point>, KernelError> {
    if arc.radius <= 0.0 {
        return Err(KernelError::Operand("non-positive arc radius".to_string()));
    }
    let d = s.p1 - s.p0;
    let len2 = d.hypot2();
    if len2 < PARAM_EPS * PARAM_EPS {
        return Err(KernelError::Operand("zero-length segment".to_string()));
    }
    let f = s.p0 - arc.center;
    // |f + t d|^2 = r^2
    let a = len2;
    let b = 2.0 * f.dot(d);
    let c = f.hypot2() - arc.radius * arc.radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Ok(Vec::new());
    }
    let sqrt_disc = disc.sqrt();
    let mut hits = Vec::new();
    for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
        if !on_unit_range(t) {
            continue;
        }
        let p = s.p0 + d * t;
        let angle = (p - arc.center).atan2();
        if arc.contains_angle(angle) && !contains_close(&hits, p) {
            hits.push(p);
        }
    }
    Ok(hits)
}

fn arc_arc(
    a1: &crate::geometry::Arc,
    a2: &crate::geometry::Arc,
) -> Result<Vec<Point>, KernelError> {
    if a1.radius <= 0.0 || a2.radius <= 0.0 {
        return Err(KernelError::Operand("non-positive arc radius".to_string()));
    }
    let between = a2.center - a1.center;
    let dist = between.hypot();
    if dist < PARAM_EPS {
        // Concentric carriers never cross at discrete points.
        return Ok(Vec::new());
    }
    if dist > a1.radius + a2.radius + PARAM_EPS
        || dist < (a1.radius - a2.radius).abs() - PARAM_EPS
    {
        return Ok(Vec::new());
    }
    let a = (a1.radius * a1.radius - a2.radius * a2.radius + dist * dist) / (2.0 * dist);
    let h2 = a1.radius * a1.radius - a * a;
    let h = h2.max(0.0).sqrt();
    let dir = between / dist;
    let base = a1.center + dir * a;
    let perp = kurbo::Vec2::new(-dir.y, dir.x);
    let mut hits = Vec::new();
    for p in [base + perp * h, base - perp * h] {
        let on_first = a1.contains_angle((p - a1.center).atan2());
        let on_second = a2.contains_angle((p - a2.center).atan2());
        if on_first && on_second && !contains_close(&hits, p) {
            hits.push(p);
        }
    }
    Ok(hits)
}

fn on_unit_range(t: f64) -> bool {
    (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&t)
}

fn contains_close(points: &[Point], p: Point) -> bool {
    points.iter().any(|q| q.distance(p) < 1e-7)
}

/// One chain-pair intersection candidate: where, and which element of the
/// subject chain was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainHit {
    pub point: Point,
    /// Index of the intersected element within the subject chain.
    pub element_index: usize,
}

/// Intersections between a subject chain and a cutter chain.
///
/// Each cutter element contributes at most its first hit against the subject,
/// scanned in subject order; at most [`MAX_CHAIN_HITS`] candidates are
/// collected. Kernel failures on any pair are treated as no intersection for
/// that pair.
pub fn chain_intersections<K: GeometryKernel>(
    kernel: &K,
    subject: &FeatureChain,
    cutter: &FeatureChain,
) -> Vec<ChainHit> {
    let mut hits = Vec::new();
    for cutter_el in cutter.elements() {
        if hits.len() >= MAX_CHAIN_HITS {
            break;
        }
        for (index, subject_el) in subject.elements().iter().enumerate() {
            let points = match kernel.intersect(subject_el, cutter_el) {
                Ok(points) => points,
                Err(_) => continue,
            };
            if let Some(&point) = points.first() {
                hits.push(ChainHit {
                    point,
                    element_index: index,
                });
                break;
            }
        }
    }
    hits
}

/// First intersection of a single probe element against a chain, in chain
/// order. `None` when the probe misses, and on every kernel failure.
pub fn probe_intersection<K: GeometryKernel>(
    kernel: &K,
    probe: &Element,
    chain: &FeatureChain,
) -> Option<Point> {
    for el in chain.elements() {
        match kernel.intersect(el, probe) {
            Ok(points) => {
                if let Some(&point) = points.first() {
                    return Some(point);
                }
            }
            Err(_) => continue,
        }
    }
    None
}
