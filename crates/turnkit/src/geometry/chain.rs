use crate::geometry::element::Element;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Boundary query positions on a chain, mirroring the host's extremity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremity {
    Start,
    End,
    Middle,
}

/// An ordered sequence of connected curve primitives forming a machining
/// profile. Consecutive elements share an endpoint; the chain is open unless
/// its traversal returns to the start point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureChain {
    elements: Vec<Element>,
}

impl FeatureChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    /// Build a polyline chain through the given points.
    pub fn from_points(points: &[Point]) -> Self {
        let elements = points
            .windows(2)
            .map(|w| Element::segment(w[0], w[1]))
            .collect();
        Self { elements }
    }

    pub fn count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    /// Append a primitive at the end of the chain.
    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Grow the chain by a straight segment from its end extremity to `p`.
    /// Does nothing on an empty chain or when `p` coincides with the end.
    pub fn add_point(&mut self, p: Point) {
        if let Some(end) = self.extremity(Extremity::End) {
            if end.distance(p) > 1e-9 {
                self.elements.push(Element::segment(end, p));
            }
        }
    }

    /// Keep the first `keep` elements, discarding the rest. This is the
    /// host's `RemoveEnd(n)` with `keep = n - 1`.
    pub fn truncate(&mut self, keep: usize) {
        self.elements.truncate(keep);
    }

    /// Flip traversal direction in place.
    pub fn reverse(&mut self) {
        self.elements.reverse();
        for el in &mut self.elements {
            *el = el.reversed();
        }
    }

    pub fn length(&self) -> f64 {
        self.elements.iter().map(Element::length).sum()
    }

    pub fn extremity(&self, which: Extremity) -> Option<Point> {
        match which {
            Extremity::Start => self.elements.first().map(Element::start),
            Extremity::End => self.elements.last().map(Element::end),
            Extremity::Middle => {
                if self.elements.is_empty() {
                    None
                } else {
                    Some(self.point_along(self.length() / 2.0))
                }
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        match (
            self.extremity(Extremity::Start),
            self.extremity(Extremity::End),
        ) {
            (Some(s), Some(e)) => s.distance(e) < 1e-9 && self.elements.len() > 1,
            _ => false,
        }
    }

    /// Point reached after traversing `distance` from the start extremity.
    /// Clamped to the end extremity.
    pub fn point_along(&self, distance: f64) -> Point {
        let mut remaining = distance.max(0.0);
        for el in &self.elements {
            let len = el.length();
            if remaining <= len {
                return el.point_along(remaining);
            }
            remaining -= len;
        }
        self.extremity(Extremity::End).unwrap_or(Point::ZERO)
    }

    /// The chain vertex with the largest Y value.
    pub fn max_y_point(&self) -> Option<Point> {
        let mut best: Option<Point> = None;
        for el in &self.elements {
            for p in [el.start(), el.end()] {
                match best {
                    Some(b) if p.y <= b.y => {}
                    _ => best = Some(p),
                }
            }
        }
        best
    }

    pub fn translate(&mut self, offset: Vec2) {
        for el in &mut self.elements {
            *el = el.translated(offset);
        }
    }

    /// Append another chain's elements after this one, bridging any gap
    /// between the two with a straight segment.
    pub fn connect(&mut self, other: &FeatureChain) {
        if let (Some(end), Some(start)) = (
            self.extremity(Extremity::End),
            other.extremity(Extremity::Start),
        ) {
            if end.distance(start) > 1e-6 {
                self.elements.push(Element::segment(end, start));
            }
        }
        self.elements.extend_from_slice(&other.elements);
    }
}
