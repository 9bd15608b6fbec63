use kurbo::{Line, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A circular arc defined by center, radius and a swept angular range.
///
/// The host object model only ever produces circular arcs, so this is
/// deliberately narrower than an elliptical arc type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    /// Angle of the start extremity, radians.
    pub start_angle: f64,
    /// Signed sweep; positive is counter-clockwise.
    pub sweep_angle: f64,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, sweep_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep_angle,
        }
    }

    /// Point on the carrier circle at the given absolute angle.
    pub fn point_at(&self, angle: f64) -> Point {
        self.center + Vec2::from_angle(angle) * self.radius
    }

    pub fn start(&self) -> Point {
        self.point_at(self.start_angle)
    }

    pub fn end(&self) -> Point {
        self.point_at(self.start_angle + self.sweep_angle)
    }

    pub fn length(&self) -> f64 {
        self.sweep_angle.abs() * self.radius
    }

    /// Point reached after traversing `distance` from the start extremity.
    pub fn point_along(&self, distance: f64) -> Point {
        if self.radius <= 0.0 {
            return self.center;
        }
        let swept = (distance / self.radius).min(self.sweep_angle.abs());
        self.point_at(self.start_angle + swept.copysign(self.sweep_angle))
    }

    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.start_angle + self.sweep_angle,
            sweep_angle: -self.sweep_angle,
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            center: self.center + offset,
            ..*self
        }
    }

    /// Whether an absolute angle on the carrier circle lies inside the swept
    /// range, with a small angular tolerance at both extremities.
    pub fn contains_angle(&self, angle: f64) -> bool {
        const EPS: f64 = 1e-9;
        let rel = if self.sweep_angle >= 0.0 {
            (angle - self.start_angle).rem_euclid(TAU)
        } else {
            (self.start_angle - angle).rem_euclid(TAU)
        };
        rel <= self.sweep_angle.abs() + EPS
    }
}

/// A single curve primitive of a feature chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Element {
    /// A straight line segment.
    Segment(Line),
    /// A circular arc.
    Arc(Arc),
}

impl Element {
    pub fn segment(p0: Point, p1: Point) -> Self {
        Element::Segment(Line::new(p0, p1))
    }

    pub fn start(&self) -> Point {
        match self {
            Element::Segment(line) => line.p0,
            Element::Arc(arc) => arc.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Element::Segment(line) => line.p1,
            Element::Arc(arc) => arc.end(),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Element::Segment(line) => line.p0.distance(line.p1),
            Element::Arc(arc) => arc.length(),
        }
    }

    /// Point reached after traversing `distance` from the start extremity.
    /// Clamped to the end extremity.
    pub fn point_along(&self, distance: f64) -> Point {
        match self {
            Element::Segment(line) => {
                let len = line.p0.distance(line.p1);
                if len <= 0.0 {
                    return line.p0;
                }
                let t = (distance / len).clamp(0.0, 1.0);
                line.p0.lerp(line.p1, t)
            }
            Element::Arc(arc) => arc.point_along(distance),
        }
    }

    pub fn reversed(&self) -> Self {
        match self {
            Element::Segment(line) => Element::Segment(Line::new(line.p1, line.p0)),
            Element::Arc(arc) => Element::Arc(arc.reversed()),
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        match self {
            Element::Segment(line) => {
                Element::Segment(Line::new(line.p0 + offset, line.p1 + offset))
            }
            Element::Arc(arc) => Element::Arc(arc.translated(offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: Point, b: Point) {
        assert!(
            a.distance(b) < 1e-9,
            "expected {:?} to be close to {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_segment_extremities() {
        let el = Element::segment(Point::new(1.0, 2.0), Point::new(4.0, 6.0));
        assert_close(el.start(), Point::new(1.0, 2.0));
        assert_close(el.end(), Point::new(4.0, 6.0));
        assert!((el.length() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_point_along() {
        let el = Element::segment(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_close(el.point_along(4.0), Point::new(4.0, 0.0));
        // Past the end clamps to the extremity
        assert_close(el.point_along(25.0), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_arc_extremities() {
        let arc = Arc::new(Point::new(0.0, 0.0), 2.0, 0.0, FRAC_PI_2);
        assert_close(arc.start(), Point::new(2.0, 0.0));
        assert_close(arc.end(), Point::new(0.0, 2.0));
        assert!((arc.length() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_arc_reversed() {
        let arc = Arc::new(Point::new(0.0, 0.0), 2.0, 0.0, FRAC_PI_2);
        let rev = arc.reversed();
        assert_close(rev.start(), arc.end());
        assert_close(rev.end(), arc.start());
        assert!((rev.length() - arc.length()).abs() < 1e-12);
    }

    #[test]
    fn test_arc_contains_angle() {
        let arc = Arc::new(Point::new(0.0, 0.0), 1.0, 0.0, FRAC_PI_2);
        assert!(arc.contains_angle(FRAC_PI_2 / 2.0));
        assert!(arc.contains_angle(0.0));
        assert!(!arc.contains_angle(PI));
        let cw = Arc::new(Point::new(0.0, 0.0), 1.0, FRAC_PI_2, -FRAC_PI_2);
        assert!(cw.contains_angle(FRAC_PI_2 / 2.0));
        assert!(!cw.contains_angle(PI));
    }

    #[test]
    fn test_element_translated() {
        let el = Element::segment(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let moved = el.translated(Vec2::new(0.0, 3.0));
        assert_close(moved.start(), Point::new(0.0, 3.0));
        assert_close(moved.end(), Point::new(1.0, 4.0));
    }
}
