//! Size-independent coordinate descriptions.

use std::fmt::Display;

use geometry::prelude::*;
use serde::{Deserialize, Serialize};

/// How one coordinate of a sample tracks the bounding box of its example.
///
/// Ratios are fractions of the full extent measured from the center,
/// so the edges sit at `-0.5` and `0.5`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "anchor", content = "value")]
pub enum Anchor {
    ToLeftEdge(f64),
    ToRightEdge(f64),
    ToBottomEdge(f64),
    ToTopEdge(f64),
    FromCenter(f64),
    /// Fraction of the full extent, not the half extent: `0.5` is the high edge.
    RatioOfHalfExtent(f64),
}

impl Anchor {
    /// Evaluates the anchor against the extent of an example along this anchor's axis.
    pub fn evaluate(&self, span: Span) -> f64 {
        match *self {
            Self::ToLeftEdge(d) | Self::ToBottomEdge(d) => span.start() + d,
            Self::ToRightEdge(d) | Self::ToTopEdge(d) => span.stop() - d,
            Self::FromCenter(d) => span.center() + d,
            Self::RatioOfHalfExtent(r) => span.center() + r * span.length(),
        }
    }

    /// The factor applied to the primitive's size in the center-relative form
    /// `multiplier * size + adder`.
    pub fn multiplier(&self) -> f64 {
        match *self {
            Self::ToLeftEdge(_) | Self::ToBottomEdge(_) => -0.5,
            Self::ToRightEdge(_) | Self::ToTopEdge(_) => 0.5,
            Self::FromCenter(_) => 0.,
            Self::RatioOfHalfExtent(r) => r,
        }
    }

    /// The constant term of the center-relative form `multiplier * size + adder`.
    pub fn adder(&self) -> f64 {
        match *self {
            Self::ToLeftEdge(d) | Self::ToBottomEdge(d) | Self::FromCenter(d) => d,
            Self::ToRightEdge(d) | Self::ToTopEdge(d) => -d,
            Self::RatioOfHalfExtent(_) => 0.,
        }
    }

    /// The offset from the center of a primitive of extent `size`.
    #[inline]
    pub fn position(&self, size: f64) -> f64 {
        self.multiplier() * size + self.adder()
    }

    /// Returns `true` if the coordinate keeps a fixed distance to an edge.
    pub fn is_edge(&self) -> bool {
        !matches!(self, Self::FromCenter(_) | Self::RatioOfHalfExtent(_))
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToLeftEdge(d) => write!(f, "left{d:+}"),
            Self::ToRightEdge(d) => write!(f, "right{:+}", -d),
            Self::ToBottomEdge(d) => write!(f, "bottom{d:+}"),
            Self::ToTopEdge(d) => write!(f, "top{:+}", -d),
            Self::FromCenter(d) => write!(f, "center{d:+}"),
            Self::RatioOfHalfExtent(r) => write!(f, "center{:+}w", r),
        }
    }
}

/// The pair of anchors locating one point of a sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePoint {
    pub x: Anchor,
    pub y: Anchor,
}

impl RulePoint {
    pub const fn new(x: Anchor, y: Anchor) -> Self {
        Self { x, y }
    }

    pub fn anchor(&self, dir: Dir) -> Anchor {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }

    pub fn evaluate(&self, bounds: Rect) -> Point {
        Point::new(self.x.evaluate(bounds.hspan()), self.y.evaluate(bounds.vspan()))
    }

    /// The offset of this point from the center of a primitive of the given size.
    pub fn position(&self, width: f64, height: f64) -> Point {
        Point::new(self.x.position(width), self.y.position(height))
    }
}

impl Display for RulePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The size-independent description of a sample: one anchored point per
/// geometric point of the drawn shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub points: Vec<RulePoint>,
}

impl Rule {
    pub fn new(points: Vec<RulePoint>) -> Self {
        Self { points }
    }

    /// Evaluates every point against an example bounding box.
    pub fn evaluate(&self, bounds: Rect) -> Vec<Point> {
        self.points.iter().map(|p| p.evaluate(bounds)).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns `true` if the rule reduces to a box given by two corners:
    /// two points with distinct anchors on each axis.
    pub fn is_box(&self) -> bool {
        match self.points.as_slice() {
            [a, b] => a.x != b.x && a.y != b.y,
            _ => false,
        }
    }

    /// The mean offset of the rule's points from the center of a primitive
    /// of the given size.
    pub fn mean_position(&self, width: f64, height: f64) -> Point {
        if self.points.is_empty() {
            return Point::zero();
        }
        let n = self.points.len() as f64;
        let sum = self
            .points
            .iter()
            .fold(Point::zero(), |acc, p| acc + p.position(width, height));
        Point::new(sum.x / n, sum.y / n)
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_log::test;

    #[test]
    fn anchors_evaluate_against_span() {
        let span = Span::new(0., 20.);
        assert_eq!(Anchor::ToLeftEdge(2.).evaluate(span), 2.);
        assert_eq!(Anchor::ToRightEdge(2.).evaluate(span), 18.);
        assert_eq!(Anchor::FromCenter(-3.).evaluate(span), 7.);
        assert_eq!(Anchor::RatioOfHalfExtent(0.3).evaluate(span), 16.);
    }

    #[test]
    fn position_matches_evaluate_relative_to_center() {
        let span = Span::new(-7., 7.);
        for anchor in [
            Anchor::ToLeftEdge(1.5),
            Anchor::ToTopEdge(2.),
            Anchor::FromCenter(0.25),
            Anchor::RatioOfHalfExtent(-0.2),
        ] {
            assert_abs_diff_eq!(anchor.position(span.length()), anchor.evaluate(span));
        }
    }

    #[test]
    fn box_form_needs_distinct_anchors() {
        let corner = |x, y| RulePoint::new(x, y);
        let boxed = Rule::new(vec![
            corner(Anchor::ToLeftEdge(1.), Anchor::ToBottomEdge(1.)),
            corner(Anchor::ToRightEdge(1.), Anchor::ToTopEdge(1.)),
        ]);
        assert!(boxed.is_box());
        let line = Rule::new(vec![
            corner(Anchor::ToLeftEdge(1.), Anchor::FromCenter(0.)),
            corner(Anchor::ToRightEdge(1.), Anchor::FromCenter(0.)),
        ]);
        assert!(!line.is_box());
        let triangle = Rule::new(vec![
            corner(Anchor::ToLeftEdge(1.), Anchor::ToBottomEdge(1.)),
            corner(Anchor::ToRightEdge(1.), Anchor::ToBottomEdge(2.)),
            corner(Anchor::ToLeftEdge(1.), Anchor::ToTopEdge(1.)),
        ]);
        assert!(!triangle.is_box());
        assert_eq!(boxed.to_string(), "(left+1, bottom+1) (right-1, top-1)");
    }
}
