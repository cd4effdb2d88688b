//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::dir::Dir;
use crate::point::Point;
use crate::span::Span;
use crate::transform::{Transform, TransformMut, Transformation, TranslateMut};

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15., 20., 30., 40.);
    /// assert_eq!(rect.left(), 15.);
    /// assert_eq!(rect.bot(), 20.);
    /// assert_eq!(rect.right(), 30.);
    /// assert_eq!(rect.top(), 40.);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    ///
    /// If you want sides to be sorted for you, consider using [`Rect::new`] instead.
    #[inline]
    pub fn from_sides(left: f64, bot: f64, right: f64, top: f64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle from two opposite corners in any order.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(10., 0.), Point::new(0., 5.));
    /// assert_eq!(rect, Rect::from_sides(0., 0., 10., 5.));
    /// ```
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle of the given size centered at `center`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_center_size(Point::new(5., 5.), 4., 2.);
    /// assert_eq!(rect, Rect::from_sides(3., 4., 7., 6.));
    /// ```
    pub fn from_center_size(center: Point, width: f64, height: f64) -> Self {
        Self::from_spans(
            Span::from_center_span(center.x, width.abs()),
            Span::from_center_span(center.y, height.abs()),
        )
    }

    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// Creates a rectangle from horizontal and vertical [`Span`]s.
    pub const fn from_spans(h: Span, v: Span) -> Self {
        Self {
            p0: Point::new(h.start(), v.start()),
            p1: Point::new(h.stop(), v.stop()),
        }
    }

    /// Returns the center point of the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0., 0., 55., 45.);
    /// assert_eq!(rect.center(), Point::new(27.5, 22.5));
    /// ```
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }

    /// The bottom y-coordinate of the rectangle.
    #[inline]
    pub const fn bot(&self) -> f64 {
        self.p0.y
    }

    /// The top y-coordinate of the rectangle.
    #[inline]
    pub const fn top(&self) -> f64 {
        self.p1.y
    }

    /// The left x-coordinate of the rectangle.
    #[inline]
    pub const fn left(&self) -> f64 {
        self.p0.x
    }

    /// The right x-coordinate of the rectangle.
    #[inline]
    pub const fn right(&self) -> f64 {
        self.p1.x
    }

    /// The lower-left corner.
    #[inline]
    pub const fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub const fn upper_right(&self) -> Point {
        self.p1
    }

    /// The horizontal span of the rectangle.
    pub const fn hspan(&self) -> Span {
        Span::from_sorted(self.p0.x, self.p1.x)
    }

    /// The vertical span of the rectangle.
    pub const fn vspan(&self) -> Span {
        Span::from_sorted(self.p0.y, self.p1.y)
    }

    /// The span of the rectangle along `dir`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(10., 20., 30., 40.);
    /// assert_eq!(rect.span(Dir::Horiz), Span::new(10., 30.));
    /// assert_eq!(rect.span(Dir::Vert), Span::new(20., 40.));
    /// ```
    pub const fn span(&self, dir: Dir) -> Span {
        match dir {
            Dir::Horiz => self.hspan(),
            Dir::Vert => self.vspan(),
        }
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.right() - self.left()
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.top() - self.bot()
    }

    /// The extent of the rectangle along `dir`.
    #[inline]
    pub fn length(&self, dir: Dir) -> f64 {
        match dir {
            Dir::Horiz => self.width(),
            Dir::Vert => self.height(),
        }
    }

    /// The area of the rectangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The smallest rectangle containing both rectangles.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0., 0., 10., 10.);
    /// let b = Rect::from_sides(5., -5., 20., 2.);
    /// assert_eq!(a.union(b), Rect::from_sides(0., -5., 20., 10.));
    /// ```
    pub fn union(self, other: Self) -> Self {
        Self::from_spans(
            self.hspan().union(other.hspan()),
            self.vspan().union(other.vspan()),
        )
    }

    /// The smallest rectangle containing all of the given rectangles.
    ///
    /// Returns [`None`] if the iterator is empty.
    pub fn union_all_option(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        rects.into_iter().reduce(Rect::union)
    }

    /// Returns `true` if the two closed rectangles share at least one point.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let a = Rect::from_sides(0., 0., 10., 10.);
    /// assert!(a.intersects(&Rect::from_sides(10., 10., 12., 12.)));
    /// assert!(!a.intersects(&Rect::from_sides(11., 0., 12., 12.)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.hspan().intersects(&other.hspan()) && self.vspan().intersects(&other.vspan())
    }

    /// Returns a new rectangle with every side moved inward by `amount`.
    ///
    /// Returns [`None`] if the shrunken rectangle would be empty.
    pub fn shrink_all(&self, amount: f64) -> Option<Self> {
        let (l, b, r, t) = (
            self.left() + amount,
            self.bot() + amount,
            self.right() - amount,
            self.top() - amount,
        );
        if l <= r && b <= t {
            Some(Self::from_sides(l, b, r, t))
        } else {
            None
        }
    }

    /// The four corners in counterclockwise order starting at the lower left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.p0,
            Point::new(self.p1.x, self.p0.y),
            self.p1,
            Point::new(self.p0.x, self.p1.y),
        ]
    }
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl TranslateMut for Rect {
    fn translate_mut(&mut self, p: Point) {
        self.p0.translate_mut(p);
        self.p1.translate_mut(p);
    }
}

impl TransformMut for Rect {
    fn transform_mut(&mut self, trans: Transformation) {
        let corners = self.corners().map(|c| c.transform(trans));
        let mut out = Rect::from_point(corners[0]);
        for c in &corners[1..] {
            out = out.union(Rect::from_point(*c));
        }
        *self = out;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_rect_bbox_swaps_extent() {
        let rect = Rect::from_center_size(Point::new(5., 5.), 4., 2.);
        let rotated = rect.transform(Transformation::rotate_about(Point::new(5., 5.), 90.));
        assert_eq!(rotated, Rect::from_sides(4., 3., 6., 7.));
    }

    #[test]
    fn shrink_all_rejects_inverted() {
        let rect = Rect::from_sides(0., 0., 4., 4.);
        assert_eq!(rect.shrink_all(1.), Some(Rect::from_sides(1., 1., 3., 3.)));
        assert_eq!(rect.shrink_all(3.), None);
    }
}
