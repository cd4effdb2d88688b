//! A one-dimensional span.
//!
//! A span represents the closed interval `[start, stop]`.
use serde::{Deserialize, Serialize};

/// A closed interval of coordinates in one dimension.
///
/// Represents the range `[start, stop]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Span {
    start: f64,
    stop: f64,
}

impl Span {
    /// Creates a new [`Span`] between two coordinates.
    ///
    /// The endpoints are sorted, so `Span::new(4., 1.)` is `[1, 4]`.
    pub fn new(start: f64, stop: f64) -> Self {
        Self {
            start: start.min(stop),
            stop: start.max(stop),
        }
    }

    /// Creates a span from endpoints already known to satisfy `start <= stop`.
    pub(crate) const fn from_sorted(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    /// Creates a span of zero length encompassing the given point.
    pub const fn from_point(x: f64) -> Self {
        Self { start: x, stop: x }
    }

    /// Creates a span centered at `center` with total length `span`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let span = Span::from_center_span(5., 4.);
    /// assert_eq!(span, Span::new(3., 7.));
    /// ```
    pub fn from_center_span(center: f64, span: f64) -> Self {
        Self::new(center - span / 2., center + span / 2.)
    }

    /// The midpoint of the span.
    #[inline]
    pub fn center(&self) -> f64 {
        (self.start + self.stop) / 2.
    }

    /// The length of the span.
    #[inline]
    pub fn length(&self) -> f64 {
        self.stop - self.start
    }

    /// The lower endpoint.
    #[inline]
    pub const fn start(&self) -> f64 {
        self.start
    }

    /// The upper endpoint.
    #[inline]
    pub const fn stop(&self) -> f64 {
        self.stop
    }

    /// Returns `true` if the two closed intervals share at least one point.
    ///
    /// Touching spans intersect.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert!(Span::new(0., 2.).intersects(&Span::new(2., 3.)));
    /// assert!(!Span::new(0., 2.).intersects(&Span::new(2.5, 3.)));
    /// ```
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.stop < self.start || self.stop < other.start)
    }

    /// The smallest span containing both spans.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }

    /// Extends the span so that it contains `pos`.
    pub fn add_point(self, pos: f64) -> Self {
        self.union(Self::from_point(pos))
    }

    /// Shifts the span by `amount`.
    pub fn translate(self, amount: f64) -> Self {
        Self {
            start: self.start + amount,
            stop: self.stop + amount,
        }
    }
}

impl From<(f64, f64)> for Span {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}
