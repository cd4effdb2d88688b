//! Classifying how every sample coordinate stretches across examples.

use arcstr::ArcStr;
use geometry::prelude::*;
use tracing::Level;

use crate::anchor::{Anchor, Rule, RulePoint};
use crate::config::ConvertConfig;
use crate::error::{AssociationError, ConvError, RuleSynthesisError};
use crate::model::{Associations, ExampleSet, Sample, SampleId, SampleTag};

type Result<T> = std::result::Result<T, ConvError>;

/// Anchor kinds still consistent with every example seen so far, for one axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct AxisBits {
    lo: bool,
    hi: bool,
    center: bool,
    ratio: bool,
}

impl AxisBits {
    const ALL: Self = Self::new(true, true, true, true);
    const CENTER: Self = Self::new(false, false, true, false);
    const RATIO: Self = Self::new(false, false, false, true);
    const LO: Self = Self::new(true, false, false, false);
    const HI: Self = Self::new(false, true, false, false);
    const EDGES: Self = Self::new(true, true, false, false);

    const fn new(lo: bool, hi: bool, center: bool, ratio: bool) -> Self {
        Self {
            lo,
            hi,
            center,
            ratio,
        }
    }

    fn has_edge(&self) -> bool {
        self.lo || self.hi
    }
}

/// The quantities an anchor may hold fixed, for one coordinate.
#[derive(Debug, Copy, Clone, PartialEq)]
struct AxisMeasure {
    lo: f64,
    hi: f64,
    center: f64,
    ratio: f64,
}

impl AxisMeasure {
    fn new(coord: f64, span: Span) -> Self {
        let center = coord - span.center();
        let length = span.length();
        Self {
            lo: coord - span.start(),
            hi: span.stop() - coord,
            center,
            ratio: if length == 0. { 0. } else { center / length },
        }
    }

    /// Clears the bits whose quantity differs in `other`.
    fn retain_matching(&self, other: &Self, bits: &mut AxisBits, config: &ConvertConfig) {
        bits.lo &= config.approx_eq(self.lo, other.lo);
        bits.hi &= config.approx_eq(self.hi, other.hi);
        bits.center &= config.approx_eq(self.center, other.center);
        bits.ratio &= config.approx_eq(self.ratio, other.ratio);
    }

    /// Picks the surviving anchor, preferring edges, then the center, then a ratio.
    ///
    /// When both edges survive, the nearer one wins.
    fn select(&self, bits: AxisBits, dir: Dir, span: Span) -> Option<Anchor> {
        let lo = bits.lo && !(bits.hi && self.hi < self.lo);
        Some(if lo {
            match dir {
                Dir::Horiz => Anchor::ToLeftEdge(self.lo),
                Dir::Vert => Anchor::ToBottomEdge(self.lo),
            }
        } else if bits.hi {
            match dir {
                Dir::Horiz => Anchor::ToRightEdge(self.hi),
                Dir::Vert => Anchor::ToTopEdge(self.hi),
            }
        } else if bits.center {
            Anchor::FromCenter(self.center)
        } else if bits.ratio {
            if span.length() == 0. {
                Anchor::FromCenter(0.)
            } else {
                Anchor::RatioOfHalfExtent(self.ratio)
            }
        } else {
            return None;
        })
    }
}

/// The geometric points of a sample that receive anchors.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CandidatePoints {
    pub points: Vec<Point>,
    /// Points beyond this index duplicate earlier ones and only track the center.
    pub true_count: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Outline {
    Rect,
    Polygon,
    Circle,
    CircleArc,
}

fn outline(sample: &Sample) -> Outline {
    let shape = &sample.shape;
    if shape.kind.is_polygon() && !shape.trace.is_empty() {
        Outline::Polygon
    } else if shape.is_circle_arc() {
        Outline::CircleArc
    } else if shape.kind.is_circle() {
        Outline::Circle
    } else {
        Outline::Rect
    }
}

/// Lists the points of `sample` in cell coordinates.
pub(crate) fn candidate_points(sample: &Sample) -> CandidatePoints {
    let shape = &sample.shape;
    let bounds = sample.bounds;
    let kind = outline(sample);
    let mut points = match kind {
        Outline::Polygon => shape.vertices(),
        Outline::CircleArc => {
            let center = bounds.center();
            let radius = shape.width.abs() / 2.;
            let trans = shape.transformation();
            let (start, extent) = shape
                .arc
                .map(|a| (a.start, a.extent))
                .unwrap_or_default();
            let on_circle = |degrees: f64| {
                let rad = degrees.to_radians();
                Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
                    .transform(trans)
            };
            vec![center, on_circle(start), on_circle(start + extent)]
        }
        Outline::Circle => vec![
            bounds.center(),
            Point::new(bounds.right(), bounds.center().y),
        ],
        Outline::Rect => vec![bounds.lower_left(), bounds.upper_right()],
    };
    let true_count = points.len();
    if shape.min_size && matches!(kind, Outline::Rect | Outline::Circle) {
        points.extend_from_within(0..2);
    }
    CandidatePoints { points, true_count }
}

/// Lists the points of `other` in the order matching `main`'s points.
///
/// Polygon vertex lists are rotated to the cyclic offset that minimizes the
/// total distance between corresponding vertex offsets.
fn matched_points(main: &Sample, other: &Sample) -> Vec<Point> {
    if outline(other) != Outline::Polygon || outline(main) != Outline::Polygon {
        let mut points = candidate_points(other);
        points.points.truncate(points.true_count);
        return points.points;
    }
    let (ours, theirs) = (&main.shape.trace, &other.shape.trace);
    let n = ours.len().min(theirs.len());
    let best = (0..n)
        .map(|offset| {
            let dist: f64 = (0..n)
                .map(|i| ours[i].distance(theirs[(i + offset) % n]))
                .sum();
            (offset, dist)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(offset, _)| offset)
        .unwrap_or(0);
    let vertices = other.shape.vertices();
    (0..theirs.len())
        .map(|i| vertices[(i + best) % theirs.len()])
        .collect()
}

/// Derives stretch rules for main-example samples.
pub struct Synthesizer<'a> {
    set: &'a ExampleSet,
    assoc: &'a Associations,
    config: &'a ConvertConfig,
    cell: &'a ArcStr,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        set: &'a ExampleSet,
        assoc: &'a Associations,
        config: &'a ConvertConfig,
        cell: &'a ArcStr,
    ) -> Self {
        Self {
            set,
            assoc,
            config,
            cell,
        }
    }

    fn fail(&self, sample: &Sample, cause: RuleSynthesisError) -> ConvError {
        tracing::event!(
            Level::ERROR,
            cell_name = %self.cell,
            shape = sample.shape_index,
            "{}",
            cause
        );
        ConvError::new(self.cell.clone(), cause).at(sample.sample_ref())
    }

    /// Synthesizes the rule of main-example sample `id`.
    pub fn synthesize(&self, id: SampleId) -> Result<Rule> {
        let sample = self.set.sample(id);
        let bounds = self.set.main().bounds;
        let candidates = candidate_points(sample);
        let measures: Vec<Dirs<AxisMeasure>> = candidates
            .points
            .iter()
            .map(|p| Dirs::from_fn(|dir| AxisMeasure::new(p.coord(dir), bounds.span(dir))))
            .collect();

        let bits = if self.set.is_single() {
            uniform_bits(sample, &candidates)
        } else {
            self.constrained_bits(id, &candidates, &measures)?
        };

        if sample.tag == SampleTag::Highlight {
            let all_edges = bits[..candidates.true_count]
                .iter()
                .all(|b| b[Dir::Horiz].has_edge() && b[Dir::Vert].has_edge());
            if !all_edges {
                return Err(self.fail(sample, RuleSynthesisError::HighlightNotEdgeRelative));
            }
        }

        let mut points = Vec::with_capacity(measures.len());
        for (measure, bits) in measures.iter().zip(bits.iter()) {
            let mut anchors = Dirs::uniform(Anchor::FromCenter(0.));
            for dir in Dir::ALL {
                anchors[dir] = measure[dir]
                    .select(bits[dir], dir, bounds.span(dir))
                    .ok_or_else(|| {
                        self.fail(
                            sample,
                            RuleSynthesisError::NoAnchor {
                                axis: dir,
                                label: sample.tag.label(),
                            },
                        )
                    })?;
            }
            points.push(RulePoint::new(anchors[Dir::Horiz], anchors[Dir::Vert]));
        }
        Ok(Rule::new(points))
    }

    /// Starts from every anchor kind and removes those contradicted by a secondary example.
    fn constrained_bits(
        &self,
        id: SampleId,
        candidates: &CandidatePoints,
        measures: &[Dirs<AxisMeasure>],
    ) -> Result<Vec<Dirs<AxisBits>>> {
        let sample = self.set.sample(id);
        let mut bits: Vec<Dirs<AxisBits>> = (0..candidates.points.len())
            .map(|i| {
                Dirs::uniform(if i < candidates.true_count {
                    AxisBits::ALL
                } else {
                    AxisBits::CENTER
                })
            })
            .collect();

        for example in self.set.secondary_ids() {
            let Some(&other_id) = self.assoc.counterparts(self.set, id, example).first() else {
                return Err(ConvError::new(
                    self.cell.clone(),
                    AssociationError::MissingInSecondary(sample.tag.label()),
                )
                .at(sample.sample_ref()));
            };
            let other = self.set.sample(other_id);
            let other_points = matched_points(sample, other);
            if other_points.len() != candidates.true_count {
                return Err(self.fail(
                    other,
                    RuleSynthesisError::PointCountMismatch {
                        label: sample.tag.label(),
                        main: candidates.true_count,
                        other: other_points.len(),
                    },
                ));
            }
            let other_bounds = self.set.example(example).bounds;
            for (i, point) in other_points.iter().enumerate() {
                for dir in Dir::ALL {
                    let seen = AxisMeasure::new(point.coord(dir), other_bounds.span(dir));
                    measures[i][dir].retain_matching(&seen, &mut bits[i][dir], self.config);
                }
            }
        }
        Ok(bits)
    }
}

/// Anchor kinds for a primitive drawn only once.
///
/// Geometry scales with the example; the highlight stays edge-relative and
/// circle centers stay put.
fn uniform_bits(sample: &Sample, candidates: &CandidatePoints) -> Vec<Dirs<AxisBits>> {
    let kind = outline(sample);
    (0..candidates.points.len())
        .map(|i| {
            if i >= candidates.true_count {
                return Dirs::uniform(AxisBits::CENTER);
            }
            if sample.tag == SampleTag::Highlight {
                return Dirs::uniform(match (kind, i) {
                    (Outline::Rect, 0) => AxisBits::LO,
                    (Outline::Rect, _) => AxisBits::HI,
                    _ => AxisBits::EDGES,
                });
            }
            match (kind, i) {
                (Outline::Circle | Outline::CircleArc, 0) => Dirs::uniform(AxisBits::CENTER),
                _ => Dirs::uniform(AxisBits::RATIO),
            }
        })
        .collect()
}
