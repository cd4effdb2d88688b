//! Partitioning a cell's shapes into examples.

use std::cmp::Ordering;

use geometry::prelude::*;
use tracing::Level;

use crate::error::{ConvError, StructuralError};
use crate::input::{CellCategory, CellDesc};
use crate::model::{ExampleSet, Sample, SampleTag};

type Result<T> = std::result::Result<T, ConvError>;

/// Groups the structural shapes of `cell` into examples by bounding-box flood fill,
/// and selects the main example.
///
/// Shapes without a structural role are ignored. Touching shapes belong to the
/// same example. Grab points join the example they touch but do not enlarge it.
pub fn cluster_examples(cell: &CellDesc) -> Result<ExampleSet> {
    let allow_node_roles = cell.category() == CellCategory::Node;
    let fail = |cause: StructuralError| ConvError::new(cell.name.clone(), cause);

    let mut members = Vec::new();
    for (index, shape) in cell.shapes.iter().enumerate() {
        let Some(tag) = shape.role.as_ref().and_then(SampleTag::from_role) else {
            continue;
        };
        if !allow_node_roles {
            let role = match tag {
                SampleTag::Port => Some("ports"),
                SampleTag::GrabPoint => Some("grab points"),
                _ => None,
            };
            if let Some(role) = role {
                let sample = Sample::new(index, shape, tag);
                return Err(fail(StructuralError::NodeOnlyRole(role)).at(sample.sample_ref()));
            }
        }
        members.push(Sample::new(index, shape, tag));
    }
    if members.is_empty() {
        tracing::event!(Level::ERROR, cell_name = %cell.name, "no examples found");
        return Err(fail(StructuralError::NoExamples));
    }

    let is_grab = |i: usize| members[i].tag == SampleTag::GrabPoint;
    let mut owner: Vec<Option<usize>> = vec![None; members.len()];
    let mut extents: Vec<Rect> = Vec::new();

    // Seed from real geometry first so grab points join an existing example.
    let seeds: Vec<usize> = (0..members.len())
        .filter(|&i| !is_grab(i))
        .chain((0..members.len()).filter(|&i| is_grab(i)))
        .collect();
    for seed in seeds {
        if owner[seed].is_some() {
            continue;
        }
        let cluster = extents.len();
        owner[seed] = Some(cluster);
        let mut extent = members[seed].bounds;
        let mut bounds = (!is_grab(seed)).then_some(extent);

        let mut grew = true;
        while grew {
            grew = false;
            for j in 0..members.len() {
                if owner[j] == Some(cluster) || !members[j].bounds.intersects(&extent) {
                    continue;
                }
                if owner[j].is_some() {
                    tracing::event!(
                        Level::ERROR,
                        cell_name = %cell.name,
                        shape = members[j].shape_index,
                        "examples are too close"
                    );
                    return Err(fail(StructuralError::TooClose).at(members[j].sample_ref()));
                }
                owner[j] = Some(cluster);
                if !is_grab(j) {
                    let b = members[j].bounds;
                    let grown = bounds.map_or(b, |r| r.union(b));
                    bounds = Some(grown);
                    extent = grown;
                }
                grew = true;
            }
        }
        extents.push(bounds.unwrap_or(extent));
    }

    let mut grouped: Vec<Vec<Sample>> = vec![Vec::new(); extents.len()];
    for (sample, cluster) in members.into_iter().zip(owner) {
        if let Some(cluster) = cluster {
            grouped[cluster].push(sample);
        }
    }

    let mut clusters = Vec::with_capacity(grouped.len());
    for (samples, bounds) in grouped.into_iter().zip(extents) {
        let highlights: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tag == SampleTag::Highlight)
            .map(|(i, _)| i)
            .collect();
        match highlights.len() {
            1 => clusters.push((bounds, samples, highlights[0])),
            0 => {
                let err = fail(StructuralError::NoHighlight);
                return Err(match samples.first() {
                    Some(s) => err.at(s.sample_ref()),
                    None => err,
                });
            }
            n => {
                let second = &samples[highlights[1]];
                return Err(fail(StructuralError::MultipleHighlights(n)).at(second.sample_ref()));
            }
        }
    }

    let main = select_main(clusters.iter().map(|(bounds, _, _)| *bounds));
    tracing::event!(
        Level::DEBUG,
        cell_name = %cell.name,
        examples = clusters.len(),
        main,
        "clustered examples"
    );
    Ok(ExampleSet::from_clusters(clusters, main))
}

/// The main example is the one with the smallest area; ties go to the higher
/// center, then to the center further left.
fn select_main(bounds: impl Iterator<Item = Rect>) -> usize {
    let key = |r: &Rect| (r.area(), -r.center().y, r.center().x);
    bounds
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let (a, b) = (key(a), key(b));
            a.0.total_cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.total_cmp(&b.2))
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ShapeDesc, ShapeKind};
    use crate::role::Role;
    use test_log::test;

    fn boxed(rect: Rect, role: Role) -> ShapeDesc {
        ShapeDesc::from_rect(ShapeKind::FilledBox, rect).with_role(role)
    }

    fn example(cell: &mut CellDesc, bounds: Rect) {
        cell.add_shape(boxed(bounds, Role::Highlight));
        cell.add_shape(boxed(
            bounds.shrink_all(1.).unwrap_or(bounds),
            Role::patch("metal"),
        ));
    }

    #[test]
    fn picks_smallest_example_as_main() {
        let mut cell = CellDesc::new("node-metal-node");
        example(&mut cell, Rect::from_sides(0., 0., 20., 10.));
        example(&mut cell, Rect::from_sides(30., 0., 40., 10.));
        cell.add_shape(ShapeDesc::from_rect(ShapeKind::Text, Rect::from_sides(0., -50., 1., -49.)));
        let set = cluster_examples(&cell).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.main().bounds, Rect::from_sides(30., 0., 40., 10.));
        assert_eq!(set.main().samples.len(), 2);
        assert_eq!(set.sample(set.main().highlight).shape_index, 2);
    }

    #[test]
    fn equal_areas_prefer_upper_example() {
        let mut cell = CellDesc::new("node-x");
        example(&mut cell, Rect::from_sides(0., 0., 10., 10.));
        example(&mut cell, Rect::from_sides(0., 20., 10., 30.));
        example(&mut cell, Rect::from_sides(20., 20., 30., 30.));
        let set = cluster_examples(&cell).unwrap();
        assert_eq!(set.main().bounds, Rect::from_sides(0., 20., 10., 30.));
    }

    #[test]
    fn touching_shapes_join_one_example() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 10.), Role::Highlight));
        cell.add_shape(boxed(Rect::from_sides(10., 0., 14., 4.), Role::patch("poly")));
        cell.add_shape(boxed(Rect::from_sides(14., 4., 16., 6.), Role::patch("poly")));
        let set = cluster_examples(&cell).unwrap();
        assert!(set.is_single());
        assert_eq!(set.main().bounds, Rect::from_sides(0., 0., 16., 10.));
    }

    #[test]
    fn grab_point_does_not_grow_example() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(ShapeDesc::new(ShapeKind::Pin, Point::new(10., 5.), 0., 0.).with_role(Role::GrabPoint));
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 10.), Role::Highlight));
        let set = cluster_examples(&cell).unwrap();
        assert_eq!(set.main().samples.len(), 2);
        assert_eq!(set.main().bounds, Rect::from_sides(0., 0., 10., 10.));
    }

    #[test]
    fn missing_highlight_is_structural_error() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 10.), Role::patch("metal")));
        let err = cluster_examples(&cell).unwrap_err();
        assert_eq!(err.cause, StructuralError::NoHighlight.into());
        assert_eq!(err.sample.map(|s| s.shape), Some(0));
    }

    #[test]
    fn two_highlights_is_structural_error() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 10.), Role::Highlight));
        cell.add_shape(boxed(Rect::from_sides(2., 2., 8., 8.), Role::Highlight));
        let err = cluster_examples(&cell).unwrap_err();
        assert_eq!(err.cause, StructuralError::MultipleHighlights(2).into());
    }

    #[test]
    fn no_structural_shapes_is_error() {
        let cell = CellDesc::new("node-x")
            .with_shape(ShapeDesc::from_rect(ShapeKind::Text, Rect::from_sides(0., 0., 1., 1.)));
        let err = cluster_examples(&cell).unwrap_err();
        assert_eq!(err.cause, StructuralError::NoExamples.into());
    }

    #[test]
    fn ports_rejected_outside_nodes() {
        let mut cell = CellDesc::new("arc-metal");
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 10.), Role::Highlight));
        cell.add_shape(boxed(Rect::from_sides(4., 4., 6., 6.), Role::port("a")));
        let err = cluster_examples(&cell).unwrap_err();
        assert_eq!(err.cause, StructuralError::NodeOnlyRole("ports").into());
    }

    #[test]
    fn enclosing_example_reports_examples_too_close() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(Rect::from_sides(4., 4., 7., 7.), Role::Highlight));
        // An L-shaped example whose bounding box swallows the first one.
        cell.add_shape(boxed(Rect::from_sides(0., 0., 10., 1.), Role::Highlight));
        cell.add_shape(boxed(Rect::from_sides(0., 0., 1., 10.), Role::patch("metal")));
        let err = cluster_examples(&cell).unwrap_err();
        assert_eq!(err.cause, StructuralError::TooClose.into());
        assert_eq!(err.sample.map(|s| s.shape), Some(0));
    }
}
