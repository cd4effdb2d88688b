//! Matching secondary-example samples to their main-example counterparts.

use std::cmp::Ordering;

use arcstr::ArcStr;
use tracing::Level;
use unicase::UniCase;

use crate::context::ConversionContext;
use crate::error::{AssociationError, ConvError, WarningKind};
use crate::model::{Associations, ExampleId, ExampleSet, Sample, SampleId, SampleTag};

type Result<T> = std::result::Result<T, ConvError>;

/// Associates every sample of every secondary example with a main-example sample.
///
/// A cell with a single example has nothing to associate.
pub fn associate(set: &ExampleSet, cell: &ArcStr) -> Result<Associations> {
    let mut assoc = Associations::new();
    if set.is_single() {
        return Ok(assoc);
    }
    for example in set.secondary_ids() {
        associate_example(set, example, cell, &mut assoc)?;
    }
    check_complete(set, &assoc, cell)?;
    Ok(assoc)
}

fn associate_example(
    set: &ExampleSet,
    example: ExampleId,
    cell: &ArcStr,
    assoc: &mut Associations,
) -> Result<()> {
    let fail = |sample: &Sample, cause: AssociationError| {
        tracing::event!(
            Level::ERROR,
            cell_name = %cell,
            shape = sample.shape_index,
            "{}",
            cause
        );
        ConvError::new(cell.clone(), cause).at(sample.sample_ref())
    };

    for (id, sample) in set.samples_in(example) {
        if assoc.main_of(id).is_some() {
            continue;
        }
        if sample.tag == SampleTag::GrabPoint {
            return Err(fail(sample, AssociationError::GrabPointInSecondary));
        }

        let candidates: Vec<SampleId> = set
            .main_samples_where(|m| m.tag == sample.tag)
            .map(|(id, _)| id)
            .collect();
        match candidates.as_slice() {
            [] => {
                return Err(fail(sample, AssociationError::AbsentFromMain(sample.tag.label())));
            }
            [only] => assoc.insert(id, *only),
            _ if sample.tag == SampleTag::Port => {
                let Some(name) = sample.port_name() else {
                    return Err(fail(sample, AssociationError::UnnamedPort));
                };
                let name = UniCase::new(name.as_str());
                let found = candidates.iter().copied().find(|c| {
                    set.sample(*c)
                        .port_name()
                        .map(|other| UniCase::new(other.as_str()) == name)
                        .unwrap_or(false)
                });
                match found {
                    Some(main) => assoc.insert(id, main),
                    None => {
                        let name = sample.port_name().cloned().unwrap_or_default();
                        return Err(fail(sample, AssociationError::PortNotInMain(name)));
                    }
                }
            }
            _ => pair_by_position(set, example, &sample.tag, &candidates, cell, assoc)?,
        }
    }
    Ok(())
}

/// Pairs same-tag samples of `example` with `main_list` by ascending position.
fn pair_by_position(
    set: &ExampleSet,
    example: ExampleId,
    tag: &SampleTag,
    main_list: &[SampleId],
    cell: &ArcStr,
    assoc: &mut Associations,
) -> Result<()> {
    let mut others: Vec<SampleId> = set
        .samples_in(example)
        .filter(|(_, s)| &s.tag == tag)
        .map(|(id, _)| id)
        .collect();
    if others.len() != main_list.len() {
        let first = set.sample(others[0]);
        return Err(ConvError::new(
            cell.clone(),
            AssociationError::CountMismatch {
                label: tag.label(),
                main: main_list.len(),
                other: others.len(),
            },
        )
        .at(first.sample_ref()));
    }

    let mut mains = main_list.to_vec();
    mains.sort_by(|a, b| position_order(set.sample(*a), set.sample(*b)));
    others.sort_by(|a, b| position_order(set.sample(*a), set.sample(*b)));

    for list in [&mains, &others] {
        for pair in list.windows(2) {
            let (a, b) = (set.sample(pair[0]), set.sample(pair[1]));
            if position_order(a, b) == Ordering::Equal {
                return Err(ConvError::new(
                    cell.clone(),
                    AssociationError::Unassociated(b.tag.label()),
                )
                .at(b.sample_ref()));
            }
        }
    }

    for (other, main) in others.into_iter().zip(mains) {
        assoc.insert(other, main);
    }
    Ok(())
}

/// Orders samples by center x, then center y, then shape kind.
fn position_order(a: &Sample, b: &Sample) -> Ordering {
    let (pa, pb) = (a.center(), b.center());
    pa.x.total_cmp(&pb.x)
        .then(pa.y.total_cmp(&pb.y))
        .then(a.shape.kind.cmp(&b.shape.kind))
}

/// Every main sample other than the grab point needs a counterpart in every
/// secondary example.
fn check_complete(set: &ExampleSet, assoc: &Associations, cell: &ArcStr) -> Result<()> {
    for example in set.secondary_ids() {
        for (main, sample) in set.main_samples_where(|s| s.tag != SampleTag::GrabPoint) {
            if assoc.counterparts(set, main, example).is_empty() {
                return Err(ConvError::new(
                    cell.clone(),
                    AssociationError::MissingInSecondary(sample.tag.label()),
                )
                .at(sample.sample_ref()));
            }
        }
    }
    Ok(())
}

/// Copies port angle, range, and connections that only secondary examples carry
/// onto the main example, warning about each move.
pub fn merge_port_info(
    set: &mut ExampleSet,
    assoc: &Associations,
    cell: &ArcStr,
    ctx: &mut ConversionContext,
) {
    let moves: Vec<(SampleId, SampleId)> = assoc
        .iter()
        .filter(|(_, main)| set.sample(*main).tag == SampleTag::Port)
        .collect();
    for (secondary, main) in moves {
        let Some(source) = set.sample(secondary).port.clone() else {
            continue;
        };
        let Some(target) = set.sample_mut(main).port.as_mut() else {
            continue;
        };
        let mut moved = Vec::new();
        if target.angle.is_none() && source.angle.is_some() {
            target.angle = source.angle;
            moved.push("angle");
        }
        if target.range.is_none() && source.range.is_some() {
            target.range = source.range;
            moved.push("range");
        }
        if target.connections.is_none() && source.connections.is_some() {
            target.connections = source.connections;
            moved.push("connections");
        }
        for what in moved {
            ctx.warn(Some(cell), WarningKind::MovedPortInfo(what));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster_examples;
    use crate::input::{CellDesc, ShapeDesc, ShapeKind};
    use crate::role::{PortAttrs, Role};
    use geometry::prelude::*;
    use test_log::test;

    fn boxed(l: f64, b: f64, r: f64, t: f64, role: Role) -> ShapeDesc {
        ShapeDesc::from_rect(ShapeKind::FilledBox, Rect::from_sides(l, b, r, t)).with_role(role)
    }

    fn two_port_cell(second_names: [&str; 2]) -> CellDesc {
        let mut cell = CellDesc::new("node-res");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(0., 4., 2., 6., Role::port("a")));
        cell.add_shape(boxed(8., 4., 10., 6., Role::port("b")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(38., 4., 40., 6., Role::port(second_names[0])));
        cell.add_shape(boxed(20., 4., 22., 6., Role::port(second_names[1])));
        cell
    }

    #[test]
    fn single_example_has_no_associations() {
        let cell = CellDesc::new("node-x").with_shape(boxed(0., 0., 1., 1., Role::Highlight));
        let set = cluster_examples(&cell).unwrap();
        assert!(associate(&set, &cell.name).unwrap().is_empty());
    }

    #[test]
    fn ports_match_by_name_ignoring_case() {
        let cell = two_port_cell(["B", "A"]);
        let set = cluster_examples(&cell).unwrap();
        let assoc = associate(&set, &cell.name).unwrap();
        let secondary = set.secondary_ids().next().unwrap();
        for (id, sample) in set.samples_in(secondary) {
            let main = set.sample(assoc.main_of(id).unwrap());
            assert_eq!(main.tag, sample.tag);
            if let (Some(a), Some(b)) = (main.port_name(), sample.port_name()) {
                assert!(a.eq_ignore_ascii_case(b));
            }
        }
    }

    #[test]
    fn unknown_port_name_fails() {
        let cell = two_port_cell(["b", "c"]);
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert_eq!(err.cause, AssociationError::PortNotInMain("c".into()).into());
        assert_eq!(err.sample.unwrap().shape, 5);
    }

    #[test]
    fn repeated_layers_pair_by_position() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(6., 1., 9., 9., Role::patch("poly")));
        cell.add_shape(boxed(1., 1., 4., 9., Role::patch("poly")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(21., 1., 24., 9., Role::patch("poly")));
        cell.add_shape(boxed(36., 1., 39., 9., Role::patch("poly")));
        let set = cluster_examples(&cell).unwrap();
        let assoc = associate(&set, &cell.name).unwrap();
        let secondary = set.secondary_ids().next().unwrap();
        let pairs: Vec<(usize, usize)> = set
            .samples_in(secondary)
            .filter(|(_, s)| s.tag.layer().is_some())
            .map(|(id, s)| (s.shape_index, set.sample(assoc.main_of(id).unwrap()).shape_index))
            .collect();
        assert_eq!(pairs, vec![(4, 2), (5, 1)]);
    }

    #[test]
    fn count_mismatch_fails() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(1., 1., 4., 9., Role::patch("poly")));
        cell.add_shape(boxed(6., 1., 9., 9., Role::patch("poly")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(21., 1., 24., 9., Role::patch("poly")));
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert!(matches!(
            err.cause,
            crate::error::Cause::Association(AssociationError::CountMismatch { main: 2, other: 1, .. })
        ));
    }

    #[test]
    fn coincident_samples_are_ambiguous() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(1., 1., 9., 9., Role::patch("poly")));
        cell.add_shape(boxed(2., 2., 8., 8., Role::patch("poly")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(21., 1., 39., 9., Role::patch("poly")));
        cell.add_shape(boxed(22., 2., 38., 8., Role::patch("poly")));
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert_eq!(err.cause, AssociationError::Unassociated("layer poly".into()).into());
    }

    #[test]
    fn layer_absent_from_main_fails() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(21., 1., 24., 9., Role::patch("metal")));
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert_eq!(err.cause, AssociationError::AbsentFromMain("layer metal".into()).into());
    }

    #[test]
    fn layer_missing_from_secondary_fails() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(1., 1., 4., 9., Role::patch("metal")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert_eq!(err.cause, AssociationError::MissingInSecondary("layer metal".into()).into());
        assert_eq!(err.sample.unwrap().shape, 1);
    }

    #[test]
    fn grab_point_only_in_main() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(ShapeDesc::new(ShapeKind::Pin, Point::new(30., 5.), 0., 0.).with_role(Role::GrabPoint));
        let set = cluster_examples(&cell).unwrap();
        let err = associate(&set, &cell.name).unwrap_err();
        assert_eq!(err.cause, AssociationError::GrabPointInSecondary.into());
    }

    #[test]
    fn port_info_moves_to_main_example() {
        let mut cell = CellDesc::new("node-x");
        cell.add_shape(boxed(0., 0., 10., 10., Role::Highlight));
        cell.add_shape(boxed(4., 4., 6., 6., Role::port("a")));
        cell.add_shape(boxed(20., 0., 40., 10., Role::Highlight));
        cell.add_shape(boxed(
            29.,
            4.,
            31.,
            6.,
            Role::Port(PortAttrs::named("a").with_angle(90).with_connections(["metal"])),
        ));
        let mut set = cluster_examples(&cell).unwrap();
        let assoc = associate(&set, &cell.name).unwrap();
        let mut ctx = ConversionContext::default();
        merge_port_info(&mut set, &assoc, &cell.name, &mut ctx);
        let (_, port) = set
            .main_samples_where(|s| s.tag == SampleTag::Port)
            .next()
            .unwrap();
        let attrs = port.port.as_ref().unwrap();
        assert_eq!(attrs.angle, Some(90));
        assert_eq!(attrs.range, None);
        assert_eq!(attrs.connections.as_ref().map(Vec::len), Some(1));
        assert_eq!(ctx.issues().num_warnings(), 2);
    }
}
