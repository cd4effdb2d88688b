//! Rule inference for one cell: clustering, association, and synthesis.

use arcstr::ArcStr;
use indexmap::IndexMap;
use tracing::Level;

use crate::anchor::Rule;
use crate::associate::{associate, merge_port_info};
use crate::cluster::cluster_examples;
use crate::context::ConversionContext;
use crate::error::{ConvError, MulticutError};
use crate::input::CellDesc;
use crate::model::{Associations, ExampleSet, SampleId, SampleTag};
use crate::multicut::{build_multicut, MulticutRule};
use crate::synth::Synthesizer;

type Result<T> = std::result::Result<T, ConvError>;

/// The size-independent description of one main-example sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleRule {
    Points(Rule),
    Multicut(MulticutRule),
}

/// Everything learned from the examples of one cell.
#[derive(Debug, Clone)]
pub struct Inference {
    pub examples: ExampleSet,
    pub associations: Associations,
    /// Rules of the main-example samples, in example order. Grab points have none.
    pub rules: IndexMap<SampleId, SampleRule>,
}

impl Inference {
    #[inline]
    pub fn rule(&self, id: SampleId) -> Option<&SampleRule> {
        self.rules.get(&id)
    }

    /// The point rule of `id`, if it is not an iterated cut.
    pub fn points(&self, id: SampleId) -> Option<&Rule> {
        match self.rule(id)? {
            SampleRule::Points(rule) => Some(rule),
            SampleRule::Multicut(_) => None,
        }
    }
}

/// Returns `true` if some secondary example holds several counterparts of `id`.
fn is_iterated(set: &ExampleSet, assoc: &Associations, id: SampleId) -> bool {
    set.secondary_ids()
        .any(|example| assoc.counterparts(set, id, example).len() > 1)
}

/// Infers a rule for every sample of the main example of `cell`.
pub fn infer(cell: &CellDesc, ctx: &mut ConversionContext) -> Result<Inference> {
    let name: &ArcStr = &cell.name;
    let mut examples = {
        let _span = tracing::span!(Level::DEBUG, "cluster").entered();
        cluster_examples(cell)?
    };
    let associations = {
        let _span = tracing::span!(Level::DEBUG, "associate").entered();
        associate(&examples, name)?
    };
    merge_port_info(&mut examples, &associations, name, ctx);

    let _span = tracing::span!(Level::DEBUG, "synthesize").entered();
    let config = ctx.config().clone();
    let synth = Synthesizer::new(&examples, &associations, &config, name);
    let mut rules = IndexMap::new();
    for (id, sample) in examples.main_samples_where(|s| s.tag != SampleTag::GrabPoint) {
        let rule = if is_iterated(&examples, &associations, id) {
            if !matches!(sample.tag, SampleTag::Layer(_)) {
                return Err(ConvError::new(name.clone(), MulticutError::NotContactLayer)
                    .at(sample.sample_ref()));
            }
            SampleRule::Multicut(build_multicut(
                &examples,
                &associations,
                id,
                &config,
                name,
            )?)
        } else {
            SampleRule::Points(synth.synthesize(id)?)
        };
        tracing::event!(
            Level::TRACE,
            shape = sample.shape_index,
            "{}: {:?}",
            sample.tag.label(),
            rule
        );
        rules.insert(id, rule);
    }

    Ok(Inference {
        examples,
        associations,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{Anchor, RulePoint};
    use crate::error::Cause;
    use crate::input::{ShapeDesc, ShapeKind};
    use crate::role::Role;
    use geometry::prelude::*;
    use test_log::test;

    fn boxed(l: f64, b: f64, r: f64, t: f64, role: Role) -> ShapeDesc {
        ShapeDesc::from_rect(ShapeKind::FilledBox, Rect::from_sides(l, b, r, t)).with_role(role)
    }

    #[test]
    fn rules_cover_main_samples() {
        let mut cell = CellDesc::new("node-via");
        cell.add_shape(boxed(0., 0., 4., 4., Role::Highlight));
        cell.add_shape(boxed(0., 0., 4., 4., Role::patch("metal")));
        cell.add_shape(boxed(1., 1., 3., 3., Role::patch("cut")));
        cell.add_shape(boxed(1., 1., 3., 3., Role::port("via")));
        cell.add_shape(boxed(20., 0., 27., 4., Role::Highlight));
        cell.add_shape(boxed(20., 0., 27., 4., Role::patch("metal")));
        cell.add_shape(boxed(21., 1., 23., 3., Role::patch("cut")));
        cell.add_shape(boxed(24., 1., 26., 3., Role::patch("cut")));
        cell.add_shape(boxed(21., 1., 26., 3., Role::port("via")));

        let mut ctx = ConversionContext::default();
        let inference = infer(&cell, &mut ctx).unwrap();
        let set = &inference.examples;
        assert_eq!(inference.rules.len(), set.main().samples.len());

        let (cut, _) = set
            .main_samples_where(|s| s.tag == SampleTag::Layer("cut".into()))
            .next()
            .unwrap();
        assert!(matches!(inference.rule(cut), Some(SampleRule::Multicut(_))));
        assert!(inference.points(cut).is_none());

        let (metal, _) = set
            .main_samples_where(|s| s.tag == SampleTag::Layer("metal".into()))
            .next()
            .unwrap();
        assert_eq!(
            inference.points(metal).unwrap().points,
            vec![
                RulePoint::new(Anchor::ToLeftEdge(0.), Anchor::ToBottomEdge(0.)),
                RulePoint::new(Anchor::ToRightEdge(0.), Anchor::ToTopEdge(0.)),
            ]
        );
        assert!(ctx.issues().is_empty());
    }

    #[test]
    fn iterated_ports_are_rejected() {
        let mut cell = CellDesc::new("node-pad");
        cell.add_shape(boxed(0., 0., 4., 4., Role::Highlight));
        cell.add_shape(boxed(1., 1., 3., 3., Role::port("a")));
        cell.add_shape(boxed(20., 0., 27., 4., Role::Highlight));
        cell.add_shape(boxed(21., 1., 23., 3., Role::port("a")));
        cell.add_shape(boxed(24., 1., 26., 3., Role::port("a")));
        let err = infer(&cell, &mut ConversionContext::default()).unwrap_err();
        assert_eq!(err.cause, Cause::Multicut(MulticutError::NotContactLayer));
    }
}
