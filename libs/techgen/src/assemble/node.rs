//! Node primitives.

use geometry::prelude::*;
use tracing::Level;

use crate::anchor::Rule;
use crate::context::ConversionContext;
use crate::error::{AssemblyError, ConvError};
use crate::infer::{infer, Inference, SampleRule};
use crate::input::{CellDesc, PolyStyle};
use crate::model::SampleTag;
use crate::role::NodeAttr;
use crate::tech::{
    ArcProto, Layer, NodeFunction, NodeLayer, NodeProto, Representation, SizeOffset, SpecialShape,
};

use super::attr::attrs;
use super::fail;
use super::port::build_ports;
use super::serpentine::{build_serpentine, DrawnLayer};

type Result<T> = std::result::Result<T, ConvError>;

/// The attribute shapes of a node cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NodeAttrs {
    pub(crate) function: NodeFunction,
    pub(crate) serpentine: bool,
    pub(crate) square: bool,
    pub(crate) wipes: bool,
    pub(crate) lockable: bool,
    pub(crate) multicut_separation: Option<f64>,
}

impl NodeAttrs {
    pub(crate) fn parse(cell: &CellDesc) -> Result<Self> {
        let mut out = Self::default();
        for shape in attrs::<NodeAttr>(cell) {
            match shape.attr {
                NodeAttr::Function => out.function = shape.parse()?,
                NodeAttr::Serpentine => out.serpentine = shape.flag()?,
                NodeAttr::Square => out.square = shape.flag()?,
                NodeAttr::Wipes => out.wipes = shape.flag()?,
                NodeAttr::Lockable => out.lockable = shape.flag()?,
                NodeAttr::MulticutSeparation => out.multicut_separation = Some(shape.parse()?),
            }
        }
        Ok(out)
    }

    /// Processing pass of the node: pins, then ordinary nodes, then pure-layer nodes.
    pub(crate) fn pass(&self) -> u8 {
        match self.function {
            NodeFunction::Pin => 0,
            NodeFunction::Node => 2,
            _ => 1,
        }
    }
}

/// Distances from the node edges to the highlight, or `None` if they coincide.
fn size_offset(rule: &Rule, bounds: Rect) -> std::result::Result<Option<SizeOffset>, AssemblyError> {
    let [p0, p1] = match rule.points.as_slice() {
        [p0, p1, ..] => [p0, p1],
        _ => return Err(AssemblyError::HighlightFromCenter),
    };
    if ![p0.x, p0.y, p1.x, p1.y].iter().all(|a| a.is_edge()) {
        return Err(AssemblyError::HighlightFromCenter);
    }
    let offset = SizeOffset {
        left: p0.x.evaluate(bounds.hspan()) - bounds.left(),
        right: bounds.right() - p1.x.evaluate(bounds.hspan()),
        bottom: p0.y.evaluate(bounds.vspan()) - bounds.bot(),
        top: bounds.top() - p1.y.evaluate(bounds.vspan()),
    };
    Ok((offset != SizeOffset::default()).then_some(offset))
}

fn representation(rule: &Rule, style: PolyStyle, min_size: bool) -> Representation {
    match rule.len() {
        4 if min_size && style.is_boxable() => Representation::MinBox,
        2 if style.is_boxable() && rule.is_box() => Representation::Box,
        _ => Representation::Points,
    }
}

/// A node layer with the tech layer and main-example bounds it was drawn with.
struct Resolved<'a> {
    node: NodeLayer,
    tech: &'a Layer,
    bounds: Rect,
}

/// Resolves the layer samples of the main example; iterated cuts go last.
fn node_layers<'a>(
    cell: &CellDesc,
    inference: &Inference,
    layers: &'a [Layer],
    special: &mut SpecialShape,
) -> Result<Vec<Resolved<'a>>> {
    let set = &inference.examples;
    let mut plain = Vec::new();
    let mut cuts = Vec::new();
    for (id, sample) in set.main_samples_where(|s| matches!(s.tag, SampleTag::Layer(_))) {
        let Some(name) = sample.tag.layer() else {
            continue;
        };
        let Some(tech) = layers.iter().find(|l| &l.name == name) else {
            return Err(fail(&cell.name, Some(sample), AssemblyError::UnknownLayer(name.clone())));
        };
        let Some(style) = sample.shape.style() else {
            return Err(fail(&cell.name, Some(sample), AssemblyError::UnknownStyle(sample.shape.kind)));
        };
        let message = (style == PolyStyle::TextCenter)
            .then(|| sample.shape.value.clone())
            .flatten();

        let (rule, representation) = match inference.rule(id) {
            Some(SampleRule::Multicut(mc)) => {
                if *special == SpecialShape::None {
                    *special = SpecialShape::Multicut {
                        cut_width: mc.cut_width,
                        cut_height: mc.cut_height,
                        indent_x: mc.indent,
                        indent_y: mc.indent,
                        sep_x: mc.separation,
                        sep_y: mc.separation,
                    };
                }
                (mc.region.clone(), Representation::Multicut)
            }
            Some(SampleRule::Points(rule)) => {
                let repr = representation(rule, style, sample.shape.min_size);
                (rule.clone(), repr)
            }
            None => continue,
        };
        let resolved = Resolved {
            node: NodeLayer {
                layer: tech.name.clone(),
                style,
                representation,
                rule,
                message,
                serpentine: None,
            },
            tech,
            bounds: sample.bounds,
        };
        if representation == Representation::Multicut {
            cuts.push(resolved);
        } else {
            plain.push(resolved);
        }
    }
    plain.extend(cuts);
    Ok(plain)
}

/// Builds a node from its examples.
pub(crate) fn build_node(
    cell: &CellDesc,
    attrs: &NodeAttrs,
    layers: &[Layer],
    arcs: &[ArcProto],
    ctx: &mut ConversionContext,
) -> Result<NodeProto> {
    let name = &cell.name;
    let inference = infer(cell, ctx)?;

    let _span = tracing::span!(Level::DEBUG, "assemble").entered();
    let set = &inference.examples;
    let main = set.main();
    let bounds = main.bounds;
    let size = (bounds.width(), bounds.height());

    let highlight = set.sample(main.highlight);
    let offset = inference
        .points(main.highlight)
        .ok_or(AssemblyError::HighlightFromCenter)
        .and_then(|rule| size_offset(rule, bounds))
        .map_err(|cause| fail(name, Some(highlight), cause))?;

    let mut special = SpecialShape::None;
    let mut resolved = node_layers(cell, &inference, layers, &mut special)?;
    let ports = build_ports(name, &inference, arcs, attrs.function, size)?;

    if attrs.function == NodeFunction::Node {
        if attrs.serpentine {
            return Err(fail(name, None, AssemblyError::SerpentinePureLayer));
        }
        special = SpecialShape::Polygonal;
    } else if attrs.serpentine {
        let mut drawn: Vec<DrawnLayer<'_>> = resolved
            .iter_mut()
            .map(|r| DrawnLayer {
                node: &mut r.node,
                tech: r.tech,
                bounds: r.bounds,
            })
            .collect();
        let values = build_serpentine(&mut drawn, &ports, bounds.center(), size)
            .map_err(|cause| fail(name, None, cause))?;
        special = SpecialShape::Serpentine { values };
    }

    let grab_offset = set
        .main_samples_where(|s| s.tag == SampleTag::GrabPoint)
        .next()
        .map(|(_, s)| s.center() - bounds.center());

    let node = NodeProto {
        name: cell.payload_name().into(),
        function: attrs.function,
        width: size.0,
        height: size.1,
        size_offset: offset,
        layers: resolved.into_iter().map(|r| r.node).collect(),
        ports,
        special,
        square: attrs.square,
        wipes: attrs.wipes,
        lockable: attrs.lockable,
        multicut_separation: attrs.multicut_separation,
        grab_offset,
    };
    tracing::event!(
        Level::DEBUG,
        cell_name = %name,
        function = %node.function,
        layers = node.layers.len(),
        ports = node.ports.len(),
        "built node"
    );
    Ok(node)
}
