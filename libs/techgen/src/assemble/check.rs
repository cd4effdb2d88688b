//! Cross-primitive consistency warnings.

use crate::context::ConversionContext;
use crate::error::WarningKind;
use crate::tech::{NodeFunction, NodeProto, Technology};

/// Warns about layers and arcs that lack the nodes an editor needs to draw them.
pub(crate) fn check_consistency(tech: &Technology, ctx: &mut ConversionContext) {
    for layer in tech.layers.iter().filter(|l| !l.is_pseudo()) {
        let has_pure_node = tech.nodes.iter().any(|n| {
            n.function == NodeFunction::Node
                && n.layers.first().is_some_and(|l| l.layer == layer.name)
        });
        if !has_pure_node {
            ctx.warn(None, WarningKind::LayerWithoutPureNode(layer.name.clone()));
        }
    }

    for arc in tech.arcs.iter() {
        let pin = tech.nodes.iter().find(|n| {
            n.function == NodeFunction::Pin
                && n.ports.iter().any(|p| p.connections.contains(&arc.name))
        });
        let Some(pin) = pin else {
            ctx.warn(None, WarningKind::ArcWithoutPin(arc.name.clone()));
            continue;
        };
        if !is_pseudo_pin(tech, pin) {
            ctx.warn(None, WarningKind::PinNotPseudo(pin.name.clone()));
        }
    }
}

fn is_pseudo_pin(tech: &Technology, pin: &NodeProto) -> bool {
    pin.layers
        .iter()
        .all(|l| tech.layer(&l.layer).is_some_and(|layer| layer.is_pseudo()))
}
