//! Serpentine transistor description.

use geometry::prelude::*;

use crate::anchor::{Rule, RulePoint};
use crate::error::AssemblyError;
use crate::tech::{Layer, NodeLayer, NodePort, SerpentineExtent};

/// A node layer together with what is known about it in the main example.
pub(crate) struct DrawnLayer<'a> {
    pub(crate) node: &'a mut NodeLayer,
    pub(crate) tech: &'a Layer,
    pub(crate) bounds: Rect,
}

fn point(rule: &Rule, i: usize) -> Result<RulePoint, AssemblyError> {
    rule.points
        .get(i)
        .copied()
        .ok_or(AssemblyError::NoSerpentineLayers)
}

/// Picks the gate (last polysilicon) and active layers of a transistor.
fn serpentine_layers(layers: &[DrawnLayer<'_>]) -> Option<(usize, usize)> {
    let poly = layers.iter().rposition(|l| l.tech.function.is_poly())?;
    let mut diff: Option<usize> = None;
    for (i, layer) in layers.iter().enumerate() {
        if !layer.tech.function.is_diffusion() {
            continue;
        }
        let keep = diff.is_some_and(|d| {
            let old = &layers[d].tech.extras;
            old == &layer.tech.extras || old.iter().all(|e| e.is_doping())
        });
        if !keep {
            diff = Some(i);
        }
    }
    Some((poly, diff?))
}

/// Computes the serpentine values of a transistor and fills in the
/// per-layer extents relative to its centerline.
///
/// Expects the ports in transistor order, gate first.
pub(crate) fn build_serpentine(
    layers: &mut [DrawnLayer<'_>],
    ports: &[NodePort],
    center: Point,
    (width, height): (f64, f64),
) -> Result<[f64; 6], AssemblyError> {
    let (poly_idx, diff_idx) =
        serpentine_layers(layers).ok_or(AssemblyError::NoSerpentineLayers)?;
    let [g1, t1] = match ports {
        [g1, t1, ..] => [&g1.rule, &t1.rule],
        _ => return Err(AssemblyError::NeedGateAndActivePorts),
    };
    let poly = &layers[poly_idx].node.rule;
    let diff = &layers[diff_idx].node.rule;
    let px = |p: RulePoint| p.x.position(width);
    let py = |p: RulePoint| p.y.position(height);

    let (p0, p1) = (point(poly, 0)?, point(poly, 1)?);
    let d0 = point(diff, 0)?;
    let (g0, g1) = (point(g1, 0)?, point(g1, 1)?);
    let (t0, t1) = (point(t1, 0)?, point(t1, 1)?);

    let mut values = [0.; 6];
    values[0] = (layers.len() + 1) as f64;
    if t0.x.adder() > t0.y.adder() {
        // Active region runs vertically.
        values[3] = py(p1) - py(p0);
        values[1] = px(t0) - px(d0);
        values[2] = py(t0) - py(p1);
        values[4] = py(g0) - py(p0);
        values[5] = px(d0) - px(g1);
    } else {
        values[3] = px(p1) - px(p0);
        values[1] = py(t0) - py(d0);
        values[2] = px(p0) - px(t1);
        values[4] = px(g0) - px(p0);
        values[5] = py(d0) - py(g1);
    }

    let poly_bounds = layers[poly_idx].bounds;
    let diff_bounds = layers[diff_idx].bounds;
    let horizontal = poly_bounds.width() > poly_bounds.height();
    for layer in layers.iter_mut() {
        let b = layer.bounds;
        let extent = if horizontal {
            let extend = diff_bounds.left() - b.left();
            SerpentineExtent {
                lwidth: b.top() - center.y,
                rwidth: center.y - b.bot(),
                extend_top: extend,
                extend_bottom: extend,
            }
        } else {
            let extend = diff_bounds.bot() - b.bot();
            SerpentineExtent {
                lwidth: b.right() - center.x,
                rwidth: center.x - b.left(),
                extend_top: extend,
                extend_bottom: extend,
            }
        };
        layer.node.serpentine = Some(extent);
    }
    Ok(values)
}
