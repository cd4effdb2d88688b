//! Node ports: naming, connectivity, ordering, and transistor canonicalization.

use arcstr::ArcStr;
use geometry::prelude::*;
use unicase::UniCase;

use crate::anchor::Rule;
use crate::error::{AssemblyError, ConvError};
use crate::infer::Inference;
use crate::model::{Sample, SampleTag};
use crate::tech::{ArcProto, NodeFunction, NodePort};

use super::fail;

type Result<T> = std::result::Result<T, ConvError>;

/// A port before topology assignment.
struct DraftPort {
    port: NodePort,
    net: Option<ArcStr>,
    class: PortClass,
}

/// The kind of arc a transistor port accepts first.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PortClass {
    Gate,
    Active,
    Other,
}

fn valid_port_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| ('!'..='~').contains(&c))
}

/// Builds the ports of the main example, sorted by angle and name.
///
/// Field-effect transistors are reordered to gate, gated terminal, gate,
/// gated terminal, followed by any remaining ports.
pub(crate) fn build_ports(
    cell: &ArcStr,
    inference: &Inference,
    arcs: &[ArcProto],
    function: NodeFunction,
    size: (f64, f64),
) -> Result<Vec<NodePort>> {
    let fail = |sample: Option<&Sample>, cause: AssemblyError| fail(cell, sample, cause);

    let set = &inference.examples;
    let mut drafts = Vec::new();
    for (id, sample) in set.main_samples_where(|s| s.tag == SampleTag::Port) {
        let attrs = sample.port.clone().unwrap_or_default();
        let name = match attrs.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(fail(Some(sample), AssemblyError::UnnamedPort)),
        };
        if !valid_port_name(&name) {
            return Err(fail(Some(sample), AssemblyError::InvalidPortName(name)));
        }

        let mut connections = Vec::new();
        let mut class = PortClass::Other;
        for wanted in attrs.connections.unwrap_or_default() {
            let Some(arc) = arcs
                .iter()
                .find(|a| UniCase::new(a.name.as_str()) == UniCase::new(wanted.as_str()))
            else {
                return Err(fail(Some(sample), AssemblyError::InvalidConnection(wanted)));
            };
            if class == PortClass::Other {
                if arc.function.is_poly() {
                    class = PortClass::Gate;
                } else if arc.function.is_diffusion() {
                    class = PortClass::Active;
                }
            }
            connections.push(arc.name.clone());
        }

        drafts.push(DraftPort {
            port: NodePort {
                name,
                angle: attrs.angle.unwrap_or(0),
                range: attrs.range.unwrap_or(180),
                connections,
                topology: 0,
                rule: inference.points(id).cloned().unwrap_or_default(),
            },
            net: attrs.net,
            class,
        });
    }
    if drafts.is_empty() {
        return Err(fail(None, AssemblyError::NoPorts));
    }

    drafts.sort_by(|a, b| {
        a.port
            .angle
            .cmp(&b.port.angle)
            .then_with(|| a.port.name.cmp(&b.port.name))
    });
    if function.is_fet() {
        drafts = reorder_fet(drafts, size).map_err(|cause| fail(None, cause))?;
    }

    for i in 0..drafts.len() {
        let topology = drafts[i]
            .net
            .as_ref()
            .and_then(|net| drafts[..i].iter().position(|d| d.net.as_ref() == Some(net)))
            .unwrap_or(i);
        drafts[i].port.topology = topology;
    }
    Ok(drafts.into_iter().map(|d| d.port).collect())
}

/// Orders a pair of ports along the axis on which they are further apart.
fn by_position(mut pair: Vec<DraftPort>, size: (f64, f64)) -> Vec<DraftPort> {
    let pos = |rule: &Rule| rule.mean_position(size.0, size.1);
    let (a, b) = (pos(&pair[0].port.rule), pos(&pair[1].port.rule));
    let dir = if (a.x - b.x).abs() > (a.y - b.y).abs() {
        Dir::Horiz
    } else {
        Dir::Vert
    };
    if a.coord(dir) > b.coord(dir) {
        pair.swap(0, 1);
    }
    pair
}

/// Places the lower gate first and the upper gated terminal first.
fn reorder_fet(
    drafts: Vec<DraftPort>,
    size: (f64, f64),
) -> std::result::Result<Vec<DraftPort>, AssemblyError> {
    let mut gates = Vec::new();
    let mut actives = Vec::new();
    let mut rest = Vec::new();
    for draft in drafts {
        match draft.class {
            PortClass::Gate if gates.len() < 2 => gates.push(draft),
            PortClass::Active if actives.len() < 2 => actives.push(draft),
            _ => rest.push(draft),
        }
    }
    if gates.len() != 2 || actives.len() != 2 {
        return Err(AssemblyError::NeedGateAndActivePorts);
    }
    let mut gates = by_position(gates, size).into_iter();
    let mut actives = by_position(actives, size).into_iter().rev();

    let mut ordered = Vec::with_capacity(4 + rest.len());
    for _ in 0..2 {
        ordered.extend(gates.next());
        ordered.extend(actives.next());
    }
    ordered.extend(rest);
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ConversionContext;
    use crate::error::Cause;
    use crate::infer::infer;
    use crate::input::{CellDesc, ShapeDesc, ShapeKind};
    use crate::role::{PortAttrs, Role};
    use crate::tech::ArcFunction;
    use test_log::test;

    fn arcs() -> Vec<ArcProto> {
        let mut poly = ArcProto::new("Poly");
        poly.function = ArcFunction::Poly(1);
        let mut diff = ArcProto::new("Active");
        diff.function = ArcFunction::Diffusion;
        vec![poly, diff, ArcProto::new("metal")]
    }

    fn port(l: f64, b: f64, r: f64, t: f64, attrs: PortAttrs) -> ShapeDesc {
        ShapeDesc::from_rect(ShapeKind::Box, Rect::from_sides(l, b, r, t))
            .with_role(Role::Port(attrs))
    }

    fn single(ports: Vec<ShapeDesc>) -> CellDesc {
        let mut cell = CellDesc::new("node-test");
        cell.add_shape(
            ShapeDesc::from_rect(ShapeKind::Box, Rect::from_sides(0., 0., 10., 10.))
                .with_role(Role::Highlight),
        );
        for p in ports {
            cell.add_shape(p);
        }
        cell
    }

    fn ports_of(cell: &CellDesc, function: NodeFunction) -> Result<Vec<NodePort>> {
        let inference = infer(cell, &mut ConversionContext::default())?;
        build_ports(&cell.name, &inference, &arcs(), function, (10., 10.))
    }

    fn names(ports: &[NodePort]) -> Vec<&str> {
        ports.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn sorted_by_angle_then_name() {
        let cell = single(vec![
            port(0., 0., 1., 1., PortAttrs::named("b").with_angle(90)),
            port(1., 0., 2., 1., PortAttrs::named("c")),
            port(2., 0., 3., 1., PortAttrs::named("a").with_angle(90).with_range(45)),
        ]);
        let ports = ports_of(&cell, NodeFunction::Contact).unwrap();
        assert_eq!(names(&ports), ["c", "a", "b"]);
        assert_eq!(ports[0].range, 180);
        assert_eq!(ports[1].range, 45);
    }

    #[test]
    fn connections_resolve_ignoring_case() {
        let cell = single(vec![port(
            0.,
            0.,
            1.,
            1.,
            PortAttrs::named("a").with_connections(["METAL", "poly"]),
        )]);
        let ports = ports_of(&cell, NodeFunction::Pin).unwrap();
        assert_eq!(ports[0].connections, vec![ArcStr::from("metal"), ArcStr::from("Poly")]);

        let cell = single(vec![port(
            0.,
            0.,
            1.,
            1.,
            PortAttrs::named("a").with_connections(["copper"]),
        )]);
        assert_eq!(
            ports_of(&cell, NodeFunction::Pin).unwrap_err().cause,
            Cause::Assembly(AssemblyError::InvalidConnection("copper".into()))
        );
    }

    #[test]
    fn names_are_checked() {
        let cell = single(vec![port(0., 0., 1., 1., PortAttrs::named("a b"))]);
        assert_eq!(
            ports_of(&cell, NodeFunction::Pin).unwrap_err().cause,
            Cause::Assembly(AssemblyError::InvalidPortName("a b".into()))
        );
        let cell = single(vec![port(0., 0., 1., 1., PortAttrs::default())]);
        assert_eq!(
            ports_of(&cell, NodeFunction::Pin).unwrap_err().cause,
            Cause::Assembly(AssemblyError::UnnamedPort)
        );
        let cell = single(Vec::new());
        assert_eq!(
            ports_of(&cell, NodeFunction::Pin).unwrap_err().cause,
            Cause::Assembly(AssemblyError::NoPorts)
        );
    }

    #[test]
    fn shared_nets_share_topology() {
        let cell = single(vec![
            port(0., 0., 1., 1., PortAttrs::named("a").with_net("x")),
            port(1., 0., 2., 1., PortAttrs::named("b")),
            port(2., 0., 3., 1., PortAttrs::named("c").with_net("x")),
        ]);
        let ports = ports_of(&cell, NodeFunction::Resistor).unwrap();
        let topology: Vec<usize> = ports.iter().map(|p| p.topology).collect();
        assert_eq!(topology, [0, 1, 0]);
    }

    #[test]
    fn transistor_ports_are_canonical() {
        // Vertical poly crossing horizontal diffusion.
        let cell = single(vec![
            port(4., 9., 6., 10., PortAttrs::named("g-top").with_connections(["poly"])),
            port(4., 0., 6., 1., PortAttrs::named("g-bot").with_connections(["poly"])),
            port(0., 4., 1., 6., PortAttrs::named("d-left").with_connections(["active"])),
            port(9., 4., 10., 6., PortAttrs::named("d-right").with_connections(["active"])),
        ]);
        let ports = ports_of(&cell, NodeFunction::Nmos).unwrap();
        assert_eq!(names(&ports), ["g-bot", "d-right", "g-top", "d-left"]);
        let topology: Vec<usize> = ports.iter().map(|p| p.topology).collect();
        assert_eq!(topology, [0, 1, 2, 3]);
    }

    #[test]
    fn transistor_needs_two_of_each() {
        let cell = single(vec![
            port(4., 9., 6., 10., PortAttrs::named("g").with_connections(["poly"])),
            port(0., 4., 1., 6., PortAttrs::named("s").with_connections(["active"])),
            port(9., 4., 10., 6., PortAttrs::named("d").with_connections(["active"])),
        ]);
        assert_eq!(
            ports_of(&cell, NodeFunction::Pmos).unwrap_err().cause,
            Cause::Assembly(AssemblyError::NeedGateAndActivePorts)
        );
    }
}
