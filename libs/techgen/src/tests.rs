use approx::assert_abs_diff_eq;
use geometry::prelude::*;
use test_log::test;

use crate::anchor::Anchor;
use crate::context::ConversionContext;
use crate::error::{Cause, RuleSynthesisError, StructuralError, WarningKind};
use crate::infer::infer;
use crate::input::{CellDesc, ShapeDesc, ShapeKind};
use crate::role::{ArcAttr, LayerAttr, NodeAttr, PortAttrs, Role};
use crate::tech::{NodeFunction, Representation, SpecialShape};
use crate::*;

const LIBRARY: &str = r#"
name = "demo"

[sequence]
layers = ["metal", "pseudo-metal", "poly", "bogus"]

[[cell]]
name = "technology"

[[cell.shape]]
kind = "text"
role = { misc = "lambda" }
value = "200"

[[cell.shape]]
kind = "text"
role = { misc = "description" }
value = "A demonstration process"

[[cell]]
name = "layer-poly"

[[cell.shape]]
kind = "text"
role = { layer = "function" }
value = "poly"

[[cell]]
name = "layer-pseudo-metal"

[[cell.shape]]
kind = "text"
role = { layer = "function" }
value = "metal-1, pseudo"

[[cell]]
name = "layer-metal"

[[cell.shape]]
kind = "text"
role = { layer = "function" }
value = "metal-1"

[[cell.shape]]
kind = "text"
role = { layer = "color" }
value = "96,96,255"

[[cell]]
name = "arc-metal"

[[cell.shape]]
kind = "text"
role = { arc = "function" }
value = "metal-1"

[[cell.shape]]
kind = "filled-box"
center = { x = 5, y = 2 }
width = 10
height = 4
role = { patch = "metal" }

[[cell.shape]]
kind = "box"
center = { x = 5, y = 2 }
width = 10
height = 4
role = "highlight"

[[cell]]
name = "node-metal-node"

[[cell.shape]]
kind = "text"
role = { node = "function" }
value = "pure-layer"

[[cell.shape]]
kind = "filled-box"
center = { x = 2, y = 2 }
width = 4
height = 4
role = { patch = "metal" }

[[cell.shape]]
kind = "box"
center = { x = 2, y = 2 }
width = 4
height = 4
role = "highlight"

[[cell.shape]]
kind = "pin"
center = { x = 2, y = 2 }
role = { port = { name = "metal", connections = ["metal"] } }

[[cell]]
name = "node-metal-pin"

[[cell.shape]]
kind = "text"
role = { node = "function" }
value = "pin"

[[cell.shape]]
kind = "filled-box"
center = { x = 2, y = 2 }
width = 4
height = 4
role = { patch = "pseudo-metal" }

[[cell.shape]]
kind = "box"
center = { x = 2, y = 2 }
width = 4
height = 4
role = "highlight"

[[cell.shape]]
kind = "pin"
center = { x = 2, y = 2 }
role = { port = { name = "metal", connections = ["METAL"] } }
"#;

fn library() -> LibraryDesc {
    toml::from_str(LIBRARY).unwrap()
}

fn boxed(kind: ShapeKind, l: f64, b: f64, r: f64, t: f64, role: Role) -> ShapeDesc {
    ShapeDesc::from_rect(kind, Rect::from_sides(l, b, r, t)).with_role(role)
}

fn highlight(l: f64, b: f64, r: f64, t: f64) -> ShapeDesc {
    boxed(ShapeKind::Box, l, b, r, t, Role::Highlight)
}

fn patch(layer: &str, l: f64, b: f64, r: f64, t: f64) -> ShapeDesc {
    boxed(ShapeKind::FilledBox, l, b, r, t, Role::patch(layer))
}

fn point_port(at: Point, attrs: PortAttrs) -> ShapeDesc {
    ShapeDesc::new(ShapeKind::Pin, at, 0., 0.).with_role(Role::Port(attrs))
}

fn text(role: Role, value: &str) -> ShapeDesc {
    ShapeDesc::new(ShapeKind::Text, Point::new(-100., -100.), 0., 0.)
        .with_role(role)
        .with_value(value)
}

fn layer_cell(name: &str, function: &str) -> CellDesc {
    CellDesc::new(format!("layer-{name}")).with_shape(text(Role::Layer(LayerAttr::Function), function))
}

/// A metal patch inset by 2 in a 10x10 example, and drawn from
/// `second_left` to `second_right` in a 20x10 example.
fn stretched_node(name: &str, second_left: f64, second_right: f64) -> CellDesc {
    CellDesc::new(format!("node-{name}"))
        .with_shape(text(Role::Node(NodeAttr::Function), "contact"))
        .with_shape(highlight(0., 0., 10., 10.))
        .with_shape(patch("metal", 2., 2., 8., 8.))
        .with_shape(point_port(Point::new(5., 5.), PortAttrs::named("a")))
        .with_shape(highlight(20., 0., 40., 10.))
        .with_shape(patch("metal", second_left, 2., second_right, 8.))
        .with_shape(point_port(Point::new(30., 5.), PortAttrs::named("a")))
}

#[test]
fn converts_library_from_toml() {
    let conversion = convert(&library(), ConvertConfig::default());
    assert!(!conversion.has_error(), "{}", conversion.issues);
    let tech = &conversion.technology;

    assert_eq!(tech.name.as_deref(), Some("demo"));
    assert_eq!(tech.info.lambda, Some(200.));
    assert_eq!(tech.info.description.as_deref(), Some("A demonstration process"));

    let layers: Vec<&str> = tech.layers.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(layers, ["metal", "pseudo-metal", "poly"]);
    assert_eq!(tech.layers[0].graphics.color, Some([96, 96, 255]));

    let arc = tech.arc("metal").unwrap();
    assert_eq!(arc.max_width, 4.);
    assert_eq!(arc.width_offset, 0.);
    assert_eq!(arc.layers.len(), 1);

    // Pins are assembled before other nodes.
    let nodes: Vec<&str> = tech.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(nodes, ["metal-pin", "metal-node"]);
    let pin = tech.node("metal-pin").unwrap();
    assert_eq!(pin.function, NodeFunction::Pin);
    assert_eq!(pin.ports[0].connections, vec![arcstr::literal!("metal")]);
    assert_eq!(tech.node("metal-node").unwrap().special, SpecialShape::Polygonal);

    let warnings: Vec<WarningKind> = conversion
        .issues
        .iter()
        .filter_map(|i| i.as_warning())
        .map(|w| w.kind.clone())
        .collect();
    assert_eq!(
        warnings,
        vec![
            WarningKind::UnknownSequenceEntry {
                category: "layer",
                name: "bogus".into(),
            },
            WarningKind::LayerWithoutPureNode("poly".into()),
        ]
    );

    let rendered = tech.to_toml_string().unwrap();
    assert!(rendered.contains("metal-pin"));
}

#[test]
fn conversion_is_deterministic() {
    let lib = library();
    let a = convert(&lib, ConvertConfig::default());
    let b = convert(&lib, ConvertConfig::default());
    assert_eq!(a.technology, b.technology);
    assert_eq!(a.issues.len(), b.issues.len());
}

#[test]
fn failing_cell_does_not_stop_conversion() {
    let mut lib = library();
    lib.cells.push(
        CellDesc::new("node-broken")
            .with_shape(patch("metal", 0., 0., 4., 4.))
            .with_shape(point_port(Point::new(2., 2.), PortAttrs::named("x"))),
    );
    let conversion = convert(&lib, ConvertConfig::default());
    assert_eq!(conversion.issues.num_errors(), 1);
    assert!(conversion.issues.scope_has_error("node-broken"));
    let err = conversion.issues.errors().next().and_then(|i| i.as_error()).unwrap();
    assert_eq!(err.cause, Cause::Structural(StructuralError::NoHighlight));
    assert!(conversion.technology.node("broken").is_none());
    assert_eq!(conversion.technology.nodes.len(), 2);
}

#[test]
fn failed_misc_cell_sets_no_info() {
    let mut lib = library();
    let misc = lib.cells.iter_mut().find(|c| c.name == "technology").unwrap();
    misc.shapes[1].value = None;
    let conversion = convert(&lib, ConvertConfig::default());
    assert!(conversion.issues.scope_has_error("technology"));
    assert_eq!(conversion.technology.info.lambda, None);
    assert_eq!(conversion.technology.info.description, None);
}

#[test]
fn rules_reproduce_every_example() {
    for right in [38., 36.] {
        let cell = stretched_node("wire", 22., right);
        let inference = infer(&cell, &mut ConversionContext::default()).unwrap();
        let set = &inference.examples;
        for example in set.example_ids() {
            let bounds = set.example(example).bounds;
            for (id, sample) in set.samples_in(example) {
                if sample.tag.layer().is_none() {
                    continue;
                }
                let main = inference.associations.main_of(id).unwrap_or(id);
                let points = inference.points(main).unwrap().evaluate(bounds);
                assert_abs_diff_eq!(points[0].x, sample.bounds.left());
                assert_abs_diff_eq!(points[0].y, sample.bounds.bot());
                assert_abs_diff_eq!(points[1].x, sample.bounds.right());
                assert_abs_diff_eq!(points[1].y, sample.bounds.top());
            }
        }
    }
}

#[test]
fn stretch_rules_in_assembled_node() {
    let mut lib = LibraryDesc::default();
    lib.cells.push(layer_cell("metal", "metal-1"));
    lib.cells.push(stretched_node("wire", 22., 38.));
    lib.cells.push(stretched_node("ratio", 22., 36.));
    let conversion = convert(&lib, ConvertConfig::default());
    assert!(!conversion.has_error(), "{}", conversion.issues);

    let wire = conversion.technology.node("wire").unwrap();
    let rule = &wire.layers[0].rule;
    assert_eq!(rule.points[0].x, Anchor::ToLeftEdge(2.));
    assert_eq!(rule.points[1].x, Anchor::ToRightEdge(2.));
    assert_eq!(wire.layers[0].representation, Representation::Box);
    assert_eq!(wire.ports[0].rule.points[0].x, Anchor::FromCenter(0.));

    let ratio = conversion.technology.node("ratio").unwrap();
    assert_eq!(ratio.layers[0].rule.points[1].x, Anchor::RatioOfHalfExtent(0.3));
}

#[test]
fn unstretchable_sample_reports_cell_and_sample() {
    let mut lib = LibraryDesc::default();
    lib.cells.push(layer_cell("metal", "metal-1"));
    lib.cells.push(stretched_node("wire", 22., 32.));
    let conversion = convert(&lib, ConvertConfig::default());
    let err = conversion.issues.errors().next().and_then(|i| i.as_error()).unwrap();
    assert_eq!(err.cell, "node-wire");
    assert_eq!(err.sample.as_ref().map(|s| s.shape), Some(2));
    assert!(matches!(
        err.cause,
        Cause::RuleSynthesis(RuleSynthesisError::NoAnchor { axis: Dir::Horiz, .. })
    ));
    assert!(conversion.technology.nodes.is_empty());
}

#[test]
fn epsilon_absorbs_drawing_noise() {
    let mut lib = LibraryDesc::default();
    lib.cells.push(layer_cell("metal", "metal-1"));
    lib.cells.push(stretched_node("wire", 22.000_000_1, 38.));

    assert!(convert(&lib, ConvertConfig::default()).has_error());
    let conversion = convert(&lib, ConvertConfig::default().with_epsilon(1e-6));
    assert!(!conversion.has_error(), "{}", conversion.issues);
    let wire = conversion.technology.node("wire").unwrap();
    assert_eq!(wire.layers[0].rule.points[0].x, Anchor::ToLeftEdge(2.));
}

#[test]
fn contact_with_cut_array() {
    let mut cell = CellDesc::new("node-via")
        .with_shape(text(Role::Node(NodeAttr::Function), "contact"))
        .with_shape(highlight(0., 0., 4., 4.))
        .with_shape(patch("metal", 0., 0., 4., 4.))
        .with_shape(patch("cut", 1., 1., 3., 3.))
        .with_shape(point_port(Point::new(2., 2.), PortAttrs::named("via")))
        .with_shape(highlight(20., 0., 27., 4.))
        .with_shape(patch("metal", 20., 0., 27., 4.))
        .with_shape(patch("cut", 21., 1., 23., 3.))
        .with_shape(patch("cut", 24., 1., 26., 3.));
    cell.add_shape(point_port(Point::new(23.5, 2.), PortAttrs::named("via")));

    let mut lib = LibraryDesc::default();
    lib.cells.push(layer_cell("metal", "metal-1"));
    lib.cells.push(layer_cell("cut", "contact-1"));
    lib.cells.push(cell);
    let conversion = convert(&lib, ConvertConfig::default());
    assert!(!conversion.has_error(), "{}", conversion.issues);

    let via = conversion.technology.node("via").unwrap();
    assert_eq!(
        via.special,
        SpecialShape::Multicut {
            cut_width: 2.,
            cut_height: 2.,
            indent_x: 1.,
            indent_y: 1.,
            sep_x: 1.,
            sep_y: 1.,
        }
    );
    let layers: Vec<(&str, Representation)> = via
        .layers
        .iter()
        .map(|l| (l.layer.as_str(), l.representation))
        .collect();
    assert_eq!(
        layers,
        [("metal", Representation::Box), ("cut", Representation::Multicut)]
    );
    assert_eq!(via.size_offset, None);
    assert_eq!(via.ports[0].rule.points[0].x, Anchor::FromCenter(0.));
}

#[test]
fn serpentine_transistor() {
    let arc = |name: &str, function: &str, layer: &str| {
        CellDesc::new(format!("arc-{name}"))
            .with_shape(text(Role::Arc(ArcAttr::Function), function))
            .with_shape(patch(layer, 0., 0., 10., 2.))
            .with_shape(highlight(0., 0., 10., 2.))
    };
    let port = |l: f64, b: f64, r: f64, t: f64, name: &str, arc: &str| {
        boxed(
            ShapeKind::Box,
            l,
            b,
            r,
            t,
            Role::Port(PortAttrs::named(name).with_connections([arc])),
        )
    };
    let transistor = CellDesc::new("node-nmos")
        .with_shape(text(Role::Node(NodeAttr::Function), "nmos"))
        .with_shape(text(Role::Node(NodeAttr::Serpentine), "yes"))
        .with_shape(highlight(0., 0., 10., 10.))
        .with_shape(patch("diff", 3., 0., 7., 10.))
        .with_shape(patch("poly", 0., 4., 10., 6.))
        .with_shape(port(0., 4., 1., 6., "g-left", "poly"))
        .with_shape(port(9., 4., 10., 6., "g-right", "poly"))
        .with_shape(port(3., 0., 7., 1., "d-bot", "diff"))
        .with_shape(port(3., 9., 7., 10., "d-top", "diff"));

    let mut lib = LibraryDesc::default();
    lib.cells.push(layer_cell("diff", "diffusion"));
    lib.cells.push(layer_cell("poly", "poly"));
    lib.cells.push(arc("poly", "poly", "poly"));
    lib.cells.push(arc("diff", "diffusion", "diff"));
    lib.cells.push(transistor);
    let conversion = convert(&lib, ConvertConfig::default());
    assert!(!conversion.has_error(), "{}", conversion.issues);

    let nmos = conversion.technology.node("nmos").unwrap();
    let ports: Vec<&str> = nmos.ports.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(ports, ["g-left", "d-top", "g-right", "d-bot"]);
    let SpecialShape::Serpentine { values } = nmos.special else {
        panic!("expected a serpentine transistor, got {:?}", nmos.special);
    };
    assert_eq!(values[0], 3.);
    let poly = nmos.layers.iter().find(|l| l.layer == "poly").unwrap();
    let extent = poly.serpentine.unwrap();
    assert_abs_diff_eq!(extent.lwidth, 1.);
    assert_abs_diff_eq!(extent.rwidth, 1.);
    assert_abs_diff_eq!(extent.extend_top, 3.);
}
