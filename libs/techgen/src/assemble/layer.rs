//! Layer primitives, built from attribute shapes alone.

use crate::error::ConvError;
use crate::input::CellDesc;
use crate::role::LayerAttr;
use crate::tech::{Layer, LayerExtra, LayerFunction};

use super::attr::{attrs, parse_color, parse_fill_style, parse_pattern, parse_transparency};

type Result<T> = std::result::Result<T, ConvError>;

/// Parses `function[, modifier...]`.
fn parse_function(s: &str) -> std::result::Result<(LayerFunction, Vec<LayerExtra>), String> {
    let mut parts = s.split(',');
    let function = parts
        .next()
        .unwrap_or_default()
        .parse::<LayerFunction>()
        .map_err(|e| e.to_string())?;
    let mut extras = parts
        .map(|p| p.parse::<LayerExtra>().map_err(|e| e.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    extras.sort();
    extras.dedup();
    Ok((function, extras))
}

pub(crate) fn build_layer(cell: &CellDesc) -> Result<Layer> {
    let mut layer = Layer::new(cell.payload_name());
    for shape in attrs::<LayerAttr>(cell) {
        match shape.attr {
            LayerAttr::Function => {
                (layer.function, layer.extras) = shape.parse_with(parse_function)?;
            }
            LayerAttr::Letters => layer.letters = Some(shape.text()?.to_string()),
            LayerAttr::Color => layer.graphics.color = Some(shape.parse_with(parse_color)?),
            LayerAttr::Transparency => {
                layer.graphics.transparent_layer = shape.parse_with(parse_transparency)?;
            }
            LayerAttr::Style => layer.graphics.patterned = shape.parse_with(parse_fill_style)?,
            LayerAttr::Pattern => layer.graphics.pattern = Some(shape.parse_with(parse_pattern)?),
            LayerAttr::Cif => layer.cif = Some(shape.text()?.to_string()),
            LayerAttr::Dxf => layer.dxf = Some(shape.text()?.to_string()),
            LayerAttr::Gds => layer.gds = Some(shape.text()?.to_string()),
            LayerAttr::SpiceResistance => layer.spice.resistance = shape.parse()?,
            LayerAttr::SpiceCapacitance => layer.spice.capacitance = shape.parse()?,
            LayerAttr::SpiceEdgeCapacitance => layer.spice.edge_capacitance = shape.parse()?,
            LayerAttr::Height3d => layer.height_3d = shape.parse()?,
            LayerAttr::Thickness3d => layer.thickness_3d = shape.parse()?,
        }
    }
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AssemblyError, Cause};
    use crate::input::{ShapeDesc, ShapeKind};
    use crate::role::Role;
    use geometry::prelude::*;
    use test_log::test;

    fn attr(attr: LayerAttr, value: &str) -> ShapeDesc {
        ShapeDesc::new(ShapeKind::Text, Point::zero(), 1., 1.)
            .with_role(Role::Layer(attr))
            .with_value(value)
    }

    #[test]
    fn builds_every_attribute() {
        let cell = CellDesc::new("layer-ndiff")
            .with_shape(attr(LayerAttr::Function, "diffusion, n-type"))
            .with_shape(attr(LayerAttr::Letters, "n"))
            .with_shape(attr(LayerAttr::Color, "0,200,0"))
            .with_shape(attr(LayerAttr::Transparency, "layer-3"))
            .with_shape(attr(LayerAttr::Style, "solid"))
            .with_shape(attr(LayerAttr::Gds, "65"))
            .with_shape(attr(LayerAttr::SpiceCapacitance, "0.1"))
            .with_shape(attr(LayerAttr::Thickness3d, "2.5"));
        let layer = build_layer(&cell).unwrap();
        assert_eq!(layer.name, "ndiff");
        assert_eq!(layer.function, LayerFunction::Diffusion);
        assert_eq!(layer.extras, vec![LayerExtra::NType]);
        assert_eq!(layer.letters.as_deref(), Some("n"));
        assert_eq!(layer.graphics.color, Some([0, 200, 0]));
        assert!(layer.is_transparent());
        assert!(!layer.graphics.patterned);
        assert_eq!(layer.gds.as_deref(), Some("65"));
        assert_eq!(layer.spice.capacitance, 0.1);
        assert_eq!(layer.thickness_3d, 2.5);
        assert!(!layer.is_pseudo());
    }

    #[test]
    fn rejects_unknown_function() {
        let cell = CellDesc::new("layer-x").with_shape(attr(LayerAttr::Function, "metal-1, shiny"));
        let err = build_layer(&cell).unwrap_err();
        assert!(matches!(
            err.cause,
            Cause::Assembly(AssemblyError::InvalidAttribute { attr: "function", .. })
        ));
    }

    #[test]
    fn pseudo_metal() {
        let cell = CellDesc::new("layer-pseudo-metal")
            .with_shape(attr(LayerAttr::Function, "metal-1,pseudo"));
        let layer = build_layer(&cell).unwrap();
        assert_eq!(layer.function, LayerFunction::Metal(1));
        assert!(layer.is_pseudo());
    }
}
