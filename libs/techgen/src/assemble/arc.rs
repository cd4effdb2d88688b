//! Arc primitives.

use tracing::Level;

use crate::cluster::cluster_examples;
use crate::error::{AssemblyError, ConvError, StructuralError};
use crate::input::{CellDesc, PolyStyle, ShapeKind};
use crate::model::Sample;
use crate::role::ArcAttr;
use crate::tech::{ArcLayer, ArcProto, Layer};

use super::attr::attrs;
use super::fail;

type Result<T> = std::result::Result<T, ConvError>;

fn apply_attrs(cell: &CellDesc, arc: &mut ArcProto) -> Result<()> {
    for shape in attrs::<ArcAttr>(cell) {
        match shape.attr {
            ArcAttr::Function => arc.function = shape.parse()?,
            ArcAttr::FixedAngle => arc.fixed_angle = shape.flag()?,
            ArcAttr::WipesPins => arc.wipes_pins = shape.flag()?,
            ArcAttr::NoExtend => arc.no_extend = shape.flag()?,
            ArcAttr::AngleIncrement => arc.angle_increment = shape.parse()?,
            ArcAttr::AntennaRatio => arc.antenna_ratio = Some(shape.parse()?),
        }
    }
    Ok(())
}

/// Builds an arc from its single example.
///
/// Layer widths are recorded as offsets from the widest sample; transparent
/// layers come first.
pub(crate) fn build_arc(cell: &CellDesc, layers: &[Layer]) -> Result<ArcProto> {
    let mut arc = ArcProto::new(cell.payload_name());
    apply_attrs(cell, &mut arc)?;

    let set = cluster_examples(cell)?;
    if !set.is_single() {
        let cause = StructuralError::MultipleArcExamples(set.len());
        return Err(fail(&cell.name, None, cause));
    }

    let samples: Vec<_> = set.samples_in(set.main_id()).map(|(_, s)| s).collect();
    let width = |s: &Sample| s.shape.width.abs().min(s.shape.height.abs());
    let max_width = samples.iter().map(|s| width(s)).fold(f64::MIN, f64::max);
    let highlight = set.sample(set.main().highlight);
    arc.max_width = max_width;
    arc.width_offset = max_width - width(highlight);

    let mut resolved = Vec::new();
    for sample in samples {
        let Some(name) = sample.tag.layer() else {
            continue;
        };
        let Some(layer) = layers.iter().find(|l| &l.name == name) else {
            let cause = AssemblyError::UnknownLayer(name.clone());
            return Err(fail(&cell.name, Some(sample), cause));
        };
        let style = if sample.shape.kind == ShapeKind::FilledBox {
            PolyStyle::Filled
        } else {
            PolyStyle::Closed
        };
        resolved.push((
            layer.is_transparent(),
            ArcLayer {
                layer: layer.name.clone(),
                width_offset: max_width - width(sample),
                style,
            },
        ));
    }
    // Stable, so drawing order is kept within each group.
    resolved.sort_by_key(|(transparent, _)| !transparent);
    arc.layers = resolved.into_iter().map(|(_, l)| l).collect();

    tracing::event!(
        Level::DEBUG,
        cell_name = %cell.name,
        layers = arc.layers.len(),
        width_offset = arc.width_offset,
        "built arc"
    );
    Ok(arc)
}
