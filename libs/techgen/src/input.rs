//! The hand-drawn library a technology is generated from.

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// A library of technology cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDesc {
    /// The name of the technology being described.
    #[serde(default)]
    pub name: Option<ArcStr>,
    /// Optional ordering of the generated primitives.
    #[serde(default)]
    pub sequence: Sequence,
    /// The cells of the library.
    #[serde(default, rename = "cell")]
    pub cells: Vec<CellDesc>,
}

/// Explicit primitive ordering, by payload name.
///
/// Primitives named here come first, in the listed order;
/// the remaining primitives follow in library order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub layers: Vec<ArcStr>,
    #[serde(default)]
    pub arcs: Vec<ArcStr>,
    #[serde(default)]
    pub nodes: Vec<ArcStr>,
}

/// The kind of primitive a cell describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CellCategory {
    Layer,
    Arc,
    Node,
    /// Technology-wide information.
    Misc,
}

impl CellCategory {
    const LAYER_PREFIX: &'static str = "layer-";
    const ARC_PREFIX: &'static str = "arc-";
    const NODE_PREFIX: &'static str = "node-";

    /// The category encoded in a cell name's prefix.
    pub fn from_cell_name(name: &str) -> Self {
        if name.starts_with(Self::LAYER_PREFIX) {
            Self::Layer
        } else if name.starts_with(Self::ARC_PREFIX) {
            Self::Arc
        } else if name.starts_with(Self::NODE_PREFIX) {
            Self::Node
        } else {
            Self::Misc
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Self::Layer => Self::LAYER_PREFIX,
            Self::Arc => Self::ARC_PREFIX,
            Self::Node => Self::NODE_PREFIX,
            Self::Misc => "",
        }
    }
}

impl std::fmt::Display for CellCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layer => write!(f, "layer"),
            Self::Arc => write!(f, "arc"),
            Self::Node => write!(f, "node"),
            Self::Misc => write!(f, "misc"),
        }
    }
}

/// A single cell of the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDesc {
    pub name: ArcStr,
    #[serde(default, rename = "shape")]
    pub shapes: Vec<ShapeDesc>,
}

impl CellDesc {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            shapes: Vec::new(),
        }
    }

    /// Adds a shape, returning its index within the cell.
    pub fn add_shape(&mut self, shape: ShapeDesc) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Builder-style variant of [`CellDesc::add_shape`].
    pub fn with_shape(mut self, shape: ShapeDesc) -> Self {
        self.add_shape(shape);
        self
    }

    #[inline]
    pub fn category(&self) -> CellCategory {
        CellCategory::from_cell_name(&self.name)
    }

    /// The name of the primitive this cell describes, without its category prefix.
    pub fn payload_name(&self) -> &str {
        &self.name[self.category().prefix().len()..]
    }
}

/// The drawing primitive used for a shape.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Box,
    FilledBox,
    CrossedBox,
    FilledPolygon,
    ClosedPolygon,
    OpenedPolygon,
    OpenedDottedPolygon,
    OpenedDashedPolygon,
    OpenedThickerPolygon,
    Circle,
    ThickCircle,
    FilledCircle,
    Text,
    Pin,
}

impl ShapeKind {
    /// Returns `true` if shapes of this kind are described by a vertex trace.
    pub fn is_polygon(&self) -> bool {
        matches!(
            self,
            Self::FilledPolygon
                | Self::ClosedPolygon
                | Self::OpenedPolygon
                | Self::OpenedDottedPolygon
                | Self::OpenedDashedPolygon
                | Self::OpenedThickerPolygon
        )
    }

    /// Returns `true` if shapes of this kind may be drawn as partial arcs.
    pub fn is_outlined_circle(&self) -> bool {
        matches!(self, Self::Circle | Self::ThickCircle)
    }

    pub fn is_circle(&self) -> bool {
        self.is_outlined_circle() || matches!(self, Self::FilledCircle)
    }
}

/// How a primitive layer is rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolyStyle {
    Filled,
    Closed,
    Crossed,
    Opened,
    OpenedDotted,
    OpenedDashed,
    OpenedThicker,
    Circle,
    ThickCircle,
    CircleArc,
    ThickCircleArc,
    Disc,
    TextCenter,
}

impl PolyStyle {
    /// Returns `true` if a two-point rule in this style describes a box.
    pub fn is_boxable(&self) -> bool {
        matches!(self, Self::Filled | Self::Closed | Self::Crossed)
    }
}

/// Start and extent of a partial circle, in degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcDegrees {
    pub start: f64,
    pub extent: f64,
}

/// A drawn shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDesc {
    pub kind: ShapeKind,
    #[serde(default)]
    pub center: Point,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Counter-clockwise rotation about the center, in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Whether the shape is mirrored about its horizontal axis before rotation.
    #[serde(default)]
    pub reflect: bool,
    /// Polygon vertices, as offsets from the center.
    #[serde(default)]
    pub trace: Vec<Point>,
    #[serde(default)]
    pub arc: Option<ArcDegrees>,
    #[serde(default)]
    pub role: Option<Role>,
    /// Free-text payload of attribute shapes, or the message of a text layer.
    #[serde(default)]
    pub value: Option<String>,
    /// Marks a box that must not shrink below its drawn size.
    #[serde(default)]
    pub min_size: bool,
}

impl ShapeDesc {
    pub fn new(kind: ShapeKind, center: Point, width: f64, height: f64) -> Self {
        Self {
            kind,
            center,
            width,
            height,
            rotation: 0.,
            reflect: false,
            trace: Vec::new(),
            arc: None,
            role: None,
            value: None,
            min_size: false,
        }
    }

    /// Creates an unrotated shape covering `rect`.
    pub fn from_rect(kind: ShapeKind, rect: Rect) -> Self {
        Self::new(kind, rect.center(), rect.width(), rect.height())
    }

    /// Creates a polygon from absolute vertex positions.
    ///
    /// The center becomes the middle of the vertices' bounding box.
    pub fn polygon(kind: ShapeKind, vertices: &[Point]) -> Self {
        let bounds = vertices.bbox().unwrap_or_default();
        let center = bounds.center();
        let mut shape = Self::new(kind, center, bounds.width(), bounds.height());
        shape.trace = vertices.iter().map(|v| *v - center).collect();
        shape
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_orientation(mut self, rotation: f64, reflect: bool) -> Self {
        self.rotation = rotation;
        self.reflect = reflect;
        self
    }

    pub fn with_arc(mut self, start: f64, extent: f64) -> Self {
        self.arc = Some(ArcDegrees { start, extent });
        self
    }

    pub fn with_min_size(mut self) -> Self {
        self.min_size = true;
        self
    }

    /// The transformation placing this shape's local geometry in the cell.
    pub fn transformation(&self) -> Transformation {
        Transformation::orient_about(self.center, self.rotation, self.reflect)
    }

    /// Absolute polygon vertices, after orientation.
    pub fn vertices(&self) -> Vec<Point> {
        let trans = self.transformation();
        self.trace
            .iter()
            .map(|offset| (self.center + *offset).transform(trans))
            .collect()
    }

    /// Returns `true` if this shape is a circle drawn as a partial arc.
    pub fn is_circle_arc(&self) -> bool {
        self.kind.is_outlined_circle()
            && self
                .arc
                .map(|a| a.start != 0. || a.extent != 0.)
                .unwrap_or(false)
    }

    /// The bounding box of the shape in cell coordinates.
    pub fn bounds(&self) -> Rect {
        if self.kind.is_polygon() && !self.trace.is_empty() {
            if let Some(bbox) = self.vertices().bbox() {
                return bbox;
            }
        }
        Rect::from_center_size(self.center, self.width, self.height).transform(self.transformation())
    }

    /// The rendering style of a layer drawn with this shape, if it has one.
    pub fn style(&self) -> Option<PolyStyle> {
        let style = match self.kind {
            ShapeKind::FilledBox | ShapeKind::FilledPolygon => PolyStyle::Filled,
            ShapeKind::Box | ShapeKind::ClosedPolygon => PolyStyle::Closed,
            ShapeKind::CrossedBox => PolyStyle::Crossed,
            ShapeKind::OpenedPolygon => PolyStyle::Opened,
            ShapeKind::OpenedDottedPolygon => PolyStyle::OpenedDotted,
            ShapeKind::OpenedDashedPolygon => PolyStyle::OpenedDashed,
            ShapeKind::OpenedThickerPolygon => PolyStyle::OpenedThicker,
            ShapeKind::FilledCircle => PolyStyle::Disc,
            ShapeKind::Circle if self.is_circle_arc() => PolyStyle::CircleArc,
            ShapeKind::Circle => PolyStyle::Circle,
            ShapeKind::ThickCircle if self.is_circle_arc() => PolyStyle::ThickCircleArc,
            ShapeKind::ThickCircle => PolyStyle::ThickCircle,
            ShapeKind::Text if self.value.is_some() => PolyStyle::TextCenter,
            ShapeKind::Text | ShapeKind::Pin => return None,
        };
        Some(style)
    }
}
