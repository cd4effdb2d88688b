//! The size-independent technology produced by a conversion.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use geometry::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anchor::Rule;
use crate::input::PolyStyle;

/// A technology attribute that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Splits a numbered name such as `metal-2` or `metal2` into its stem and number.
fn numbered(s: &str) -> Option<(&str, u8)> {
    let stem = s.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &s[stem.len()..];
    if digits.is_empty() {
        return None;
    }
    Some((stem.trim_end_matches('-'), digits.parse().ok()?))
}

/// The primary purpose of a layer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerFunction {
    #[default]
    Unknown,
    Metal(u8),
    Poly(u8),
    Gate,
    Diffusion,
    Implant,
    Contact(u8),
    Plug,
    Overglass,
    Resistor,
    Capacitor,
    Transistor,
    Emitter,
    Base,
    Collector,
    Substrate,
    Well,
    Guard,
    Isolation,
    Bus,
    Art,
    Control,
    TileNot,
}

impl LayerFunction {
    /// Returns `true` for polysilicon and transistor gate layers.
    pub fn is_poly(&self) -> bool {
        matches!(self, Self::Poly(_) | Self::Gate)
    }

    pub fn is_diffusion(&self) -> bool {
        matches!(self, Self::Diffusion)
    }
}

impl FromStr for LayerFunction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some((stem, n)) = numbered(&lower) {
            return match stem {
                "metal" => Ok(Self::Metal(n)),
                "poly" => Ok(Self::Poly(n)),
                "contact" => Ok(Self::Contact(n)),
                _ => Err(ParseError::new("layer function", s)),
            };
        }
        Ok(match lower.as_str() {
            "unknown" => Self::Unknown,
            "metal" => Self::Metal(1),
            "poly" | "polysilicon" => Self::Poly(1),
            "gate" => Self::Gate,
            "diff" | "diffusion" => Self::Diffusion,
            "implant" => Self::Implant,
            "contact" | "cut" => Self::Contact(1),
            "plug" => Self::Plug,
            "overglass" => Self::Overglass,
            "resistor" => Self::Resistor,
            "capacitor" | "cap" => Self::Capacitor,
            "transistor" => Self::Transistor,
            "emitter" => Self::Emitter,
            "base" => Self::Base,
            "collector" => Self::Collector,
            "substrate" => Self::Substrate,
            "well" => Self::Well,
            "guard" => Self::Guard,
            "isolation" => Self::Isolation,
            "bus" => Self::Bus,
            "art" => Self::Art,
            "control" => Self::Control,
            "tile-not" | "tilenot" => Self::TileNot,
            _ => return Err(ParseError::new("layer function", s)),
        })
    }
}

/// A modifier of a [`LayerFunction`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerExtra {
    PType,
    NType,
    Depletion,
    Enhancement,
    Light,
    Heavy,
    /// Exists only to draw pins; never manufactured.
    Pseudo,
    Nonelectrical,
    ConnectsMetal,
    ConnectsPoly,
    ConnectsDiffusion,
    InsideTransistor,
    Thick,
    Native,
}

impl LayerExtra {
    /// Returns `true` for the doping-type modifiers.
    pub fn is_doping(&self) -> bool {
        matches!(self, Self::PType | Self::NType)
    }
}

impl FromStr for LayerExtra {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "p-type" | "ptype" => Self::PType,
            "n-type" | "ntype" => Self::NType,
            "depletion" => Self::Depletion,
            "enhancement" => Self::Enhancement,
            "light" => Self::Light,
            "heavy" => Self::Heavy,
            "pseudo" => Self::Pseudo,
            "nonelectrical" => Self::Nonelectrical,
            "connects-metal" => Self::ConnectsMetal,
            "connects-poly" => Self::ConnectsPoly,
            "connects-diffusion" => Self::ConnectsDiffusion,
            "inside-transistor" => Self::InsideTransistor,
            "thick" => Self::Thick,
            "native" => Self::Native,
            _ => return Err(ParseError::new("layer modifier", s)),
        })
    }
}

/// How a layer is drawn on screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graphics {
    /// Red, green, and blue components.
    pub color: Option<[u8; 3]>,
    /// The transparent color plane, if the layer is drawn transparently.
    pub transparent_layer: Option<u8>,
    /// Whether `pattern` is used when filling; solid otherwise.
    pub patterned: bool,
    /// 16 rows of 16 bits, most significant bit leftmost.
    pub pattern: Option<[u16; 16]>,
}

/// Electrical parameters used for SPICE extraction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpiceParams {
    pub resistance: f64,
    pub capacitance: f64,
    pub edge_capacitance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: ArcStr,
    pub function: LayerFunction,
    pub extras: Vec<LayerExtra>,
    pub letters: Option<String>,
    pub graphics: Graphics,
    pub cif: Option<String>,
    pub dxf: Option<String>,
    pub gds: Option<String>,
    pub spice: SpiceParams,
    pub height_3d: f64,
    pub thickness_3d: f64,
}

impl Layer {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            function: LayerFunction::Unknown,
            extras: Vec::new(),
            letters: None,
            graphics: Graphics::default(),
            cif: None,
            dxf: None,
            gds: None,
            spice: SpiceParams::default(),
            height_3d: 0.,
            thickness_3d: 0.,
        }
    }

    #[inline]
    pub fn has_extra(&self, extra: LayerExtra) -> bool {
        self.extras.contains(&extra)
    }

    #[inline]
    pub fn is_pseudo(&self) -> bool {
        self.has_extra(LayerExtra::Pseudo)
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.graphics.transparent_layer.is_some()
    }
}

/// The purpose of an arc.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArcFunction {
    #[default]
    Unknown,
    Metal(u8),
    Poly(u8),
    Diffusion,
    PDiffusion,
    NDiffusion,
    SubstrateDiffusion,
    WellDiffusion,
    Bus,
    Unrouted,
    Nonelectrical,
}

impl ArcFunction {
    pub fn is_poly(&self) -> bool {
        matches!(self, Self::Poly(_))
    }

    pub fn is_diffusion(&self) -> bool {
        matches!(
            self,
            Self::Diffusion
                | Self::PDiffusion
                | Self::NDiffusion
                | Self::SubstrateDiffusion
                | Self::WellDiffusion
        )
    }
}

impl FromStr for ArcFunction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some((stem, n)) = numbered(&lower) {
            return match stem {
                "metal" => Ok(Self::Metal(n)),
                "poly" => Ok(Self::Poly(n)),
                _ => Err(ParseError::new("arc function", s)),
            };
        }
        Ok(match lower.as_str() {
            "unknown" => Self::Unknown,
            "metal" => Self::Metal(1),
            "poly" | "polysilicon" => Self::Poly(1),
            "diff" | "diffusion" => Self::Diffusion,
            "p-diffusion" => Self::PDiffusion,
            "n-diffusion" => Self::NDiffusion,
            "substrate-diffusion" => Self::SubstrateDiffusion,
            "well-diffusion" => Self::WellDiffusion,
            "bus" => Self::Bus,
            "unrouted" => Self::Unrouted,
            "nonelectrical" => Self::Nonelectrical,
            _ => return Err(ParseError::new("arc function", s)),
        })
    }
}

/// One layer of an arc, narrower than the widest layer by `width_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcLayer {
    pub layer: ArcStr,
    pub width_offset: f64,
    pub style: PolyStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcProto {
    pub name: ArcStr,
    pub function: ArcFunction,
    pub fixed_angle: bool,
    pub wipes_pins: bool,
    pub no_extend: bool,
    /// Angle increment in degrees; zero allows any angle.
    pub angle_increment: i32,
    pub antenna_ratio: Option<f64>,
    /// Difference between the widest layer and the highlight.
    pub width_offset: f64,
    pub max_width: f64,
    pub layers: Vec<ArcLayer>,
}

impl ArcProto {
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            function: ArcFunction::Unknown,
            fixed_angle: true,
            wipes_pins: false,
            no_extend: false,
            angle_increment: 90,
            antenna_ratio: None,
            width_offset: 0.,
            max_width: 0.,
            layers: Vec::new(),
        }
    }
}

/// The purpose of a node.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeFunction {
    #[default]
    Unknown,
    Pin,
    Contact,
    /// A pure-layer node.
    Node,
    Connect,
    Nmos,
    Dmos,
    Pmos,
    Npn,
    Pnp,
    Njfet,
    Pjfet,
    Dmes,
    Emes,
    Resistor,
    Capacitor,
    Diode,
    Substrate,
    Well,
    Art,
}

impl NodeFunction {
    /// Returns `true` for the field-effect transistors with two gate and two
    /// gated-terminal ports.
    pub fn is_fet(&self) -> bool {
        matches!(
            self,
            Self::Nmos | Self::Dmos | Self::Pmos | Self::Dmes | Self::Emes
        )
    }
}

impl FromStr for NodeFunction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "unknown" => Self::Unknown,
            "pin" => Self::Pin,
            "contact" => Self::Contact,
            "node" | "pure-layer" => Self::Node,
            "connect" => Self::Connect,
            "nmos" => Self::Nmos,
            "dmos" => Self::Dmos,
            "pmos" => Self::Pmos,
            "npn" => Self::Npn,
            "pnp" => Self::Pnp,
            "njfet" => Self::Njfet,
            "pjfet" => Self::Pjfet,
            "dmes" => Self::Dmes,
            "emes" => Self::Emes,
            "resistor" => Self::Resistor,
            "capacitor" => Self::Capacitor,
            "diode" => Self::Diode,
            "substrate" => Self::Substrate,
            "well" => Self::Well,
            "art" => Self::Art,
            _ => return Err(ParseError::new("node function", s)),
        })
    }
}

impl Display for NodeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// How the points of a node layer's rule are interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Representation {
    /// Two opposite corners.
    Box,
    /// Two opposite corners, followed by the corners of the smallest allowed box.
    MinBox,
    /// An outline or trace through every point.
    Points,
    /// The region an array of cuts is placed in.
    Multicut,
}

/// Distances describing a layer of a serpentine transistor relative to its
/// centerline.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerpentineExtent {
    pub lwidth: f64,
    pub rwidth: f64,
    pub extend_top: f64,
    pub extend_bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayer {
    pub layer: ArcStr,
    pub style: PolyStyle,
    pub representation: Representation,
    pub rule: Rule,
    /// Text drawn by a text layer.
    pub message: Option<String>,
    pub serpentine: Option<SerpentineExtent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePort {
    pub name: ArcStr,
    /// Direction the port faces, in degrees.
    pub angle: i32,
    pub range: i32,
    /// Names of the arcs that may connect.
    pub connections: Vec<ArcStr>,
    /// Ports sharing a topology index are connected inside the node.
    pub topology: usize,
    pub rule: Rule,
}

/// Geometry a node generates beyond its plain layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpecialShape {
    #[default]
    None,
    /// An outline that may be reshaped freely.
    Polygonal,
    Multicut {
        cut_width: f64,
        cut_height: f64,
        indent_x: f64,
        indent_y: f64,
        sep_x: f64,
        sep_y: f64,
    },
    Serpentine {
        values: [f64; 6],
    },
}

/// Distances from each node edge to its highlight.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeOffset {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeProto {
    pub name: ArcStr,
    pub function: NodeFunction,
    pub width: f64,
    pub height: f64,
    pub size_offset: Option<SizeOffset>,
    pub layers: Vec<NodeLayer>,
    pub ports: Vec<NodePort>,
    pub special: SpecialShape,
    pub square: bool,
    pub wipes: bool,
    pub lockable: bool,
    pub multicut_separation: Option<f64>,
    /// Offset of the grab point from the node center.
    pub grab_offset: Option<Point>,
}

impl NodeProto {
    pub fn port(&self, name: &str) -> Option<&NodePort> {
        self.ports.iter().find(|p| p.name == name)
    }
}

/// Technology-wide values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechInfo {
    /// Size of one grid unit, in nanometers.
    pub lambda: Option<f64>,
    pub description: Option<String>,
}

impl TechInfo {
    /// Overwrites the values that `other` sets.
    pub fn merge(&mut self, other: TechInfo) {
        if other.lambda.is_some() {
            self.lambda = other.lambda;
        }
        if other.description.is_some() {
            self.description = other.description;
        }
    }
}

/// Every primitive of a technology, in output order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: Option<ArcStr>,
    pub info: TechInfo,
    pub layers: Vec<Layer>,
    pub arcs: Vec<ArcProto>,
    pub nodes: Vec<NodeProto>,
}

impl Technology {
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn arc(&self, name: &str) -> Option<&ArcProto> {
        self.arcs.iter().find(|a| a.name == name)
    }

    pub fn node(&self, name: &str) -> Option<&NodeProto> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Renders the technology as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn parses_numbered_functions() {
        assert_eq!("metal-2".parse(), Ok(LayerFunction::Metal(2)));
        assert_eq!("Metal3".parse(), Ok(LayerFunction::Metal(3)));
        assert_eq!("poly".parse(), Ok(LayerFunction::Poly(1)));
        assert_eq!("diffusion".parse(), Ok(LayerFunction::Diffusion));
        assert_eq!("poly-2".parse(), Ok(ArcFunction::Poly(2)));
        assert!("gate-4".parse::<LayerFunction>().is_err());
        let err = "plasma".parse::<ArcFunction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown arc function `plasma`");
    }

    #[test]
    fn function_classes() {
        assert!(LayerFunction::Gate.is_poly());
        assert!(ArcFunction::PDiffusion.is_diffusion());
        assert!(!ArcFunction::Metal(1).is_diffusion());
        assert!("pmos".parse::<NodeFunction>().unwrap().is_fet());
        assert!(!NodeFunction::Npn.is_fet());
        assert_eq!("pseudo".parse(), Ok(LayerExtra::Pseudo));
        assert!(LayerExtra::NType.is_doping());
    }
}
