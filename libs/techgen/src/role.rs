//! The closed set of roles a drawn shape can play.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// What a shape in a technology cell means.
///
/// Attribute roles carry their payload in [`ShapeDesc::value`](crate::input::ShapeDesc::value);
/// structural roles make the shape part of an example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Layer(LayerAttr),
    Arc(ArcAttr),
    Node(NodeAttr),
    Misc(MiscAttr),
    /// A piece of geometry on the named layer.
    Patch(ArcStr),
    Port(PortAttrs),
    /// The point a node is grabbed by when placed.
    GrabPoint,
    /// The outline a node or arc reports as its extent.
    Highlight,
}

/// The partition of [`Role`]s.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RoleCategory {
    LayerAttr,
    ArcAttr,
    NodeAttr,
    MiscAttr,
    Structural,
}

impl Role {
    pub fn category(&self) -> RoleCategory {
        match self {
            Self::Layer(_) => RoleCategory::LayerAttr,
            Self::Arc(_) => RoleCategory::ArcAttr,
            Self::Node(_) => RoleCategory::NodeAttr,
            Self::Misc(_) => RoleCategory::MiscAttr,
            Self::Patch(_) | Self::Port(_) | Self::GrabPoint | Self::Highlight => {
                RoleCategory::Structural
            }
        }
    }

    #[inline]
    pub fn is_structural(&self) -> bool {
        self.category() == RoleCategory::Structural
    }

    /// Shorthand for a patch on `layer`.
    pub fn patch(layer: impl Into<ArcStr>) -> Self {
        Self::Patch(layer.into())
    }

    /// Shorthand for a named port with no further attributes.
    pub fn port(name: impl Into<ArcStr>) -> Self {
        Self::Port(PortAttrs::named(name))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerAttr {
    Function,
    Letters,
    Color,
    Transparency,
    Style,
    Pattern,
    Cif,
    Dxf,
    Gds,
    SpiceResistance,
    SpiceCapacitance,
    SpiceEdgeCapacitance,
    #[serde(rename = "height-3d")]
    Height3d,
    #[serde(rename = "thickness-3d")]
    Thickness3d,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArcAttr {
    Function,
    FixedAngle,
    WipesPins,
    NoExtend,
    AngleIncrement,
    AntennaRatio,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeAttr {
    Function,
    Serpentine,
    Square,
    Wipes,
    Lockable,
    MulticutSeparation,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MiscAttr {
    Lambda,
    Description,
}

macro_rules! attr_names {
    ($ty:ty { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $ty {
            /// The name of this attribute as written in libraries.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),*
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

attr_names!(LayerAttr {
    Function => "function",
    Letters => "letters",
    Color => "color",
    Transparency => "transparency",
    Style => "style",
    Pattern => "pattern",
    Cif => "cif",
    Dxf => "dxf",
    Gds => "gds",
    SpiceResistance => "spice-resistance",
    SpiceCapacitance => "spice-capacitance",
    SpiceEdgeCapacitance => "spice-edge-capacitance",
    Height3d => "height-3d",
    Thickness3d => "thickness-3d",
});

attr_names!(ArcAttr {
    Function => "function",
    FixedAngle => "fixed-angle",
    WipesPins => "wipes-pins",
    NoExtend => "no-extend",
    AngleIncrement => "angle-increment",
    AntennaRatio => "antenna-ratio",
});

attr_names!(NodeAttr {
    Function => "function",
    Serpentine => "serpentine",
    Square => "square",
    Wipes => "wipes",
    Lockable => "lockable",
    MulticutSeparation => "multicut-separation",
});

attr_names!(MiscAttr {
    Lambda => "lambda",
    Description => "description",
});

/// Attributes of a port marker.
///
/// Fields left unset on the main example may be supplied by a secondary example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortAttrs {
    #[serde(default)]
    pub name: Option<ArcStr>,
    /// Direction the port faces, in degrees.
    #[serde(default)]
    pub angle: Option<i32>,
    /// Allowed deviation from `angle`, in degrees.
    #[serde(default)]
    pub range: Option<i32>,
    /// Names of the arcs that may connect to this port.
    #[serde(default)]
    pub connections: Option<Vec<ArcStr>>,
    /// Ports drawn on the same net are electrically connected inside the node.
    #[serde(default)]
    pub net: Option<ArcStr>,
}

impl PortAttrs {
    pub fn named(name: impl Into<ArcStr>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_angle(mut self, angle: i32) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_connections<S: Into<ArcStr>>(mut self, arcs: impl IntoIterator<Item = S>) -> Self {
        self.connections = Some(arcs.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_net(mut self, net: impl Into<ArcStr>) -> Self {
        self.net = Some(net.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[derive(Deserialize)]
    struct Holder {
        role: Role,
    }

    fn parse(s: &str) -> Role {
        toml::from_str::<Holder>(s).unwrap().role
    }

    #[test]
    fn roles_parse_from_toml() {
        assert_eq!(parse(r#"role = "highlight""#), Role::Highlight);
        assert_eq!(parse(r#"role = "grab-point""#), Role::GrabPoint);
        assert_eq!(parse(r#"role = { patch = "poly" }"#), Role::patch("poly"));
        assert_eq!(
            parse(r#"role = { layer = "height-3d" }"#),
            Role::Layer(LayerAttr::Height3d)
        );
        assert_eq!(
            parse(r#"role = { port = { name = "a", angle = 90, connections = ["metal-1"] } }"#),
            Role::Port(
                PortAttrs::named("a")
                    .with_angle(90)
                    .with_connections(["metal-1"])
            )
        );
    }

    #[test]
    fn categories_partition_roles() {
        assert_eq!(Role::Node(NodeAttr::Square).category(), RoleCategory::NodeAttr);
        assert_eq!(Role::Misc(MiscAttr::Lambda).category(), RoleCategory::MiscAttr);
        assert!(Role::Highlight.is_structural());
        assert!(Role::port("a").is_structural());
        assert!(!Role::Arc(ArcAttr::NoExtend).is_structural());
        assert_eq!(LayerAttr::SpiceEdgeCapacitance.name(), "spice-edge-capacitance");
    }
}
