//! Attribute shapes and the text formats of their values.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;

use crate::error::{AssemblyError, ConvError, SampleRef};
use crate::input::CellDesc;
use crate::role::{ArcAttr, LayerAttr, MiscAttr, NodeAttr, Role};

type Result<T> = std::result::Result<T, ConvError>;

/// An attribute role of a particular primitive category.
pub(crate) trait AttrKind: Copy + Display {
    fn from_role(role: &Role) -> Option<Self>;
    fn name(&self) -> &'static str;
}

macro_rules! attr_kind {
    ($ty:ty, $variant:ident) => {
        impl AttrKind for $ty {
            fn from_role(role: &Role) -> Option<Self> {
                match role {
                    Role::$variant(attr) => Some(*attr),
                    _ => None,
                }
            }

            fn name(&self) -> &'static str {
                <$ty>::name(self)
            }
        }
    };
}

attr_kind!(LayerAttr, Layer);
attr_kind!(ArcAttr, Arc);
attr_kind!(NodeAttr, Node);
attr_kind!(MiscAttr, Misc);

/// One attribute shape of a cell.
pub(crate) struct AttrShape<'a, A> {
    pub attr: A,
    index: usize,
    value: Option<&'a str>,
    cell: &'a ArcStr,
}

/// The attribute shapes of kind `A` in `cell`, in drawing order.
pub(crate) fn attrs<A: AttrKind>(cell: &CellDesc) -> impl Iterator<Item = AttrShape<'_, A>> {
    cell.shapes.iter().enumerate().filter_map(|(index, shape)| {
        let attr = A::from_role(shape.role.as_ref()?)?;
        Some(AttrShape {
            attr,
            index,
            value: shape.value.as_deref(),
            cell: &cell.name,
        })
    })
}

impl<'a, A: AttrKind> AttrShape<'a, A> {
    fn fail(&self, cause: AssemblyError) -> ConvError {
        tracing::event!(
            tracing::Level::ERROR,
            cell_name = %self.cell,
            shape = self.index,
            "{}",
            cause
        );
        ConvError::new(self.cell.clone(), cause).at(SampleRef {
            shape: self.index,
            label: arcstr::format!("{} attribute", self.attr.name()),
        })
    }

    fn invalid(&self, value: &str, reason: impl Display) -> ConvError {
        self.fail(AssemblyError::InvalidAttribute {
            attr: self.attr.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
    }

    /// The trimmed text of the attribute.
    pub fn text(&self) -> Result<&'a str> {
        self.value
            .map(str::trim)
            .ok_or_else(|| self.fail(AssemblyError::MissingValue(self.attr.name())))
    }

    pub fn parse<T>(&self) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let text = self.text()?;
        text.parse().map_err(|e| self.invalid(text, e))
    }

    /// Applies a custom text format.
    pub fn parse_with<T>(&self, f: impl FnOnce(&str) -> std::result::Result<T, String>) -> Result<T> {
        let text = self.text()?;
        f(text).map_err(|e| self.invalid(text, e))
    }

    /// A yes/no flag; an attribute shape without text means yes.
    pub fn flag(&self) -> Result<bool> {
        match self.value {
            None => Ok(true),
            Some(_) => self.parse_with(parse_bool),
        }
    }
}

pub(crate) fn parse_bool(s: &str) -> std::result::Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" => Ok(true),
        "no" | "false" | "off" => Ok(false),
        _ => Err("expected yes or no".to_string()),
    }
}

/// Parses `r,g,b` with components in `0..=255`.
pub(crate) fn parse_color(s: &str) -> std::result::Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return Err("expected three comma-separated components".to_string());
    };
    let component = |c: &str| c.parse::<u8>().map_err(|e| format!("component `{c}`: {e}"));
    Ok([component(r)?, component(g)?, component(b)?])
}

/// Parses `none` or `layer-N`.
pub(crate) fn parse_transparency(s: &str) -> std::result::Result<Option<u8>, String> {
    let lower = s.to_ascii_lowercase();
    if lower == "none" {
        return Ok(None);
    }
    lower
        .strip_prefix("layer-")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|&n| n > 0)
        .map(Some)
        .ok_or_else(|| "expected `none` or `layer-N`".to_string())
}

/// Parses `solid` or `patterned`, returning whether the layer is patterned.
pub(crate) fn parse_fill_style(s: &str) -> std::result::Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "solid" => Ok(false),
        "patterned" => Ok(true),
        _ => Err("expected `solid` or `patterned`".to_string()),
    }
}

/// Parses 16 whitespace-separated rows of 16 cells each.
///
/// `X`, `x`, and `1` set a bit; `.` and `0` clear it.
pub(crate) fn parse_pattern(s: &str) -> std::result::Result<[u16; 16], String> {
    let rows: Vec<&str> = s.split_whitespace().collect();
    if rows.len() != 16 {
        return Err(format!("expected 16 rows, found {}", rows.len()));
    }
    let mut pattern = [0u16; 16];
    for (bits, row) in pattern.iter_mut().zip(rows) {
        if row.chars().count() != 16 {
            return Err(format!("row `{row}` is not 16 cells wide"));
        }
        for c in row.chars() {
            *bits <<= 1;
            match c {
                'X' | 'x' | '1' => *bits |= 1,
                '.' | '0' => (),
                _ => return Err(format!("unexpected pattern cell `{c}`")),
            }
        }
    }
    Ok(pattern)
}
