//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::dir::{Dir, Dirs};
pub use crate::point::Point;
pub use crate::rect::Rect;
pub use crate::span::Span;
pub use crate::transform::{
    Rotation, Transform, TransformMut, Transformation, Translate, TranslateMut,
};
