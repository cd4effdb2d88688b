//! Axis-aligned directions: horizontal or vertical.

use std::fmt::Display;

use array_map::{ArrayMap, Indexable};
use serde::{Deserialize, Serialize};

/// An enumeration of axis-aligned directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Dir {
    /// The horizontal, or x-aligned, direction.
    Horiz,
    /// The vertical, or y-aligned, direction.
    Vert,
}

impl Dir {
    /// Both directions, horizontal first.
    pub const ALL: [Dir; 2] = [Dir::Horiz, Dir::Vert];

    /// Returns the other direction.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Dir::Vert.other(), Dir::Horiz);
    /// assert_eq!(Dir::Horiz.other(), Dir::Vert);
    /// ```
    pub const fn other(&self) -> Self {
        match *self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }

    /// The single-letter axis name, `X` or `Y`.
    pub const fn axis_name(&self) -> &'static str {
        match *self {
            Self::Horiz => "X",
            Self::Vert => "Y",
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl std::ops::Not for Dir {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// An association of a value with type `T` to each of the two [`Dir`]s.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Dirs<T> {
    inner: ArrayMap<Dir, T, 2>,
}

impl<T> Dirs<T>
where
    T: Copy,
{
    /// Creates a new [`Dirs`] with `value` associated with both directions.
    pub const fn uniform(value: T) -> Self {
        Self {
            inner: ArrayMap::new([value; 2]),
        }
    }
}

impl<T> Dirs<T> {
    /// Creates a new [`Dirs`] with the provided values for each direction.
    pub const fn new(horiz: T, vert: T) -> Self {
        // Array order must match the variant order of [`Dir`].
        Self {
            inner: ArrayMap::new([horiz, vert]),
        }
    }

    /// Builds a [`Dirs`] by evaluating `f` once per direction.
    pub fn from_fn(mut f: impl FnMut(Dir) -> T) -> Self {
        let horiz = f(Dir::Horiz);
        let vert = f(Dir::Vert);
        Self::new(horiz, vert)
    }

    /// Maps a function over both directions, returning a new [`Dirs`].
    pub fn map<B>(self, f: impl FnMut(&Dir, T) -> B) -> Dirs<B> {
        Dirs {
            inner: self.inner.map(f),
        }
    }
}

impl<T> std::ops::Index<Dir> for Dirs<T> {
    type Output = T;
    fn index(&self, index: Dir) -> &Self::Output {
        self.inner.index(index)
    }
}

impl<T> std::ops::IndexMut<Dir> for Dirs<T> {
    fn index_mut(&mut self, index: Dir) -> &mut Self::Output {
        self.inner.index_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_from_fn_indexes_by_direction() {
        let dirs = Dirs::from_fn(|dir| dir.axis_name());
        assert_eq!(dirs[Dir::Horiz], "X");
        assert_eq!(dirs[Dir::Vert], "Y");
        assert_eq!(!Dir::Horiz, Dir::Vert);
    }
}
