use std::hash::Hash;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A stable index into one of the arenas owned by an [`ExampleSet`](crate::model::ExampleSet).
#[derive(Serialize, Deserialize)]
pub struct Id<T>(usize, PhantomData<T>);

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl<T> Id<T> {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index, PhantomData)
    }

    /// The position of the referenced record within its arena.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}
