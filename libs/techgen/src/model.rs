//! Samples, examples, and the associations between them.

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexMap;

use crate::error::SampleRef;
use crate::id::Id;
use crate::input::ShapeDesc;
use crate::role::{PortAttrs, Role};

pub type SampleId = Id<Sample>;
pub type ExampleId = Id<Example>;

/// What a sample stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleTag {
    /// Geometry on a named layer.
    Layer(ArcStr),
    Port,
    GrabPoint,
    Highlight,
}

impl SampleTag {
    /// The tag of a structural role; `None` for attribute roles.
    pub fn from_role(role: &Role) -> Option<Self> {
        Some(match role {
            Role::Patch(layer) => Self::Layer(layer.clone()),
            Role::Port(_) => Self::Port,
            Role::GrabPoint => Self::GrabPoint,
            Role::Highlight => Self::Highlight,
            Role::Layer(_) | Role::Arc(_) | Role::Node(_) | Role::Misc(_) => return None,
        })
    }

    /// A human-readable description, used in diagnostics.
    pub fn label(&self) -> ArcStr {
        match self {
            Self::Layer(name) => arcstr::format!("layer {name}"),
            Self::Port => arcstr::literal!("port"),
            Self::GrabPoint => arcstr::literal!("grab point"),
            Self::Highlight => arcstr::literal!("highlight"),
        }
    }

    pub fn layer(&self) -> Option<&ArcStr> {
        match self {
            Self::Layer(name) => Some(name),
            _ => None,
        }
    }
}

/// One tagged shape within an example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Index of the source shape within its cell.
    pub shape_index: usize,
    pub shape: ShapeDesc,
    pub example: ExampleId,
    pub tag: SampleTag,
    pub bounds: Rect,
    /// Port attributes; may be completed from secondary examples.
    pub port: Option<PortAttrs>,
}

impl Sample {
    pub(crate) fn new(shape_index: usize, shape: &ShapeDesc, tag: SampleTag) -> Self {
        let port = match &shape.role {
            Some(Role::Port(attrs)) => Some(attrs.clone()),
            _ => None,
        };
        Self {
            shape_index,
            bounds: shape.bounds(),
            shape: shape.clone(),
            example: ExampleId::new(0),
            tag,
            port,
        }
    }

    /// The anchor position of the drawn shape.
    #[inline]
    pub fn center(&self) -> Point {
        self.shape.center
    }

    /// The port name, if this sample is a named port.
    pub fn port_name(&self) -> Option<&ArcStr> {
        self.port.as_ref().and_then(|p| p.name.as_ref())
    }

    pub fn sample_ref(&self) -> SampleRef {
        SampleRef {
            shape: self.shape_index,
            label: self.tag.label(),
        }
    }
}

/// A cluster of samples drawn at one concrete size.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub bounds: Rect,
    pub samples: Vec<SampleId>,
    pub highlight: SampleId,
}

/// The examples of a cell, addressed by stable ids.
///
/// The main example always has the first id.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleSet {
    examples: Vec<Example>,
    samples: Vec<Sample>,
}

impl ExampleSet {
    /// Builds the arenas from clusters of samples; `main` selects the main cluster.
    ///
    /// Each cluster must hold its highlight at position `highlight`.
    pub(crate) fn from_clusters(clusters: Vec<(Rect, Vec<Sample>, usize)>, main: usize) -> Self {
        let mut order: Vec<usize> = (0..clusters.len()).collect();
        order.retain(|&i| i != main);
        order.insert(0, main);

        let mut clusters: Vec<Option<(Rect, Vec<Sample>, usize)>> =
            clusters.into_iter().map(Some).collect();
        let mut examples = Vec::with_capacity(clusters.len());
        let mut samples = Vec::new();
        for (ex_index, cluster_index) in order.into_iter().enumerate() {
            let Some((bounds, members, highlight)) = clusters[cluster_index].take() else {
                continue;
            };
            let example = ExampleId::new(ex_index);
            let first = samples.len();
            for mut sample in members {
                sample.example = example;
                samples.push(sample);
            }
            examples.push(Example {
                bounds,
                samples: (first..samples.len()).map(SampleId::new).collect(),
                highlight: SampleId::new(first + highlight),
            });
        }
        Self { examples, samples }
    }

    #[inline]
    pub fn main_id(&self) -> ExampleId {
        ExampleId::new(0)
    }

    #[inline]
    pub fn main(&self) -> &Example {
        self.example(self.main_id())
    }

    #[inline]
    pub fn is_main(&self, id: ExampleId) -> bool {
        id == self.main_id()
    }

    #[inline]
    pub fn example(&self, id: ExampleId) -> &Example {
        &self.examples[id.index()]
    }

    #[inline]
    pub fn sample(&self, id: SampleId) -> &Sample {
        &self.samples[id.index()]
    }

    #[inline]
    pub(crate) fn sample_mut(&mut self, id: SampleId) -> &mut Sample {
        &mut self.samples[id.index()]
    }

    /// The number of examples.
    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Returns `true` if the cell holds exactly one example.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.examples.len() == 1
    }

    pub fn example_ids(&self) -> impl Iterator<Item = ExampleId> {
        (0..self.examples.len()).map(ExampleId::new)
    }

    /// Every example other than the main one.
    pub fn secondary_ids(&self) -> impl Iterator<Item = ExampleId> {
        (1..self.examples.len()).map(ExampleId::new)
    }

    pub fn samples_in(&self, id: ExampleId) -> impl Iterator<Item = (SampleId, &Sample)> + '_ {
        self.example(id)
            .samples
            .iter()
            .map(move |&s| (s, self.sample(s)))
    }

    /// The main example's samples that match `pred`.
    pub fn main_samples_where<'a>(
        &'a self,
        mut pred: impl FnMut(&Sample) -> bool + 'a,
    ) -> impl Iterator<Item = (SampleId, &'a Sample)> + 'a {
        self.samples_in(self.main_id()).filter(move |(_, s)| pred(s))
    }
}

/// Maps every secondary-example sample to its main-example counterpart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Associations {
    to_main: IndexMap<SampleId, SampleId>,
}

impl Associations {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, secondary: SampleId, main: SampleId) {
        self.to_main.insert(secondary, main);
    }

    /// The main-example sample that `secondary` was matched to.
    #[inline]
    pub fn main_of(&self, secondary: SampleId) -> Option<SampleId> {
        self.to_main.get(&secondary).copied()
    }

    pub fn len(&self) -> usize {
        self.to_main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_main.is_empty()
    }

    /// The samples of `example` associated with main sample `main`, in example order.
    pub fn counterparts(
        &self,
        set: &ExampleSet,
        main: SampleId,
        example: ExampleId,
    ) -> Vec<SampleId> {
        set.example(example)
            .samples
            .iter()
            .copied()
            .filter(|s| self.main_of(*s) == Some(main))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SampleId, SampleId)> + '_ {
        self.to_main.iter().map(|(a, b)| (*a, *b))
    }
}
