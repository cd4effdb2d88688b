//! Conversion errors and warnings.

use std::fmt::Display;

use arcstr::ArcStr;
use diagnostics::{Diagnostic, Severity};
use geometry::dir::Dir;
use thiserror::Error;

use crate::input::ShapeKind;

/// The shape an error points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRef {
    /// Index of the shape within its cell.
    pub shape: usize,
    /// What the sample represents, e.g. `layer poly` or `port`.
    pub label: ArcStr,
}

impl Display for SampleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shape #{} ({})", self.shape, self.label)
    }
}

/// A malformed set of examples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("no examples found")]
    NoExamples,
    #[error("example has no highlight layer")]
    NoHighlight,
    #[error("example has {0} highlight layers")]
    MultipleHighlights(usize),
    #[error("examples are too close")]
    TooClose,
    #[error("{0} may only appear in node cells")]
    NodeOnlyRole(&'static str),
    #[error("can only be one example of an arc, but {0} were found")]
    MultipleArcExamples(usize),
}

/// A failure to match secondary samples to the main example.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssociationError {
    #[error("grab point should only be in main example")]
    GrabPointInSecondary,
    #[error("{0} not found in main example")]
    AbsentFromMain(ArcStr),
    #[error("port does not have a name")]
    UnnamedPort,
    #[error("port `{0}` not found in main example")]
    PortNotInMain(ArcStr),
    #[error("main example has {main} samples of {label}, but this example has {other}")]
    CountMismatch {
        label: ArcStr,
        main: usize,
        other: usize,
    },
    #[error("sample {0} is unassociated")]
    Unassociated(ArcStr),
    #[error("{0} found in main example, not others")]
    MissingInSecondary(ArcStr),
}

/// A sample coordinate whose stretching behavior could not be classified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleSynthesisError {
    #[error("cannot determine {} stretching rule for {label}", .axis.axis_name())]
    NoAnchor { axis: Dir, label: ArcStr },
    #[error("highlight must be constant distance from edge")]
    HighlightNotEdgeRelative,
    #[error("main example of {label} has {main} points but this has {other}")]
    PointCountMismatch {
        label: ArcStr,
        main: usize,
        other: usize,
    },
}

/// An iterated contact cut that does not form a regular array.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MulticutError {
    #[error("only contact layers may be iterated")]
    NotContactLayer,
    #[error("multiple contact cuts must be indented uniformly")]
    NonUniformIndent,
    #[error("multiple contact cuts must not differ in size")]
    SizeMismatch,
    #[error("multiple contact cuts must not overlap")]
    Overlap,
    #[error("multiple contact cut {} spacing must be uniform", .0.axis_name())]
    NonUniformSpacing(Dir),
    #[error("multiple contact cut X and Y spacing must be the same")]
    MismatchedSpacing,
    #[error("multiple contact cuts never appear side by side")]
    NoSpacing,
}

/// A primitive that cannot be built from otherwise valid rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("cannot find layer `{0}`")]
    UnknownLayer(ArcStr),
    #[error("invalid connection list on port: no arc named `{0}`")]
    InvalidConnection(ArcStr),
    #[error("no ports found")]
    NoPorts,
    #[error("port does not have a name")]
    UnnamedPort,
    #[error("invalid port name `{0}`")]
    InvalidPortName(ArcStr),
    #[error("need 2 gate and 2 active ports on field-effect transistor")]
    NeedGateAndActivePorts,
    #[error("no diffusion and polysilicon layers in transistor")]
    NoSerpentineLayers,
    #[error("pure layer node can not be serpentine")]
    SerpentinePureLayer,
    #[error("highlighting cannot scale from center")]
    HighlightFromCenter,
    #[error("cannot determine style for {0:?} shape")]
    UnknownStyle(ShapeKind),
    #[error("invalid {attr} `{value}`: {reason}")]
    InvalidAttribute {
        attr: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} attribute has no value")]
    MissingValue(&'static str),
}

/// The reason a cell failed to convert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Cause {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Association(#[from] AssociationError),
    #[error(transparent)]
    RuleSynthesis(#[from] RuleSynthesisError),
    #[error(transparent)]
    Multicut(#[from] MulticutError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// A fatal problem in one cell.
///
/// Aborts that cell only; conversion of the rest of the library continues.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvError {
    pub cell: ArcStr,
    pub sample: Option<SampleRef>,
    pub cause: Cause,
}

impl ConvError {
    pub fn new(cell: impl Into<ArcStr>, cause: impl Into<Cause>) -> Self {
        Self {
            cell: cell.into(),
            sample: None,
            cause: cause.into(),
        }
    }

    pub fn at(mut self, sample: SampleRef) -> Self {
        self.sample = Some(sample);
        self
    }
}

impl Display for ConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)?;
        if let Some(sample) = &self.sample {
            write!(f, " at {sample}")?;
        }
        write!(f, " in cell `{}`", self.cell)
    }
}

impl std::error::Error for ConvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarningKind {
    #[error("moving port {0} to main example")]
    MovedPortInfo(&'static str),
    #[error("layer `{0}` has no associated pure-layer node")]
    LayerWithoutPureNode(ArcStr),
    #[error("arc `{0}` has no associated pin node")]
    ArcWithoutPin(ArcStr),
    #[error("pin `{0}` is not composed of pseudo-layers")]
    PinNotPseudo(ArcStr),
    #[error("sequence names unknown {category} `{name}`")]
    UnknownSequenceEntry { category: &'static str, name: ArcStr },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvWarning {
    pub cell: Option<ArcStr>,
    pub kind: WarningKind,
}

impl Display for ConvWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(cell) = &self.cell {
            write!(f, " in cell `{cell}`")?;
        }
        Ok(())
    }
}

/// Anything reported during a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Issue {
    Error(ConvError),
    Warning(ConvWarning),
}

impl Issue {
    pub fn as_error(&self) -> Option<&ConvError> {
        match self {
            Self::Error(e) => Some(e),
            Self::Warning(_) => None,
        }
    }

    pub fn as_warning(&self) -> Option<&ConvWarning> {
        match self {
            Self::Warning(w) => Some(w),
            Self::Error(_) => None,
        }
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{e}"),
            Self::Warning(w) => write!(f, "{w}"),
        }
    }
}

impl Diagnostic for Issue {
    fn help(&self) -> Option<Box<dyn Display>> {
        let help: &'static str = match self {
            Self::Error(ConvError {
                cause: Cause::Structural(StructuralError::TooClose),
                ..
            }) => "separate the examples so their bounding boxes do not touch",
            Self::Error(ConvError {
                cause: Cause::Structural(StructuralError::NoHighlight),
                ..
            }) => "draw a highlight box around every example",
            Self::Error(ConvError {
                cause: Cause::RuleSynthesis(RuleSynthesisError::NoAnchor { .. }),
                ..
            }) => "make the sample keep a fixed distance to an edge or the center in every example",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn severity(&self) -> Severity {
        match self {
            Self::Error(_) => Severity::Error,
            Self::Warning(_) => Severity::Warning,
        }
    }

    fn scope(&self) -> Option<&str> {
        match self {
            Self::Error(e) => Some(&e.cell),
            Self::Warning(w) => w.cell.as_deref(),
        }
    }
}

impl From<ConvError> for Issue {
    fn from(value: ConvError) -> Self {
        Self::Error(value)
    }
}

impl From<ConvWarning> for Issue {
    fn from(value: ConvWarning) -> Self {
        Self::Warning(value)
    }
}
