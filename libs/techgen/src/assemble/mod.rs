//! Assembly of technology primitives from the cells of a library.

use arcstr::ArcStr;
use diagnostics::IssueSet;
use tracing::Level;

use crate::config::ConvertConfig;
use crate::context::ConversionContext;
use crate::error::{Cause, ConvError, Issue, WarningKind};
use crate::input::{CellCategory, CellDesc, LibraryDesc};
use crate::model::Sample;
use crate::role::MiscAttr;
use crate::tech::{TechInfo, Technology};

use self::arc::build_arc;
use self::attr::attrs;
use self::check::check_consistency;
use self::layer::build_layer;
use self::node::{build_node, NodeAttrs};

mod arc;
mod attr;
mod check;
mod layer;
mod node;
mod port;
mod serpentine;

type Result<T> = std::result::Result<T, ConvError>;

/// Logs and builds an error raised while assembling `cell`.
pub(crate) fn fail(cell: &ArcStr, sample: Option<&Sample>, cause: impl Into<Cause>) -> ConvError {
    let cause = cause.into();
    tracing::event!(Level::ERROR, cell_name = %cell, "{}", cause);
    let err = ConvError::new(cell.clone(), cause);
    match sample {
        Some(sample) => err.at(sample.sample_ref()),
        None => err,
    }
}

/// The result of converting a library.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Every primitive that converted successfully.
    pub technology: Technology,
    pub issues: IssueSet<Issue>,
}

impl Conversion {
    /// Returns `true` if any cell failed to convert.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.issues.has_error()
    }
}

/// Converts the cells of one library.
pub struct Converter<'a> {
    lib: &'a LibraryDesc,
    ctx: ConversionContext,
}

impl<'a> Converter<'a> {
    pub fn new(lib: &'a LibraryDesc, config: ConvertConfig) -> Self {
        Self {
            lib,
            ctx: ConversionContext::new(config),
        }
    }

    fn cells(&self, category: CellCategory) -> impl Iterator<Item = &'a CellDesc> {
        self.lib
            .cells
            .iter()
            .filter(move |c| c.category() == category)
    }

    /// Orders the cells of a category: sequenced names first, then library order.
    fn ordered(
        &mut self,
        category: CellCategory,
        sequence: &[ArcStr],
        label: &'static str,
    ) -> Vec<&'a CellDesc> {
        let mut rest: Vec<&'a CellDesc> = self.cells(category).collect();
        let mut out = Vec::with_capacity(rest.len());
        for name in sequence {
            match rest.iter().position(|c| c.payload_name() == name.as_str()) {
                Some(i) => out.push(rest.remove(i)),
                None => self.ctx.warn(
                    None,
                    WarningKind::UnknownSequenceEntry {
                        category: label,
                        name: name.clone(),
                    },
                ),
            }
        }
        out.extend(rest);
        out
    }

    /// Runs `f` on `cell` inside its span, reporting any failure.
    fn convert_cell<T>(
        &mut self,
        cell: &CellDesc,
        f: impl FnOnce(&mut ConversionContext) -> Result<T>,
    ) -> Option<T> {
        let _span = tracing::span!(Level::INFO, "cell", name = %cell.name).entered();
        match f(&mut self.ctx) {
            Ok(value) => Some(value),
            Err(err) => {
                self.ctx.report(err);
                None
            }
        }
    }

    /// Converts every cell, continuing past cells that fail.
    pub fn run(mut self) -> Conversion {
        let lib = self.lib;
        let _span = tracing::span!(
            Level::INFO,
            "convert",
            library = lib.name.as_deref().unwrap_or("")
        )
        .entered();

        let mut tech = Technology {
            name: lib.name.clone(),
            ..Default::default()
        };

        let misc: Vec<_> = self.cells(CellCategory::Misc).collect();
        for cell in misc {
            if let Some(info) = self.convert_cell(cell, |_| read_info(cell)) {
                tech.info.merge(info);
            }
        }

        for cell in self.ordered(CellCategory::Layer, &lib.sequence.layers, "layer") {
            if let Some(layer) = self.convert_cell(cell, |_| build_layer(cell)) {
                tech.layers.push(layer);
            }
        }

        for cell in self.ordered(CellCategory::Arc, &lib.sequence.arcs, "arc") {
            if let Some(arc) = self.convert_cell(cell, |_| build_arc(cell, &tech.layers)) {
                tech.arcs.push(arc);
            }
        }

        let mut nodes = Vec::new();
        for cell in self.ordered(CellCategory::Node, &lib.sequence.nodes, "node") {
            if let Some(attrs) = self.convert_cell(cell, |_| NodeAttrs::parse(cell)) {
                nodes.push((cell, attrs));
            }
        }
        // Stable, so sequence order is kept within each pass.
        nodes.sort_by_key(|(_, attrs)| attrs.pass());
        for (cell, attrs) in nodes {
            let built = self.convert_cell(cell, |ctx| {
                build_node(cell, &attrs, &tech.layers, &tech.arcs, ctx)
            });
            if let Some(node) = built {
                tech.nodes.push(node);
            }
        }

        if self.ctx.config().check_consistency {
            let _span = tracing::span!(Level::DEBUG, "check").entered();
            check_consistency(&tech, &mut self.ctx);
        }

        let issues = self.ctx.into_issues();
        tracing::event!(
            Level::INFO,
            layers = tech.layers.len(),
            arcs = tech.arcs.len(),
            nodes = tech.nodes.len(),
            errors = issues.num_errors(),
            warnings = issues.num_warnings(),
            "conversion finished"
        );
        Conversion {
            technology: tech,
            issues,
        }
    }
}

/// Reads the technology-wide values of a misc cell.
fn read_info(cell: &CellDesc) -> Result<TechInfo> {
    let mut info = TechInfo::default();
    for shape in attrs::<MiscAttr>(cell) {
        match shape.attr {
            MiscAttr::Lambda => info.lambda = Some(shape.parse()?),
            MiscAttr::Description => info.description = Some(shape.text()?.to_string()),
        }
    }
    Ok(info)
}
