//! Arrays of identical contact cuts.

use arcstr::ArcStr;
use geometry::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::anchor::{Anchor, Rule, RulePoint};
use crate::config::ConvertConfig;
use crate::error::{ConvError, MulticutError};
use crate::model::{Associations, ExampleSet, SampleId, SampleTag};

type Result<T> = std::result::Result<T, ConvError>;

/// A contact layer drawn as a regular array of cuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticutRule {
    pub cut_width: f64,
    pub cut_height: f64,
    /// Distance from the highlight to the outermost cuts, equal on every side.
    pub indent: f64,
    /// Gap between neighboring cuts, equal along both axes.
    pub separation: f64,
    /// The region of the lone main-example cut, relative to the example edges.
    pub region: Rule,
}

impl MulticutRule {
    /// Center-to-center distance between neighboring cuts along `dir`.
    pub fn pitch(&self, dir: Dir) -> f64 {
        match dir {
            Dir::Horiz => self.cut_width + self.separation,
            Dir::Vert => self.cut_height + self.separation,
        }
    }

    /// The number of cuts that fit along an axis of the given highlight extent.
    pub fn cuts_along(&self, dir: Dir, extent: f64) -> usize {
        let cut = match dir {
            Dir::Horiz => self.cut_width,
            Dir::Vert => self.cut_height,
        };
        let room = extent - 2. * self.indent - cut;
        if room < 0. {
            return 0;
        }
        1 + (room / self.pitch(dir)).floor() as usize
    }
}

/// Derives the cut array of main sample `cut` from every example.
///
/// The main example must hold a single cut; secondary examples may hold any number.
pub fn build_multicut(
    set: &ExampleSet,
    assoc: &Associations,
    cut: SampleId,
    config: &ConvertConfig,
    cell: &ArcStr,
) -> Result<MulticutRule> {
    let sample = set.sample(cut);
    let fail = |cause: MulticutError| {
        tracing::event!(
            Level::ERROR,
            cell_name = %cell,
            shape = sample.shape_index,
            "{}",
            cause
        );
        ConvError::new(cell.clone(), cause).at(sample.sample_ref())
    };
    if !matches!(sample.tag, SampleTag::Layer(_)) {
        return Err(fail(MulticutError::NotContactLayer));
    }

    let main = set.main();
    let highlight = set.sample(main.highlight).bounds;
    let bounds = sample.bounds;
    let indent = bounds.left() - highlight.left();
    let indents = [
        bounds.bot() - highlight.bot(),
        highlight.right() - bounds.right(),
        highlight.top() - bounds.top(),
    ];
    if !indents.iter().all(|&i| config.approx_eq(i, indent)) {
        return Err(fail(MulticutError::NonUniformIndent));
    }

    let size = Dirs::new(bounds.width(), bounds.height());
    let mut spacings: Dirs<Vec<f64>> = Dirs::new(Vec::new(), Vec::new());
    for example in set.example_ids() {
        let cuts: Vec<Rect> = if set.is_main(example) {
            vec![bounds]
        } else {
            assoc
                .counterparts(set, cut, example)
                .into_iter()
                .map(|id| set.sample(id).bounds)
                .collect()
        };
        if cuts.iter().any(|c| {
            !config.approx_eq(c.width(), size[Dir::Horiz])
                || !config.approx_eq(c.height(), size[Dir::Vert])
        }) {
            return Err(fail(MulticutError::SizeMismatch));
        }
        let overlapping = cuts.iter().tuple_combinations().any(|(a, b)| {
            let d = a.center() - b.center();
            d.x.abs() < size[Dir::Horiz] && d.y.abs() < size[Dir::Vert]
        });
        if overlapping {
            return Err(fail(MulticutError::Overlap));
        }
        for dir in Dir::ALL {
            let centers: Vec<f64> = cuts
                .iter()
                .map(|c| c.center().coord(dir))
                .sorted_by(f64::total_cmp)
                .dedup_by(|a, b| config.approx_eq(*a, *b))
                .collect();
            spacings[dir].extend(centers.iter().tuple_windows().map(|(a, b)| b - a));
        }
    }

    let mut beyond = Dirs::uniform(None);
    for dir in Dir::ALL {
        beyond[dir] = separation(&spacings[dir], size[dir], config)
            .map_err(|()| fail(MulticutError::NonUniformSpacing(dir)))?
            .map(|sep| sep - size[dir]);
    }
    let separation = match (beyond[Dir::Horiz], beyond[Dir::Vert]) {
        (Some(x), Some(y)) if config.approx_eq(x, y) => x,
        (Some(_), Some(_)) => return Err(fail(MulticutError::MismatchedSpacing)),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => return Err(fail(MulticutError::NoSpacing)),
    };

    let ex = main.bounds;
    let region = Rule::new(vec![
        RulePoint::new(
            Anchor::ToLeftEdge(bounds.left() - ex.left()),
            Anchor::ToBottomEdge(bounds.bot() - ex.bot()),
        ),
        RulePoint::new(
            Anchor::ToRightEdge(ex.right() - bounds.right()),
            Anchor::ToTopEdge(ex.top() - bounds.top()),
        ),
    ]);

    let rule = MulticutRule {
        cut_width: size[Dir::Horiz],
        cut_height: size[Dir::Vert],
        indent,
        separation,
        region,
    };
    tracing::event!(
        Level::DEBUG,
        cell_name = %cell,
        cut_width = rule.cut_width,
        cut_height = rule.cut_height,
        indent = rule.indent,
        separation = rule.separation,
        "derived multi-cut rule"
    );
    Ok(rule)
}

/// The smallest spacing at least one cut wide, provided every spacing is a
/// whole multiple of it. `Ok(None)` if no cuts sit side by side.
fn separation(
    spacings: &[f64],
    cut: f64,
    config: &ConvertConfig,
) -> std::result::Result<Option<f64>, ()> {
    if spacings.is_empty() {
        return Ok(None);
    }
    let sep = spacings
        .iter()
        .copied()
        .filter(|&s| s > cut || config.approx_eq(s, cut))
        .min_by(f64::total_cmp)
        .ok_or(())?;
    let uniform = spacings.iter().all(|&s| {
        let k = (s / sep).round();
        k >= 1. && config.approx_eq(k * sep, s)
    });
    if uniform {
        Ok(Some(sep))
    } else {
        Err(())
    }
}
