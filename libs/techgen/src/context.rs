use arcstr::ArcStr;
use diagnostics::IssueSet;

use crate::config::ConvertConfig;
use crate::error::{ConvError, ConvWarning, Issue, WarningKind};

/// State threaded through one conversion.
///
/// Each conversion owns its issue sink, so unrelated conversions may run in parallel.
#[derive(Debug, Default)]
pub struct ConversionContext {
    config: ConvertConfig,
    issues: IssueSet<Issue>,
}

impl ConversionContext {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            issues: IssueSet::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Records a failed cell.
    pub fn report(&mut self, err: ConvError) {
        self.issues.add_and_log(Issue::Error(err));
    }

    pub fn warn(&mut self, cell: Option<&ArcStr>, kind: WarningKind) {
        self.issues.add_and_log(Issue::Warning(ConvWarning {
            cell: cell.cloned(),
            kind,
        }));
    }

    #[inline]
    pub fn issues(&self) -> &IssueSet<Issue> {
        &self.issues
    }

    pub fn into_issues(self) -> IssueSet<Issue> {
        self.issues
    }
}
