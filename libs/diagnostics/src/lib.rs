//! Utilities for collecting diagnostics produced while converting technology libraries.
//!
//! Issues are gathered into an [`IssueSet`] owned by a single conversion, so
//! independent conversions never share a reporting sink.

#![warn(missing_docs)]


use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

/// A diagnostic issue that should be reported to users.
pub trait Diagnostic: Debug + Display {
    /// Returns an optional help message that should indicate
    /// what users need to do to resolve an issue.
    fn help(&self) -> Option<Box<dyn Display>> {
        None
    }

    /// Returns the severity of this issue.
    ///
    /// The default implementation returns [`Severity::default`].
    fn severity(&self) -> Severity {
        Default::default()
    }

    /// The name of the unit of work (typically a cell) this issue belongs to.
    fn scope(&self) -> Option<&str> {
        None
    }

    /// Emits this issue as a `tracing` event at the level matching its severity.
    fn log(&self) {
        let scope = self.scope().unwrap_or("");
        match self.severity() {
            Severity::Info => tracing::event!(tracing::Level::INFO, scope, "{}", self),
            Severity::Warning => tracing::event!(tracing::Level::WARN, scope, "{}", self),
            Severity::Error => tracing::event!(tracing::Level::ERROR, scope, "{}", self),
        }
    }
}

/// An enumeration of possible severity levels.
#[derive(
    Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum Severity {
    /// An informational message.
    Info,
    /// A warning.
    #[default]
    Warning,
    /// An error. Fatal for the scope that produced it.
    Error,
}

/// A collection of issues.
#[derive(Debug, Clone)]
pub struct IssueSet<T> {
    issues: Vec<T>,
    num_errors: usize,
    num_warnings: usize,
}

impl<T> IssueSet<T> {
    /// Creates a new, empty issue set.
    #[inline]
    pub fn new() -> Self {
        Self {
            issues: Vec::new(),
            num_errors: 0,
            num_warnings: 0,
        }
    }

    /// Returns an iterator over all issues in the set, in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.issues.iter()
    }

    /// The number of issues in this issue set.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if this issue set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl<T: Diagnostic> IssueSet<T> {
    /// Adds the given issue to the issue set.
    #[inline]
    pub fn add(&mut self, issue: T) {
        match issue.severity() {
            Severity::Error => self.num_errors += 1,
            Severity::Warning => self.num_warnings += 1,
            Severity::Info => (),
        };
        self.issues.push(issue);
    }

    /// Logs the given issue through `tracing`, then adds it to the set.
    pub fn add_and_log(&mut self, issue: T) {
        issue.log();
        self.add(issue);
    }

    /// Moves every issue of `other` into this set.
    pub fn extend(&mut self, other: IssueSet<T>) {
        for issue in other {
            self.add(issue);
        }
    }

    /// Returns `true` if this issue set contains an error.
    pub fn has_error(&self) -> bool {
        self.num_errors > 0
    }

    /// The number of errors in this issue set.
    #[inline]
    pub fn num_errors(&self) -> usize {
        self.num_errors
    }

    /// Returns `true` if this issue set contains a warning.
    pub fn has_warning(&self) -> bool {
        self.num_warnings > 0
    }

    /// The number of warnings in this issue set.
    #[inline]
    pub fn num_warnings(&self) -> usize {
        self.num_warnings
    }

    /// Iterates over the issues whose severity is [`Severity::Error`].
    pub fn errors(&self) -> impl Iterator<Item = &T> {
        self.issues.iter().filter(|i| i.severity().is_error())
    }

    /// Iterates over the issues reported against the given scope.
    pub fn in_scope<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        self.issues.iter().filter(move |i| i.scope() == Some(scope))
    }

    /// Returns `true` if any error was reported against the given scope.
    pub fn scope_has_error(&self, scope: &str) -> bool {
        self.in_scope(scope).any(|i| i.severity().is_error())
    }
}

impl<T> IntoIterator for IssueSet<T> {
    type Item = T;
    type IntoIter = <std::vec::Vec<T> as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<T> Default for IssueSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Severity {
    /// Returns log level corresponding to this severity.
    #[inline]
    pub const fn as_tracing_level(&self) -> tracing::Level {
        match *self {
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Returns `true` if the severity is [`Severity::Error`].
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(*self, Self::Error)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl<T: Diagnostic> Display for IssueSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in self.issues.iter() {
            writeln!(f, "{}: {}", issue.severity(), issue)?;
            if let Some(help) = issue.help() {
                writeln!(f, "  help: {}", help)?;
            }
        }
        Ok(())
    }
}
