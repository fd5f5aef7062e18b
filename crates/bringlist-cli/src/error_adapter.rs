//! Error adapter for converting [`BringListError`] to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error
//! types and miette's rich diagnostic formatting used in the CLI. Compile
//! errors carry their source text, so they render as a labeled snippet of
//! the offending template line.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use bringlist::{BringListError, CompileError};

/// A reportable error that can be rendered by miette.
pub struct Reportable<'a> {
    err: &'a BringListError,
}

/// Wrap a [`BringListError`] for miette rendering.
pub fn to_reportable(err: &BringListError) -> Reportable<'_> {
    Reportable { err }
}

impl fmt::Debug for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.err, f)
    }
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl std::error::Error for Reportable<'_> {}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err {
            BringListError::Io(_) => "bringlist::io",
            BringListError::Compile { .. } => "bringlist::compile",
            BringListError::Render(_) => "bringlist::render",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self.err {
            BringListError::Compile {
                err: CompileError::ItemWithoutCategory { .. },
                ..
            } => Some(Box::new("add a `# Category` header above this line")),
            _ => None,
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self.err {
            BringListError::Compile { src, .. } => Some(src as &dyn miette::SourceCode),
            _ => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let BringListError::Compile { err, src } = self.err else {
            return None;
        };

        let span = err.span_in(src);
        let span = SourceSpan::new(span.start.into(), span.end - span.start);
        let message = match err {
            CompileError::Syntax { expected, .. } => format!("expected {expected}"),
            CompileError::ItemWithoutCategory { .. } => {
                "no category header before this item".to_string()
            }
        };

        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(message), span),
        )))
    }
}
