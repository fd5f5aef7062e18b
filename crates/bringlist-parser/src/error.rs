//! The user-facing compile error.
//!
//! Template text is user-edited and recompiled on every keystroke, so a
//! malformed template is the common case, not an exceptional one. Parse
//! failures travel as values through the combinators and only become a
//! [`CompileError`] at the [`compile`](crate::compile) entry point.

use std::ops::Range;

use thiserror::Error;

use crate::combinator::{Expected, Failure};

/// Why a template failed to compile.
///
/// The `Display` text is the message shown verbatim to the template
/// author; line numbers are 1-based positions in the original text,
/// counting blank and comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A line did not match the grammar.
    #[error("parse error: expected {expected} on line {line} (rest: '{rest}')")]
    Syntax {
        /// 1-based line number in the original template text.
        line: usize,
        /// Descriptions of the tokens that would have been accepted.
        expected: Expected,
        /// The unconsumed remainder of the offending line.
        rest: String,
    },

    /// An item line appeared before the first category header.
    #[error("parse error: no category specified for item on line {line} '{text}'")]
    ItemWithoutCategory { line: usize, text: String },
}

impl CompileError {
    pub(crate) fn syntax(line: usize, failure: &Failure<'_>) -> Self {
        CompileError::Syntax {
            line,
            expected: failure.expected.clone(),
            rest: failure.rest.to_string(),
        }
    }

    /// The 1-based line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            CompileError::Syntax { line, .. } => *line,
            CompileError::ItemWithoutCategory { line, .. } => *line,
        }
    }

    /// The byte range of the error inside the source the template was
    /// compiled from: the unconsumed remainder of the offending line, or
    /// the whole line when nothing useful was left. For labeled terminal
    /// reports.
    pub fn span_in(&self, source: &str) -> Range<usize> {
        let mut offset = 0;
        for (index, raw) in source.split('\n').enumerate() {
            let content = raw.strip_suffix('\r').unwrap_or(raw);
            if index + 1 == self.line() {
                let start = match self {
                    CompileError::Syntax { rest, .. }
                        if !rest.is_empty() && rest.len() <= content.len() =>
                    {
                        offset + content.len() - rest.len()
                    }
                    _ => offset,
                };
                return start..offset + content.len();
            }
            offset += raw.len() + 1;
        }
        0..0
    }
}
