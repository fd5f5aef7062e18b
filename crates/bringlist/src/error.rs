//! Error types for bringlist operations.
//!
//! This module provides the main error type [`BringListError`] which wraps
//! the error conditions callers of the facade crate run into.

use std::io;

use thiserror::Error;

use bringlist_parser::CompileError;

/// The main error type for bringlist operations.
///
/// The `Compile` variant keeps the offending source text alongside the
/// structured [`CompileError`] so callers can render labeled reports.
#[derive(Debug, Error)]
pub enum BringListError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Compile { err: CompileError, src: String },

    #[error("render error: {0}")]
    Render(Box<dyn std::error::Error>),
}

impl BringListError {
    /// Create a new `Compile` error with the associated source text.
    pub fn new_compile_error(err: CompileError, src: impl Into<String>) -> Self {
        Self::Compile {
            err,
            src: src.into(),
        }
    }
}
