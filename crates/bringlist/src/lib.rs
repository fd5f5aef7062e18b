//! Bringlist - a packing-list template language.
//!
//! A bringlist template is a small line-oriented document: `#` lines open
//! categories, other lines are items, and both can carry a bracketed tag
//! expression gating their visibility by user-toggled tags and the trip
//! length in nights.
//!
//! This crate is the facade the surrounding application depends on. It
//! exposes the whole engine surface:
//!
//! - [`compile`] - template text to a structured [`BringList`], or a
//!   [`CompileError`] (malformed input is an ordinary outcome, not a
//!   panic)
//! - [`evaluate`] - decide whether a [`TagExpr`] matches a [`Filter`],
//!   with an explanation of which tags drove the verdict
//! - [`check_consistency`] - warn about same-named entries that can be
//!   visible at the same time
//! - [`collect_tags`] / [`collect_all_tags`] - the tag vocabulary, for
//!   tag-picker UIs
//!
//! ```
//! use bringlist::Filter;
//!
//! let list = bringlist::compile("# Kleding\ntrui [ !warm ]\n")?;
//! let filter = Filter::new(["warm"], 3);
//!
//! let trui = &list.categories()[0].items[0];
//! assert!(!bringlist::evaluate(&filter, &trui.tags).is_match);
//! # Ok::<(), bringlist::CompileError>(())
//! ```

pub mod check;

mod error;

pub use bringlist_core::{
    evaluate, BinOp, BringList, Category, ExprMatch, Filter, Item, TagExpr,
    LOWEST_POSSIBLE_NIGHTS,
};
pub use bringlist_parser::CompileError;

pub use check::{check_consistency, Warning};
pub use error::BringListError;

use indexmap::IndexSet;
use log::{debug, info};

/// The stock template new users start from.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.blt");

/// Compile template text into a [`BringList`].
///
/// Never panics on malformed input; the error carries the offending line
/// number, the expected tokens and the unconsumed remainder.
pub fn compile(template: &str) -> Result<BringList, CompileError> {
    info!("compiling bringlist template");

    let list = bringlist_parser::compile(template)?;

    debug!(categories = list.len(); "template compiled");
    Ok(list)
}

/// Every tag referenced in the expression, in first-occurrence order.
pub fn collect_tags(expr: &TagExpr) -> IndexSet<String> {
    expr.collect_tags()
}

/// Every tag referenced anywhere in the document, in first-occurrence
/// order. This is the vocabulary a tag-picker UI offers.
pub fn collect_all_tags(list: &BringList) -> IndexSet<String> {
    list.collect_tags()
}
