//! The tag-expression tree.
//!
//! A [`TagExpr`] gates the visibility of an item or category. It is built
//! once by the compiler and never mutated afterwards; evaluation and the
//! traversals below treat it as a pure value.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A binary operator between two tag expressions.
///
/// Operators have no relative precedence: `a & b | c` is grouped as
/// `(a & b) | c`, strictly left to right in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    /// Both sides must match (`&`).
    And,
    /// Either side may match (`|`).
    Or,
    /// Exactly one side must match (`^`).
    Xor,
}

impl BinOp {
    /// The source-level symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::And => "&",
            BinOp::Or => "|",
            BinOp::Xor => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A tag expression, the condition attached to an item or category.
///
/// Expressions are immutable values with structural equality. The variant
/// set is closed; the evaluator and the traversals dispatch by `match` and
/// have no fallthrough arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagExpr {
    /// Two sub-expressions joined by a binary operator.
    BinOp {
        op: BinOp,
        left: Box<TagExpr>,
        right: Box<TagExpr>,
    },
    /// Negation of the inner expression.
    Not(Box<TagExpr>),
    /// A reference to a user-toggled tag; matches when the tag is active.
    Tag(String),
    /// An inclusive nights range; an absent bound is unbounded on that side.
    Nights { lo: Option<i64>, hi: Option<i64> },
    /// The absent qualifier; always matches.
    Empty,
}

impl TagExpr {
    /// Build a binary node, boxing both sides.
    pub fn bin_op(op: BinOp, left: TagExpr, right: TagExpr) -> Self {
        TagExpr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Build a negation node.
    pub fn not(inner: TagExpr) -> Self {
        TagExpr::Not(Box::new(inner))
    }

    /// Build a tag reference.
    pub fn tag(name: impl Into<String>) -> Self {
        TagExpr::Tag(name.into())
    }

    /// Collect every tag name referenced anywhere in this expression.
    ///
    /// The result preserves first-occurrence order, which is the order a
    /// tag-picker UI presents the tags in.
    pub fn collect_tags(&self) -> IndexSet<String> {
        let mut tags = IndexSet::new();
        self.collect_tags_into(&mut tags);
        tags
    }

    fn collect_tags_into(&self, tags: &mut IndexSet<String>) {
        match self {
            TagExpr::BinOp { left, right, .. } => {
                left.collect_tags_into(tags);
                right.collect_tags_into(tags);
            }
            TagExpr::Not(inner) => inner.collect_tags_into(tags),
            TagExpr::Tag(name) => {
                tags.insert(name.clone());
            }
            TagExpr::Nights { .. } | TagExpr::Empty => {}
        }
    }

    /// Collect every nights bound appearing in this expression, in source
    /// order. Duplicates are kept; callers deduplicate document-wide.
    pub fn night_bounds(&self) -> Vec<i64> {
        let mut bounds = Vec::new();
        self.night_bounds_into(&mut bounds);
        bounds
    }

    fn night_bounds_into(&self, bounds: &mut Vec<i64>) {
        match self {
            TagExpr::BinOp { left, right, .. } => {
                left.night_bounds_into(bounds);
                right.night_bounds_into(bounds);
            }
            TagExpr::Not(inner) => inner.night_bounds_into(bounds),
            TagExpr::Nights { lo, hi } => {
                bounds.extend(lo.iter().copied());
                bounds.extend(hi.iter().copied());
            }
            TagExpr::Tag(_) | TagExpr::Empty => {}
        }
    }
}
