//! Filters and expression evaluation.
//!
//! A [`Filter`] is the runtime state the surrounding application owns: the
//! set of active tags and the nights count. [`evaluate`] decides whether a
//! [`TagExpr`] matches a filter and explains the verdict by listing the tag
//! references that contributed to it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::expr::{BinOp, TagExpr};

/// The active tag set and nights count visibility is evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Tags the user has switched on.
    pub tags: BTreeSet<String>,
    /// Length of the trip in nights.
    pub nights: i64,
}

impl Filter {
    /// Build a filter from any collection of tag names.
    pub fn new<I, S>(tags: I, nights: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            nights,
        }
    }

    /// Whether the named tag is active.
    pub fn is_active(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// The outcome of evaluating an expression against a filter.
///
/// `true_tags` and `false_tags` list the tag references that contributed
/// positively and negatively, in left-to-right depth-first evaluation
/// order. Duplicate names are possible when a tag is referenced twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExprMatch {
    pub is_match: bool,
    pub true_tags: Vec<String>,
    pub false_tags: Vec<String>,
}

impl ExprMatch {
    /// A non-match with no explanation.
    fn no_match() -> Self {
        Self::default()
    }

    /// A match with no explanation.
    fn matched() -> Self {
        Self {
            is_match: true,
            ..Self::default()
        }
    }

    /// Combine both sides' explanations under the given verdict.
    fn combined(is_match: bool, left: Self, right: Self) -> Self {
        let mut true_tags = left.true_tags;
        true_tags.extend(right.true_tags);
        let mut false_tags = left.false_tags;
        false_tags.extend(right.false_tags);
        Self {
            is_match,
            true_tags,
            false_tags,
        }
    }
}

impl TagExpr {
    /// Whether this expression matches the filter, without the explanation.
    pub fn matches(&self, filter: &Filter) -> bool {
        evaluate(filter, self).is_match
    }
}

/// Evaluate `expr` against `filter`, returning the verdict plus the tag
/// references that produced it.
///
/// Short-circuit rules shape the explanation: a failing left side of `&`
/// and a succeeding left side of `|` are returned unchanged, so the right
/// side contributes nothing. Negation deliberately suppresses the
/// explanation of a non-match: `!x` reports empty tag lists when `x`
/// matches.
pub fn evaluate(filter: &Filter, expr: &TagExpr) -> ExprMatch {
    match expr {
        TagExpr::BinOp { op, left, right } => {
            let lhs = evaluate(filter, left);
            match op {
                BinOp::And => {
                    if !lhs.is_match {
                        return lhs;
                    }
                    let rhs = evaluate(filter, right);
                    let is_match = rhs.is_match;
                    ExprMatch::combined(is_match, lhs, rhs)
                }
                BinOp::Or => {
                    if lhs.is_match {
                        return lhs;
                    }
                    evaluate(filter, right)
                }
                BinOp::Xor => {
                    let rhs = evaluate(filter, right);
                    if lhs.is_match != rhs.is_match {
                        ExprMatch::combined(true, lhs, rhs)
                    } else {
                        ExprMatch::no_match()
                    }
                }
            }
        }
        TagExpr::Not(inner) => {
            let inner = evaluate(filter, inner);
            if inner.is_match {
                ExprMatch::no_match()
            } else {
                ExprMatch {
                    is_match: true,
                    true_tags: inner.true_tags,
                    false_tags: inner.false_tags,
                }
            }
        }
        TagExpr::Tag(name) => {
            if filter.is_active(name) {
                ExprMatch {
                    is_match: true,
                    true_tags: vec![name.clone()],
                    false_tags: Vec::new(),
                }
            } else {
                ExprMatch {
                    is_match: false,
                    true_tags: Vec::new(),
                    false_tags: vec![name.clone()],
                }
            }
        }
        TagExpr::Nights { lo, hi } => {
            let below = lo.is_some_and(|lo| filter.nights < lo);
            let above = hi.is_some_and(|hi| filter.nights > hi);
            if below || above {
                ExprMatch::no_match()
            } else {
                ExprMatch::matched()
            }
        }
        TagExpr::Empty => ExprMatch::matched(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(tags: &[&str], nights: i64) -> Filter {
        Filter::new(tags.iter().copied(), nights)
    }

    fn nights_range(lo: Option<i64>, hi: Option<i64>) -> TagExpr {
        TagExpr::Nights { lo, hi }
    }

    #[test]
    fn test_empty_always_matches() {
        let result = evaluate(&filter(&[], 1), &TagExpr::Empty);
        assert!(result.is_match);
        assert!(result.true_tags.is_empty());
        assert!(result.false_tags.is_empty());
    }

    #[test]
    fn test_tag_reference_records_itself() {
        let expr = TagExpr::tag("warm");

        let hit = evaluate(&filter(&["warm"], 1), &expr);
        assert!(hit.is_match);
        assert_eq!(hit.true_tags, vec!["warm"]);
        assert!(hit.false_tags.is_empty());

        let miss = evaluate(&filter(&[], 1), &expr);
        assert!(!miss.is_match);
        assert!(miss.true_tags.is_empty());
        assert_eq!(miss.false_tags, vec!["warm"]);
    }

    #[test]
    fn test_range_boundaries_at_ten_nights() {
        let at_ten = filter(&[], 10);

        // <=10, >=10 and ==10 include the boundary
        assert!(nights_range(None, Some(10)).matches(&at_ten));
        assert!(nights_range(Some(10), None).matches(&at_ten));
        assert!(nights_range(Some(10), Some(10)).matches(&at_ten));

        // <10 is lo=None hi=9, >10 is lo=11 hi=None, ==9 is 9..=9
        assert!(!nights_range(None, Some(9)).matches(&at_ten));
        assert!(!nights_range(Some(11), None).matches(&at_ten));
        assert!(!nights_range(Some(9), Some(9)).matches(&at_ten));
    }

    #[test]
    fn test_double_ended_range_inclusive() {
        let range = nights_range(Some(0), Some(10));
        for nights in 0..=10 {
            assert!(range.matches(&filter(&[], nights)), "nights={nights}");
        }
        assert!(!range.matches(&filter(&[], 11)));
    }

    #[test]
    fn test_range_contributes_no_tags() {
        let result = evaluate(&filter(&[], 5), &nights_range(Some(1), Some(3)));
        assert!(!result.is_match);
        assert!(result.true_tags.is_empty());
        assert!(result.false_tags.is_empty());
    }

    #[test]
    fn test_and_failing_left_passes_through() {
        // warm is inactive, so the right side must not be consulted
        let expr = TagExpr::bin_op(BinOp::And, TagExpr::tag("warm"), TagExpr::tag("zwemmen"));

        let result = evaluate(&filter(&[], 1), &expr);
        assert!(!result.is_match);
        assert!(result.true_tags.is_empty());
        assert_eq!(result.false_tags, vec!["warm"]);
    }

    #[test]
    fn test_and_matching_left_combines_both_sides() {
        let expr = TagExpr::bin_op(BinOp::And, TagExpr::Empty, TagExpr::tag("warm"));

        let result = evaluate(&filter(&[], 1), &expr);
        assert!(!result.is_match);
        assert!(result.true_tags.is_empty());
        assert_eq!(result.false_tags, vec!["warm"]);
    }

    #[test]
    fn test_or_matching_left_passes_through() {
        let expr = TagExpr::bin_op(BinOp::Or, TagExpr::tag("warm"), TagExpr::tag("zwemmen"));

        let result = evaluate(&filter(&["warm", "zwemmen"], 1), &expr);
        assert!(result.is_match);
        assert_eq!(result.true_tags, vec!["warm"]);
        assert!(result.false_tags.is_empty());
    }

    #[test]
    fn test_or_failing_left_yields_right_result() {
        let expr = TagExpr::bin_op(BinOp::Or, TagExpr::tag("warm"), TagExpr::tag("zwemmen"));

        let result = evaluate(&filter(&["zwemmen"], 1), &expr);
        assert!(result.is_match);
        assert_eq!(result.true_tags, vec!["zwemmen"]);
        assert!(result.false_tags.is_empty());
    }

    #[test]
    fn test_xor_exactly_one_side() {
        let expr = TagExpr::bin_op(BinOp::Xor, TagExpr::tag("warm"), TagExpr::tag("zwemmen"));

        let one = evaluate(&filter(&["warm"], 1), &expr);
        assert!(one.is_match);
        assert_eq!(one.true_tags, vec!["warm"]);
        assert_eq!(one.false_tags, vec!["zwemmen"]);

        let both = evaluate(&filter(&["warm", "zwemmen"], 1), &expr);
        assert!(!both.is_match);
        assert!(both.true_tags.is_empty());
        assert!(both.false_tags.is_empty());

        let neither = evaluate(&filter(&[], 1), &expr);
        assert!(!neither.is_match);
        assert!(neither.true_tags.is_empty());
        assert!(neither.false_tags.is_empty());
    }

    #[test]
    fn test_not_matching_passes_inner_explanation() {
        let expr = TagExpr::not(TagExpr::tag("warm"));

        let result = evaluate(&filter(&[], 1), &expr);
        assert!(result.is_match);
        assert!(result.true_tags.is_empty());
        assert_eq!(result.false_tags, vec!["warm"]);
    }

    #[test]
    fn test_not_suppresses_why_not() {
        let expr = TagExpr::not(TagExpr::tag("warm"));

        let result = evaluate(&filter(&["warm"], 1), &expr);
        assert!(!result.is_match);
        assert!(result.true_tags.is_empty());
        assert!(result.false_tags.is_empty());
    }

    #[test]
    fn test_explanation_order_is_left_to_right() {
        // (a & b) & c with everything active: tags appear in source order
        let expr = TagExpr::bin_op(
            BinOp::And,
            TagExpr::bin_op(BinOp::And, TagExpr::tag("a"), TagExpr::tag("b")),
            TagExpr::tag("c"),
        );

        let result = evaluate(&filter(&["a", "b", "c"], 1), &expr);
        assert!(result.is_match);
        assert_eq!(result.true_tags, vec!["a", "b", "c"]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_expr() -> impl Strategy<Value = TagExpr> {
            let leaf = prop_oneof![
                Just(TagExpr::Empty),
                "[a-z]{1,4}".prop_map(|name| TagExpr::tag(name)),
                (proptest::option::of(0i64..20), proptest::option::of(0i64..20))
                    .prop_map(|(lo, hi)| TagExpr::Nights { lo, hi }),
            ];
            leaf.prop_recursive(4, 24, 2, |inner| {
                prop_oneof![
                    inner.clone().prop_map(TagExpr::not),
                    (
                        prop_oneof![Just(BinOp::And), Just(BinOp::Or), Just(BinOp::Xor)],
                        inner.clone(),
                        inner
                    )
                        .prop_map(|(op, l, r)| TagExpr::bin_op(op, l, r)),
                ]
            })
        }

        proptest! {
            #[test]
            fn evaluate_is_total_and_deterministic(
                expr in arb_expr(),
                tags in proptest::collection::btree_set("[a-z]{1,4}", 0..4),
                nights in 0i64..20,
            ) {
                let filter = Filter { tags, nights };
                let first = evaluate(&filter, &expr);
                let second = evaluate(&filter, &expr);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn explanation_tags_come_from_the_expression(
                expr in arb_expr(),
                tags in proptest::collection::btree_set("[a-z]{1,4}", 0..4),
                nights in 0i64..20,
            ) {
                let filter = Filter { tags, nights };
                let result = evaluate(&filter, &expr);
                let known = expr.collect_tags();
                for tag in result.true_tags.iter().chain(&result.false_tags) {
                    prop_assert!(known.contains(tag));
                }
            }
        }
    }
}
