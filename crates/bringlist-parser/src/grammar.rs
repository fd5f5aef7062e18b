//! The concrete template grammar.
//!
//! One rule per function, composed from the [`combinator`](crate::combinator)
//! toolkit. Rules that appear inside other rules are wrapped with
//! [`rule`] so the grammar can recurse (an atom contains a parenthesized
//! tag expression, which contains atoms).
//!
//! Binary operators deliberately have no precedence: `a & b | c` folds to
//! `(a & b) | c` and `a | b & c` to `(a | b) & c`, strictly left to right
//! in source order.

use once_cell::sync::Lazy;
use regex::Regex;

use bringlist_core::{BinOp, Item, TagExpr};

use crate::combinator::{
    empty, float, integer, literal, pattern, rule, Expected, Failure, PResult, Parse,
};

/// Tag identifiers: a letter or underscore, then letters, digits, `_`, `-`.
///
/// A leading digit is rejected; that keeps `0-10` unambiguous with the
/// double-ended range form. (A later revision of the language accepted
/// leading digits; the stricter form is the one the test corpus pins down.)
static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*").expect("identifier pattern is valid"));

static RANGE_OP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(==|<=?|>=?)").expect("range operator pattern is valid"));

/// One successfully parsed template line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line {
    Category { name: String, tags: TagExpr },
    Item(Item),
}

/// Turn a comparison operator into an inclusive range.
fn make_range_single(op: &str, n: i64) -> TagExpr {
    let (lo, hi) = match op {
        "==" => (Some(n), Some(n)),
        "<" => (None, Some(n - 1)),
        "<=" => (None, Some(n)),
        ">" => (Some(n + 1), None),
        ">=" => (Some(n), None),
        _ => unreachable!("range operator pattern admits no other symbol"),
    };
    TagExpr::Nights { lo, hi }
}

fn nights_range_single(input: &str) -> PResult<'_, TagExpr> {
    pattern(&RANGE_OP_RE, "range operator")
        .describe(&["'=='", "'<'", "'<='", "'>'", "'>='"])
        .space()
        .and(integer().space())
        .map(|(op, n)| make_range_single(&op, n))
        .parse(input)
}

fn nights_range_double(input: &str) -> PResult<'_, TagExpr> {
    integer()
        .space()
        .and(literal("-").space().and(integer().space()).map(|(_, hi)| hi))
        .map(|(lo, hi)| TagExpr::Nights {
            lo: Some(lo),
            hi: Some(hi),
        })
        .parse(input)
}

fn nights_range(input: &str) -> PResult<'_, TagExpr> {
    rule(nights_range_single)
        .or(rule(nights_range_double))
        .parse(input)
}

fn tag_ident(input: &str) -> PResult<'_, String> {
    pattern(&IDENT_RE, "identifier").parse(input)
}

fn tag_lit(input: &str) -> PResult<'_, TagExpr> {
    rule(tag_ident).space().map(TagExpr::Tag).parse(input)
}

/// Negation binds tighter than the binary operators: the operand is a
/// single atom, so `!a | b` is `(!a) | b`.
fn not_expr(input: &str) -> PResult<'_, TagExpr> {
    literal("!")
        .and(rule(atom))
        .map(|(_, inner)| TagExpr::not(inner))
        .parse(input)
}

fn paren_expr(input: &str) -> PResult<'_, TagExpr> {
    rule(tag_expr)
        .space()
        .between(literal("(").space(), literal(")").space())
        .parse(input)
}

/// An atom: parenthesized expression, negation, nights range or tag
/// reference. Ranges come before tag references so the error message for
/// a bad atom mentions both.
fn atom(input: &str) -> PResult<'_, TagExpr> {
    rule(paren_expr)
        .or(rule(not_expr))
        .or(rule(nights_range))
        .or(rule(tag_lit))
        .parse(input)
}

fn bin_op(input: &str) -> PResult<'_, BinOp> {
    literal("&")
        .map(|_| BinOp::And)
        .or(literal("|").map(|_| BinOp::Or))
        .or(literal("^").map(|_| BinOp::Xor))
        .parse(input)
}

fn bin_op_rest(input: &str) -> PResult<'_, (BinOp, TagExpr)> {
    rule(bin_op).space().and(rule(atom).space()).parse(input)
}

/// A full tag expression: an atom followed by any number of
/// `(operator, atom)` pairs, folded left in encounter order.
pub(crate) fn tag_expr(input: &str) -> PResult<'_, TagExpr> {
    rule(atom)
        .and(rule(bin_op_rest).many())
        .map(|(first, rest)| {
            rest.into_iter()
                .fold(first, |tree, (op, right)| TagExpr::bin_op(op, tree, right))
        })
        .parse(input)
}

/// Free item text: anything up to a bracket delimiter or the end of the
/// line, with trailing spaces trimmed. Empty text is a failure.
fn item_desc(input: &str) -> PResult<'_, String> {
    let end = input
        .find(['[', ']', '{', '}', '\r', '\n'])
        .unwrap_or(input.len());
    let name = input[..end].trim_end();
    if name.is_empty() {
        return Err(Failure::new(Expected::one("item description"), input));
    }
    Ok((name.to_string(), &input[name.len()..]))
}

fn every_n_nights(input: &str) -> PResult<'_, f64> {
    literal("*").and(float()).map(|(_, n)| n).parse(input)
}

/// The bracketed `[ *cadence tagexpr ]` section of an item line; both
/// parts are optional, independently.
fn bracket_section(input: &str) -> PResult<'_, (Option<f64>, TagExpr)> {
    rule(every_n_nights)
        .map(Some)
        .space()
        .optional(None)
        .and(rule(tag_expr).space().optional(TagExpr::Empty))
        .between(literal("[").space(), literal("]").space())
        .parse(input)
}

pub(crate) fn item_line(input: &str) -> PResult<'_, Line> {
    rule(item_desc)
        .space()
        .and(rule(bracket_section).optional((None, TagExpr::Empty)))
        .map(|(name, (every_n_nights, tags))| {
            Line::Item(Item {
                name,
                every_n_nights,
                tags,
            })
        })
        .parse(input)
}

fn category_tags(input: &str) -> PResult<'_, TagExpr> {
    rule(tag_expr)
        .space()
        .optional(TagExpr::Empty)
        .between(literal("[").space(), literal("]").space())
        .parse(input)
}

fn category_body(input: &str) -> PResult<'_, Line> {
    rule(item_desc)
        .space()
        .and(rule(category_tags).optional(TagExpr::Empty))
        .map(|(name, tags)| Line::Category { name, tags })
        .parse(input)
}

/// A category header: `#`, a name, an optional bracketed tag expression.
/// Once the `#` is seen the line is a category; there is no falling back
/// to the item rule.
pub(crate) fn category_line(input: &str) -> PResult<'_, Line> {
    literal("#")
        .space()
        .and(rule(category_body).cut())
        .map(|(_, line)| line)
        .parse(input)
}

/// One template line: leading spaces, then a category header or an item,
/// consuming the whole line.
pub(crate) fn line(input: &str) -> PResult<'_, Line> {
    empty()
        .space()
        .and(rule(category_line).or(rule(item_line)))
        .map(|(_, line)| line)
        .complete()
        .parse(input)
}
