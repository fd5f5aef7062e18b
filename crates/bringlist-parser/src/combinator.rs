//! A minimal parser-combinator toolkit for the template grammar.
//!
//! Every parser is a small value with one method: [`Parse::parse`] takes the
//! remaining input and returns either the parsed value with the rest of the
//! input, or a [`Failure`] describing what would have been accepted.
//! Failures are ordinary values threaded through every combinator;
//! backtracking never unwinds the stack.
//!
//! Alternation ([`Parse::or`]) retries on the original input and reports the
//! union of the expected sets of all failed branches, so a top-level error
//! can list every token that would have been accepted. A failure marked
//! committed (see [`Parse::cut`] and [`Parse::between`]) aborts alternation
//! and repetition instead of backtracking, which keeps messages like
//! "expected `]`" from degrading into a generic end-of-line error.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// The set of token descriptions a failed parse would have accepted.
///
/// Kept sorted so error messages are stable regardless of the order the
/// alternatives were tried in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expected(BTreeSet<String>);

impl Expected {
    /// A set with a single description.
    pub fn one(description: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(description.into());
        Self(set)
    }

    /// Union the other set into this one.
    pub fn merge(&mut self, other: Expected) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, description: &str) -> bool {
        self.0.contains(description)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for description in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(description)?;
            first = false;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Expected {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A failed parse: what was expected, and where consumption stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<'a> {
    /// Descriptions of the tokens that would have been accepted here.
    pub expected: Expected,
    /// The unconsumed input at the failure position.
    pub rest: &'a str,
    /// Committed failures abort alternation and repetition instead of
    /// backtracking.
    pub committed: bool,
}

impl<'a> Failure<'a> {
    pub fn new(expected: Expected, rest: &'a str) -> Self {
        Self {
            expected,
            rest,
            committed: false,
        }
    }

    fn into_committed(mut self) -> Self {
        self.committed = true;
        self
    }
}

/// The result of running a parser: the value and the remaining input, or a
/// [`Failure`].
pub type PResult<'a, T> = Result<(T, &'a str), Failure<'a>>;

/// A parser: one method from remaining input to a [`PResult`].
///
/// The provided methods are the combinators; each returns a new parser
/// value wrapping `self`, so grammars read as builder chains.
pub trait Parse {
    type Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output>;

    /// Transform the parsed value; failures pass through unchanged.
    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map { parser: self, f }
    }

    /// Run `self`, then `next` on the remainder; succeed with the pair.
    fn and<P>(self, next: P) -> And<Self, P>
    where
        Self: Sized,
        P: Parse,
    {
        And {
            first: self,
            second: next,
        }
    }

    /// Try `self`; on an uncommitted failure, retry `other` on the
    /// original input. When both fail the expected sets are unioned.
    fn or<P>(self, other: P) -> Or<Self, P>
    where
        Self: Sized,
        P: Parse<Output = Self::Output>,
    {
        Or {
            first: self,
            second: other,
        }
    }

    /// Repeat zero or more times, collecting the values. Never fails.
    fn many(self) -> Many<Self>
    where
        Self: Sized,
    {
        Many { parser: self }
    }

    /// Repeat one or more times, collecting the values.
    fn some(self) -> AtLeastOne<Self>
    where
        Self: Sized,
    {
        AtLeastOne { parser: self }
    }

    /// Consume any run of ASCII spaces (only `' '`) after `self`.
    fn space(self) -> Space<Self>
    where
        Self: Sized,
    {
        Space { parser: self }
    }

    /// Succeed with `default` and unchanged input when `self` fails.
    fn optional(self, default: Self::Output) -> Optional<Self>
    where
        Self: Sized,
        Self::Output: Clone,
    {
        Optional {
            parser: self,
            default,
        }
    }

    /// Fail with expected `<eof>` unless `self` consumes all input.
    fn complete(self) -> Complete<Self>
    where
        Self: Sized,
    {
        Complete { parser: self }
    }

    /// Sequence `left`, `self`, `right`, keeping only `self`'s value.
    ///
    /// Once `left` has matched there is no backtracking past it: failures
    /// of the body or the closing delimiter are reported committed.
    fn between<L, R>(self, left: L, right: R) -> Between<Self, L, R>
    where
        Self: Sized,
        L: Parse,
        R: Parse,
    {
        Between {
            body: self,
            left,
            right,
        }
    }

    /// Mark failures of `self` as committed.
    fn cut(self) -> Cut<Self>
    where
        Self: Sized,
    {
        Cut { parser: self }
    }

    /// Replace the expected set of a failure with the given descriptions.
    fn describe(self, descriptions: &[&str]) -> Describe<Self>
    where
        Self: Sized,
    {
        Describe {
            parser: self,
            expected: descriptions.iter().copied().collect(),
        }
    }
}

/// See [`Parse::map`].
#[derive(Clone)]
pub struct Map<P, F> {
    parser: P,
    f: F,
}

impl<P, F, U> Parse for Map<P, F>
where
    P: Parse,
    F: Fn(P::Output) -> U,
{
    type Output = U;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, U> {
        let (value, rest) = self.parser.parse(input)?;
        Ok(((self.f)(value), rest))
    }
}

/// See [`Parse::and`].
#[derive(Clone)]
pub struct And<P, Q> {
    first: P,
    second: Q,
}

impl<P: Parse, Q: Parse> Parse for And<P, Q> {
    type Output = (P::Output, Q::Output);

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let (first, rest) = self.first.parse(input)?;
        let (second, rest) = self.second.parse(rest)?;
        Ok(((first, second), rest))
    }
}

/// See [`Parse::or`].
#[derive(Clone)]
pub struct Or<P, Q> {
    first: P,
    second: Q,
}

impl<P, Q> Parse for Or<P, Q>
where
    P: Parse,
    Q: Parse<Output = P::Output>,
{
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let first = match self.first.parse(input) {
            Ok(ok) => return Ok(ok),
            Err(failure) if failure.committed => return Err(failure),
            Err(failure) => failure,
        };
        match self.second.parse(input) {
            Ok(ok) => Ok(ok),
            Err(failure) if failure.committed => Err(failure),
            Err(second) => {
                let mut expected = first.expected;
                expected.merge(second.expected);
                Err(Failure::new(expected, input))
            }
        }
    }
}

/// See [`Parse::many`].
#[derive(Clone)]
pub struct Many<P> {
    parser: P,
}

impl<P: Parse> Parse for Many<P> {
    type Output = Vec<P::Output>;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let mut items = Vec::new();
        let mut rest = input;
        loop {
            match self.parser.parse(rest) {
                // a parser that consumes nothing would repeat forever
                Ok((_, next)) if next.len() == rest.len() => break,
                Ok((value, next)) => {
                    items.push(value);
                    rest = next;
                }
                Err(failure) if failure.committed => return Err(failure),
                Err(_) => break,
            }
        }
        Ok((items, rest))
    }
}

/// See [`Parse::some`].
#[derive(Clone)]
pub struct AtLeastOne<P> {
    parser: P,
}

impl<P: Parse> Parse for AtLeastOne<P> {
    type Output = Vec<P::Output>;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let (first, rest) = self.parser.parse(input)?;
        let mut items = vec![first];
        let mut rest = rest;
        loop {
            match self.parser.parse(rest) {
                Ok((_, next)) if next.len() == rest.len() => break,
                Ok((value, next)) => {
                    items.push(value);
                    rest = next;
                }
                Err(failure) if failure.committed => return Err(failure),
                Err(_) => break,
            }
        }
        Ok((items, rest))
    }
}

/// See [`Parse::space`].
#[derive(Clone)]
pub struct Space<P> {
    parser: P,
}

impl<P: Parse> Parse for Space<P> {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let (value, rest) = self.parser.parse(input)?;
        Ok((value, rest.trim_start_matches(' ')))
    }
}

/// See [`Parse::optional`].
pub struct Optional<P: Parse> {
    parser: P,
    default: P::Output,
}

impl<P> Parse for Optional<P>
where
    P: Parse,
    P::Output: Clone,
{
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        match self.parser.parse(input) {
            Ok(ok) => Ok(ok),
            Err(failure) if failure.committed => Err(failure),
            Err(_) => Ok((self.default.clone(), input)),
        }
    }
}

/// See [`Parse::complete`].
#[derive(Clone)]
pub struct Complete<P> {
    parser: P,
}

impl<P: Parse> Parse for Complete<P> {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let (value, rest) = self.parser.parse(input)?;
        if rest.is_empty() {
            Ok((value, rest))
        } else {
            Err(Failure::new(Expected::one("<eof>"), rest))
        }
    }
}

/// See [`Parse::between`].
#[derive(Clone)]
pub struct Between<P, L, R> {
    body: P,
    left: L,
    right: R,
}

impl<P, L, R> Parse for Between<P, L, R>
where
    P: Parse,
    L: Parse,
    R: Parse,
{
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let (_, rest) = self.left.parse(input)?;
        let (value, rest) = self.body.parse(rest).map_err(Failure::into_committed)?;
        let (_, rest) = self.right.parse(rest).map_err(Failure::into_committed)?;
        Ok((value, rest))
    }
}

/// See [`Parse::cut`].
#[derive(Clone)]
pub struct Cut<P> {
    parser: P,
}

impl<P: Parse> Parse for Cut<P> {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        self.parser.parse(input).map_err(Failure::into_committed)
    }
}

/// See [`Parse::describe`].
#[derive(Clone)]
pub struct Describe<P> {
    parser: P,
    expected: Expected,
}

impl<P: Parse> Parse for Describe<P> {
    type Output = P::Output;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        self.parser.parse(input).map_err(|failure| Failure {
            expected: self.expected.clone(),
            ..failure
        })
    }
}

/// Match the literal string at the start of the input.
pub fn literal(literal: &'static str) -> Literal {
    Literal { literal }
}

#[derive(Debug, Clone)]
pub struct Literal {
    literal: &'static str,
}

impl Parse for Literal {
    type Output = &'static str;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        match input.strip_prefix(self.literal) {
            Some(rest) => Ok((self.literal, rest)),
            None => Err(Failure::new(
                Expected::one(format!("'{}'", self.literal)),
                input,
            )),
        }
    }
}

/// Match the leading substring accepted by an anchored regex.
///
/// `description` is what failure reports instead of the raw pattern text.
pub fn pattern(regex: &'static Regex, description: &'static str) -> Pattern {
    Pattern { regex, description }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    regex: &'static Regex,
    description: &'static str,
}

impl Parse for Pattern {
    type Output = String;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        match self.regex.find(input) {
            // patterns are anchored; a match elsewhere is no match here
            Some(found) if found.start() == 0 => {
                Ok((found.as_str().to_string(), &input[found.end()..]))
            }
            _ => Err(Failure::new(Expected::one(self.description), input)),
        }
    }
}

static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+").expect("integer pattern is valid"));

static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?([0-9]+(\.[0-9]*)?|\.[0-9]+)").expect("float pattern is valid"));

/// Match an unsigned decimal integer literal.
pub fn integer() -> Integer {
    Integer
}

#[derive(Debug, Clone, Copy)]
pub struct Integer;

impl Parse for Integer {
    type Output = i64;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let fail = || Failure::new(Expected::one("integer"), input);
        let found = INTEGER_RE.find(input).filter(|m| m.start() == 0).ok_or_else(fail)?;
        let value = found.as_str().parse::<i64>().map_err(|_| fail())?;
        Ok((value, &input[found.end()..]))
    }
}

/// Match a float literal: optional sign, digits with an optional fraction,
/// or a leading-dot fraction.
pub fn float() -> Float {
    Float
}

#[derive(Debug, Clone, Copy)]
pub struct Float;

impl Parse for Float {
    type Output = f64;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        let fail = || Failure::new(Expected::one("float"), input);
        let found = FLOAT_RE.find(input).filter(|m| m.start() == 0).ok_or_else(fail)?;
        let value = found.as_str().parse::<f64>().map_err(|_| fail())?;
        Ok((value, &input[found.end()..]))
    }
}

/// Succeed without consuming anything.
///
/// Mostly useful to hang a leading [`Parse::space`] off of.
pub fn empty() -> Empty {
    Empty
}

#[derive(Debug, Clone, Copy)]
pub struct Empty;

impl Parse for Empty {
    type Output = ();

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, Self::Output> {
        Ok(((), input))
    }
}

/// A plain parse function, for self- and mutually-recursive grammar rules.
pub type ParseFn<T> = for<'a> fn(&'a str) -> PResult<'a, T>;

/// Wrap a plain function as a parser.
///
/// Grammar rules written as ordinary functions can refer to each other
/// freely; wrapping them with `rule` defers the call, so recursive rules
/// need no forward declarations or shared mutable state.
pub fn rule<T>(f: ParseFn<T>) -> Rule<T> {
    Rule { f }
}

#[derive(Debug)]
pub struct Rule<T> {
    f: ParseFn<T>,
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        Self { f: self.f }
    }
}

impl<T> Parse for Rule<T> {
    type Output = T;

    fn parse<'a>(&self, input: &'a str) -> PResult<'a, T> {
        (self.f)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_match_and_failure() {
        let hash = literal("#");
        assert_eq!(hash.parse("#rest"), Ok(("#", "rest")));

        let failure = hash.parse("rest").unwrap_err();
        assert!(failure.expected.contains("'#'"));
        assert_eq!(failure.rest, "rest");
        assert!(!failure.committed);
    }

    #[test]
    fn test_or_unions_expected_sets_of_all_branches() {
        let parser = literal("&").or(literal("|")).or(literal("^"));

        let failure = parser.parse("x").unwrap_err();
        let expected: Vec<_> = failure.expected.iter().collect();
        assert_eq!(expected, vec!["'&'", "'^'", "'|'"]);
        assert_eq!(failure.rest, "x");
    }

    #[test]
    fn test_or_backtracks_to_original_input() {
        // "ab" fails after consuming would-be progress; "a" must still see
        // the full input
        let parser = literal("ab").map(|_| "long").or(literal("a").map(|_| "short"));
        assert_eq!(parser.parse("ax"), Ok(("short", "x")));
    }

    #[test]
    fn test_and_sequences_and_stops_at_first_failure() {
        let parser = literal("a").and(literal("b"));
        assert_eq!(parser.parse("abc"), Ok((("a", "b"), "c")));

        let failure = parser.parse("ax").unwrap_err();
        assert!(failure.expected.contains("'b'"));
        assert_eq!(failure.rest, "x");
    }

    #[test]
    fn test_many_collects_and_never_fails() {
        let parser = literal("a").many();
        assert_eq!(parser.parse("aaab"), Ok((vec!["a", "a", "a"], "b")));
        assert_eq!(parser.parse("b"), Ok((vec![], "b")));
    }

    #[test]
    fn test_some_requires_at_least_one() {
        let parser = literal("a").some();
        assert_eq!(parser.parse("aab"), Ok((vec!["a", "a"], "b")));
        assert!(parser.parse("b").is_err());
    }

    #[test]
    fn test_space_consumes_only_ascii_spaces() {
        let parser = literal("a").space();
        assert_eq!(parser.parse("a   b"), Ok(("a", "b")));
        // tabs are not spaces
        assert_eq!(parser.parse("a\tb"), Ok(("a", "\tb")));
    }

    #[test]
    fn test_optional_substitutes_default_without_consuming() {
        let parser = literal("a").map(|_| 1).optional(0);
        assert_eq!(parser.parse("ab"), Ok((1, "b")));
        assert_eq!(parser.parse("b"), Ok((0, "b")));
    }

    #[test]
    fn test_complete_requires_all_input_consumed() {
        let parser = literal("a").complete();
        assert_eq!(parser.parse("a"), Ok(("a", "")));

        let failure = parser.parse("ab").unwrap_err();
        assert!(failure.expected.contains("<eof>"));
        assert_eq!(failure.rest, "b");
    }

    #[test]
    fn test_between_keeps_only_the_body_value() {
        let parser = literal("x").between(literal("(").space(), literal(")"));
        assert_eq!(parser.parse("( x)rest"), Ok(("x", "rest")));
    }

    #[test]
    fn test_between_commits_after_the_opening_delimiter() {
        let parser = literal("x")
            .between(literal("("), literal(")"))
            .optional("default");

        // no opening delimiter: optional backtracks
        assert_eq!(parser.parse("y"), Ok(("default", "y")));

        // opening delimiter without closing: the failure must survive
        // the enclosing optional
        let failure = parser.parse("(x").unwrap_err();
        assert!(failure.committed);
        assert!(failure.expected.contains("')'"));
    }

    #[test]
    fn test_cut_aborts_alternation() {
        let parser = literal("a").and(literal("b")).cut().or(literal("a").and(literal("c")));

        let failure = parser.parse("ac").unwrap_err();
        assert!(failure.committed);
        assert!(failure.expected.contains("'b'"));
    }

    #[test]
    fn test_describe_overrides_expected() {
        let parser = literal("==").or(literal("<")).describe(&["range operator"]);

        let failure = parser.parse("x").unwrap_err();
        let expected: Vec<_> = failure.expected.iter().collect();
        assert_eq!(expected, vec!["range operator"]);
    }

    #[test]
    fn test_integer_parses_digits() {
        assert_eq!(integer().parse("10-3"), Ok((10, "-3")));
        assert!(integer().parse("x").is_err());
        assert!(integer().parse("-1").is_err());
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(float().parse("2 "), Ok((2.0, " ")));
        assert_eq!(float().parse("2.5]"), Ok((2.5, "]")));
        assert_eq!(float().parse(".5"), Ok((0.5, "")));
        assert_eq!(float().parse("-1.5"), Ok((-1.5, "")));
        assert_eq!(float().parse("+2."), Ok((2.0, "")));
        assert!(float().parse("x").is_err());
    }

    #[test]
    fn test_map_transforms_success_only() {
        let parser = integer().map(|n| n * 2);
        assert_eq!(parser.parse("21"), Ok((42, "")));
        assert!(parser.parse("x").is_err());
    }

    #[test]
    fn test_empty_consumes_nothing() {
        assert_eq!(empty().parse("abc"), Ok(((), "abc")));
        assert_eq!(empty().space().parse("  abc"), Ok(((), "abc")));
    }
}
