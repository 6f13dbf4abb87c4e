//! Predicates: boolean composition over extractor + matcher pairs.

use crate::{Extractor, PredicateTrace, Value, ValueMatcher};
use std::fmt;

/// One extractor paired with one matcher.
///
/// This is where the domain-specific half (extraction) meets the
/// domain-agnostic half (matching).
///
/// # Absence is false
///
/// When the extractor returns [`Value::None`] the predicate is `false` and the
/// matcher is never called, whatever it would have answered.
pub struct SinglePredicate<Ctx> {
    input: Box<dyn Extractor<Ctx>>,
    matcher: Box<dyn ValueMatcher>,
}

impl<Ctx> SinglePredicate<Ctx> {
    /// Pair an extractor with a matcher.
    #[must_use]
    pub fn new(input: Box<dyn Extractor<Ctx>>, matcher: Box<dyn ValueMatcher>) -> Self {
        Self { input, matcher }
    }

    /// The extraction half.
    #[must_use]
    pub fn input(&self) -> &dyn Extractor<Ctx> {
        &*self.input
    }

    /// The matching half.
    #[must_use]
    pub fn matcher(&self) -> &dyn ValueMatcher {
        &*self.matcher
    }

    /// Extract, then match.
    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        match self.input.extract(ctx) {
            Value::None => false,
            value => self.matcher.matches(&value),
        }
    }

    /// Like [`evaluate`](Self::evaluate), recording what was extracted.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> PredicateTrace {
        let value = self.input.extract(ctx);
        let matched = !value.is_none() && self.matcher.matches(&value);
        PredicateTrace::Single {
            matched,
            input: format!("{:?}", self.input),
            value: format!("{value:?}"),
            matcher: format!("{:?}", self.matcher),
        }
    }
}

impl<Ctx> fmt::Debug for SinglePredicate<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinglePredicate")
            .field("input", &self.input)
            .field("matcher", &self.matcher)
            .finish()
    }
}

/// A boolean expression tree.
///
/// Children are owned exclusively, so a predicate is always a finite tree.
///
/// | Variant | Result | Empty |
/// |---------|--------|-------|
/// | `And` | every child true, left to right, stops at first false | `true` |
/// | `Or` | some child true, left to right, stops at first true | `false` |
/// | `Not` | negation | n/a |
pub enum Predicate<Ctx> {
    /// Extract and match.
    Single(SinglePredicate<Ctx>),
    /// Conjunction.
    And(Vec<Predicate<Ctx>>),
    /// Disjunction.
    Or(Vec<Predicate<Ctx>>),
    /// Negation.
    Not(Box<Predicate<Ctx>>),
}

impl<Ctx> Predicate<Ctx> {
    /// Shorthand for `Predicate::Single(SinglePredicate::new(input, matcher))`.
    #[must_use]
    pub fn single(input: Box<dyn Extractor<Ctx>>, matcher: Box<dyn ValueMatcher>) -> Self {
        Self::Single(SinglePredicate::new(input, matcher))
    }

    /// Shorthand for `Predicate::Not(Box::new(inner))`.
    #[must_use]
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Evaluate against `ctx`, short-circuiting `And` / `Or`.
    ///
    /// Recursion is bounded by [`MAX_DEPTH`](crate::MAX_DEPTH), which every
    /// [`Matcher`](crate::Matcher) enforces at construction.
    pub fn evaluate(&self, ctx: &Ctx) -> bool {
        match self {
            Self::Single(p) => p.evaluate(ctx),
            Self::And(ps) => ps.iter().all(|p| p.evaluate(ctx)),
            Self::Or(ps) => ps.iter().any(|p| p.evaluate(ctx)),
            Self::Not(p) => !p.evaluate(ctx),
        }
    }

    /// Evaluate every node and record the outcome of each.
    ///
    /// No short-circuit, so the trace shows every child; the top-level
    /// `matched()` still equals [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> PredicateTrace {
        match self {
            Self::Single(p) => p.evaluate_with_trace(ctx),
            Self::And(ps) => {
                let children: Vec<_> = ps.iter().map(|p| p.evaluate_with_trace(ctx)).collect();
                PredicateTrace::And {
                    matched: children.iter().all(PredicateTrace::matched),
                    children,
                }
            }
            Self::Or(ps) => {
                let children: Vec<_> = ps.iter().map(|p| p.evaluate_with_trace(ctx)).collect();
                PredicateTrace::Or {
                    matched: children.iter().any(PredicateTrace::matched),
                    children,
                }
            }
            Self::Not(p) => {
                let inner = p.evaluate_with_trace(ctx);
                PredicateTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
        }
    }

    /// Nesting depth: 1 for a single predicate, 1 + child for `Not`,
    /// 1 + deepest child (0 when empty) for `And` / `Or`.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::And(ps) | Self::Or(ps) => 1 + ps.iter().map(Self::depth).max().unwrap_or(0),
            Self::Not(p) => 1 + p.depth(),
        }
    }

    /// AND-combine, collapsing the trivial cases.
    ///
    /// Empty yields `catch_all`, one predicate is returned as is, more become
    /// an `And`. Domain compilers use this when a rule has optional conditions.
    #[must_use]
    pub fn all_of(predicates: Vec<Self>, catch_all: Self) -> Self {
        Self::collapse(predicates, catch_all, Self::And)
    }

    /// OR-combine, collapsing the trivial cases like [`all_of`](Self::all_of).
    #[must_use]
    pub fn any_of(predicates: Vec<Self>, catch_all: Self) -> Self {
        Self::collapse(predicates, catch_all, Self::Or)
    }

    fn collapse(mut predicates: Vec<Self>, catch_all: Self, wrap: fn(Vec<Self>) -> Self) -> Self {
        match predicates.len() {
            0 => catch_all,
            1 => predicates.pop().unwrap_or(catch_all),
            _ => wrap(predicates),
        }
    }
}

impl<Ctx> fmt::Debug for Predicate<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(p) => f.debug_tuple("Single").field(p).finish(),
            Self::And(ps) => f.debug_tuple("And").field(ps).finish(),
            Self::Or(ps) => f.debug_tuple("Or").field(ps).finish(),
            Self::Not(p) => f.debug_tuple("Not").field(p).finish(),
        }
    }
}
