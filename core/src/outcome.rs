//! `Outcome`: what a matching rule (or the fallback) leads to.

use crate::{Matcher, OutcomeTrace};
use std::fmt;

/// Either a terminal action or a nested tree, never both.
///
/// The enum makes the exclusivity structural: there is no way to build an
/// outcome that carries an action *and* a nested matcher.
pub enum Outcome<Ctx, A> {
    /// Stop and return this action.
    Action(A),
    /// Continue into a nested tree with the same context.
    Nested(Box<Matcher<Ctx, A>>),
}

impl<Ctx, A> Outcome<Ctx, A> {
    /// Terminal action.
    #[must_use]
    pub fn action(action: A) -> Self {
        Self::Action(action)
    }

    /// Nested tree.
    #[must_use]
    pub fn nested(matcher: Matcher<Ctx, A>) -> Self {
        Self::Nested(Box::new(matcher))
    }

    /// Whether this is a terminal action.
    #[must_use]
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    /// The action, if terminal.
    #[must_use]
    pub fn as_action(&self) -> Option<&A> {
        match self {
            Self::Action(a) => Some(a),
            Self::Nested(_) => None,
        }
    }

    /// The nested tree, if any.
    #[must_use]
    pub fn as_nested(&self) -> Option<&Matcher<Ctx, A>> {
        match self {
            Self::Action(_) => None,
            Self::Nested(m) => Some(m),
        }
    }

    /// Depth contributed by this outcome: 0 for an action, the nested tree's
    /// depth otherwise.
    pub(crate) fn depth(&self) -> usize {
        self.as_nested().map_or(0, Matcher::depth)
    }
}

impl<Ctx, A: Clone> Outcome<Ctx, A> {
    /// Action for terminals, nested evaluation otherwise.
    pub(crate) fn resolve(&self, ctx: &Ctx) -> Option<A> {
        match self {
            Self::Action(a) => Some(a.clone()),
            Self::Nested(m) => m.evaluate(ctx),
        }
    }

    pub(crate) fn resolve_with_trace(&self, ctx: &Ctx) -> OutcomeTrace<A> {
        match self {
            Self::Action(a) => OutcomeTrace::Action(a.clone()),
            Self::Nested(m) => OutcomeTrace::Nested(Box::new(m.evaluate_with_trace(ctx))),
        }
    }
}

impl<Ctx, A: fmt::Debug> fmt::Debug for Outcome<Ctx, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(a) => f.debug_tuple("Action").field(a).finish(),
            Self::Nested(m) => f.debug_tuple("Nested").field(m).finish(),
        }
    }
}
