//! `FieldRule`: a predicate and the outcome it leads to.

use crate::{Outcome, Predicate};
use std::fmt;

/// One entry in a [`Matcher`](crate::Matcher): when `predicate` holds,
/// resolve `outcome`.
pub struct FieldRule<Ctx, A> {
    predicate: Predicate<Ctx>,
    outcome: Outcome<Ctx, A>,
}

impl<Ctx, A> FieldRule<Ctx, A> {
    /// Pair a predicate with an outcome.
    #[must_use]
    pub fn new(predicate: Predicate<Ctx>, outcome: Outcome<Ctx, A>) -> Self {
        Self { predicate, outcome }
    }

    /// The condition.
    #[must_use]
    pub fn predicate(&self) -> &Predicate<Ctx> {
        &self.predicate
    }

    /// What happens when the condition holds.
    #[must_use]
    pub fn outcome(&self) -> &Outcome<Ctx, A> {
        &self.outcome
    }

    /// Whether the predicate holds for `ctx`.
    pub fn matches(&self, ctx: &Ctx) -> bool {
        self.predicate.evaluate(ctx)
    }

    pub(crate) fn depth(&self) -> usize {
        self.predicate.depth().max(self.outcome.depth())
    }
}

impl<Ctx, A: fmt::Debug> fmt::Debug for FieldRule<Ctx, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("predicate", &self.predicate)
            .field("outcome", &self.outcome)
            .finish()
    }
}
