//! `Matcher`: ordered rules, first match wins.

use crate::{EvalStep, EvalTrace, FieldRule, MatcherError, Outcome, OutcomeTrace, MAX_DEPTH};
use std::fmt;

/// A decision tree: field rules evaluated in order, plus an optional fallback.
///
/// Immutable once built. Depth is validated in [`new`](Self::new) and never
/// again, so a `Matcher` that exists is always within [`MAX_DEPTH`].
///
/// # Evaluation
///
/// 1. Rules are tried in order. The first rule whose predicate holds
///    resolves its [`Outcome`].
/// 2. An action is returned immediately.
/// 3. A nested tree is evaluated with the same context. If it decides, that
///    decision is returned. If it does not, evaluation moves on to the
///    **next rule**; it does not jump to this tree's fallback.
/// 4. When no rule decides, the fallback is resolved the same way. Without
///    a fallback the result is `None` ("no decision").
///
/// ```
/// use gavel::{FieldRule, Matcher, Outcome, Predicate, StringMatcher, Extractor, Value};
///
/// #[derive(Debug)]
/// struct User { name: String }
///
/// #[derive(Debug)]
/// struct NameInput;
/// impl Extractor<User> for NameInput {
///     fn extract(&self, ctx: &User) -> Value { ctx.name.as_str().into() }
/// }
///
/// let rule = |name: &str, role: &'static str| FieldRule::new(
///     Predicate::single(Box::new(NameInput), Box::new(StringMatcher::exact(name, false))),
///     Outcome::action(role),
/// );
///
/// let m = Matcher::new(
///     vec![rule("alice", "admin"), rule("bob", "user")],
///     Some(Outcome::action("guest")),
/// )?;
///
/// assert_eq!(m.evaluate(&User { name: "bob".into() }), Some("user"));
/// assert_eq!(m.evaluate(&User { name: "eve".into() }), Some("guest"));
/// # Ok::<(), gavel::MatcherError>(())
/// ```
pub struct Matcher<Ctx, A> {
    rules: Vec<FieldRule<Ctx, A>>,
    fallback: Option<Outcome<Ctx, A>>,
}

impl<Ctx, A> Matcher<Ctx, A> {
    /// Build a tree, rejecting it if it nests deeper than [`MAX_DEPTH`].
    ///
    /// # Errors
    ///
    /// [`MatcherError::DepthExceeded`].
    pub fn new(
        rules: Vec<FieldRule<Ctx, A>>,
        fallback: Option<Outcome<Ctx, A>>,
    ) -> Result<Self, MatcherError> {
        let matcher = Self { rules, fallback };
        let depth = matcher.depth();
        if depth > MAX_DEPTH {
            return Err(MatcherError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(matcher)
    }

    /// No rules and no fallback: always "no decision".
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            fallback: None,
        }
    }

    /// Nesting depth.
    ///
    /// `1 + max` over every rule of `max(predicate depth, nested depth)`,
    /// with the fallback's nested depth included. Predicate nesting and tree
    /// nesting are combined with `max`, not added.
    #[must_use]
    pub fn depth(&self) -> usize {
        let rules = self.rules.iter().map(FieldRule::depth).max().unwrap_or(0);
        let fallback = self.fallback.as_ref().map_or(0, Outcome::depth);
        1 + rules.max(fallback)
    }

    /// The rules, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule<Ctx, A>] {
        &self.rules
    }

    /// The fallback outcome.
    #[must_use]
    pub fn fallback(&self) -> Option<&Outcome<Ctx, A>> {
        self.fallback.as_ref()
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` when there are no rules (a fallback may still exist).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a fallback is configured.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl<Ctx, A: Clone> Matcher<Ctx, A> {
    /// Decide for `ctx`, or `None` for "no decision".
    ///
    /// Pure: no I/O, no mutation, same answer for the same context.
    pub fn evaluate(&self, ctx: &Ctx) -> Option<A> {
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.matches(ctx) {
                continue;
            }
            if let Some(action) = rule.outcome().resolve(ctx) {
                tracing::trace!(rule = index, "rule decided");
                return Some(action);
            }
            tracing::trace!(rule = index, "nested matcher made no decision, continuing");
        }

        let fallback = self.fallback.as_ref()?;
        tracing::trace!("no rule decided, resolving fallback");
        fallback.resolve(ctx)
    }

    /// Evaluate and record the path taken.
    ///
    /// Predicates are traced without short-circuit; rules are not: the
    /// trace stops at the deciding rule exactly as [`evaluate`](Self::evaluate)
    /// does.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &Ctx) -> EvalTrace<A> {
        let mut steps = Vec::new();

        for (index, rule) in self.rules.iter().enumerate() {
            let predicate = rule.predicate().evaluate_with_trace(ctx);
            if !predicate.matched() {
                steps.push(EvalStep {
                    index,
                    predicate,
                    outcome: None,
                });
                continue;
            }

            let outcome = rule.outcome().resolve_with_trace(ctx);
            let result = match &outcome {
                OutcomeTrace::Action(a) => Some(a.clone()),
                OutcomeTrace::Nested(t) => t.result.clone(),
            };
            steps.push(EvalStep {
                index,
                predicate,
                outcome: Some(outcome),
            });
            if result.is_some() {
                return EvalTrace {
                    result,
                    steps,
                    fallback: None,
                };
            }
        }

        let fallback = self.fallback.as_ref().map(|f| f.resolve_with_trace(ctx));
        let result = match &fallback {
            Some(OutcomeTrace::Action(a)) => Some(a.clone()),
            Some(OutcomeTrace::Nested(t)) => t.result.clone(),
            None => None,
        };
        EvalTrace {
            result,
            steps,
            fallback,
        }
    }
}

impl<Ctx, A: fmt::Debug> fmt::Debug for Matcher<Ctx, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("rules", &self.rules)
            .field("fallback", &self.fallback)
            .finish()
    }
}
