//! Evaluation traces.
//!
//! Shaped like the runtime tree but holding results instead of ports.
//! [`Matcher::evaluate_with_trace`](crate::Matcher::evaluate_with_trace)
//! produces an [`EvalTrace`] whose `result` always equals what
//! [`Matcher::evaluate`](crate::Matcher::evaluate) returns for the same context.

use std::fmt;

/// Result of evaluating one [`Predicate`](crate::Predicate).
///
/// `And` / `Or` record every child: tracing does not short-circuit.
#[derive(Clone, PartialEq, Eq)]
pub enum PredicateTrace {
    /// Extract and match.
    Single {
        /// Outcome.
        matched: bool,
        /// Debug rendering of the extractor.
        input: String,
        /// Debug rendering of the extracted [`Value`](crate::Value).
        value: String,
        /// Debug rendering of the matcher.
        matcher: String,
    },
    /// Conjunction.
    And {
        /// Outcome.
        matched: bool,
        /// Every child, in order.
        children: Vec<PredicateTrace>,
    },
    /// Disjunction.
    Or {
        /// Outcome.
        matched: bool,
        /// Every child, in order.
        children: Vec<PredicateTrace>,
    },
    /// Negation.
    Not {
        /// Outcome (the inverse of `inner`).
        matched: bool,
        /// The negated predicate.
        inner: Box<PredicateTrace>,
    },
}

impl PredicateTrace {
    /// Outcome of this node.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Single { matched, .. }
            | Self::And { matched, .. }
            | Self::Or { matched, .. }
            | Self::Not { matched, .. } => *matched,
        }
    }
}

impl fmt::Debug for PredicateTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single {
                matched,
                input,
                value,
                matcher,
            } => write!(f, "{input} -> {value} ~ {matcher} = {matched}"),
            Self::And { matched, children } => f
                .debug_struct("And")
                .field("matched", matched)
                .field("children", children)
                .finish(),
            Self::Or { matched, children } => f
                .debug_struct("Or")
                .field("matched", matched)
                .field("children", children)
                .finish(),
            Self::Not { matched, inner } => f
                .debug_struct("Not")
                .field("matched", matched)
                .field("inner", inner)
                .finish(),
        }
    }
}

/// Result of evaluating a whole [`Matcher`](crate::Matcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalTrace<A> {
    /// The decision, identical to `evaluate()`.
    pub result: Option<A>,
    /// Rules visited, in order. Ends at the rule that decided, if any.
    pub steps: Vec<EvalStep<A>>,
    /// Fallback resolution, when no rule decided and a fallback exists.
    pub fallback: Option<OutcomeTrace<A>>,
}

impl<A> EvalTrace<A> {
    /// Whether the decision (or lack of one) came from the fallback.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Index of the rule that produced the decision, if a rule did.
    #[must_use]
    pub fn decided_by(&self) -> Option<usize> {
        self.steps
            .last()
            .filter(|step| step.outcome.as_ref().is_some_and(OutcomeTrace::decided))
            .map(|step| step.index)
    }
}

/// One field rule as visited during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalStep<A> {
    /// Position of the rule (0-based).
    pub index: usize,
    /// Predicate result and detail.
    pub predicate: PredicateTrace,
    /// How the outcome resolved. `None` when the predicate did not match.
    pub outcome: Option<OutcomeTrace<A>>,
}

impl<A> EvalStep<A> {
    /// Whether the rule's predicate matched.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.predicate.matched()
    }
}

/// How an [`Outcome`](crate::Outcome) resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeTrace<A> {
    /// A terminal action.
    Action(A),
    /// A nested tree, traced recursively.
    Nested(Box<EvalTrace<A>>),
}

impl<A> OutcomeTrace<A> {
    /// Whether this outcome produced a decision.
    #[must_use]
    pub fn decided(&self) -> bool {
        match self {
            Self::Action(_) => true,
            Self::Nested(trace) => trace.result.is_some(),
        }
    }
}
