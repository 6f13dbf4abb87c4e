//! gavel: a domain-agnostic rule-matching and policy-decision kernel.
//!
//! Describe *how to pull a value out of your context* once, and decide with
//! ordered, nestable rule trees built in code or loaded from configuration.
//!
//! # Architecture
//!
//! - [`Value`]: type-erased extracted value (string, int, bool, bytes, extension)
//! - [`Extractor<Ctx>`]: domain-specific extraction, returns a `Value`
//! - [`ValueMatcher`]: domain-agnostic test on a `Value` (non-generic, reusable)
//! - [`SinglePredicate<Ctx>`]: an extractor paired with a matcher
//! - [`Predicate<Ctx>`]: `And` / `Or` / `Not` composition
//! - [`Matcher<Ctx, A>`]: ordered [`FieldRule`]s with an optional fallback, first match wins
//! - [`Registry<Ctx>`]: type URL → factory, turns [`MatcherConfig`] into a live `Matcher`
//!
//! Two invariants hold everywhere:
//!
//! 1. An extractor returning [`Value::None`] makes its predicate `false`;
//!    the matcher is not consulted.
//! 2. Every `Matcher` that exists nests no deeper than [`MAX_DEPTH`]; the
//!    check runs once, in [`Matcher::new`].
//!
//! # Example
//!
//! ```
//! use gavel::prelude::*;
//!
//! #[derive(Debug)]
//! struct Request { path: String }
//!
//! #[derive(Debug)]
//! struct PathInput;
//!
//! impl Extractor<Request> for PathInput {
//!     fn extract(&self, ctx: &Request) -> Value {
//!         ctx.path.as_str().into()
//!     }
//! }
//!
//! let matcher: Matcher<Request, &str> = Matcher::new(
//!     vec![FieldRule::new(
//!         Predicate::single(Box::new(PathInput), Box::new(StringMatcher::prefix("/api", false))),
//!         Outcome::action("api"),
//!     )],
//!     Some(Outcome::action("static")),
//! )?;
//!
//! assert_eq!(matcher.evaluate(&Request { path: "/api/users".into() }), Some("api"));
//! assert_eq!(matcher.evaluate(&Request { path: "/ap".into() }), Some("static"));
//! # Ok::<(), gavel::MatcherError>(())
//! ```

mod error;
mod extractor;
mod field_rule;
mod matcher;
mod outcome;
mod predicate;
mod string_match;
mod trace;
mod value;
mod value_matcher;

pub mod config;
pub mod registry;

pub use error::MatcherError;
pub use extractor::Extractor;
pub use field_rule::FieldRule;
pub use matcher::Matcher;
pub use outcome::Outcome;
pub use predicate::{Predicate, SinglePredicate};
pub use string_match::{StringMatchSpec, StringPattern};
pub use trace::{EvalStep, EvalTrace, OutcomeTrace, PredicateTrace};
pub use value::{ExtensionValue, Value};
pub use value_matcher::{BoolMatcher, BoolMatcherConfig, Literal, StringMatcher, ValueMatcher};

pub use config::{
    FieldRuleConfig, MatcherConfig, OutcomeConfig, PredicateConfig, SinglePredicateConfig,
    TypedConfig, UnitConfig, ValueMatchConfig,
};
pub use registry::{
    register_core_matchers, ActionRegistry, ActionRegistryBuilder, IntoAction, IntoExtractor,
    IntoValueMatcher, Registry, RegistryBuilder, StringAction,
};

/// Everything needed to build and evaluate trees by hand.
pub mod prelude {
    pub use crate::{
        BoolMatcher, EvalTrace, Extractor, FieldRule, Matcher, MatcherError, Outcome, Predicate,
        PredicateTrace, SinglePredicate, StringMatcher, Value, ValueMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Limits
// ═══════════════════════════════════════════════════════════════════════════════

/// Deepest nesting a [`Matcher`] may have, counting predicate nesting and
/// nested trees (see [`Matcher::depth`]).
pub const MAX_DEPTH: usize = 32;

/// Most rules one tree may hold when loaded from configuration.
///
/// Width is not bounded by [`MAX_DEPTH`], so it gets its own ceiling.
pub const MAX_FIELD_RULES: usize = 256;

/// Most children of one `and` / `or` when loaded from configuration.
pub const MAX_PREDICATES_PER_COMPOUND: usize = 256;

/// Longest literal pattern (exact, prefix, suffix, contains), in bytes.
pub const MAX_PATTERN_LENGTH: usize = 8192;

/// Longest regular expression, in bytes.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

/// Compiled-program size limit handed to the regex builder.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;
