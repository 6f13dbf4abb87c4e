//! Serializable tree configuration.
//!
//! Same shape as the runtime tree, with ports replaced by [`TypedConfig`]
//! references that a [`Registry`](crate::Registry) resolves at load time.
//!
//! ```yaml
//! rules:
//!   - predicate:
//!       single:
//!         input: { type_url: gavel.test.v1.KeyInput, config: { key: user } }
//!         value_match: { exact: alice, ignore_case: true }
//!     outcome: { action: admin }
//!   - predicate:
//!       and:
//!         - single: { input: { type_url: ... }, custom_match: { type_url: ..., config: ... } }
//!         - not: { single: { ... } }
//!     outcome:
//!       nested: { rules: [ ... ], fallback: { action: deny } }
//! fallback: { action: guest }
//! ```
//!
//! | Config | Runtime |
//! |--------|---------|
//! | [`MatcherConfig`] | [`Matcher`](crate::Matcher) |
//! | [`FieldRuleConfig`] | [`FieldRule`](crate::FieldRule) |
//! | [`PredicateConfig`] | [`Predicate`](crate::Predicate) |
//! | [`SinglePredicateConfig`] | [`SinglePredicate`](crate::SinglePredicate) |
//! | [`OutcomeConfig`] | [`Outcome`](crate::Outcome) |

use crate::StringMatchSpec;
use serde::{Deserialize, Serialize};

/// A whole tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct MatcherConfig<A> {
    /// Rules in evaluation order.
    pub rules: Vec<FieldRuleConfig<A>>,

    /// Resolved when no rule decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<OutcomeConfig<A>>,
}

/// One rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub struct FieldRuleConfig<A> {
    /// Condition.
    pub predicate: PredicateConfig,
    /// Result when the condition holds.
    pub outcome: OutcomeConfig<A>,
}

/// A predicate node, keyed by its kind: `single`, `and`, `or` or `not`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateConfig {
    /// Extract and match.
    Single(SinglePredicateConfig),
    /// Every child holds.
    And(Vec<PredicateConfig>),
    /// Some child holds.
    Or(Vec<PredicateConfig>),
    /// The child does not hold.
    Not(Box<PredicateConfig>),
}

/// An extractor reference plus how to match what it extracts.
///
/// On the wire the matcher is either `value_match` (a built-in string match)
/// or `custom_match` (a registered matcher). Exactly one must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSinglePredicate", into = "RawSinglePredicate")]
pub struct SinglePredicateConfig {
    /// Extractor to resolve through the registry.
    pub input: TypedConfig,
    /// Matcher to pair it with.
    pub matcher: ValueMatchConfig,
}

/// The matcher half of a [`SinglePredicateConfig`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueMatchConfig {
    /// One of the built-in string matchers.
    BuiltIn(StringMatchSpec),
    /// A matcher registered under a type URL.
    Custom(TypedConfig),
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSinglePredicate {
    input: TypedConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_match: Option<StringMatchSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_match: Option<TypedConfig>,
}

impl TryFrom<RawSinglePredicate> for SinglePredicateConfig {
    type Error = &'static str;

    fn try_from(raw: RawSinglePredicate) -> Result<Self, Self::Error> {
        let matcher = match (raw.value_match, raw.custom_match) {
            (Some(spec), None) => ValueMatchConfig::BuiltIn(spec),
            (None, Some(typed)) => ValueMatchConfig::Custom(typed),
            (Some(_), Some(_)) => {
                return Err("single predicate has both value_match and custom_match")
            }
            (None, None) => return Err("single predicate needs value_match or custom_match"),
        };
        Ok(Self {
            input: raw.input,
            matcher,
        })
    }
}

impl From<SinglePredicateConfig> for RawSinglePredicate {
    fn from(config: SinglePredicateConfig) -> Self {
        let (value_match, custom_match) = match config.matcher {
            ValueMatchConfig::BuiltIn(spec) => (Some(spec), None),
            ValueMatchConfig::Custom(typed) => (None, Some(typed)),
        };
        Self {
            input: config.input,
            value_match,
            custom_match,
        }
    }
}

/// A reference to a registered type and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypedConfig {
    /// Identifier the factory was registered under.
    pub type_url: String,

    /// Payload handed to the factory. Defaults to `{}`.
    #[serde(default = "empty_object")]
    pub config: serde_json::Value,
}

impl TypedConfig {
    /// Reference `type_url` with an empty payload.
    #[must_use]
    pub fn new(type_url: impl Into<String>) -> Self {
        Self {
            type_url: type_url.into(),
            config: empty_object(),
        }
    }

    /// Reference `type_url` with `config` as payload.
    #[must_use]
    pub fn with_config(type_url: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            type_url: type_url.into(),
            config,
        }
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Payload for types that take no parameters. Accepts and ignores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}

/// An outcome: `{ action: ... }` or `{ nested: { rules, fallback } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(bound(deserialize = "A: Deserialize<'de>", serialize = "A: Serialize"))]
pub enum OutcomeConfig<A> {
    /// Terminal action.
    Action(A),
    /// Nested tree.
    Nested(Box<MatcherConfig<A>>),
}
