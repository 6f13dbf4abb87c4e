//! Extension registry: type URL → factory → live port.
//!
//! Each extractor or matcher type describes how to build itself from a
//! payload ([`IntoExtractor`], [`IntoValueMatcher`]). Registering it under a
//! type URL monomorphizes that knowledge into a boxed closure; loading a
//! [`MatcherConfig`] looks the closures up by URL and never sees the concrete
//! types again.
//!
//! | Port | Trait | Builder method |
//! |------|-------|----------------|
//! | extractor | [`IntoExtractor`] | [`RegistryBuilder::extractor`] |
//! | matcher | [`IntoValueMatcher`] | [`RegistryBuilder::matcher`] |
//! | action | [`IntoAction`] | [`ActionRegistryBuilder::action`] |
//!
//! Actions live in their own [`ActionRegistry<A>`] because `A` is chosen per
//! load call, not when the `Registry<Ctx>` is built.
//!
//! ```
//! use gavel::{register_core_matchers, Extractor, MatcherConfig, RegistryBuilder, UnitConfig, Value};
//! use gavel::registry::IntoExtractor;
//!
//! #[derive(Debug)]
//! struct Path(String);
//!
//! #[derive(Debug)]
//! struct PathInput;
//! impl Extractor<Path> for PathInput {
//!     fn extract(&self, ctx: &Path) -> Value { ctx.0.as_str().into() }
//! }
//! impl IntoExtractor<Path> for PathInput {
//!     type Config = UnitConfig;
//!     fn from_config(_: UnitConfig) -> Result<Box<dyn Extractor<Path>>, gavel::MatcherError> {
//!         Ok(Box::new(PathInput))
//!     }
//! }
//!
//! let registry = register_core_matchers(RegistryBuilder::new())
//!     .extractor::<PathInput>("example.PathInput")
//!     .build();
//!
//! let config: MatcherConfig<String> = serde_json::from_str(r#"{
//!     "rules": [{
//!         "predicate": { "single": {
//!             "input": { "type_url": "example.PathInput" },
//!             "value_match": { "prefix": "/api" }
//!         }},
//!         "outcome": { "action": "api" }
//!     }],
//!     "fallback": { "action": "static" }
//! }"#)?;
//!
//! let matcher = registry.load_matcher(config)?;
//! assert_eq!(matcher.evaluate(&Path("/api/users".into())), Some("api".to_string()));
//! assert_eq!(matcher.evaluate(&Path("/index.html".into())), Some("static".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{
    FieldRuleConfig, MatcherConfig, OutcomeConfig, PredicateConfig, SinglePredicateConfig,
    TypedConfig, ValueMatchConfig,
};
use crate::{
    Extractor, FieldRule, Matcher, MatcherError, Outcome, Predicate, SinglePredicate,
    ValueMatcher, MAX_FIELD_RULES, MAX_PREDICATES_PER_COMPOUND,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Construction traits
// ═══════════════════════════════════════════════════════════════════════════════

/// An extractor type that can be built from a configuration payload.
pub trait IntoExtractor<Ctx>: 'static {
    /// Payload shape.
    type Config: DeserializeOwned;

    /// Build the extractor.
    ///
    /// # Errors
    ///
    /// [`MatcherError::InvalidConfig`] when the payload decodes but makes no
    /// sense (an empty key, say).
    fn from_config(config: Self::Config) -> Result<Box<dyn Extractor<Ctx>>, MatcherError>;
}

/// A matcher type that can be built from a configuration payload.
///
/// Not generic over the context, like [`ValueMatcher`] itself.
pub trait IntoValueMatcher: 'static {
    /// Payload shape.
    type Config: DeserializeOwned;

    /// Build the matcher.
    ///
    /// # Errors
    ///
    /// [`MatcherError::InvalidConfig`] or [`MatcherError::InvalidPattern`].
    fn from_config(config: Self::Config) -> Result<Box<dyn ValueMatcher>, MatcherError>;
}

/// A factory for action values of type `A`.
///
/// ```ignore
/// struct Route;
/// impl IntoAction<Backend> for Route {
///     type Config = RouteConfig;
///     fn from_config(c: RouteConfig) -> Result<Backend, MatcherError> {
///         Ok(Backend { host: c.host, port: c.port })
///     }
/// }
/// ```
pub trait IntoAction<A>: 'static {
    /// Payload shape.
    type Config: DeserializeOwned;

    /// Build the action.
    ///
    /// # Errors
    ///
    /// [`MatcherError::InvalidConfig`].
    fn from_config(config: Self::Config) -> Result<A, MatcherError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Factory tables
// ═══════════════════════════════════════════════════════════════════════════════

type Factory<T> = Box<dyn Fn(&serde_json::Value) -> Result<T, MatcherError> + Send + Sync>;

/// Type URL → factory, for one kind of port.
struct Factories<T> {
    kind: &'static str,
    table: HashMap<String, Factory<T>>,
}

impl<T> Factories<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            table: HashMap::new(),
        }
    }

    fn insert(&mut self, type_url: &str, factory: Factory<T>) {
        if self.table.insert(type_url.to_owned(), factory).is_some() {
            tracing::warn!(
                registry = self.kind,
                type_url,
                "type URL registered twice, keeping the later factory"
            );
        }
    }

    fn resolve(&self, typed: &TypedConfig) -> Result<T, MatcherError> {
        let factory =
            self.table
                .get(&typed.type_url)
                .ok_or_else(|| MatcherError::UnknownTypeUrl {
                    type_url: typed.type_url.clone(),
                    registry: self.kind,
                    available: self.urls().into_iter().map(str::to_owned).collect(),
                })?;
        factory(&typed.config)
    }

    fn urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.table.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn contains(&self, type_url: &str) -> bool {
        self.table.contains_key(type_url)
    }
}

fn decode<C: DeserializeOwned>(payload: &serde_json::Value) -> Result<C, MatcherError> {
    C::deserialize(payload).map_err(MatcherError::invalid_config)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects extractor and matcher factories, then freezes into a [`Registry`].
pub struct RegistryBuilder<Ctx> {
    extractors: Factories<Box<dyn Extractor<Ctx>>>,
    matchers: Factories<Box<dyn ValueMatcher>>,
}

impl<Ctx: 'static> RegistryBuilder<Ctx> {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Factories::new("input"),
            matchers: Factories::new("matcher"),
        }
    }

    /// Register extractor type `T` under `type_url`.
    ///
    /// Registering a URL twice keeps the later factory and logs a warning.
    #[must_use]
    pub fn extractor<T: IntoExtractor<Ctx>>(mut self, type_url: &str) -> Self {
        self.extractors.insert(
            type_url,
            Box::new(|payload: &serde_json::Value| T::from_config(decode(payload)?)),
        );
        self
    }

    /// Register matcher type `T` under `type_url`.
    #[must_use]
    pub fn matcher<T: IntoValueMatcher>(mut self, type_url: &str) -> Self {
        self.matchers.insert(
            type_url,
            Box::new(|payload: &serde_json::Value| T::from_config(decode(payload)?)),
        );
        self
    }

    /// Freeze. The returned registry cannot be extended.
    #[must_use]
    pub fn build(self) -> Registry<Ctx> {
        tracing::debug!(
            extractors = self.extractors.len(),
            matchers = self.matchers.len(),
            "registry frozen"
        );
        Registry {
            extractors: self.extractors,
            matchers: self.matchers,
        }
    }
}

impl<Ctx: 'static> Default for RegistryBuilder<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the built-in matchers:
///
/// - `gavel.core.v1.StringMatcher` (payload like a `value_match`)
/// - `gavel.core.v1.BoolMatcher` (payload `{ "expected": bool }`)
#[must_use]
pub fn register_core_matchers<Ctx: 'static>(builder: RegistryBuilder<Ctx>) -> RegistryBuilder<Ctx> {
    use crate::{BoolMatcher, StringMatcher};
    builder
        .matcher::<StringMatcher>("gavel.core.v1.StringMatcher")
        .matcher::<BoolMatcher>("gavel.core.v1.BoolMatcher")
}

/// Frozen factory tables for one context type.
///
/// `Send + Sync` and read-only: share it behind an `Arc` and load trees from
/// any thread.
pub struct Registry<Ctx> {
    extractors: Factories<Box<dyn Extractor<Ctx>>>,
    matchers: Factories<Box<dyn ValueMatcher>>,
}

impl<Ctx: 'static> Registry<Ctx> {
    /// Build a live tree from configuration whose actions are plain values.
    ///
    /// # Errors
    ///
    /// - [`MatcherError::UnknownTypeUrl`] for an unregistered extractor or matcher
    /// - [`MatcherError::InvalidConfig`] when a payload does not decode
    /// - [`MatcherError::InvalidPattern`] for a regex that does not compile
    /// - [`MatcherError::IncompatibleTypes`] when a matcher cannot take what its extractor produces
    /// - [`MatcherError::TooManyFieldRules`], [`MatcherError::TooManyPredicates`],
    ///   [`MatcherError::PatternTooLong`] past the width and length limits
    /// - [`MatcherError::DepthExceeded`] past [`MAX_DEPTH`](crate::MAX_DEPTH)
    pub fn load_matcher<A>(
        &self,
        config: MatcherConfig<A>,
    ) -> Result<Matcher<Ctx, A>, MatcherError> {
        let matcher = self.load_tree(config, &mut |action: A| Ok::<_, MatcherError>(action))?;
        tracing::debug!(rules = matcher.len(), depth = matcher.depth(), "matcher loaded");
        Ok(matcher)
    }

    /// Build a live tree whose actions are [`TypedConfig`]s resolved through
    /// `actions`.
    ///
    /// # Errors
    ///
    /// As [`load_matcher`](Self::load_matcher), plus
    /// [`MatcherError::UnknownTypeUrl`] for an unregistered action.
    pub fn load_typed_matcher<A>(
        &self,
        config: MatcherConfig<TypedConfig>,
        actions: &ActionRegistry<A>,
    ) -> Result<Matcher<Ctx, A>, MatcherError> {
        let matcher = self.load_tree(config, &mut |typed: TypedConfig| actions.resolve(&typed))?;
        tracing::debug!(rules = matcher.len(), depth = matcher.depth(), "typed matcher loaded");
        Ok(matcher)
    }

    /// Number of extractor types.
    #[must_use]
    pub fn extractor_count(&self) -> usize {
        self.extractors.len()
    }

    /// Number of matcher types.
    #[must_use]
    pub fn matcher_count(&self) -> usize {
        self.matchers.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.len() == 0 && self.matchers.len() == 0
    }

    /// Whether an extractor is registered under `type_url`.
    #[must_use]
    pub fn contains_extractor(&self, type_url: &str) -> bool {
        self.extractors.contains(type_url)
    }

    /// Whether a matcher is registered under `type_url`.
    #[must_use]
    pub fn contains_matcher(&self, type_url: &str) -> bool {
        self.matchers.contains(type_url)
    }

    /// Registered extractor URLs, sorted.
    #[must_use]
    pub fn extractor_type_urls(&self) -> Vec<&str> {
        self.extractors.urls()
    }

    /// Registered matcher URLs, sorted.
    #[must_use]
    pub fn matcher_type_urls(&self) -> Vec<&str> {
        self.matchers.urls()
    }

    fn load_tree<C, A>(
        &self,
        config: MatcherConfig<C>,
        action: &mut dyn FnMut(C) -> Result<A, MatcherError>,
    ) -> Result<Matcher<Ctx, A>, MatcherError> {
        if config.rules.len() > MAX_FIELD_RULES {
            return Err(MatcherError::TooManyFieldRules {
                count: config.rules.len(),
                max: MAX_FIELD_RULES,
            });
        }

        let mut rules = Vec::with_capacity(config.rules.len());
        for FieldRuleConfig { predicate, outcome } in config.rules {
            let predicate = self.load_predicate(predicate)?;
            let outcome = self.load_outcome(outcome, action)?;
            rules.push(FieldRule::new(predicate, outcome));
        }
        let fallback = config
            .fallback
            .map(|outcome| self.load_outcome(outcome, action))
            .transpose()?;

        Matcher::new(rules, fallback)
    }

    fn load_outcome<C, A>(
        &self,
        config: OutcomeConfig<C>,
        action: &mut dyn FnMut(C) -> Result<A, MatcherError>,
    ) -> Result<Outcome<Ctx, A>, MatcherError> {
        Ok(match config {
            OutcomeConfig::Action(a) => Outcome::Action(action(a)?),
            OutcomeConfig::Nested(nested) => Outcome::nested(self.load_tree(*nested, action)?),
        })
    }

    fn load_predicate(&self, config: PredicateConfig) -> Result<Predicate<Ctx>, MatcherError> {
        Ok(match config {
            PredicateConfig::Single(single) => Predicate::Single(self.load_single(single)?),
            PredicateConfig::And(children) => Predicate::And(self.load_children(children)?),
            PredicateConfig::Or(children) => Predicate::Or(self.load_children(children)?),
            PredicateConfig::Not(inner) => Predicate::negate(self.load_predicate(*inner)?),
        })
    }

    fn load_children(
        &self,
        children: Vec<PredicateConfig>,
    ) -> Result<Vec<Predicate<Ctx>>, MatcherError> {
        if children.len() > MAX_PREDICATES_PER_COMPOUND {
            return Err(MatcherError::TooManyPredicates {
                count: children.len(),
                max: MAX_PREDICATES_PER_COMPOUND,
            });
        }
        children
            .into_iter()
            .map(|child| self.load_predicate(child))
            .collect()
    }

    fn load_single(
        &self,
        config: SinglePredicateConfig,
    ) -> Result<SinglePredicate<Ctx>, MatcherError> {
        let input = self.extractors.resolve(&config.input)?;
        let matcher: Box<dyn ValueMatcher> = match config.matcher {
            ValueMatchConfig::BuiltIn(spec) => {
                spec.check_length()?;
                Box::new(spec.compile()?)
            }
            ValueMatchConfig::Custom(typed) => self.matchers.resolve(&typed)?,
        };

        let produces = input.produces();
        let accepts = matcher.accepts();
        if !accepts.contains(&produces) {
            return Err(MatcherError::IncompatibleTypes {
                input_type: produces.to_owned(),
                matcher_types: accepts.iter().map(|k| (*k).to_owned()).collect(),
            });
        }

        Ok(SinglePredicate::new(input, matcher))
    }
}

impl<Ctx> fmt::Debug for Registry<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("extractors", &self.extractors.urls())
            .field("matchers", &self.matchers.urls())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects action factories for [`Registry::load_typed_matcher`].
pub struct ActionRegistryBuilder<A> {
    actions: Factories<A>,
}

impl<A: 'static> ActionRegistryBuilder<A> {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: Factories::new("action"),
        }
    }

    /// Register action factory `T` under `type_url`.
    #[must_use]
    pub fn action<T: IntoAction<A>>(mut self, type_url: &str) -> Self {
        self.actions.insert(
            type_url,
            Box::new(|payload: &serde_json::Value| T::from_config(decode(payload)?)),
        );
        self
    }

    /// Freeze.
    #[must_use]
    pub fn build(self) -> ActionRegistry<A> {
        tracing::debug!(actions = self.actions.len(), "action registry frozen");
        ActionRegistry {
            actions: self.actions,
        }
    }
}

impl<A: 'static> Default for ActionRegistryBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen action factories.
pub struct ActionRegistry<A> {
    actions: Factories<A>,
}

impl<A> ActionRegistry<A> {
    /// Number of action types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.len() == 0
    }

    /// Whether an action is registered under `type_url`.
    #[must_use]
    pub fn contains(&self, type_url: &str) -> bool {
        self.actions.contains(type_url)
    }

    /// Registered URLs, sorted.
    #[must_use]
    pub fn type_urls(&self) -> Vec<&str> {
        self.actions.urls()
    }

    /// Build one action from its typed config.
    ///
    /// # Errors
    ///
    /// [`MatcherError::UnknownTypeUrl`] or the factory's own error.
    pub fn resolve(&self, typed: &TypedConfig) -> Result<A, MatcherError> {
        self.actions.resolve(typed)
    }
}

impl<A> fmt::Debug for ActionRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.actions.urls())
            .finish()
    }
}

/// Action payload that is just a string: `{ "value": "allow" }`.
///
/// Register as `.action::<StringAction>(url)` on an `ActionRegistryBuilder<String>`.
#[derive(Debug, Clone, Copy)]
pub struct StringAction;

/// Payload for [`StringAction`].
#[derive(Debug, Clone, Deserialize)]
pub struct StringActionConfig {
    /// The action string.
    pub value: String,
}

impl IntoAction<String> for StringAction {
    type Config = StringActionConfig;

    fn from_config(config: Self::Config) -> Result<String, MatcherError> {
        Ok(config.value)
    }
}
