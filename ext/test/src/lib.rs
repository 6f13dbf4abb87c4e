//! gavel-test: dictionary reference domain and conformance fixtures.
//!
//! The smallest useful domain: the context is a map of named [`Value`]s and
//! the extractors look keys up in it. It doubles as the worked example of how
//! to plug a domain into gavel.
//!
//! ```
//! use gavel::{Extractor, Value};
//! use gavel_test::{DictContext, KeyInput};
//!
//! let ctx = DictContext::new().with("name", "alice").with("admin", true);
//!
//! assert_eq!(KeyInput::new("name").extract(&ctx), Value::from("alice"));
//! assert_eq!(KeyInput::new("missing").extract(&ctx), Value::None);
//! ```

use gavel::registry::IntoExtractor;
use gavel::{Extractor, MatcherError, RegistryBuilder, Value};
use serde::Deserialize;
use std::collections::HashMap;

pub mod fixture;

/// Type URL of [`KeyInput`].
pub const KEY_INPUT: &str = "gavel.test.v1.KeyInput";

/// Type URL of [`FlagInput`].
pub const FLAG_INPUT: &str = "gavel.test.v1.FlagInput";

/// A string-keyed map of values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DictContext {
    values: HashMap<String, Value>,
}

impl DictContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look an entry up.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The entry under `key` as an extracted value, [`Value::None`] when missing.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Value {
        self.get(key).cloned().unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DictContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Extracts the entry under `key`, or [`Value::None`] when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    key: String,
}

impl KeyInput {
    /// Extractor for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The looked-up key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Extractor<DictContext> for KeyInput {
    fn extract(&self, ctx: &DictContext) -> Value {
        ctx.lookup(&self.key)
    }
}

/// Like [`KeyInput`], but declares boolean output so it pairs with
/// [`BoolMatcher`](gavel::BoolMatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagInput(KeyInput);

impl FlagInput {
    /// Extractor for `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(KeyInput::new(key))
    }

    /// The looked-up key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.0.key()
    }
}

impl Extractor<DictContext> for FlagInput {
    fn extract(&self, ctx: &DictContext) -> Value {
        self.0.extract(ctx)
    }

    fn produces(&self) -> &'static str {
        "bool"
    }
}

/// Payload for [`KeyInput`] and [`FlagInput`]: `{ "key": "name" }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    /// Context key to read.
    pub key: String,
}

impl KeyConfig {
    fn checked(self) -> Result<String, MatcherError> {
        if self.key.is_empty() {
            return Err(MatcherError::InvalidConfig {
                reason: "key must not be empty".into(),
            });
        }
        Ok(self.key)
    }
}

impl IntoExtractor<DictContext> for KeyInput {
    type Config = KeyConfig;

    fn from_config(config: KeyConfig) -> Result<Box<dyn Extractor<DictContext>>, MatcherError> {
        Ok(Box::new(Self::new(config.checked()?)))
    }
}

impl IntoExtractor<DictContext> for FlagInput {
    type Config = KeyConfig;

    fn from_config(config: KeyConfig) -> Result<Box<dyn Extractor<DictContext>>, MatcherError> {
        Ok(Box::new(Self(KeyInput::new(config.checked()?))))
    }
}

/// Register the core matchers and the dictionary extractors.
#[must_use]
pub fn register(builder: RegistryBuilder<DictContext>) -> RegistryBuilder<DictContext> {
    gavel::register_core_matchers(builder)
        .extractor::<KeyInput>(KEY_INPUT)
        .extractor::<FlagInput>(FLAG_INPUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel::{FieldRule, Matcher, Outcome, Predicate, StringMatcher};

    #[test]
    fn context_builder() {
        let ctx = DictContext::new().with("name", "alice").with("age", 30_i64);
        assert_eq!(ctx.get("name"), Some(&Value::from("alice")));
        assert_eq!(ctx.get("age"), Some(&Value::Int(30)));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn context_from_pairs() {
        let ctx: DictContext = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(ctx.get("b"), Some(&Value::from("2")));
    }

    #[test]
    fn missing_key_is_none() {
        let ctx = DictContext::new();
        assert_eq!(KeyInput::new("missing").extract(&ctx), Value::None);
        assert_eq!(FlagInput::new("missing").extract(&ctx), Value::None);
    }

    #[test]
    fn flag_input_reads_like_key_input() {
        let ctx = DictContext::new().with("admin", true).with("name", "alice");
        for key in ["admin", "name", "missing"] {
            assert_eq!(FlagInput::new(key).extract(&ctx), KeyInput::new(key).extract(&ctx));
            assert_eq!(ctx.lookup(key), KeyInput::new(key).extract(&ctx));
        }
        assert_eq!(FlagInput::new("admin").key(), "admin");
    }

    #[test]
    fn flag_input_declares_bool() {
        assert_eq!(Extractor::<DictContext>::produces(&FlagInput::new("x")), "bool");
        assert_eq!(Extractor::<DictContext>::produces(&KeyInput::new("x")), "string");
    }

    #[test]
    fn registration() {
        let registry = register(RegistryBuilder::new()).build();
        assert!(registry.contains_extractor(KEY_INPUT));
        assert!(registry.contains_extractor(FLAG_INPUT));
        assert!(registry.contains_matcher("gavel.core.v1.StringMatcher"));
        assert!(registry.contains_matcher("gavel.core.v1.BoolMatcher"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = KeyInput::from_config(KeyConfig { key: String::new() }).unwrap_err();
        assert!(matches!(err, MatcherError::InvalidConfig { .. }));
    }

    #[test]
    fn hand_built_tree() {
        let matcher: Matcher<DictContext, &str> = Matcher::new(
            vec![FieldRule::new(
                Predicate::single(
                    Box::new(KeyInput::new("role")),
                    Box::new(StringMatcher::exact("admin", false)),
                ),
                Outcome::action("allowed"),
            )],
            Some(Outcome::action("denied")),
        )
        .unwrap();

        assert_eq!(matcher.evaluate(&DictContext::new().with("role", "admin")), Some("allowed"));
        assert_eq!(matcher.evaluate(&DictContext::new()), Some("denied"));
    }
}
