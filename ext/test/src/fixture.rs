//! YAML conformance fixtures.
//!
//! A fixture file holds one or more documents separated by `---`:
//!
//! ```yaml
//! name: exact_match
//! description: optional free text
//! config:                       # registry format, see gavel::MatcherConfig
//!   rules:
//!     - predicate:
//!         single:
//!           input: { type_url: gavel.test.v1.KeyInput, config: { key: name } }
//!           value_match: { exact: alice }
//!       outcome: { action: admin }
//!   fallback: { action: guest }
//! cases:
//!   - name: alice
//!     context: { name: alice }
//!     expect: admin
//!   - name: nobody
//!     context: {}
//!     expect: guest             # omit or null for "no decision"
//! ```
//!
//! A document with `expect_error: <substring>` instead asserts that loading
//! the config fails with a message containing the substring.
//!
//! Valid configs are checked twice: once loaded through the [`Registry`] and
//! once built by hand from the same config, and both trees must agree with
//! every case.

use crate::{DictContext, FlagInput, KeyConfig, KeyInput, FLAG_INPUT, KEY_INPUT};
use gavel::{
    BoolMatcher, BoolMatcherConfig, Extractor, FieldRule, Matcher, MatcherConfig, MatcherError,
    Outcome, OutcomeConfig, Predicate, PredicateConfig, Registry, SinglePredicateConfig,
    StringMatchSpec, Value, ValueMatchConfig,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One fixture document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    /// Identifier used in failure messages.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
    /// Tree configuration, kept raw so error fixtures may hold malformed shapes.
    pub config: serde_json::Value,
    /// Contexts and their expected decisions.
    #[serde(default)]
    pub cases: Vec<FixtureCase>,
    /// Substring the load error must contain. When set, `cases` is ignored.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// One context and the decision expected for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureCase {
    /// Identifier used in failure messages.
    pub name: String,
    /// Context entries. Missing keys extract as `Value::None`.
    #[serde(default)]
    pub context: BTreeMap<String, ContextValue>,
    /// Expected action, `None` for "no decision".
    #[serde(default)]
    pub expect: Option<String>,
}

/// A context entry as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    /// `true` / `false`.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Anything quoted or otherwise textual.
    Str(String),
}

impl From<ContextValue> for Value {
    fn from(v: ContextValue) -> Self {
        match v {
            ContextValue::Bool(b) => Value::Bool(b),
            ContextValue::Int(i) => Value::Int(i),
            ContextValue::Str(s) => Value::Str(s),
        }
    }
}

impl FixtureCase {
    /// Build the case's context.
    #[must_use]
    pub fn context(&self) -> DictContext {
        self.context
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Why a fixture did not hold.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The YAML itself did not parse.
    #[error("fixture file does not parse: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// `config` is not a valid `MatcherConfig`.
    #[error("fixture '{fixture}': config does not decode: {source}")]
    Config {
        /// Fixture name.
        fixture: String,
        /// Decoder error.
        source: serde_json::Error,
    },

    /// Building the tree failed.
    #[error("fixture '{fixture}': {path} load failed: {source}")]
    Load {
        /// Fixture name.
        fixture: String,
        /// `"registry"` or `"hand-built"`.
        path: &'static str,
        /// Construction error.
        source: MatcherError,
    },

    /// A case produced the wrong decision.
    #[error(
        "fixture '{fixture}' case '{case}' ({path}): expected {expected:?}, got {actual:?}"
    )]
    CaseFailed {
        /// Fixture name.
        fixture: String,
        /// Case name.
        case: String,
        /// `"registry"` or `"hand-built"`.
        path: &'static str,
        /// Expected decision.
        expected: Option<String>,
        /// Actual decision.
        actual: Option<String>,
    },

    /// An error was expected but loading succeeded.
    #[error("fixture '{fixture}': expected an error containing {expected:?}, but the config loaded")]
    MissingError {
        /// Fixture name.
        fixture: String,
        /// Expected substring.
        expected: String,
    },

    /// Loading failed with a different error than expected.
    #[error("fixture '{fixture}': expected an error containing {expected:?}, got \"{actual}\"")]
    WrongError {
        /// Fixture name.
        fixture: String,
        /// Expected substring.
        expected: String,
        /// Actual message.
        actual: String,
    },
}

/// Outcome of one case against one tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// Case name.
    pub case: String,
    /// Expected decision.
    pub expected: Option<String>,
    /// Actual decision.
    pub actual: Option<String>,
}

impl CaseResult {
    /// Whether the decision was the expected one.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl Fixture {
    /// Parse a single-document fixture.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Yaml`].
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse every `---`-separated document.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Yaml`] for the first document that does not parse.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, FixtureError> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|doc| Self::deserialize(doc).map_err(FixtureError::from))
            .collect()
    }

    /// Decode `config` as a tree configuration with string actions.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Config`].
    pub fn matcher_config(&self) -> Result<MatcherConfig<String>, FixtureError> {
        serde_json::from_value(self.config.clone()).map_err(|source| FixtureError::Config {
            fixture: self.name.clone(),
            source,
        })
    }

    /// Load `config` through `registry`.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Config`] or [`FixtureError::Load`].
    pub fn load(
        &self,
        registry: &Registry<DictContext>,
    ) -> Result<Matcher<DictContext, String>, FixtureError> {
        registry
            .load_matcher(self.matcher_config()?)
            .map_err(|source| self.load_error("registry", source))
    }

    /// Build `config` without the registry, wiring the dictionary types directly.
    ///
    /// Only the checks done by the kernel types themselves apply: no width,
    /// length or type-compatibility limits.
    ///
    /// # Errors
    ///
    /// [`FixtureError::Config`] or [`FixtureError::Load`].
    pub fn build_by_hand(&self) -> Result<Matcher<DictContext, String>, FixtureError> {
        build_tree(self.matcher_config()?).map_err(|source| self.load_error("hand-built", source))
    }

    /// Evaluate every case against `matcher`.
    #[must_use]
    pub fn run(&self, matcher: &Matcher<DictContext, String>) -> Vec<CaseResult> {
        self.cases
            .iter()
            .map(|case| CaseResult {
                case: case.name.clone(),
                expected: case.expect.clone(),
                actual: matcher.evaluate(&case.context()),
            })
            .collect()
    }

    /// Check the fixture through both construction paths.
    ///
    /// Returns the number of case evaluations performed.
    ///
    /// # Errors
    ///
    /// The first [`FixtureError`] found.
    pub fn check(&self, registry: &Registry<DictContext>) -> Result<usize, FixtureError> {
        if let Some(expected) = &self.expect_error {
            return match self.load(registry) {
                Ok(_) => Err(FixtureError::MissingError {
                    fixture: self.name.clone(),
                    expected: expected.clone(),
                }),
                Err(err) => {
                    let actual = err.to_string();
                    if actual.contains(expected.as_str()) {
                        Ok(0)
                    } else {
                        Err(FixtureError::WrongError {
                            fixture: self.name.clone(),
                            expected: expected.clone(),
                            actual,
                        })
                    }
                }
            };
        }

        let mut evaluated = 0;
        let paths = [
            ("registry", self.load(registry)?),
            ("hand-built", self.build_by_hand()?),
        ];
        for (path, matcher) in paths {
            for result in self.run(&matcher) {
                if !result.passed() {
                    return Err(FixtureError::CaseFailed {
                        fixture: self.name.clone(),
                        case: result.case,
                        path,
                        expected: result.expected,
                        actual: result.actual,
                    });
                }
                evaluated += 1;
            }
        }
        Ok(evaluated)
    }

    fn load_error(&self, path: &'static str, source: MatcherError) -> FixtureError {
        FixtureError::Load {
            fixture: self.name.clone(),
            path,
            source,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Hand-built path
// ═══════════════════════════════════════════════════════════════════════════════

fn build_tree(config: MatcherConfig<String>) -> Result<Matcher<DictContext, String>, MatcherError> {
    let rules = config
        .rules
        .into_iter()
        .map(|rule| -> Result<_, MatcherError> {
            Ok(FieldRule::new(build_predicate(rule.predicate)?, build_outcome(rule.outcome)?))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let fallback = config.fallback.map(build_outcome).transpose()?;
    Matcher::new(rules, fallback)
}

fn build_outcome(
    config: OutcomeConfig<String>,
) -> Result<Outcome<DictContext, String>, MatcherError> {
    Ok(match config {
        OutcomeConfig::Action(action) => Outcome::action(action),
        OutcomeConfig::Nested(nested) => Outcome::nested(build_tree(*nested)?),
    })
}

fn build_predicate(config: PredicateConfig) -> Result<Predicate<DictContext>, MatcherError> {
    let children = |configs: Vec<PredicateConfig>| {
        configs
            .into_iter()
            .map(build_predicate)
            .collect::<Result<Vec<_>, _>>()
    };
    Ok(match config {
        PredicateConfig::Single(single) => build_single(single)?,
        PredicateConfig::And(configs) => Predicate::And(children(configs)?),
        PredicateConfig::Or(configs) => Predicate::Or(children(configs)?),
        PredicateConfig::Not(inner) => Predicate::negate(build_predicate(*inner)?),
    })
}

fn build_single(config: SinglePredicateConfig) -> Result<Predicate<DictContext>, MatcherError> {
    let KeyConfig { key } = decode(config.input.config)?;
    let input: Box<dyn Extractor<DictContext>> = match config.input.type_url.as_str() {
        KEY_INPUT => Box::new(KeyInput::new(key)),
        FLAG_INPUT => Box::new(FlagInput::new(key)),
        other => return Err(unknown(other, "input", &[FLAG_INPUT, KEY_INPUT])),
    };

    match config.matcher {
        ValueMatchConfig::BuiltIn(spec) => spec.to_predicate(input),
        ValueMatchConfig::Custom(typed) => match typed.type_url.as_str() {
            "gavel.core.v1.StringMatcher" => {
                decode::<StringMatchSpec>(typed.config)?.to_predicate(input)
            }
            "gavel.core.v1.BoolMatcher" => {
                let BoolMatcherConfig { expected } = decode(typed.config)?;
                Ok(Predicate::single(input, Box::new(BoolMatcher::new(expected))))
            }
            other => Err(unknown(
                other,
                "matcher",
                &["gavel.core.v1.BoolMatcher", "gavel.core.v1.StringMatcher"],
            )),
        },
    }
}

fn decode<T: serde::de::DeserializeOwned>(payload: serde_json::Value) -> Result<T, MatcherError> {
    serde_json::from_value(payload).map_err(|e| MatcherError::InvalidConfig {
        reason: e.to_string(),
    })
}

fn unknown(type_url: &str, registry: &'static str, available: &[&str]) -> MatcherError {
    MatcherError::UnknownTypeUrl {
        type_url: type_url.to_owned(),
        registry,
        available: available.iter().map(|s| (*s).to_owned()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
name: roles
config:
  rules:
    - predicate:
        single:
          input: { type_url: gavel.test.v1.KeyInput, config: { key: name } }
          value_match: { exact: alice }
      outcome: { action: admin }
  fallback: { action: guest }
cases:
  - name: alice
    context: { name: alice }
    expect: admin
  - name: eve
    context: { name: eve }
    expect: guest
"#;

    fn registry() -> Registry<DictContext> {
        crate::register(gavel::RegistryBuilder::new()).build()
    }

    #[test]
    fn parses_and_checks() {
        let fixture = Fixture::from_yaml(DOC).unwrap();
        assert_eq!(fixture.name, "roles");
        assert_eq!(fixture.cases.len(), 2);
        assert_eq!(fixture.check(&registry()).unwrap(), 4);
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{DOC}\n---\n{}", DOC.replace("roles", "roles_again"));
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[1].name, "roles_again");
    }

    #[test]
    fn wrong_expectation_is_reported() {
        let fixture = Fixture::from_yaml(&DOC.replace("expect: guest", "expect: admin")).unwrap();
        let err = fixture.check(&registry()).unwrap_err();
        assert!(matches!(
            err,
            FixtureError::CaseFailed { ref case, path: "registry", .. } if case == "eve"
        ));
    }

    #[test]
    fn context_values_keep_their_kind() {
        let case: FixtureCase = serde_yaml::from_str(
            "name: kinds\ncontext: { flag: true, count: 3, text: \"true\" }\n",
        )
        .unwrap();
        let ctx = case.context();
        assert_eq!(ctx.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(ctx.get("count"), Some(&Value::Int(3)));
        assert_eq!(ctx.get("text"), Some(&Value::from("true")));
        assert_eq!(case.expect, None);
    }

    #[test]
    fn expected_error_must_match() {
        let yaml = r#"
name: bad_regex
config:
  rules:
    - predicate:
        single:
          input: { type_url: gavel.test.v1.KeyInput, config: { key: k } }
          value_match: { regex: "(" }
      outcome: { action: x }
expect_error: invalid pattern
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        assert_eq!(fixture.check(&registry()).unwrap(), 0);

        let wrong = Fixture::from_yaml(&yaml.replace("invalid pattern", "depth")).unwrap();
        assert!(matches!(wrong.check(&registry()), Err(FixtureError::WrongError { .. })));
    }
}
