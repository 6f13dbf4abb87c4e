//! `StringMatchSpec`: what a configuration asks for, before compilation.
//!
//! [`StringMatchSpec`] is the serde shape (`{ "prefix": "/api", "ignore_case": true }`);
//! [`StringMatcher`] is what it compiles to.

use crate::{
    Extractor, MatcherError, Predicate, SinglePredicate, StringMatcher, MAX_PATTERN_LENGTH,
    MAX_REGEX_PATTERN_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which comparison to run, and against what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPattern {
    /// Whole value equals the text.
    Exact(String),
    /// Value starts with the text.
    Prefix(String),
    /// Value ends with the text.
    Suffix(String),
    /// Text occurs in the value.
    Contains(String),
    /// Regular expression found anywhere in the value.
    Regex(String),
}

impl StringPattern {
    /// The configured text or pattern.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Exact(v)
            | Self::Prefix(v)
            | Self::Suffix(v)
            | Self::Contains(v)
            | Self::Regex(v) => v,
        }
    }
}

/// A string match as written in configuration.
///
/// ```
/// use gavel::{StringMatchSpec, Value, ValueMatcher};
///
/// let spec: StringMatchSpec =
///     serde_json::from_str(r#"{ "exact": "alice", "ignore_case": true }"#).unwrap();
/// let m = spec.compile().unwrap();
/// assert!(m.matches(&Value::from("Alice")));
/// ```
///
/// Exactly one operator key is allowed, and any other key is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStringMatch", into = "RawStringMatch")]
pub struct StringMatchSpec {
    /// Comparison and text.
    pub pattern: StringPattern,

    /// Fold case before comparing. Ignored for `regex`.
    pub ignore_case: bool,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStringMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    ignore_case: bool,
}

impl TryFrom<RawStringMatch> for StringMatchSpec {
    type Error = &'static str;

    fn try_from(raw: RawStringMatch) -> Result<Self, Self::Error> {
        let mut patterns = [
            raw.exact.map(StringPattern::Exact),
            raw.prefix.map(StringPattern::Prefix),
            raw.suffix.map(StringPattern::Suffix),
            raw.contains.map(StringPattern::Contains),
            raw.regex.map(StringPattern::Regex),
        ]
        .into_iter()
        .flatten();

        let pattern = patterns
            .next()
            .ok_or("string match needs one of exact, prefix, suffix, contains or regex")?;
        if patterns.next().is_some() {
            return Err(
                "string match takes exactly one of exact, prefix, suffix, contains or regex",
            );
        }
        Ok(Self {
            pattern,
            ignore_case: raw.ignore_case,
        })
    }
}

impl From<StringMatchSpec> for RawStringMatch {
    fn from(spec: StringMatchSpec) -> Self {
        let mut raw = Self {
            ignore_case: spec.ignore_case,
            ..Self::default()
        };
        match spec.pattern {
            StringPattern::Exact(v) => raw.exact = Some(v),
            StringPattern::Prefix(v) => raw.prefix = Some(v),
            StringPattern::Suffix(v) => raw.suffix = Some(v),
            StringPattern::Contains(v) => raw.contains = Some(v),
            StringPattern::Regex(v) => raw.regex = Some(v),
        }
        raw
    }
}

impl StringMatchSpec {
    /// Case-sensitive spec.
    #[must_use]
    pub fn new(pattern: StringPattern) -> Self {
        Self {
            pattern,
            ignore_case: false,
        }
    }

    /// Case-insensitive spec.
    #[must_use]
    pub fn ignoring_case(pattern: StringPattern) -> Self {
        Self {
            pattern,
            ignore_case: true,
        }
    }

    /// Compile into a runtime [`StringMatcher`].
    ///
    /// # Errors
    ///
    /// [`MatcherError::InvalidPattern`] for a regex that does not compile.
    pub fn compile(&self) -> Result<StringMatcher, MatcherError> {
        let ci = self.ignore_case;
        Ok(match &self.pattern {
            StringPattern::Exact(v) => StringMatcher::exact(v.as_str(), ci),
            StringPattern::Prefix(v) => StringMatcher::prefix(v.as_str(), ci),
            StringPattern::Suffix(v) => StringMatcher::suffix(v.as_str(), ci),
            StringPattern::Contains(v) => StringMatcher::contains(v.as_str(), ci),
            StringPattern::Regex(v) => {
                if ci {
                    tracing::warn!(
                        pattern = %v,
                        "ignore_case has no effect on regex matchers; use (?i) in the pattern"
                    );
                }
                StringMatcher::regex(v)?
            }
        })
    }

    /// Compile and pair with `input` into a single predicate.
    ///
    /// # Errors
    ///
    /// Same as [`compile`](Self::compile).
    pub fn to_predicate<Ctx: 'static>(
        &self,
        input: Box<dyn Extractor<Ctx>>,
    ) -> Result<Predicate<Ctx>, MatcherError> {
        Ok(Predicate::Single(SinglePredicate::new(
            input,
            Box::new(self.compile()?),
        )))
    }

    /// Reject patterns longer than [`MAX_PATTERN_LENGTH`] (literals) or
    /// [`MAX_REGEX_PATTERN_LENGTH`] (regex).
    ///
    /// # Errors
    ///
    /// [`MatcherError::PatternTooLong`].
    pub fn check_length(&self) -> Result<(), MatcherError> {
        let max = match self.pattern {
            StringPattern::Regex(_) => MAX_REGEX_PATTERN_LENGTH,
            _ => MAX_PATTERN_LENGTH,
        };
        let len = self.pattern.text().len();
        if len > max {
            return Err(MatcherError::PatternTooLong { len, max });
        }
        Ok(())
    }
}

impl fmt::Display for StringMatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.pattern {
            StringPattern::Exact(_) => "exact",
            StringPattern::Prefix(_) => "prefix",
            StringPattern::Suffix(_) => "suffix",
            StringPattern::Contains(_) => "contains",
            StringPattern::Regex(_) => "regex",
        };
        write!(f, "{op}({:?})", self.pattern.text())?;
        if self.ignore_case {
            f.write_str(" ignore_case")?;
        }
        Ok(())
    }
}
