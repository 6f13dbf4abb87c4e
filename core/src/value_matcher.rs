//! `ValueMatcher`: the matching port, plus the built-in matchers.
//!
//! Matchers are **non-generic**: they see a [`Value`], never the context, so
//! one instance serves HTTP, events, tool calls, or anything else.
//!
//! - [`StringMatcher`]: exact / prefix / suffix / contains / regex, with optional case folding
//! - [`BoolMatcher`]: boolean equality

use crate::{MatcherError, Value, REGEX_SIZE_LIMIT};
use std::borrow::Cow;
use std::fmt::Debug;

/// Tests a type-erased [`Value`].
///
/// A value of a kind the matcher does not understand (including
/// [`Value::None`]) is a non-match, not an error.
///
/// # Example
///
/// ```
/// use gavel::{StringMatcher, Value, ValueMatcher};
///
/// let m = StringMatcher::exact("alice", false);
/// assert!(m.matches(&Value::from("alice")));
/// assert!(!m.matches(&Value::Int(1)));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `ValueMatcher`",
    label = "this type cannot match a `Value`",
    note = "use a built-in matcher (StringMatcher, BoolMatcher) or implement `matches(&self, &Value) -> bool`"
)]
pub trait ValueMatcher: Send + Sync + Debug {
    /// `true` if `value` matches.
    fn matches(&self, value: &Value) -> bool;

    /// Value kinds this matcher understands (see [`Value::kind`]).
    ///
    /// Extension matchers list their extension kinds here.
    fn accepts(&self) -> &[&'static str] {
        &["string"]
    }
}

#[diagnostic::do_not_recommend]
impl ValueMatcher for Box<dyn ValueMatcher> {
    fn matches(&self, value: &Value) -> bool {
        (**self).matches(value)
    }

    fn accepts(&self) -> &[&'static str] {
        (**self).accepts()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// StringMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// A literal pattern, folded once at construction when case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pattern: String,
    ignore_case: bool,
}

impl Literal {
    fn new(pattern: impl Into<String>, ignore_case: bool) -> Self {
        let pattern = pattern.into();
        Self {
            pattern: if ignore_case {
                pattern.to_lowercase()
            } else {
                pattern
            },
            ignore_case,
        }
    }

    /// The pattern as compared (already lower-cased if case-insensitive).
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether comparison folds case.
    #[must_use]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn fold<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if self.ignore_case {
            Cow::Owned(input.to_lowercase())
        } else {
            Cow::Borrowed(input)
        }
    }
}

/// The built-in string matcher.
///
/// Case-insensitive mode lower-cases the pattern at construction and the
/// input per call (Unicode-aware). It does not apply to [`Regex`](Self::Regex);
/// embed `(?i)` in the pattern instead.
///
/// Regular expressions use the `regex` crate: RE2 semantics, linear time in
/// the input, no catastrophic backtracking.
///
/// # Example
///
/// ```
/// use gavel::{StringMatcher, Value, ValueMatcher};
///
/// let m = StringMatcher::prefix("/API", true);
/// assert!(m.matches(&"/api/users".into()));
///
/// let m = StringMatcher::regex(r"user-\d+").unwrap();
/// assert!(m.matches(&"id=user-42;".into())); // search, not full match
/// ```
#[derive(Debug, Clone)]
pub enum StringMatcher {
    /// Whole value equals the pattern.
    Exact(Literal),
    /// Value starts with the pattern.
    Prefix(Literal),
    /// Value ends with the pattern.
    Suffix(Literal),
    /// Pattern occurs somewhere in the value.
    Contains(Literal),
    /// Pattern found anywhere in the value.
    Regex(regex::Regex),
}

impl StringMatcher {
    /// Exact equality.
    #[must_use]
    pub fn exact(pattern: impl Into<String>, ignore_case: bool) -> Self {
        Self::Exact(Literal::new(pattern, ignore_case))
    }

    /// Prefix match.
    #[must_use]
    pub fn prefix(pattern: impl Into<String>, ignore_case: bool) -> Self {
        Self::Prefix(Literal::new(pattern, ignore_case))
    }

    /// Suffix match.
    #[must_use]
    pub fn suffix(pattern: impl Into<String>, ignore_case: bool) -> Self {
        Self::Suffix(Literal::new(pattern, ignore_case))
    }

    /// Substring match.
    #[must_use]
    pub fn contains(pattern: impl Into<String>, ignore_case: bool) -> Self {
        Self::Contains(Literal::new(pattern, ignore_case))
    }

    /// Regular-expression search, compiled once here.
    ///
    /// # Errors
    ///
    /// [`MatcherError::InvalidPattern`] if the pattern does not compile or its
    /// compiled program exceeds [`REGEX_SIZE_LIMIT`].
    pub fn regex(pattern: &str) -> Result<Self, MatcherError> {
        regex::RegexBuilder::new(pattern)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map(Self::Regex)
            .map_err(|e| MatcherError::InvalidPattern {
                pattern: pattern.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl ValueMatcher for StringMatcher {
    fn matches(&self, value: &Value) -> bool {
        let Some(input) = value.as_str() else {
            return false;
        };

        match self {
            Self::Exact(lit) => *lit.fold(input) == *lit.pattern,
            Self::Prefix(lit) => lit.fold(input).starts_with(lit.pattern.as_str()),
            Self::Suffix(lit) => lit.fold(input).ends_with(lit.pattern.as_str()),
            Self::Contains(lit) => lit.fold(input).contains(lit.pattern.as_str()),
            Self::Regex(re) => re.is_match(input),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BoolMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Boolean equality.
///
/// ```
/// use gavel::{BoolMatcher, Value, ValueMatcher};
///
/// let m = BoolMatcher::new(true);
/// assert!(m.matches(&Value::Bool(true)));
/// assert!(!m.matches(&"true".into()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolMatcher {
    expected: bool,
}

impl BoolMatcher {
    /// Match values equal to `expected`.
    #[must_use]
    pub fn new(expected: bool) -> Self {
        Self { expected }
    }
}

impl ValueMatcher for BoolMatcher {
    fn matches(&self, value: &Value) -> bool {
        value.as_bool() == Some(self.expected)
    }

    fn accepts(&self) -> &[&'static str] {
        &["bool"]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry factories
// ═══════════════════════════════════════════════════════════════════════════════

mod factories {
    use super::{BoolMatcher, StringMatcher, ValueMatcher};
    use crate::registry::IntoValueMatcher;
    use crate::{MatcherError, StringMatchSpec};
    use serde::Deserialize;

    /// Configuration for [`BoolMatcher`] under `gavel.core.v1.BoolMatcher`.
    ///
    /// ```json
    /// { "expected": true }
    /// ```
    #[derive(Debug, Clone, Deserialize)]
    pub struct BoolMatcherConfig {
        /// The flag to match.
        pub expected: bool,
    }

    impl IntoValueMatcher for BoolMatcher {
        type Config = BoolMatcherConfig;

        fn from_config(config: Self::Config) -> Result<Box<dyn ValueMatcher>, MatcherError> {
            Ok(Box::new(BoolMatcher::new(config.expected)))
        }
    }

    /// `gavel.core.v1.StringMatcher` takes the same shape as a built-in
    /// `value_match`, e.g. `{ "suffix": ".rs", "ignore_case": true }`.
    impl IntoValueMatcher for StringMatcher {
        type Config = StringMatchSpec;

        fn from_config(config: Self::Config) -> Result<Box<dyn ValueMatcher>, MatcherError> {
            config.check_length()?;
            Ok(Box::new(config.compile()?))
        }
    }
}

pub use factories::BoolMatcherConfig;
