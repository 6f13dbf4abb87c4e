//! Construction-time errors.
//!
//! Every variant is raised while building a tree (directly or from
//! configuration). Evaluation never fails.

use thiserror::Error;

/// Errors from matcher construction and configuration loading.
///
/// Fix the configuration and rebuild the tree; nothing here is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    /// Tree nesting exceeds [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error(
        "matcher nesting depth is {depth}, but maximum allowed is {max} \
         (flatten predicates or nested matchers)"
    )]
    DepthExceeded {
        /// Depth of the rejected tree.
        depth: usize,
        /// Ceiling.
        max: usize,
    },

    /// A regular expression failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A configuration payload could not be decoded or was semantically invalid.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Decoder or factory message.
        reason: String,
    },

    /// A type URL has no registered factory.
    #[error("unknown {registry} type URL \"{type_url}\" ({})", describe_available(.registry, .available))]
    UnknownTypeUrl {
        /// The unregistered identifier.
        type_url: String,
        /// Which table was searched: `"input"`, `"matcher"` or `"action"`.
        registry: &'static str,
        /// Identifiers that are registered, sorted.
        available: Vec<String>,
    },

    /// The extractor's value kind is not accepted by the paired matcher.
    #[error("input produces \"{input_type}\" values but matcher accepts {matcher_types:?}")]
    IncompatibleTypes {
        /// Kind produced by the extractor.
        input_type: String,
        /// Kinds the matcher accepts.
        matcher_types: Vec<String>,
    },

    /// Too many field rules in one tree.
    #[error("matcher has {count} rules, but maximum allowed is {max}")]
    TooManyFieldRules {
        /// Rules in the rejected tree.
        count: usize,
        /// Ceiling.
        max: usize,
    },

    /// Too many children in one `and` / `or`.
    #[error("compound predicate has {count} children, but maximum allowed is {max}")]
    TooManyPredicates {
        /// Children in the rejected predicate.
        count: usize,
        /// Ceiling.
        max: usize,
    },

    /// A string pattern is longer than allowed.
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Pattern length in bytes.
        len: usize,
        /// Ceiling.
        max: usize,
    },
}

fn describe_available(registry: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!("no {registry} types are registered")
    } else {
        format!("registered: {}", available.join(", "))
    }
}

impl MatcherError {
    pub(crate) fn invalid_config(reason: impl std::fmt::Display) -> Self {
        Self::InvalidConfig {
            reason: reason.to_string(),
        }
    }
}
