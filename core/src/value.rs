//! `Value`: the type-erased currency between extraction and matching.
//!
//! Extractors produce a [`Value`], matchers consume one. Because matchers only
//! ever see a `Value`, a single matcher instance serves every domain.
//!
//! # Extension slot
//!
//! Domain types that do not fit the primitives implement [`ExtensionValue`]
//! and travel as `Value::Extension(Arc::new(..))`. The kernel never looks
//! inside them: it only reports their [`kind`](ExtensionValue::kind) and
//! delegates equality to [`same_as`](ExtensionValue::same_as).

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// A domain-supplied payload carried in [`Value::Extension`].
///
/// Matchers that want to handle an extension declare its kind in
/// [`ValueMatcher::accepts`](crate::ValueMatcher::accepts) and recover the
/// concrete type through [`as_any`](Self::as_any). Everyone else sees an
/// opaque value and returns `false`.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use gavel::{ExtensionValue, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Cidr(String);
///
/// impl ExtensionValue for Cidr {
///     fn kind(&self) -> &'static str {
///         "cidr"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn same_as(&self, other: &dyn ExtensionValue) -> bool {
///         other.as_any().downcast_ref::<Cidr>() == Some(self)
///     }
/// }
///
/// let a = Value::Extension(Arc::new(Cidr("10.0.0.0/8".into())));
/// let b = Value::Extension(Arc::new(Cidr("10.0.0.0/8".into())));
/// assert_eq!(a.kind(), "cidr");
/// assert_eq!(a, b);
/// ```
pub trait ExtensionValue: Send + Sync + Debug {
    /// Stable name of this payload's kind, e.g. `"cidr"` or `"jwt_claims"`.
    ///
    /// Compared against matcher `accepts()` lists at construction time.
    fn kind(&self) -> &'static str;

    /// Access to the concrete payload for matchers of the same domain.
    fn as_any(&self) -> &dyn Any;

    /// Domain-defined equality.
    ///
    /// The default only treats the very same allocation as equal.
    fn same_as(&self, other: &dyn ExtensionValue) -> bool {
        std::ptr::addr_eq(self as *const Self, other as *const dyn ExtensionValue)
    }
}

/// Type-erased value produced by an [`Extractor`](crate::Extractor).
///
/// `None` is not an error: it is how an extractor says "field not present",
/// and it forces the enclosing predicate to `false`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Nothing was extracted.
    #[default]
    None,
    /// Text (paths, header values, tool names, ...).
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Domain-defined payload, opaque to the kernel.
    Extension(Arc<dyn ExtensionValue>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Extension(a), Self::Extension(b)) => {
                a.kind() == b.kind() && a.same_as(b.as_ref())
            }
            _ => false,
        }
    }
}

impl Value {
    /// `true` for [`Value::None`].
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The text, if this is a [`Value::Str`].
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`].
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The flag, if this is a [`Value::Bool`].
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The bytes, if this is a [`Value::Bytes`].
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The extension payload, if this is a [`Value::Extension`].
    #[inline]
    #[must_use]
    pub fn as_extension(&self) -> Option<&dyn ExtensionValue> {
        match self {
            Self::Extension(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Kind name used for construction-time compatibility checks.
    ///
    /// Extensions report their own [`ExtensionValue::kind`].
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Bytes(_) => "bytes",
            Self::Extension(e) => e.kind(),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}
