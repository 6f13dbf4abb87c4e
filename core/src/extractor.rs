//! `Extractor`: the extraction port.
//!
//! Generic over the context type, returns domain-agnostic [`Value`]s.

use crate::Value;
use std::fmt::Debug;

/// Pulls one value out of a domain context.
///
/// Implementations must be pure: same context, same value, no side effects.
/// A field that is not present is reported as [`Value::None`], never as an
/// error.
///
/// # Example
///
/// ```
/// use gavel::{Extractor, Value};
///
/// #[derive(Debug)]
/// struct Event { source: Option<String> }
///
/// #[derive(Debug)]
/// struct SourceInput;
///
/// impl Extractor<Event> for SourceInput {
///     fn extract(&self, ctx: &Event) -> Value {
///         ctx.source.clone().into()
///     }
/// }
///
/// assert_eq!(SourceInput.extract(&Event { source: None }), Value::None);
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Extractor<{Ctx}>`",
    label = "this type cannot extract values from `{Ctx}`",
    note = "an extractor is bound to one context type; implement `Extractor<{Ctx}>` for it"
)]
pub trait Extractor<Ctx>: Send + Sync + Debug {
    /// Extract a value, or [`Value::None`] if the field is absent.
    fn extract(&self, ctx: &Ctx) -> Value;

    /// Kind of value this extractor produces (see [`Value::kind`]).
    ///
    /// Checked against [`ValueMatcher::accepts`](crate::ValueMatcher::accepts)
    /// when predicates are loaded from configuration.
    fn produces(&self) -> &'static str {
        "string"
    }
}

#[diagnostic::do_not_recommend]
impl<Ctx> Extractor<Ctx> for Box<dyn Extractor<Ctx>> {
    fn extract(&self, ctx: &Ctx) -> Value {
        (**self).extract(ctx)
    }

    fn produces(&self) -> &'static str {
        (**self).produces()
    }
}
