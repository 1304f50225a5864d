pub mod validator;
pub mod late_bound;


use crate::error::{Error, ResolveError};
use crate::types::descriptor::TypeDescriptor;
pub use late_bound::{could_be_late_bound, kind_could_be_late_bound};
pub use validator::{Validator, check_legal_for_assertion, collect_illegal_kinds};

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Class context a descriptor is resolved in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext<'a> {
    /// Class whose source declares the annotation.
    pub declaring_class: Option<&'a str>,
    /// Class the code is running on behalf of; what `this` resolves to.
    pub called_class: Option<&'a str>,
}

/// Upstream pass that turns an annotation's descriptor into the closed,
/// concrete form the matcher expects.
pub trait Resolver {
    fn resolve(&self, ts: &TypeDescriptor, ctx: &ResolveContext<'_>) -> Result<TypeDescriptor, ResolveError>;
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Full pipeline run once per assertion site:
/// 1. Resolver  — concrete descriptor for this class context
/// 2. Validator — reject kinds illegal in `is`/`as`
pub fn resolve_and_verify<R: Resolver + ?Sized>(
    resolver: &R,
    ts: &TypeDescriptor,
    ctx: &ResolveContext<'_>,
) -> Result<TypeDescriptor, Error> {
    let resolved = resolver.resolve(ts, ctx).map_err(|e| {
        tracing::debug!(descriptor = %ts, error = %e, "type resolution failed");
        e
    })?;
    check_legal_for_assertion(&resolved)?;
    Ok(resolved)
}
