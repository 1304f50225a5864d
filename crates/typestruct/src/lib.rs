pub mod types;
pub mod runtime;
pub mod analysis;
pub mod error;

pub use error::{Error, ErrorCode, IllegalKindError, MatchDiagnostic, MismatchError, ResolveError};
pub use types::descriptor::{Kind, ShapeField, ShapeFields, TypeDescriptor, TypeNode};
pub use types::registry::{Capability, ClassDecl, ClassInfo, ClassRegistry, ClassTable};
pub use runtime::value::{ArrayKey, Dict, Keyset, Layout, LegacyArray, Object, Resource, Value, ValueKind};
pub use runtime::matcher::Matcher;
pub use analysis::{ResolveContext, Resolver};

// ─── Public API ───────────────────────────────────────────────────────────────

/// Whether `value` conforms to `ts`.
///
/// Panics if `ts` contains a function, type variable or trait at a position
/// the walk reaches; run `analysis::check_legal_for_assertion` first.
pub fn matches(registry: &dyn ClassRegistry, ts: &TypeDescriptor, value: &Value) -> bool {
    Matcher::new(registry).matches(ts, value)
}

/// `matches`, with a diagnostic for the first point of divergence.
pub fn matches_verbose(
    registry: &dyn ClassRegistry,
    ts: &TypeDescriptor,
    value: &Value,
) -> Result<(), MatchDiagnostic> {
    Matcher::new(registry).matches_verbose(ts, value)
}

// ─── Assertion ────────────────────────────────────────────────────────────────

/// A descriptor validated for use with `is` and `as`. Built once per
/// assertion site, then checked against any number of values.
///
/// Lifecycle:
///   1. `Assertion::new(ts)` or `Assertion::resolve(resolver, ts, ctx)` —
///      rejects illegal kinds and records whether the descriptor could be
///      late-bound.
///   2. `is` / `check` per value.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    descriptor: TypeDescriptor,
    late_bound: bool,
}

impl Assertion {
    pub fn new(descriptor: TypeDescriptor) -> Result<Self, IllegalKindError> {
        analysis::check_legal_for_assertion(&descriptor)?;
        let late_bound = analysis::could_be_late_bound(&descriptor);
        tracing::trace!(descriptor = %descriptor, late_bound, "assertion ready");
        Ok(Self { descriptor, late_bound })
    }

    /// Resolve `ts` in `ctx`, then validate the result.
    pub fn resolve<R: Resolver + ?Sized>(
        resolver: &R,
        ts: &TypeDescriptor,
        ctx: &ResolveContext<'_>,
    ) -> Result<Self, Error> {
        let resolved = analysis::resolve_and_verify(resolver, ts, ctx)?;
        // Classified on the annotation, not on what it resolved to.
        let late_bound = analysis::could_be_late_bound(ts);
        tracing::trace!(descriptor = %resolved, late_bound, "assertion ready");
        Ok(Self { descriptor: resolved, late_bound })
    }

    pub fn descriptor(&self) -> &TypeDescriptor { &self.descriptor }

    /// Whether resolving the annotation again from another calling class may
    /// give a different descriptor, so this one must not be shared across
    /// unrelated call sites.
    pub fn could_be_late_bound(&self) -> bool { self.late_bound }

    /// The `is` operator.
    pub fn is(&self, registry: &dyn ClassRegistry, value: &Value) -> bool {
        matches(registry, &self.descriptor, value)
    }

    /// The `as` operator: `Ok` when `value` conforms.
    pub fn check(&self, registry: &dyn ClassRegistry, value: &Value) -> Result<(), MismatchError> {
        matches_verbose(registry, &self.descriptor, value).map_err(|d| {
            tracing::debug!(
                expected = %d.expected_type,
                given = %d.given_type,
                path = %d.path_string(),
                "type assertion failed"
            );
            MismatchError::from(d)
        })
    }
}
