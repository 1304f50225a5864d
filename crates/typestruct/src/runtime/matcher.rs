//! Descriptor matcher — decides whether a value conforms to a resolved
//! descriptor.
//!
//! Both entry points share one recursive walk, monomorphised on whether
//! diagnostics are wanted. The quiet walk never formats text and never
//! records path segments; the verbose walk fills them in only on failure.

use crate::error::MatchDiagnostic;
use crate::runtime::value::{ArrayKey, Layout, Value, ValueKind};
use crate::types::descriptor::{ShapeField, TypeDescriptor, TypeNode};
use crate::types::registry::{Capability, ClassRegistry};

/// Partial diagnostic carried up the stack. `path` is innermost-first.
#[derive(Debug, Default)]
struct Miss {
    given: Option<String>,
    expected: Option<String>,
    path: Vec<ArrayKey>,
}

impl Miss {
    fn into_diagnostic(self) -> MatchDiagnostic {
        let mut path = self.path;
        path.reverse();
        MatchDiagnostic {
            given_type: self.given.unwrap_or_default(),
            expected_type: self.expected.unwrap_or_default(),
            path,
        }
    }
}

pub struct Matcher<'r> {
    registry: &'r dyn ClassRegistry,
}

impl<'r> Matcher<'r> {
    pub fn new(registry: &'r dyn ClassRegistry) -> Self {
        Self { registry }
    }

    pub fn matches(&self, ts: &TypeDescriptor, v: &Value) -> bool {
        self.check::<false>(ts, v).is_ok()
    }

    /// Same outcome as `matches`, with a diagnostic on failure.
    pub fn matches_verbose(&self, ts: &TypeDescriptor, v: &Value) -> Result<(), MatchDiagnostic> {
        self.check::<true>(ts, v).map_err(Miss::into_diagnostic)
    }

    // ── Walk ──────────────────────────────────────────────────────────────────

    fn check<const VERBOSE: bool>(&self, ts: &TypeDescriptor, v: &Value) -> Result<(), Miss> {
        if ts.nullable && v.is_null() {
            return Ok(());
        }
        let kind = v.kind();
        let result = match &ts.node {
            TypeNode::Int       => kind == ValueKind::Int,
            TypeNode::Bool      => kind == ValueKind::Bool,
            TypeNode::Float     => kind == ValueKind::Float,
            TypeNode::String    => kind == ValueKind::Str,
            TypeNode::Resource  => kind == ValueKind::Resource,
            TypeNode::Num       => matches!(kind, ValueKind::Int | ValueKind::Float),
            TypeNode::ArrayKey  => matches!(kind, ValueKind::Int | ValueKind::Str),
            TypeNode::Dict      => kind == ValueKind::Dict,
            TypeNode::Vec       => kind == ValueKind::Vec,
            TypeNode::Keyset    => kind == ValueKind::Keyset,
            TypeNode::VecOrDict => matches!(kind, ValueKind::Vec | ValueKind::Dict),
            TypeNode::Enum { classname } => self.registry
                .lookup_class(classname)
                .is_some_and(|cls| cls.has_enum_value(v)),
            TypeNode::Class { classname }
            | TypeNode::Interface { classname } => self.instance_of(v, classname),
            TypeNode::Void      => kind == ValueKind::Null,
            TypeNode::NoReturn  => false,
            TypeNode::Mixed     => return Ok(()),
            TypeNode::NonNull   => kind != ValueKind::Null,
            TypeNode::Tuple { elem_types } => return self.check_tuple::<VERBOSE>(ts, elem_types, v),
            TypeNode::Shape { fields, allows_unknown_fields } => {
                return self.check_shape::<VERBOSE>(ts, fields, *allows_unknown_fields, v);
            }
            // Should have been resolved away; never a match.
            TypeNode::Array
            | TypeNode::Unresolved { .. }
            | TypeNode::TypeAccess { .. }
            | TypeNode::Xhp { .. } => false,
            TypeNode::Fun { .. }
            | TypeNode::TypeVar { .. }
            | TypeNode::Trait { .. } => {
                unreachable!("`{ts}` reached the matcher; assertion legality must reject it first")
            }
        };
        if result { Ok(()) } else { Err(miss::<VERBOSE>(ts, v)) }
    }

    fn check_tuple<const VERBOSE: bool>(
        &self,
        ts: &TypeDescriptor,
        elem_types: &[TypeDescriptor],
        v: &Value,
    ) -> Result<(), Miss> {
        let Some(elems) = v.as_list() else {
            return Err(miss::<VERBOSE>(ts, v));
        };
        if elems.len() != elem_types.len() {
            return Err(length_miss::<VERBOSE>(ts, v, elems.len()));
        }
        for (i, (elem_ts, elem)) in elem_types.iter().zip(elems).enumerate() {
            self.check::<VERBOSE>(elem_ts, elem)
                .map_err(|m| nested::<VERBOSE>(m, || ArrayKey::Int(i as i64)))?;
        }
        Ok(())
    }

    fn check_shape<const VERBOSE: bool>(
        &self,
        ts: &TypeDescriptor,
        fields: &[(ArrayKey, ShapeField)],
        allows_unknown_fields: bool,
        v: &Value,
    ) -> Result<(), Miss> {
        let (Some(Layout::Record), Some(num_fields)) = (v.layout(), v.array_len()) else {
            return Err(miss::<VERBOSE>(ts, v));
        };
        let num_required = fields.iter().filter(|(_, f)| !f.optional).count();
        if num_fields < num_required {
            return Err(length_miss::<VERBOSE>(ts, v, num_fields));
        }
        if !allows_unknown_fields && num_fields > fields.len() {
            return Err(length_miss::<VERBOSE>(ts, v, num_fields));
        }

        let mut num_consumed = 0;
        for (key, field) in fields {
            let Some(value) = v.get(key) else {
                if field.optional {
                    continue;
                }
                return Err(missing_field::<VERBOSE>(ts, key));
            };
            self.check::<VERBOSE>(&field.descriptor, value)
                .map_err(|m| nested::<VERBOSE>(m, || key.clone()))?;
            num_consumed += 1;
        }

        // Independent of the over-count check above: a record can stay within
        // the declared count while holding undeclared keys in place of absent
        // optional ones.
        if allows_unknown_fields || num_fields == num_consumed {
            Ok(())
        } else {
            Err(length_miss::<VERBOSE>(ts, v, num_fields))
        }
    }

    /// Class/interface conformance. Objects go through instance-of; other
    /// values through the class's declared capabilities.
    fn instance_of(&self, v: &Value, classname: &str) -> bool {
        let capability = match v {
            Value::Null | Value::Bool(_) | Value::Resource(_) => return false,
            Value::Int(_)    => Capability::Int,
            Value::Float(_)  => Capability::Float,
            Value::Str(_)    => Capability::String,
            Value::Vec(_)    => Capability::Vec,
            Value::Dict(_)   => Capability::Dict,
            Value::Keyset(_) => Capability::Keyset,
            Value::Array(_)  => Capability::Array,
            Value::Object(obj) => {
                let Some(cls) = self.registry.lookup_class(classname) else { return false };
                return self.registry
                    .lookup_class(&obj.class)
                    .is_some_and(|own| own.instance_of(cls));
            }
        };
        self.registry
            .lookup_class(classname)
            .is_some_and(|cls| cls.supports(capability))
    }
}

// ─── Diagnostics ──────────────────────────────────────────────────────────────

fn miss<const VERBOSE: bool>(ts: &TypeDescriptor, v: &Value) -> Miss {
    if !VERBOSE {
        return Miss::default();
    }
    Miss {
        given: Some(v.kind().name().to_owned()),
        expected: Some(ts.to_string()),
        path: Vec::new(),
    }
}

fn length_miss<const VERBOSE: bool>(ts: &TypeDescriptor, v: &Value, len: usize) -> Miss {
    if !VERBOSE {
        return Miss::default();
    }
    Miss {
        given: Some(format!("{} of length {len}", v.kind())),
        expected: Some(ts.to_string()),
        path: Vec::new(),
    }
}

/// A required shape field with no value at its key.
fn missing_field<const VERBOSE: bool>(ts: &TypeDescriptor, key: &ArrayKey) -> Miss {
    if !VERBOSE {
        return Miss::default();
    }
    Miss {
        given: Some(String::new()),
        expected: Some(ts.to_string()),
        path: vec![key.clone()],
    }
}

fn nested<const VERBOSE: bool>(mut m: Miss, key: impl FnOnce() -> ArrayKey) -> Miss {
    if VERBOSE {
        m.path.push(key());
    }
    m
}
