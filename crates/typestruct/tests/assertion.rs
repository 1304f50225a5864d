//! `is` / `as` through the `Assertion` handle.
//!
//! Tests the full stack: resolve → validate → match, and the messages the
//! `as` operator surfaces.

use typestruct::{
    Assertion, ClassDecl, ClassTable, Error, ErrorCode, IllegalKindError, ResolveContext,
    ResolveError, Resolver, ShapeField, TypeDescriptor, TypeNode, Value,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn table() -> ClassTable {
    let mut t = ClassTable::standard();
    t.register(ClassDecl::class("Base"));
    t.register(ClassDecl::class("Child").extends("Base"));
    t
}

fn assertion(ts: TypeDescriptor) -> Assertion {
    Assertion::new(ts).unwrap_or_else(|e| panic!("assertion rejected: {e}"))
}

fn as_err(ts: TypeDescriptor, v: &Value) -> String {
    assertion(ts)
        .check(&table(), v)
        .expect_err("expected `as` to fail")
        .to_string()
}

/// Resolves `this` to the called class and type constants through a fixed table.
struct Hierarchy;

impl Resolver for Hierarchy {
    fn resolve(&self, ts: &TypeDescriptor, ctx: &ResolveContext<'_>) -> Result<TypeDescriptor, ResolveError> {
        let node = match &ts.node {
            TypeNode::Class { classname } if classname == "this" => TypeNode::Class {
                classname: ctx.called_class.ok_or_else(|| ResolveError::new("`this` outside a class"))?.into(),
            },
            TypeNode::TypeAccess { root_name, access_list } if root_name == "this" => {
                match (ctx.called_class, access_list.as_slice()) {
                    (Some("Child"), [t]) if t == "TItem" => TypeNode::Int,
                    (Some("Base"), [t]) if t == "TItem" => TypeNode::String,
                    _ => return Err(ResolveError::new(format!("no type constant {}", access_list.join("::")))),
                }
            }
            TypeNode::Unresolved { classname } if classname == "Generic" => TypeNode::TypeVar { name: "T".into() },
            other => other.clone(),
        };
        Ok(TypeDescriptor { nullable: ts.nullable, node })
    }
}

// ─── is ──────────────────────────────────────────────────────────────────────

#[test]
fn is_operator() {
    let a = assertion(TypeDescriptor::shape([("id", ShapeField::required(TypeDescriptor::int()))]));
    assert!(a.is(&table(), &Value::dict([("id", Value::Int(1))])));
    assert!(!a.is(&table(), &Value::dict([("id", Value::str("1"))])));
}

#[test]
fn illegal_assertion_is_rejected_before_matching() {
    let ts = TypeDescriptor::tuple([TypeNode::Array.into()]);
    assert_eq!(Assertion::new(ts), Err(IllegalKindError::Array));
}

#[test]
fn late_bound_flag() {
    assert!(!assertion(TypeDescriptor::int()).could_be_late_bound());
    assert!(assertion(TypeDescriptor::class("Base")).could_be_late_bound());
    assert!(assertion(TypeDescriptor::tuple([TypeDescriptor::int()])).could_be_late_bound());
}

// ─── as ──────────────────────────────────────────────────────────────────────

#[test]
fn as_message_top_level() {
    assert_eq!(as_err(TypeDescriptor::int(), &Value::str("x")), "Expected int, got String");
    assert_eq!(as_err(TypeDescriptor::class("Child"), &Value::object("Base")), "Expected Child, got object");
}

#[test]
fn as_message_with_path() {
    let ts = TypeDescriptor::tuple([TypeDescriptor::int(), TypeDescriptor::int(), TypeDescriptor::shape([
        ("name", ShapeField::required(TypeDescriptor::string())),
    ])]);
    let v = Value::vec([Value::Int(0), Value::Int(1), Value::dict([("name", Value::Null)])]);
    assert_eq!(as_err(ts, &v), "Expected string at [2][\"name\"], got null");
}

#[test]
fn as_message_for_length() {
    let ts = TypeDescriptor::tuple([TypeDescriptor::int()]);
    assert_eq!(
        as_err(ts, &Value::vec([Value::Int(1), Value::Int(2)])),
        "Expected (int), got Vec of length 2",
    );
}

#[test]
fn as_message_for_missing_field() {
    let ts = TypeDescriptor::shape([
        ("a", ShapeField::optional(TypeDescriptor::int())),
        ("b", ShapeField::required(TypeDescriptor::int())),
    ]);
    assert_eq!(
        as_err(ts, &Value::dict([("a", Value::Int(1)), ("c", Value::Int(2))])),
        "Expected shape(?'a' => int, 'b' => int) at [\"b\"], got nothing",
    );
}

#[test]
fn as_succeeds_on_conforming_value() {
    let a = assertion(TypeDescriptor::class("Base").nullable());
    assert!(a.check(&table(), &Value::object("Child")).is_ok());
    assert!(a.check(&table(), &Value::Null).is_ok());
}

#[test]
fn mismatch_converts_into_error() {
    let err: Error = assertion(TypeDescriptor::bool())
        .check(&table(), &Value::Int(1))
        .unwrap_err()
        .into();
    assert_eq!(err.code(), ErrorCode::M001);
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[test]
fn resolve_this_per_called_class() {
    let ts = TypeDescriptor::class("this");
    let in_child = Assertion::resolve(&Hierarchy, &ts, &ResolveContext { declaring_class: Some("Base"), called_class: Some("Child") }).unwrap();
    let in_base = Assertion::resolve(&Hierarchy, &ts, &ResolveContext { declaring_class: Some("Base"), called_class: Some("Base") }).unwrap();

    let base_obj = Value::object("Base");
    assert!(!in_child.is(&table(), &base_obj));
    assert!(in_base.is(&table(), &base_obj));
    assert!(in_child.could_be_late_bound());
}

#[test]
fn resolve_type_constant() {
    let ts: TypeDescriptor = TypeNode::TypeAccess { root_name: "this".into(), access_list: vec!["TItem".into()] }.into();
    let ctx = ResolveContext { declaring_class: Some("Base"), called_class: Some("Child") };
    let a = Assertion::resolve(&Hierarchy, &ts, &ctx).unwrap();
    assert_eq!(a.descriptor(), &TypeDescriptor::int());
    // Classified on the annotation: a type access stays late-bound even
    // though it resolved to `int`.
    assert!(a.could_be_late_bound());
}

#[test]
fn resolve_failure() {
    let ts: TypeDescriptor = TypeNode::TypeAccess { root_name: "this".into(), access_list: vec!["Nope".into()] }.into();
    let err = Assertion::resolve(&Hierarchy, &ts, &ResolveContext::default()).unwrap_err();
    assert_eq!(err, Error::Resolution(ResolveError::new("no type constant Nope")));
}

#[test]
fn resolved_generic_is_illegal() {
    let ts: TypeDescriptor = TypeNode::Unresolved { classname: "Generic".into() }.into();
    let err = Assertion::resolve(&Hierarchy, &ts, &ResolveContext::default()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::A003);
}
