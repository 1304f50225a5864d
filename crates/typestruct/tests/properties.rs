//! Property tests for the matcher and the validators.

use proptest::prelude::*;
use typestruct::{
    ArrayKey, ClassTable, IllegalKindError, Kind, Matcher, ShapeField, TypeDescriptor, TypeNode,
    Value, ValueKind, analysis,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_key() -> impl Strategy<Value = ArrayKey> {
    prop_oneof![
        (0i64..6).prop_map(ArrayKey::Int),
        "[a-d]{1,2}".prop_map(ArrayKey::Str),
    ]
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1e6f64..1e6).prop_map(Value::Float),
        "[a-z]{0,6}".prop_map(Value::Str),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Vec),
            prop::collection::vec((arb_key(), inner.clone()), 0..4).prop_map(|entries| Value::dict(entries)),
            prop::collection::vec(arb_key(), 0..4).prop_map(|keys| Value::keyset(keys)),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|elems| Value::varray(elems)),
            prop::collection::vec((arb_key(), inner), 0..4).prop_map(|entries| Value::darray(entries)),
        ]
    })
}

fn arb_primitive() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        Just(TypeDescriptor::int()),
        Just(TypeDescriptor::bool()),
        Just(TypeDescriptor::float()),
        Just(TypeDescriptor::string()),
        Just(TypeDescriptor::from(TypeNode::Resource)),
    ]
}

/// Descriptors built only from kinds legal in an assertion.
fn arb_legal_descriptor() -> impl Strategy<Value = TypeDescriptor> {
    let leaf = prop_oneof![
        arb_primitive(),
        Just(TypeDescriptor::mixed()),
        Just(TypeDescriptor::from(TypeNode::Num)),
        Just(TypeDescriptor::from(TypeNode::ArrayKey)),
        Just(TypeDescriptor::from(TypeNode::NonNull)),
        Just(TypeDescriptor::from(TypeNode::Vec)),
        Just(TypeDescriptor::from(TypeNode::Dict)),
        Just(TypeDescriptor::from(TypeNode::VecOrDict)),
    ];
    let leaf = (leaf, any::<bool>()).prop_map(|(ts, n)| if n { ts.nullable() } else { ts });
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|elems| TypeDescriptor::tuple(elems)),
            (prop::collection::vec((arb_key(), inner, any::<bool>()), 0..4), any::<bool>()).prop_map(
                |(fields, open)| {
                    let ts = TypeDescriptor::shape(
                        fields.into_iter().map(|(k, ts, optional)| (k, ShapeField { descriptor: ts, optional })),
                    );
                    if open { ts.allow_unknown_fields() } else { ts }
                },
            ),
        ]
    })
}

fn primitive_value_kind(ts: &TypeDescriptor) -> ValueKind {
    match ts.kind() {
        Kind::Int      => ValueKind::Int,
        Kind::Bool     => ValueKind::Bool,
        Kind::Float    => ValueKind::Float,
        Kind::String   => ValueKind::Str,
        Kind::Resource => ValueKind::Resource,
        other => unreachable!("not a primitive: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn primitive_matches_iff_same_kind(ts in arb_primitive(), v in arb_value()) {
        let table = ClassTable::new();
        let m = Matcher::new(&table);
        prop_assert_eq!(m.matches(&ts, &v), v.kind() == primitive_value_kind(&ts));
    }

    #[test]
    fn nullable_always_accepts_null(ts in arb_legal_descriptor()) {
        let table = ClassTable::new();
        prop_assert!(Matcher::new(&table).matches(&ts.nullable(), &Value::Null));
    }

    #[test]
    fn mixed_accepts_everything(v in arb_value()) {
        let table = ClassTable::new();
        prop_assert!(Matcher::new(&table).matches(&TypeDescriptor::mixed(), &v));
    }

    #[test]
    fn quiet_and_verbose_agree(ts in arb_legal_descriptor(), v in arb_value()) {
        let table = ClassTable::new();
        let m = Matcher::new(&table);
        let verbose = m.matches_verbose(&ts, &v);
        prop_assert_eq!(m.matches(&ts, &v), verbose.is_ok());
        if let Err(d) = verbose {
            prop_assert!(!d.expected_type.is_empty());
        }
    }

    #[test]
    fn matching_is_idempotent(ts in arb_legal_descriptor(), v in arb_value()) {
        let table = ClassTable::new();
        let m = Matcher::new(&table);
        prop_assert_eq!(m.matches_verbose(&ts, &v), m.matches_verbose(&ts, &v));
    }

    #[test]
    fn tuple_arity_mismatch_always_fails(
        n in 0usize..5,
        elems in prop::collection::vec(arb_value(), 0..7),
    ) {
        prop_assume!(elems.len() != n);
        let len = elems.len();
        let ts = TypeDescriptor::tuple(std::iter::repeat_n(TypeDescriptor::mixed(), n));
        let table = ClassTable::new();
        let d = Matcher::new(&table).matches_verbose(&ts, &Value::Vec(elems)).unwrap_err();
        prop_assert_eq!(d.given_type, format!("Vec of length {len}"));
        prop_assert!(d.path.is_empty());
    }

    #[test]
    fn legal_descriptors_pass_validation(ts in arb_legal_descriptor()) {
        prop_assert_eq!(analysis::check_legal_for_assertion(&ts), Ok(()));
    }

    #[test]
    fn nested_function_is_always_illegal(ts in arb_legal_descriptor(), wrap_in_shape in any::<bool>()) {
        let fun: TypeDescriptor = TypeNode::Fun { param_types: vec![], return_type: Box::new(TypeNode::Void.into()) }.into();
        let outer = if wrap_in_shape {
            TypeDescriptor::shape([("ok", ShapeField::required(ts)), ("f", ShapeField::optional(fun))])
        } else {
            TypeDescriptor::tuple([ts, TypeDescriptor::tuple([fun])])
        };
        prop_assert_eq!(analysis::check_legal_for_assertion(&outer), Err(IllegalKindError::Function));
    }

    #[test]
    fn late_bound_depends_on_kind_only(ts in arb_legal_descriptor()) {
        prop_assert_eq!(analysis::could_be_late_bound(&ts), analysis::kind_could_be_late_bound(ts.kind()));
        prop_assert_eq!(
            analysis::could_be_late_bound(&ts),
            matches!(ts.kind(), Kind::Tuple | Kind::Shape | Kind::Vec | Kind::Dict | Kind::VecOrDict),
        );
    }
}
