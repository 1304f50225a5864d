//! Late-bound classification
//!
//! Whether a descriptor's resolution may depend on the calling class (a
//! `this`-relative type somewhere inside it). Coarse on purpose: only the
//! root kind is inspected, never a class name or nested content.

use crate::types::descriptor::{Kind, TypeDescriptor};

pub fn could_be_late_bound(ts: &TypeDescriptor) -> bool {
    kind_could_be_late_bound(ts.kind())
}

pub fn kind_could_be_late_bound(kind: Kind) -> bool {
    match kind {
        Kind::Tuple
        | Kind::Fun
        | Kind::Array
        | Kind::Shape
        | Kind::Class
        | Kind::Interface
        | Kind::Trait
        | Kind::Dict
        | Kind::Vec
        | Kind::Keyset
        | Kind::VecOrDict
        | Kind::Unresolved
        | Kind::TypeAccess => true,
        Kind::Void
        | Kind::Int
        | Kind::Bool
        | Kind::Float
        | Kind::String
        | Kind::Resource
        | Kind::Num
        | Kind::ArrayKey
        | Kind::NoReturn
        | Kind::Mixed
        | Kind::TypeVar
        | Kind::Enum
        | Kind::NonNull
        | Kind::Xhp => false,
    }
}
