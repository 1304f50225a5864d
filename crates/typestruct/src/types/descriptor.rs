//! Resolved type descriptors — the structural form of a type annotation that
//! the `is`/`as` operators check values against.
//!
//! Kind-specific attributes live in the payload of the kind's variant, so a
//! tuple always has element types, a shape always has fields, and an
//! enum/class/interface always has a class name.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize, Serializer};

use crate::runtime::value::ArrayKey;

// ─── Kind ─────────────────────────────────────────────────────────────────────

/// Payload-free discriminant of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Bool,
    Float,
    String,
    Resource,
    Num,
    ArrayKey,
    Dict,
    Vec,
    Keyset,
    VecOrDict,
    Enum,
    Class,
    Interface,
    Void,
    NoReturn,
    Mixed,
    NonNull,
    Tuple,
    Shape,
    Array,
    Unresolved,
    TypeAccess,
    Xhp,
    Fun,
    TypeVar,
    Trait,
}

impl Kind {
    pub const ALL: [Kind; 27] = [
        Kind::Int, Kind::Bool, Kind::Float, Kind::String, Kind::Resource,
        Kind::Num, Kind::ArrayKey, Kind::Dict, Kind::Vec, Kind::Keyset,
        Kind::VecOrDict, Kind::Enum, Kind::Class, Kind::Interface, Kind::Void,
        Kind::NoReturn, Kind::Mixed, Kind::NonNull, Kind::Tuple, Kind::Shape,
        Kind::Array, Kind::Unresolved, Kind::TypeAccess, Kind::Xhp, Kind::Fun,
        Kind::TypeVar, Kind::Trait,
    ];
}

// ─── Descriptor ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(flatten)]
    pub node: TypeNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    Int,
    Bool,
    Float,
    String,
    Resource,
    Num,
    #[serde(rename = "arraykey")]
    ArrayKey,
    Dict,
    Vec,
    Keyset,
    VecOrDict,
    Enum { classname: String },
    Class { classname: String },
    Interface { classname: String },
    Void,
    #[serde(rename = "noreturn")]
    NoReturn,
    Mixed,
    #[serde(rename = "nonnull")]
    NonNull,
    Tuple { elem_types: Vec<TypeDescriptor> },
    Shape {
        /// Declaration order is significant: it drives both matching and
        /// the order in which nested problems are reported.
        fields: ShapeFields,
        #[serde(default)]
        allows_unknown_fields: bool,
    },
    Array,
    Unresolved { classname: String },
    #[serde(rename = "typeaccess")]
    TypeAccess { root_name: String, access_list: Vec<String> },
    Xhp { classname: String },
    Fun { param_types: Vec<TypeDescriptor>, return_type: Box<TypeDescriptor> },
    #[serde(rename = "typevar")]
    TypeVar { name: String },
    Trait { classname: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeField {
    pub descriptor: TypeDescriptor,
    #[serde(default)]
    pub optional: bool,
}

impl ShapeField {
    pub fn required(descriptor: TypeDescriptor) -> Self {
        Self { descriptor, optional: false }
    }

    pub fn optional(descriptor: TypeDescriptor) -> Self {
        Self { descriptor, optional: true }
    }
}

// ─── Shape fields ─────────────────────────────────────────────────────────────

/// Declared shape fields: a mapping from key to field in declaration order.
///
/// Every way in (`FromIterator`, `From<Vec<_>>`, deserialization) folds a
/// repeated key into one entry that keeps its first position and its last
/// field, so a key is never declared twice.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<(ArrayKey, ShapeField)>")]
pub struct ShapeFields {
    entries: Vec<(ArrayKey, ShapeField)>,
}

impl ShapeFields {
    pub fn new() -> Self { Self::default() }

    /// Declare or redeclare `key`. Returns the field it replaced.
    pub fn insert(&mut self, key: impl Into<ArrayKey>, field: ShapeField) -> Option<ShapeField> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, field)),
            None => {
                self.entries.push((key, field));
                None
            }
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&ShapeField> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }
}

impl Deref for ShapeFields {
    type Target = [(ArrayKey, ShapeField)];

    fn deref(&self) -> &Self::Target { &self.entries }
}

impl<'a> IntoIterator for &'a ShapeFields {
    type Item = &'a (ArrayKey, ShapeField);
    type IntoIter = std::slice::Iter<'a, (ArrayKey, ShapeField)>;

    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

impl<K: Into<ArrayKey>> FromIterator<(K, ShapeField)> for ShapeFields {
    fn from_iter<I: IntoIterator<Item = (K, ShapeField)>>(iter: I) -> Self {
        let mut fields = ShapeFields::new();
        for (key, field) in iter {
            fields.insert(key, field);
        }
        fields
    }
}

impl From<Vec<(ArrayKey, ShapeField)>> for ShapeFields {
    fn from(entries: Vec<(ArrayKey, ShapeField)>) -> Self { entries.into_iter().collect() }
}

impl Serialize for ShapeFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl From<TypeNode> for TypeDescriptor {
    fn from(node: TypeNode) -> Self { Self { nullable: false, node } }
}

impl TypeDescriptor {
    pub fn new(node: TypeNode) -> Self { node.into() }

    /// The same descriptor with `nullable` set.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn kind(&self) -> Kind {
        match &self.node {
            TypeNode::Int              => Kind::Int,
            TypeNode::Bool             => Kind::Bool,
            TypeNode::Float            => Kind::Float,
            TypeNode::String           => Kind::String,
            TypeNode::Resource         => Kind::Resource,
            TypeNode::Num              => Kind::Num,
            TypeNode::ArrayKey         => Kind::ArrayKey,
            TypeNode::Dict             => Kind::Dict,
            TypeNode::Vec              => Kind::Vec,
            TypeNode::Keyset           => Kind::Keyset,
            TypeNode::VecOrDict        => Kind::VecOrDict,
            TypeNode::Enum { .. }      => Kind::Enum,
            TypeNode::Class { .. }     => Kind::Class,
            TypeNode::Interface { .. } => Kind::Interface,
            TypeNode::Void             => Kind::Void,
            TypeNode::NoReturn         => Kind::NoReturn,
            TypeNode::Mixed            => Kind::Mixed,
            TypeNode::NonNull          => Kind::NonNull,
            TypeNode::Tuple { .. }     => Kind::Tuple,
            TypeNode::Shape { .. }     => Kind::Shape,
            TypeNode::Array            => Kind::Array,
            TypeNode::Unresolved { .. } => Kind::Unresolved,
            TypeNode::TypeAccess { .. } => Kind::TypeAccess,
            TypeNode::Xhp { .. }       => Kind::Xhp,
            TypeNode::Fun { .. }       => Kind::Fun,
            TypeNode::TypeVar { .. }   => Kind::TypeVar,
            TypeNode::Trait { .. }     => Kind::Trait,
        }
    }

    /// Class name of an enum, class or interface descriptor.
    pub fn classname(&self) -> Option<&str> {
        match &self.node {
            TypeNode::Enum { classname }
            | TypeNode::Class { classname }
            | TypeNode::Interface { classname } => Some(classname),
            _ => None,
        }
    }

    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn int() -> Self { TypeNode::Int.into() }
    pub fn bool() -> Self { TypeNode::Bool.into() }
    pub fn float() -> Self { TypeNode::Float.into() }
    pub fn string() -> Self { TypeNode::String.into() }
    pub fn mixed() -> Self { TypeNode::Mixed.into() }

    pub fn enumeration(classname: impl Into<String>) -> Self {
        TypeNode::Enum { classname: classname.into() }.into()
    }

    pub fn class(classname: impl Into<String>) -> Self {
        TypeNode::Class { classname: classname.into() }.into()
    }

    pub fn interface(classname: impl Into<String>) -> Self {
        TypeNode::Interface { classname: classname.into() }.into()
    }

    pub fn tuple(elem_types: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        TypeNode::Tuple { elem_types: elem_types.into_iter().collect() }.into()
    }

    /// A closed shape. A key declared twice keeps its first position and its
    /// last field.
    pub fn shape<K: Into<ArrayKey>>(fields: impl IntoIterator<Item = (K, ShapeField)>) -> Self {
        TypeNode::Shape { fields: fields.into_iter().collect(), allows_unknown_fields: false }.into()
    }

    /// Open a shape to undeclared keys. No effect on other kinds.
    pub fn allow_unknown_fields(mut self) -> Self {
        if let TypeNode::Shape { allows_unknown_fields, .. } = &mut self.node {
            *allows_unknown_fields = true;
        }
        self
    }
}

// ─── Rendering ────────────────────────────────────────────────────────────────

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            f.write_str("?")?;
        }
        match &self.node {
            TypeNode::Int       => f.write_str("int"),
            TypeNode::Bool      => f.write_str("bool"),
            TypeNode::Float     => f.write_str("float"),
            TypeNode::String    => f.write_str("string"),
            TypeNode::Resource  => f.write_str("resource"),
            TypeNode::Num       => f.write_str("num"),
            TypeNode::ArrayKey  => f.write_str("arraykey"),
            TypeNode::Dict      => f.write_str("dict"),
            TypeNode::Vec       => f.write_str("vec"),
            TypeNode::Keyset    => f.write_str("keyset"),
            TypeNode::VecOrDict => f.write_str("vec_or_dict"),
            TypeNode::Void      => f.write_str("void"),
            TypeNode::NoReturn  => f.write_str("noreturn"),
            TypeNode::Mixed     => f.write_str("mixed"),
            TypeNode::NonNull   => f.write_str("nonnull"),
            TypeNode::Array     => f.write_str("array"),
            TypeNode::Enum { classname }
            | TypeNode::Class { classname }
            | TypeNode::Interface { classname }
            | TypeNode::Unresolved { classname }
            | TypeNode::Xhp { classname }
            | TypeNode::Trait { classname } => f.write_str(classname),
            TypeNode::TypeVar { name } => f.write_str(name),
            TypeNode::TypeAccess { root_name, access_list } => {
                f.write_str(root_name)?;
                for access in access_list {
                    write!(f, "::{access}")?;
                }
                Ok(())
            }
            TypeNode::Tuple { elem_types } => {
                f.write_str("(")?;
                write_list(f, elem_types)?;
                f.write_str(")")
            }
            TypeNode::Shape { fields, allows_unknown_fields } => {
                f.write_str("shape(")?;
                for (i, (key, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if field.optional {
                        f.write_str("?")?;
                    }
                    match key {
                        ArrayKey::Int(n) => write!(f, "{n}")?,
                        ArrayKey::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))?,
                    }
                    write!(f, " => {}", field.descriptor)?;
                }
                if *allows_unknown_fields {
                    f.write_str(if fields.is_empty() { "..." } else { ", ..." })?;
                }
                f.write_str(")")
            }
            TypeNode::Fun { param_types, return_type } => {
                f.write_str("(function(")?;
                write_list(f, param_types)?;
                write!(f, "): {return_type})")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeDescriptor]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
