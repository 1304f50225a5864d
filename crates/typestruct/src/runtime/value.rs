//! Runtime values checked by the matcher.
//!
//! Array-like values come in two physical layouts: list (`vec`, packed
//! legacy arrays) and record (`dict`, mixed legacy arrays). Keysets are
//! array-like but have neither layout.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

// ─── Keys ─────────────────────────────────────────────────────────────────────

/// Key of an array-like value, and of a declared shape field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl From<i64> for ArrayKey {
    fn from(i: i64) -> Self { Self::Int(i) }
}

impl From<&str> for ArrayKey {
    fn from(s: &str) -> Self { Self::Str(s.to_owned()) }
}

impl From<String> for ArrayKey {
    fn from(s: String) -> Self { Self::Str(s) }
}

/// Path-segment form: integers bare, strings double-quoted and C-escaped.
impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => {
                f.write_char('"')?;
                write_c_escaped(f, s)?;
                f.write_char('"')
            }
        }
    }
}

/// C string-literal escaping, byte-wise: `\t` `\n` `\r` `\"` `\\` by name,
/// other bytes outside printable ASCII as three-digit octal.
fn write_c_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for &b in s.as_bytes() {
        match b {
            b'\t'        => f.write_str("\\t")?,
            b'\n'        => f.write_str("\\n")?,
            b'\r'        => f.write_str("\\r")?,
            b'"'         => f.write_str("\\\"")?,
            b'\\'        => f.write_str("\\\\")?,
            0x20..=0x7e  => f.write_char(char::from(b))?,
            _            => write!(f, "\\{b:03o}")?,
        }
    }
    Ok(())
}

// ─── Containers ───────────────────────────────────────────────────────────────

/// Insertion-ordered map from array keys to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict {
    entries: Vec<(ArrayKey, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<ArrayKey>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<ArrayKey>> FromIterator<(K, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// Insertion-ordered set of array keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyset {
    keys: Vec<ArrayKey>,
}

impl Keyset {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: impl Into<ArrayKey>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn contains(&self, key: &ArrayKey) -> bool { self.keys.contains(key) }

    pub fn len(&self) -> usize { self.keys.len() }

    pub fn is_empty(&self) -> bool { self.keys.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &ArrayKey> { self.keys.iter() }
}

impl<K: Into<ArrayKey>> FromIterator<K> for Keyset {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Keyset::new();
        for k in iter {
            set.insert(k);
        }
        set
    }
}

/// Pre-`vec`/`dict` array. `Packed` is keyed 0..n, `Mixed` arbitrarily.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyArray {
    Packed(Vec<Value>),
    Mixed(Dict),
}

// ─── Objects and resources ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    /// Name of the object's own class, as known to the class registry.
    pub class: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub id: u64,
    pub kind: String,
}

// ─── Value ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec(Vec<Value>),
    Dict(Dict),
    Keyset(Keyset),
    Array(LegacyArray),
    Object(Object),
    Resource(Resource),
}

/// Physical kind of a value, independent of its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Vec,
    Dict,
    Keyset,
    Array,
    Object,
    Resource,
}

impl ValueKind {
    /// Name used in mismatch diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null     => "null",
            Self::Bool     => "bool",
            Self::Int      => "Int",
            Self::Float    => "double",
            Self::Str      => "String",
            Self::Vec      => "Vec",
            Self::Dict     => "Dict",
            Self::Keyset   => "Keyset",
            Self::Array    => "Array",
            Self::Object   => "object",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical layout of an array-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Sequentially keyed from zero.
    List,
    /// Keyed arbitrarily.
    Record,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null        => ValueKind::Null,
            Value::Bool(_)     => ValueKind::Bool,
            Value::Int(_)      => ValueKind::Int,
            Value::Float(_)    => ValueKind::Float,
            Value::Str(_)      => ValueKind::Str,
            Value::Vec(_)      => ValueKind::Vec,
            Value::Dict(_)     => ValueKind::Dict,
            Value::Keyset(_)   => ValueKind::Keyset,
            Value::Array(_)    => ValueKind::Array,
            Value::Object(_)   => ValueKind::Object,
            Value::Resource(_) => ValueKind::Resource,
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// `None` for scalars, objects, resources and keysets.
    pub fn layout(&self) -> Option<Layout> {
        match self {
            Value::Vec(_) | Value::Array(LegacyArray::Packed(_)) => Some(Layout::List),
            Value::Dict(_) | Value::Array(LegacyArray::Mixed(_)) => Some(Layout::Record),
            _ => None,
        }
    }

    /// Elements of a list-layout value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::Vec(elems) | Value::Array(LegacyArray::Packed(elems)) => Some(elems.as_slice()),
            _ => None,
        }
    }

    /// Element count of any array-like value, keysets included.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Vec(elems) | Value::Array(LegacyArray::Packed(elems)) => Some(elems.len()),
            Value::Dict(d) | Value::Array(LegacyArray::Mixed(d)) => Some(d.len()),
            Value::Keyset(k) => Some(k.len()),
            _ => None,
        }
    }

    /// Exact-key lookup on a list- or record-layout value.
    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        match self {
            Value::Vec(elems) | Value::Array(LegacyArray::Packed(elems)) => match key {
                ArrayKey::Int(i) => usize::try_from(*i).ok().and_then(|i| elems.get(i)),
                ArrayKey::Str(_) => None,
            },
            Value::Dict(d) | Value::Array(LegacyArray::Mixed(d)) => d.get(key),
            _ => None,
        }
    }

    /// The value as an array key, if it is an int or a string.
    pub fn as_array_key(&self) -> Option<ArrayKey> {
        match self {
            Value::Int(i) => Some(ArrayKey::Int(*i)),
            Value::Str(s) => Some(ArrayKey::Str(s.clone())),
            _ => None,
        }
    }

    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn str(s: impl Into<String>) -> Self { Value::Str(s.into()) }

    pub fn vec(elems: impl IntoIterator<Item = Value>) -> Self {
        Value::Vec(elems.into_iter().collect())
    }

    pub fn dict<K: Into<ArrayKey>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(entries.into_iter().collect())
    }

    pub fn keyset<K: Into<ArrayKey>>(keys: impl IntoIterator<Item = K>) -> Self {
        Value::Keyset(keys.into_iter().collect())
    }

    pub fn varray(elems: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(LegacyArray::Packed(elems.into_iter().collect()))
    }

    pub fn darray<K: Into<ArrayKey>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Array(LegacyArray::Mixed(entries.into_iter().collect()))
    }

    pub fn object(class: impl Into<String>) -> Self {
        Value::Object(Object { class: class.into() })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Int(i) }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self { Value::Float(x) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::Str(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::Str(s) }
}

impl From<ArrayKey> for Value {
    fn from(key: ArrayKey) -> Self {
        match key {
            ArrayKey::Int(i) => Value::Int(i),
            ArrayKey::Str(s) => Value::Str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_insert_replaces_in_place() {
        let mut d = Dict::new();
        d.insert("a", Value::Int(1));
        d.insert("b", Value::Int(2));
        assert_eq!(d.insert("a", Value::Int(3)), Some(Value::Int(1)));
        let keys: Vec<_> = d.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![ArrayKey::from("a"), ArrayKey::from("b")]);
        assert_eq!(d.get(&"a".into()), Some(&Value::Int(3)));
    }

    #[test]
    fn layouts() {
        assert_eq!(Value::vec([]).layout(), Some(Layout::List));
        assert_eq!(Value::varray([]).layout(), Some(Layout::List));
        assert_eq!(Value::dict::<&str>([]).layout(), Some(Layout::Record));
        assert_eq!(Value::darray::<&str>([]).layout(), Some(Layout::Record));
        assert_eq!(Value::keyset::<i64>([]).layout(), None);
        assert_eq!(Value::Int(1).layout(), None);
    }

    #[test]
    fn lookup_by_layout() {
        let list = Value::varray([Value::Int(10), Value::Int(11)]);
        assert_eq!(list.array_len(), Some(2));
        assert_eq!(list.get(&ArrayKey::Int(1)), Some(&Value::Int(11)));
        assert_eq!(list.get(&ArrayKey::Int(-1)), None);
        assert_eq!(list.get(&"0".into()), None);

        let record = Value::darray([(0i64, Value::Null), (5, Value::Bool(true))]);
        assert_eq!(record.get(&ArrayKey::Int(5)), Some(&Value::Bool(true)));

        let ks = Value::keyset([1i64, 2]);
        assert_eq!(ks.array_len(), Some(2));
        assert_eq!(ks.get(&ArrayKey::Int(1)), None);
        assert_eq!(Value::Int(3).array_len(), None);
    }

    #[test]
    fn key_display_escapes_strings() {
        assert_eq!(ArrayKey::Int(2).to_string(), "2");
        assert_eq!(ArrayKey::from("na\"me").to_string(), "\"na\\\"me\"");
        assert_eq!(ArrayKey::from("a\\b\tc\n").to_string(), r#""a\\b\tc\n""#);
    }

    #[test]
    fn key_display_octal_escapes_non_ascii() {
        assert_eq!(ArrayKey::from("café's").to_string(), r#""caf\303\251's""#);
        assert_eq!(ArrayKey::from("\u{1}\u{7f}").to_string(), r#""\001\177""#);
    }
}
