//! Class registry — the matcher's view of declared classes, interfaces and enums.
//!
//! Consumed by:
//!   • Enum descriptors       — member lookup
//!   • Class/interface checks — instance-of for objects, capability markers
//!                              for primitives and containers
//!
//! Hosts with their own class model implement `ClassRegistry`; `ClassTable`
//! is the in-memory implementation used by tests and embedders.

use std::collections::{BTreeSet, HashMap};

use crate::runtime::value::{ArrayKey, Value};

// ─── Capabilities ─────────────────────────────────────────────────────────────

/// Non-object value kinds a class or interface can declare it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Int,
    Float,
    String,
    Vec,
    Dict,
    Keyset,
    Array,
}

impl Capability {
    pub const CONTAINERS: [Capability; 4] = [Capability::Vec, Capability::Dict, Capability::Keyset, Capability::Array];
}

// ─── Interfaces ───────────────────────────────────────────────────────────────

pub trait ClassInfo {
    fn name(&self) -> &str;

    /// Whether an instance of `self` is an instance of `other`.
    fn instance_of(&self, other: &dyn ClassInfo) -> bool;

    /// Whether `value` is one of this enum's members. Always `false` for
    /// non-enum classes.
    fn has_enum_value(&self, value: &Value) -> bool;

    fn supports(&self, capability: Capability) -> bool;
}

pub trait ClassRegistry {
    fn lookup_class(&self, name: &str) -> Option<&dyn ClassInfo>;
}

impl<R: ClassRegistry + ?Sized> ClassRegistry for &R {
    fn lookup_class(&self, name: &str) -> Option<&dyn ClassInfo> {
        (**self).lookup_class(name)
    }
}

// ─── Declarations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub kind: ClassKind,
    /// Direct parents and implemented interfaces.
    pub parents: Vec<String>,
    pub capabilities: Vec<Capability>,
    /// Enum members; empty for classes and interfaces.
    pub members: Vec<ArrayKey>,
    /// Lower-cased names of this class and every ancestor. Kept current by
    /// `ClassTable::register`.
    ancestors: BTreeSet<String>,
}

impl ClassDecl {
    fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parents: Vec::new(),
            capabilities: Vec::new(),
            members: Vec::new(),
            ancestors: BTreeSet::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self { Self::new(name, ClassKind::Class) }

    pub fn interface(name: impl Into<String>) -> Self { Self::new(name, ClassKind::Interface) }

    pub fn enumeration<K: Into<ArrayKey>>(name: impl Into<String>, members: impl IntoIterator<Item = K>) -> Self {
        let mut decl = Self::new(name, ClassKind::Enum);
        decl.members = members.into_iter().map(Into::into).collect();
        decl
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(caps);
        self
    }
}

impl ClassInfo for ClassDecl {
    fn name(&self) -> &str { &self.name }

    fn instance_of(&self, other: &dyn ClassInfo) -> bool {
        self.ancestors.contains(&other.name().to_ascii_lowercase())
    }

    /// Strictly integer-like strings also match the integer member they spell,
    /// the way array keys are normalised.
    fn has_enum_value(&self, value: &Value) -> bool {
        if self.kind != ClassKind::Enum {
            return false;
        }
        let Some(key) = value.as_array_key() else { return false };
        if self.members.contains(&key) {
            return true;
        }
        match &key {
            ArrayKey::Str(s) => strict_integer(s).is_some_and(|i| self.members.contains(&ArrayKey::Int(i))),
            ArrayKey::Int(_) => false,
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

// ─── Table ────────────────────────────────────────────────────────────────────

/// In-memory registry. Names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: HashMap<String, ClassDecl>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self { classes: HashMap::new() }
    }

    /// Registry pre-seeded with the built-in capability interfaces.
    pub fn standard() -> Self {
        let mut t = Self::new();
        t.register(ClassDecl::interface("HH\\Stringish").with_capabilities([Capability::String]));
        t.register(ClassDecl::interface("XHPChild").with_capabilities([
            Capability::Int, Capability::Float, Capability::String,
            Capability::Vec, Capability::Dict, Capability::Keyset, Capability::Array,
        ]));
        t.register(ClassDecl::interface("HH\\Traversable").with_capabilities(Capability::CONTAINERS));
        t.register(ClassDecl::interface("HH\\KeyedTraversable")
            .extends("HH\\Traversable")
            .with_capabilities(Capability::CONTAINERS));
        t.register(ClassDecl::interface("HH\\Container")
            .extends("HH\\Traversable")
            .with_capabilities(Capability::CONTAINERS));
        t.register(ClassDecl::interface("HH\\KeyedContainer")
            .extends("HH\\Container")
            .extends("HH\\KeyedTraversable")
            .with_capabilities(Capability::CONTAINERS));
        t
    }

    /// Register a declaration, replacing any previous one with the same name.
    /// Registration order does not matter: every class's ancestry is
    /// recomputed, so a parent registered (or redeclared) later is seen by
    /// its existing children. Unknown parents only contribute their own name.
    pub fn register(&mut self, decl: ClassDecl) {
        self.classes.insert(decl.name.to_ascii_lowercase(), decl);
        let closures: Vec<(String, BTreeSet<String>)> = self
            .classes
            .keys()
            .map(|key| (key.clone(), self.ancestry(key)))
            .collect();
        for (key, ancestors) in closures {
            if let Some(decl) = self.classes.get_mut(&key) {
                decl.ancestors = ancestors;
            }
        }
    }

    /// Transitive closure over `parents`, starting from (and including) `key`.
    /// Cycles terminate on the visited set.
    fn ancestry(&self, key: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![key.to_owned()];
        while let Some(name) = pending.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(decl) = self.classes.get(&name) {
                pending.extend(decl.parents.iter().map(|p| p.to_ascii_lowercase()));
            }
        }
        seen
    }

    pub fn get(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize { self.classes.len() }

    pub fn is_empty(&self) -> bool { self.classes.is_empty() }
}

impl ClassRegistry for ClassTable {
    fn lookup_class(&self, name: &str) -> Option<&dyn ClassInfo> {
        self.get(name).map(|c| c as &dyn ClassInfo)
    }
}

/// Decimal integer with no sign other than a leading `-`, no leading zeros,
/// no `-0`, and within `i64`.
fn strict_integer(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.starts_with('0') && (digits.len() > 1 || s.starts_with('-')) {
        return None;
    }
    s.parse().ok()
}
