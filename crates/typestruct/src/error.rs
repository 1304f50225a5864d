use serde::Serialize;

use crate::runtime::value::ArrayKey;
use crate::types::descriptor::Kind;

/// Error codes prefixed by phase: A = assertion legality, R = resolution,
/// M = matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Legality
    A001, // function type in assertion
    A002, // legacy array type in assertion
    A003, // generic type in assertion
    A004, // trait in assertion

    // Resolution
    R001, // resolver rejected the descriptor

    // Matching
    M001, // value does not conform
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A001 => "A001",
            Self::A002 => "A002",
            Self::A003 => "A003",
            Self::A004 => "A004",
            Self::R001 => "R001",
            Self::M001 => "M001",
        }
    }
}

// ─── Illegal kinds ────────────────────────────────────────────────────────────

/// A descriptor kind that may not appear anywhere in an `is`/`as` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalKindError {
    #[error("\"is\" and \"as\" operators cannot be used with a function")]
    Function,
    #[error("\"is\" and \"as\" operators cannot be used with an array")]
    Array,
    #[error("\"is\" and \"as\" operators cannot be used with a generic type")]
    Generic,
    #[error("\"is\" and \"as\" operators cannot be used with a trait")]
    Trait,
}

impl IllegalKindError {
    /// The error for `kind`, or `None` if the kind is legal.
    pub fn for_kind(kind: Kind) -> Option<Self> {
        match kind {
            Kind::Fun     => Some(Self::Function),
            Kind::Array   => Some(Self::Array),
            Kind::TypeVar => Some(Self::Generic),
            Kind::Trait   => Some(Self::Trait),
            _ => None,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Function => Kind::Fun,
            Self::Array    => Kind::Array,
            Self::Generic  => Kind::TypeVar,
            Self::Trait    => Kind::Trait,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Function => ErrorCode::A001,
            Self::Array    => ErrorCode::A002,
            Self::Generic  => ErrorCode::A003,
            Self::Trait    => ErrorCode::A004,
        }
    }
}

// ─── Mismatch ─────────────────────────────────────────────────────────────────

/// Where and how a value first diverged from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchDiagnostic {
    /// Description of the offending value. Empty when the value is absent
    /// (a missing required shape field).
    pub given_type: String,
    pub expected_type: String,
    /// Keys from the outermost value down to the point of divergence.
    pub path: Vec<ArrayKey>,
}

impl MatchDiagnostic {
    /// Bracketed key chain, e.g. `[2]["name"]`. Empty at the top level.
    pub fn path_string(&self) -> String {
        self.path.iter().map(|key| format!("[{key}]")).collect()
    }
}

/// The `as` operator's failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", render_mismatch(.0))]
pub struct MismatchError(pub MatchDiagnostic);

impl MismatchError {
    pub fn diagnostic(&self) -> &MatchDiagnostic { &self.0 }
}

impl From<MatchDiagnostic> for MismatchError {
    fn from(d: MatchDiagnostic) -> Self { Self(d) }
}

fn render_mismatch(d: &MatchDiagnostic) -> String {
    let given = if d.given_type.is_empty() { "nothing" } else { d.given_type.as_str() };
    if d.path.is_empty() {
        format!("Expected {}, got {given}", d.expected_type)
    } else {
        format!("Expected {} at {}, got {given}", d.expected_type, d.path_string())
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────────

/// Failure reported by an upstream `Resolver`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Illegal(#[from] IllegalKindError),
    #[error(transparent)]
    Mismatch(#[from] MismatchError),
    #[error("type resolution failed: {0}")]
    Resolution(#[from] ResolveError),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Illegal(e)    => e.code(),
            Self::Mismatch(_)   => ErrorCode::M001,
            Self::Resolution(_) => ErrorCode::R001,
        }
    }
}
