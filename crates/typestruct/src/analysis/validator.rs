//! Assertion legality
//!
//! A resolved descriptor may only be used with `is`/`as` if none of its
//! reachable nodes is a function, legacy array, type variable or trait.
//! Tuples reach their element types and shapes reach their field types; no
//! other kind has children here.

use crate::error::IllegalKindError;
use crate::types::descriptor::{TypeDescriptor, TypeNode};

pub struct Validator {
    pub errors: Vec<IllegalKindError>,
}

impl Validator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Visit every reachable node once, in declaration order, and return all
    /// findings in that order.
    pub fn validate(mut self, ts: &TypeDescriptor) -> Vec<IllegalKindError> {
        self.visit(ts);
        self.errors
    }

    fn visit(&mut self, ts: &TypeDescriptor) {
        if let Some(err) = IllegalKindError::for_kind(ts.kind()) {
            self.errors.push(err);
        }
        match &ts.node {
            TypeNode::Tuple { elem_types } => {
                for elem in elem_types { self.visit(elem); }
            }
            TypeNode::Shape { fields, .. } => {
                for (_, field) in fields { self.visit(&field.descriptor); }
            }
            _ => {}
        }
    }
}

impl Default for Validator {
    fn default() -> Self { Self::new() }
}

/// All illegal kinds reachable from `ts`, in declaration order.
pub fn collect_illegal_kinds(ts: &TypeDescriptor) -> Vec<IllegalKindError> {
    Validator::new().validate(ts)
}

/// Reject `ts` for use in an `is`/`as` expression, reporting the first
/// illegal kind in declaration order.
pub fn check_legal_for_assertion(ts: &TypeDescriptor) -> Result<(), IllegalKindError> {
    match collect_illegal_kinds(ts).into_iter().next() {
        Some(err) => {
            tracing::debug!(descriptor = %ts, error = %err, "illegal type in assertion");
            Err(err)
        }
        None => Ok(()),
    }
}
