//! Error types for the cache engine.
//!
//! Only type mismatches are errors. Missing keys, expired keys, and
//! empty collections are all value-typed outcomes (`None`, `0`, empty
//! vec) — callers never have to distinguish "not there" from "never
//! was" exceptionally.

use thiserror::Error;

/// Returned when an operation is invoked against a key holding a value
/// of an incompatible shape (e.g. `get` on an ordered collection).
///
/// The operation fails without mutating any state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
pub struct WrongType;
