//! Model types for credential queries.
//!
//! A credential query is a postfix token stream evaluated against a parameter
//! table and a data-element table. This crate holds the vocabulary shared by
//! the evaluator and its callers:
//!
//! - [`TaggedValue`]: the operand/result type, a basic value plus an optional
//!   semantic tag.
//! - [`QueryToken`] and [`Query`]: decoded tokens with their role and operand
//!   type tags split into separate fields.
//! - [`cbor`]: the wire boundary, where tag-of-tag nesting is translated to
//!   and from the explicit token fields.

pub mod cbor;
pub mod error;
pub mod tagged_value;
pub mod token;

pub use error::CodecError;
pub use tagged_value::{Tag, TaggedValue, Value, ValueKind};
pub use token::{OperatorCode, Query, QueryToken, RoleTag, TypeCode};
