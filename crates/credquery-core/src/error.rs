//! Error taxonomy for query evaluation.
//!
//! Every failure aborts the whole evaluation; no variant is recoverable
//! mid-query and none is worth retrying with the same inputs.

use credquery_model::{OperatorCode, Tag, ValueKind};
use num_bigint::BigInt;

/// Errors produced while evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    // -- structural ---------------------------------------------------------
    /// A token carries no role tag.
    #[error("invalid query: token {index} is missing its role tag")]
    MissingRoleTag {
        /// Position of the token in the query.
        index: usize,
    },

    /// A token's role tag is not one of the known roles.
    #[error("invalid query: token {index} has invalid role tag {tag}")]
    InvalidRoleTag {
        /// Position of the token in the query.
        index: usize,
        /// The unrecognized tag.
        tag: u64,
    },

    /// The stack does not hold exactly one value after the last token.
    #[error("invalid query: {remaining} stack elements remaining")]
    StackSize {
        /// Number of values left on the stack.
        remaining: usize,
    },

    /// The single remaining value is not a boolean.
    #[error("invalid query: result is {kind}, not boolean")]
    NonBooleanResult {
        /// Kind of the remaining value.
        kind: ValueKind,
    },

    /// An operator found fewer operands on the stack than it consumes.
    #[error("invalid query: {operator} needs {needed} operands, stack holds {available}")]
    StackUnderflow {
        /// The operator being applied.
        operator: OperatorCode,
        /// Operands the operator consumes.
        needed: usize,
        /// Values on the stack.
        available: usize,
    },

    /// The stack grew beyond the configured depth.
    #[error("invalid query: stack depth exceeds {max}")]
    StackOverflow {
        /// Configured maximum depth.
        max: usize,
    },

    /// The query has more tokens than the configured maximum.
    #[error("invalid query: {len} tokens exceeds maximum of {max}")]
    QueryTooLong {
        /// Number of tokens in the query.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    // -- operators ----------------------------------------------------------
    /// An operator token's payload is not an integer.
    #[error("invalid query: operator payload is {found}, not an integer")]
    InvalidOperator {
        /// Kind of the payload.
        found: ValueKind,
    },

    /// An operator code names no known operator.
    #[error("invalid query: unknown operator code {code}")]
    UnknownOperator {
        /// The unrecognized code.
        code: BigInt,
    },

    /// The operator is not defined for the operand kind.
    #[error("invalid query: operator {operator} is not supported on {kind} operands")]
    UnsupportedOperator {
        /// The operator being applied.
        operator: OperatorCode,
        /// Kind of the operands.
        kind: ValueKind,
    },

    /// No operator is defined for this operand kind at all.
    #[error("invalid query: unsupported operand type {left} for {operator} (with {right})")]
    UnsupportedOperandType {
        /// The operator being applied.
        operator: OperatorCode,
        /// Kind of the left operand.
        left: ValueKind,
        /// Kind of the right operand.
        right: ValueKind,
    },

    /// Two values that must carry the same tag do not.
    #[error("invalid query: {context} have different tags: {} and {}", describe_tag(.left), describe_tag(.right))]
    TagMismatch {
        /// What was being compared.
        context: String,
        /// Tag of the first value.
        left: Option<Tag>,
        /// Tag of the second value.
        right: Option<Tag>,
    },

    /// Operands are tagged, but not with the tag the operator declares.
    #[error(
        "invalid query: operands of {operator} are tagged {operand_tag}, operator declares {}",
        describe_tag(.operator_tag)
    )]
    OperatorOperandTagMismatch {
        /// The operator being applied.
        operator: OperatorCode,
        /// Operand tag declared by the operator token.
        operator_tag: Option<Tag>,
        /// Tag carried by the operands.
        operand_tag: Tag,
    },

    /// A value is of the wrong kind.
    #[error("invalid query: type mismatch: {message}")]
    TypeMismatch {
        /// Explanation.
        message: String,
    },

    // -- parameters ---------------------------------------------------------
    /// A parameter reference token is not a `[name, type]` pair.
    #[error("invalid parameter reference: {message}")]
    InvalidParameterReference {
        /// Explanation.
        message: String,
    },

    /// The referenced parameter is absent from the parameter table.
    #[error("invalid parameter reference: unknown parameter {name:?}")]
    UnknownParameter {
        /// Parameter name.
        name: String,
    },

    /// The declared type code is not a known type.
    #[error("invalid parameter reference: unknown type specifier {code} for {name:?}")]
    InvalidTypeSpecifier {
        /// Parameter name.
        name: String,
        /// The unrecognized type code.
        code: BigInt,
    },

    // -- data elements ------------------------------------------------------
    /// A data-element reference token is malformed.
    #[error("invalid data element reference: {message}")]
    InvalidDataElementReference {
        /// Explanation.
        message: String,
    },

    /// The referenced data element is not present.
    #[error("unknown data element {name:?} in namespace {namespace:?}")]
    UnknownDataElement {
        /// Namespace of the element.
        namespace: String,
        /// Element name.
        name: String,
    },
}

#[allow(clippy::ref_option)]
fn describe_tag(tag: &Option<Tag>) -> String {
    tag.map_or_else(|| "none".to_owned(), |tag| tag.to_string())
}
