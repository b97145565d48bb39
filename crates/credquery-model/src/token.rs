//! Query tokens and the fixed code tables they refer to.
//!
//! On the wire every token carries a role tag as its outermost tag. Operator
//! tokens may carry a second, inner tag naming the semantic tag their operands
//! must have. [`QueryToken`] keeps the two apart as `role_tag` and
//! `operand_tag`; only [`crate::cbor`] knows they were ever nested.

use std::fmt;

use num_bigint::BigInt;

use crate::tagged_value::{Tag, TaggedValue, Value};

// ---------------------------------------------------------------------------
// Role tags
// ---------------------------------------------------------------------------

/// How a query token is resolved to a stack value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleTag {
    /// Resolve through the data-element table.
    DataRef,
    /// Resolve through the parameter table.
    ParamRef,
    /// Apply an operator to values already on the stack.
    Operator,
}

impl RoleTag {
    /// Wire code for [`RoleTag::DataRef`].
    pub const DATA_REF: u64 = 300;
    /// Wire code for [`RoleTag::ParamRef`].
    pub const PARAM_REF: u64 = 301;
    /// Wire code for [`RoleTag::Operator`].
    pub const OPERATOR: u64 = 302;

    /// Look up a role by its wire code.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            Self::DATA_REF => Some(Self::DataRef),
            Self::PARAM_REF => Some(Self::ParamRef),
            Self::OPERATOR => Some(Self::Operator),
            _ => None,
        }
    }

    /// The wire code of this role.
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::DataRef => Self::DATA_REF,
            Self::ParamRef => Self::PARAM_REF,
            Self::Operator => Self::OPERATOR,
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataRef => write!(f, "data-ref"),
            Self::ParamRef => write!(f, "param-ref"),
            Self::Operator => write!(f, "operator"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Operators understood by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCode {
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
    /// Logical negation (unary).
    Not,
}

impl OperatorCode {
    /// Every operator, ordered by wire code.
    pub const ALL: [Self; 9] = [
        Self::LessThan,
        Self::LessOrEqual,
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::And,
        Self::Or,
        Self::Not,
    ];

    /// Look up an operator by its wire code.
    #[must_use]
    pub fn from_code(code: &BigInt) -> Option<Self> {
        let code = usize::try_from(code).ok()?;
        Self::ALL.get(code).copied()
    }

    /// The wire code of this operator.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::LessThan => 0,
            Self::LessOrEqual => 1,
            Self::Equal => 2,
            Self::NotEqual => 3,
            Self::GreaterThan => 4,
            Self::GreaterOrEqual => 5,
            Self::And => 6,
            Self::Or => 7,
            Self::Not => 8,
        }
    }

    /// Number of stack operands consumed.
    #[must_use]
    pub fn arity(self) -> usize {
        if matches!(self, Self::Not) { 1 } else { 2 }
    }

    /// `true` for `<`, `<=`, `>` and `>=`.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessOrEqual | Self::GreaterThan | Self::GreaterOrEqual
        )
    }

    /// `true` for `==` and `!=`.
    #[must_use]
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl fmt::Display for OperatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LessThan => write!(f, "<"),
            Self::LessOrEqual => write!(f, "<="),
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterOrEqual => write!(f, ">="),
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
            Self::Not => write!(f, "NOT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Declared parameter kinds
// ---------------------------------------------------------------------------

/// Kind a parameter reference declares for the value it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    /// Code 0.
    Integer,
    /// Code 1.
    String,
    /// Code 2.
    Boolean,
}

impl TypeCode {
    /// Look up a declared kind by its wire code.
    #[must_use]
    pub fn from_code(code: &BigInt) -> Option<Self> {
        match u8::try_from(code).ok()? {
            0 => Some(Self::Integer),
            1 => Some(Self::String),
            2 => Some(Self::Boolean),
            _ => None,
        }
    }

    /// The wire code of this kind.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Integer => 0,
            Self::String => 1,
            Self::Boolean => 2,
        }
    }

    /// Whether `value` is of the declared kind.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Integer, Value::Integer(_))
                | (Self::String, Value::Text(_))
                | (Self::Boolean, Value::Boolean(_))
        )
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// A decoded query token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryToken {
    /// Outermost tag as found on the wire. Kept raw so that a missing or
    /// unknown role is reported by the evaluator, not the decoder.
    pub role_tag: Option<u64>,
    /// Semantic tag the operands of an operator token must carry.
    pub operand_tag: Option<Tag>,
    /// Token payload: an operator code, a parameter reference or a
    /// data-element reference.
    pub body: Value,
}

impl QueryToken {
    /// Token with an arbitrary (possibly absent) role tag.
    #[must_use]
    pub fn new(role_tag: Option<u64>, body: Value) -> Self {
        Self {
            role_tag,
            operand_tag: None,
            body,
        }
    }

    /// Reference to parameter `name` declaring kind `type_code`.
    #[must_use]
    pub fn parameter(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self::parameter_ref(name, TaggedValue::integer(type_code.code()))
    }

    /// Reference to parameter `name` declaring kind `type_code` carrying `tag`.
    #[must_use]
    pub fn tagged_parameter(name: impl Into<String>, type_code: TypeCode, tag: Tag) -> Self {
        Self::parameter_ref(name, TaggedValue::integer(type_code.code()).with_tag(tag))
    }

    fn parameter_ref(name: impl Into<String>, declared: TaggedValue) -> Self {
        Self::new(
            Some(RoleTag::PARAM_REF),
            Value::Sequence(vec![TaggedValue::text(name), declared]),
        )
    }

    /// Reference to data element `element` in `namespace`.
    #[must_use]
    pub fn data_element(namespace: impl Into<String>, element: impl Into<String>) -> Self {
        Self::new(
            Some(RoleTag::DATA_REF),
            Value::Sequence(vec![TaggedValue::text(namespace), TaggedValue::text(element)]),
        )
    }

    /// Operator token without an operand tag constraint.
    #[must_use]
    pub fn operator(op: OperatorCode) -> Self {
        Self::new(
            Some(RoleTag::OPERATOR),
            Value::Integer(BigInt::from(op.code())),
        )
    }

    /// Operator token whose operands must carry `tag`.
    #[must_use]
    pub fn tagged_operator(op: OperatorCode, tag: Tag) -> Self {
        Self {
            operand_tag: Some(tag),
            ..Self::operator(op)
        }
    }
}

impl fmt::Display for QueryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(role) = self.role_tag {
            write!(f, "{role}(")?;
        }
        match self.operand_tag {
            Some(tag) => write!(f, "{tag}({})", self.body)?,
            None => write!(f, "{}", self.body)?,
        }
        if self.role_tag.is_some() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// An immutable, ordered token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<QueryToken>,
}

impl Query {
    /// Create a query from its tokens.
    #[must_use]
    pub fn new(tokens: Vec<QueryToken>) -> Self {
        Self { tokens }
    }

    /// The tokens in evaluation order.
    #[must_use]
    pub fn tokens(&self) -> &[QueryToken] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the query has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterate over the tokens in evaluation order.
    pub fn iter(&self) -> std::slice::Iter<'_, QueryToken> {
        self.tokens.iter()
    }
}

impl From<Vec<QueryToken>> for Query {
    fn from(tokens: Vec<QueryToken>) -> Self {
        Self::new(tokens)
    }
}

impl FromIterator<QueryToken> for Query {
    fn from_iter<I: IntoIterator<Item = QueryToken>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = &'a QueryToken;
    type IntoIter = std::slice::Iter<'a, QueryToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
