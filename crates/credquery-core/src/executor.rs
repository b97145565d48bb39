//! Postfix query executor.
//!
//! The executor walks the token stream once, left to right. Reference tokens
//! push the referenced value; operator tokens pop their operands and push a
//! boolean. A well-formed query leaves exactly one boolean on the stack.
//!
//! The stack lives for the duration of one [`QueryExecutor::evaluate`] call.
//! The executor itself only holds its configuration, so one instance can be
//! shared freely between threads and calls.

use std::cmp::Ordering;

use tracing::{debug, trace};

use credquery_model::{
    OperatorCode, Query, QueryToken, RoleTag, Tag, TaggedValue, Value, ValueKind,
};

use crate::config::QueryConfig;
use crate::data_elements::DataElementSource;
use crate::error::QueryError;
use crate::parameters::ParameterSet;

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Evaluates queries against parameter and data-element bindings.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    config: QueryConfig,
}

impl QueryExecutor {
    /// Create an executor with the given limits.
    #[must_use]
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// The limits this executor applies.
    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Evaluate `query` to a boolean.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the query is malformed, a reference cannot be
    /// resolved, or an operator is applied to operands it does not support.
    /// Errors from `data_elements` are returned unchanged.
    pub fn evaluate(
        &self,
        query: &Query,
        parameters: &ParameterSet,
        data_elements: &dyn DataElementSource,
    ) -> Result<bool, QueryError> {
        if query.len() > self.config.max_tokens {
            return Err(QueryError::QueryTooLong {
                len: query.len(),
                max: self.config.max_tokens,
            });
        }

        let mut stack = EvalStack::new(self.config.max_stack_depth);

        for (index, token) in query.iter().enumerate() {
            let code = token
                .role_tag
                .ok_or(QueryError::MissingRoleTag { index })?;
            let role = RoleTag::from_code(code)
                .ok_or(QueryError::InvalidRoleTag { index, tag: code })?;
            trace!(index, %role, %token, "evaluating token");

            let entry = match role {
                RoleTag::DataRef => data_elements.data_element(token)?,
                RoleTag::ParamRef => parameters.resolve(token)?,
                RoleTag::Operator => stack.apply_operator(token)?,
            };
            stack.push(entry)?;
        }

        let result = stack.finish()?;
        debug!(tokens = query.len(), result, "query evaluated");
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Evaluation stack
// ---------------------------------------------------------------------------

/// Call-local evaluation stack.
#[derive(Debug)]
struct EvalStack {
    values: Vec<TaggedValue>,
    max_depth: usize,
}

impl EvalStack {
    fn new(max_depth: usize) -> Self {
        Self {
            values: Vec::new(),
            max_depth,
        }
    }

    fn push(&mut self, value: TaggedValue) -> Result<(), QueryError> {
        if self.values.len() >= self.max_depth {
            return Err(QueryError::StackOverflow {
                max: self.max_depth,
            });
        }
        self.values.push(value);
        Ok(())
    }

    /// Pop the operands of `op`, bottom-most first.
    fn pop_operands(&mut self, op: OperatorCode) -> Result<Vec<TaggedValue>, QueryError> {
        let needed = op.arity();
        let available = self.values.len();
        if available < needed {
            return Err(QueryError::StackUnderflow {
                operator: op,
                needed,
                available,
            });
        }
        Ok(self.values.split_off(available - needed))
    }

    fn finish(mut self) -> Result<bool, QueryError> {
        if self.values.len() != 1 {
            return Err(QueryError::StackSize {
                remaining: self.values.len(),
            });
        }
        match self.values.pop() {
            Some(TaggedValue {
                value: Value::Boolean(result),
                ..
            }) => Ok(result),
            Some(other) => Err(QueryError::NonBooleanResult { kind: other.kind() }),
            None => Err(QueryError::StackSize { remaining: 0 }),
        }
    }

    fn apply_operator(&mut self, token: &QueryToken) -> Result<TaggedValue, QueryError> {
        let op = operator_code(&token.body)?;
        let operands = self.pop_operands(op)?;
        let result = match operands.as_slice() {
            [operand] => apply_unary(op, operand)?,
            [a, b] => apply_binary(op, token.operand_tag, a, b)?,
            _ => {
                return Err(QueryError::StackUnderflow {
                    operator: op,
                    needed: op.arity(),
                    available: operands.len(),
                });
            }
        };
        trace!(%op, result, "applied operator");
        Ok(TaggedValue::boolean(result))
    }
}

fn operator_code(body: &Value) -> Result<OperatorCode, QueryError> {
    let Value::Integer(code) = body else {
        return Err(QueryError::InvalidOperator { found: body.kind() });
    };
    OperatorCode::from_code(code).ok_or_else(|| QueryError::UnknownOperator { code: code.clone() })
}

// ---------------------------------------------------------------------------
// Operator semantics
// ---------------------------------------------------------------------------

fn apply_unary(op: OperatorCode, operand: &TaggedValue) -> Result<bool, QueryError> {
    match (op, &operand.value) {
        (OperatorCode::Not, Value::Boolean(b)) => Ok(!b),
        (OperatorCode::Not, _) => Err(QueryError::TypeMismatch {
            message: format!("NOT applied to {} operand", operand.kind()),
        }),
        (op, _) => Err(QueryError::UnsupportedOperator {
            operator: op,
            kind: operand.kind(),
        }),
    }
}

/// Evaluate `a op b`.
fn apply_binary(
    op: OperatorCode,
    operator_tag: Option<Tag>,
    a: &TaggedValue,
    b: &TaggedValue,
) -> Result<bool, QueryError> {
    if a.tag != b.tag {
        return Err(QueryError::TagMismatch {
            context: format!("operands of {op}"),
            left: a.tag,
            right: b.tag,
        });
    }
    if let Some(operand_tag) = a.tag {
        if operator_tag != Some(operand_tag) {
            return Err(QueryError::OperatorOperandTagMismatch {
                operator: op,
                operator_tag,
                operand_tag,
            });
        }
    }

    match (&a.value, &b.value) {
        (Value::Integer(x), Value::Integer(y)) => ordering_result(op, ValueKind::Integer, x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => boolean_result(op, *x, *y),
        (Value::Text(x), Value::Text(y)) => {
            if a.tag == Some(Tag::FULL_DATE) {
                // `yyyy-MM-dd` sorts chronologically.
                ordering_result(op, ValueKind::Text, x.cmp(y))
            } else {
                equality_result(op, ValueKind::Text, x == y)
            }
        }
        (Value::Sequence(_), _) => Err(QueryError::UnsupportedOperandType {
            operator: op,
            left: a.kind(),
            right: b.kind(),
        }),
        _ => Err(QueryError::TypeMismatch {
            message: format!(
                "operands of {op} are different kinds: {} and {}",
                a.kind(),
                b.kind()
            ),
        }),
    }
}

/// Map an ordering between two operands to the result of a relational operator.
fn ordering_result(op: OperatorCode, kind: ValueKind, ordering: Ordering) -> Result<bool, QueryError> {
    match op {
        OperatorCode::LessThan => Ok(ordering.is_lt()),
        OperatorCode::LessOrEqual => Ok(ordering.is_le()),
        OperatorCode::Equal => Ok(ordering.is_eq()),
        OperatorCode::NotEqual => Ok(ordering.is_ne()),
        OperatorCode::GreaterThan => Ok(ordering.is_gt()),
        OperatorCode::GreaterOrEqual => Ok(ordering.is_ge()),
        OperatorCode::And | OperatorCode::Or | OperatorCode::Not => {
            Err(QueryError::UnsupportedOperator { operator: op, kind })
        }
    }
}

/// Equality-only comparison for kinds without an ordering.
fn equality_result(op: OperatorCode, kind: ValueKind, equal: bool) -> Result<bool, QueryError> {
    match op {
        OperatorCode::Equal => Ok(equal),
        OperatorCode::NotEqual => Ok(!equal),
        _ => Err(QueryError::UnsupportedOperator { operator: op, kind }),
    }
}

fn boolean_result(op: OperatorCode, a: bool, b: bool) -> Result<bool, QueryError> {
    match op {
        OperatorCode::And => Ok(a && b),
        OperatorCode::Or => Ok(a || b),
        _ => equality_result(op, ValueKind::Boolean, a == b),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
