//! Parameter table and parameter-reference resolution.
//!
//! A parameter reference token carries a two-element sequence: the parameter
//! name and a declared kind code, optionally tagged with the semantic tag the
//! parameter value must carry.
//!
//! ```text
//! 301(["a", 2])             boolean parameter `a`
//! 301(["dob", 1004(1)])     string parameter `dob` tagged as a full date
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use num_bigint::BigInt;
use tracing::trace;

use credquery_model::{QueryToken, Tag, TaggedValue, TypeCode, Value};

use crate::error::QueryError;

/// Named values supplied by the caller for one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, TaggedValue>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: TaggedValue) -> Option<TaggedValue> {
        self.values.insert(name.into(), value)
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TaggedValue> {
        self.values.get(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TaggedValue)> {
        self.values.iter()
    }

    /// Resolve a parameter reference token to the referenced value.
    ///
    /// Checks, in order: the reference is well formed, the parameter exists,
    /// the declared kind code is known, the declared tag equals the value's
    /// tag, and the value is of the declared kind.
    pub fn resolve(&self, token: &QueryToken) -> Result<TaggedValue, QueryError> {
        let (name, code, declared_tag) = parse_reference(&token.body)?;

        let Some(parameter) = self.values.get(name) else {
            return Err(QueryError::UnknownParameter {
                name: name.to_owned(),
            });
        };

        let type_code =
            TypeCode::from_code(code).ok_or_else(|| QueryError::InvalidTypeSpecifier {
                name: name.to_owned(),
                code: code.clone(),
            })?;
        let type_matched = type_code.matches(&parameter.value);

        if declared_tag != parameter.tag {
            return Err(QueryError::TagMismatch {
                context: format!("declaration and value of parameter {name:?}"),
                left: declared_tag,
                right: parameter.tag,
            });
        }

        if !type_matched {
            return Err(QueryError::TypeMismatch {
                message: format!(
                    "parameter {name:?} is declared {type_code} but holds {}",
                    parameter.kind()
                ),
            });
        }

        trace!(name, value = %parameter, "resolved parameter");
        Ok(parameter.clone())
    }
}

/// Split a `[name, type]` reference into its parts.
fn parse_reference(body: &Value) -> Result<(&str, &BigInt, Option<Tag>), QueryError> {
    let Some(items) = body.as_sequence() else {
        return Err(QueryError::InvalidParameterReference {
            message: format!("must be a sequence, found {}", body.kind()),
        });
    };
    let [name, declared] = items else {
        return Err(QueryError::InvalidParameterReference {
            message: format!("must contain two items, found {}", items.len()),
        });
    };
    let Some(name) = name.value.as_text() else {
        return Err(QueryError::InvalidParameterReference {
            message: format!("name must be text, found {}", name.kind()),
        });
    };
    let Some(code) = declared.value.as_integer() else {
        return Err(QueryError::InvalidParameterReference {
            message: format!("type of {name:?} must be an integer, found {}", declared.kind()),
        });
    };
    Ok((name, code, declared.tag))
}

impl FromIterator<(String, TaggedValue)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, TaggedValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, TaggedValue>> for ParameterSet {
    fn from(values: HashMap<String, TaggedValue>) -> Self {
        Self { values }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Fluent builder for [`ParameterSet`].
///
/// ```
/// use chrono::NaiveDate;
/// use credquery_core::ParameterSetBuilder;
///
/// let params = ParameterSetBuilder::new()
///     .integer("age", 21)
///     .text("name", "Erika")
///     .boolean("resident", true)
///     .date("dob", NaiveDate::from_ymd_opt(2003, 4, 1).unwrap())
///     .build();
/// assert_eq!(params.len(), 4);
/// ```
#[derive(Debug, Default)]
pub struct ParameterSetBuilder {
    set: ParameterSet,
}

impl ParameterSetBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an untagged integer parameter.
    #[must_use]
    pub fn integer(self, name: impl Into<String>, value: impl Into<BigInt>) -> Self {
        self.tagged(name, TaggedValue::integer(value))
    }

    /// Add an untagged text parameter.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tagged(name, TaggedValue::text(value))
    }

    /// Add a boolean parameter.
    #[must_use]
    pub fn boolean(self, name: impl Into<String>, value: bool) -> Self {
        self.tagged(name, TaggedValue::boolean(value))
    }

    /// Add a date parameter, stored as `yyyy-MM-dd` text tagged as a full date.
    #[must_use]
    pub fn date(self, name: impl Into<String>, value: NaiveDate) -> Self {
        self.tagged(name, TaggedValue::date(value.format("%Y-%m-%d").to_string()))
    }

    /// Add a parameter with an arbitrary value and tag.
    #[must_use]
    pub fn tagged(mut self, name: impl Into<String>, value: TaggedValue) -> Self {
        self.set.insert(name, value);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> ParameterSet {
        self.set
    }
}
