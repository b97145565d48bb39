//! Data-element lookup used for `DATA_REF` tokens.

use std::collections::HashMap;

use tracing::trace;

use credquery_model::{QueryToken, TaggedValue};

use crate::error::QueryError;

/// Source of data elements referenced by a query.
///
/// The evaluator hands over the whole token, so implementations are free to
/// choose their own reference format. Any error returned here aborts the
/// evaluation and is passed to the caller unchanged.
pub trait DataElementSource {
    /// Resolve a data-element reference token to its value.
    fn data_element(&self, token: &QueryToken) -> Result<TaggedValue, QueryError>;
}

/// In-memory data-element table keyed by namespace and element name.
///
/// References are two-element sequences: `300(["org.iso.18013.5.1", "age_over_18"])`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryDataSet {
    namespaces: HashMap<String, HashMap<String, TaggedValue>>,
}

impl InMemoryDataSet {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element, returning the previous value.
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: TaggedValue,
    ) -> Option<TaggedValue> {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .insert(name.into(), value)
    }

    /// Builder-style [`InMemoryDataSet::insert`].
    #[must_use]
    pub fn with(
        mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: TaggedValue,
    ) -> Self {
        self.insert(namespace, name, value);
        self
    }

    /// Look up an element directly.
    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<&TaggedValue> {
        self.namespaces.get(namespace)?.get(name)
    }

    /// Total number of elements across all namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.namespaces.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the table holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<HashMap<String, HashMap<String, TaggedValue>>> for InMemoryDataSet {
    fn from(namespaces: HashMap<String, HashMap<String, TaggedValue>>) -> Self {
        Self { namespaces }
    }
}

impl DataElementSource for InMemoryDataSet {
    fn data_element(&self, token: &QueryToken) -> Result<TaggedValue, QueryError> {
        let invalid = |message: String| QueryError::InvalidDataElementReference { message };

        let items = token
            .body
            .as_sequence()
            .ok_or_else(|| invalid(format!("must be a sequence, found {}", token.body.kind())))?;
        let [namespace, name] = items else {
            return Err(invalid(format!(
                "must contain two items, found {}",
                items.len()
            )));
        };
        let (Some(namespace), Some(name)) = (namespace.value.as_text(), name.value.as_text())
        else {
            return Err(invalid(format!(
                "namespace and name must be text, found {} and {}",
                namespace.kind(),
                name.kind()
            )));
        };

        let value = self
            .get(namespace, name)
            .ok_or_else(|| QueryError::UnknownDataElement {
                namespace: namespace.to_owned(),
                name: name.to_owned(),
            })?;
        trace!(namespace, name, value = %value, "resolved data element");
        Ok(value.clone())
    }
}
