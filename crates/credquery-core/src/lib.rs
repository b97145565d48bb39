//! Credential query evaluation for CredQuery.
//!
//! A query is a postfix token stream. Each token either references a
//! caller-supplied parameter, references a data element held by an external
//! [`DataElementSource`], or applies an operator to the values already on the
//! evaluation stack. [`QueryExecutor::evaluate`] reduces the stream to a
//! single boolean.
//!
//! ```text
//! 301(["a", 0]) 301(["b", 0]) 302(0)      a < b
//! ```

pub mod config;
pub mod data_elements;
pub mod error;
pub mod executor;
pub mod parameters;

pub use config::QueryConfig;
pub use data_elements::{DataElementSource, InMemoryDataSet};
pub use error::QueryError;
pub use executor::QueryExecutor;
pub use parameters::{ParameterSet, ParameterSetBuilder};
