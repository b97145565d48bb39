//! Evaluator configuration.

use std::env;

/// Limits applied by [`crate::QueryExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Maximum number of tokens in a query.
    pub max_tokens: usize,
    /// Maximum number of values on the evaluation stack.
    pub max_stack_depth: usize,
}

impl QueryConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_tokens: env_usize("CREDQUERY_MAX_TOKENS", defaults.max_tokens),
            max_stack_depth: env_usize("CREDQUERY_MAX_STACK_DEPTH", defaults.max_stack_depth),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            max_stack_depth: 256,
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
