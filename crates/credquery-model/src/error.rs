//! CBOR codec errors.

/// Errors produced while converting between CBOR and the query model.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is not well-formed CBOR.
    #[error("malformed CBOR: {0}")]
    Malformed(String),

    /// Serializing to CBOR failed.
    #[error("failed to encode CBOR: {0}")]
    Encode(String),

    /// A CBOR item has no counterpart in the query model.
    #[error("unsupported CBOR item: {kind}")]
    Unsupported {
        /// Short description of the rejected item.
        kind: String,
    },

    /// A value carries more semantic tags than the model allows.
    #[error("too many nested tags: tag {tag} is nested under another tag")]
    NestedTag {
        /// The innermost rejected tag.
        tag: u64,
    },

    /// A structurally different item was found where another was expected.
    #[error("expected {expected}, found {found}")]
    UnexpectedItem {
        /// What was expected.
        expected: &'static str,
        /// What was found.
        found: String,
    },

    /// The same map key appears twice.
    #[error("duplicate map key: {key}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}
