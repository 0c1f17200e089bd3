use thiserror::Error;

/// Contract violations detected while wrapping a record in strict mode.
///
/// These signal registration mistakes (programmer error), not runtime data
/// problems, and are only produced by registries built with
/// [`Registry::strict`](crate::Registry::strict).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
    /// A generator exists for the boxed form of the wrapped type (or the
    /// other way around). The caller registered one form and wrapped the
    /// other.
    #[error("link generator registered for `{registered}` but a `{passed}` value was wrapped")]
    TypeMismatch {
        passed: &'static str,
        registered: &'static str,
    },

    /// A structured record was wrapped with no generator registered for
    /// its type. Non-structured values (primitives, sequences) are exempt.
    #[error("no link generator registered for structured type `{0}`")]
    MissingGenerator(&'static str),
}

/// Data-shape failures while encoding an envelope to wire bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The record serialized to a non-object top-level JSON value, so the
    /// `_links`/`_embedded` fields have no object to be spliced into.
    #[error("record serialized to a non-object JSON value; hypermedia fields require a JSON object")]
    NonObjectRecord,

    /// Record or metadata serialization failed. Propagated verbatim.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
