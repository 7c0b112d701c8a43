//! Tag key names and sentinel values.
//!
//! # Design Decisions
//! - Every sentinel lives here once; tag derivation never spells them inline
//! - Low-cardinality keys form a closed set checked by `is_low_cardinality_key`
//! - The raw URL key is the only high-cardinality key

/// Default observation name for server request exchanges.
pub const DEFAULT_OBSERVATION_NAME: &str = "http.server.requests";

/// Low-cardinality key: HTTP method.
pub const METHOD: &str = "method";
/// Low-cardinality key: matched route template or a fixed bucket.
pub const URI: &str = "uri";
/// Low-cardinality key: response status code.
pub const STATUS: &str = "status";
/// Low-cardinality key: captured error type name.
pub const EXCEPTION: &str = "exception";
/// Low-cardinality key: coarse status classification.
pub const OUTCOME: &str = "outcome";

/// High-cardinality key: raw request path.
pub const HTTP_URL: &str = "http.url";

/// Keys emitted by the default convention, in emission order.
pub const LOW_CARDINALITY_KEYS: [&str; 5] = [METHOD, URI, STATUS, EXCEPTION, OUTCOME];

/// Value used when the information needed for a tag is missing.
pub const UNKNOWN: &str = "UNKNOWN";
/// Value of the exception tag when no error was captured.
pub const NONE: &str = "NONE";
/// Value of the uri tag for an empty (root) route pattern.
pub const ROOT: &str = "root";
/// Value of the uri tag for unmatched requests answered with 404.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Value of the uri tag for unmatched requests answered with a 3xx.
pub const REDIRECTION: &str = "REDIRECTION";

/// Returns true if `key` belongs to the closed low-cardinality vocabulary.
pub fn is_low_cardinality_key(key: &str) -> bool {
    LOW_CARDINALITY_KEYS.contains(&key)
}
