use thiserror::Error;

/// Unified error type for the peerlink workspace.
///
/// The keyed exchange deliberately has no variant for "no active binding" or
/// "no value stored": those are expected transient conditions and surface as
/// empty results, not errors.
#[derive(Error, Debug)]
pub enum PeerError {
    // ── Keyed exchange errors ──────────────────────────────────
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),

    #[error("malformed payload for key {key}: {reason}")]
    MalformedPayload { key: String, reason: String },

    #[error("ambiguous binding: {count} peer-group bindings are active, expected one")]
    AmbiguousBinding { count: usize },

    // ── Membership errors ──────────────────────────────────────
    #[error("unknown membership event: {0}")]
    UnknownEvent(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Replay / scripting errors ──────────────────────────────
    #[error("script error: {0}")]
    Script(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PeerError>;
