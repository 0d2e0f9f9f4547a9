use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `coachcore`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide what to show the user ("try again" vs. "blocked" vs.
/// "offline"); internal code continues to use `anyhow::Result` for ad-hoc
/// context chains.
#[derive(Debug, Error)]
pub enum CoachError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Generation endpoint ─────────────────────────────────────────────
    #[error("generate: {0}")]
    Generate(#[from] GenerateError),

    // ── Response validation ─────────────────────────────────────────────
    #[error("validate: {0}")]
    Validate(#[from] ValidateError),

    // ── Media / image payloads ──────────────────────────────────────────
    #[error("media: {0}")]
    Media(#[from] MediaError),

    // ── Document / object store ─────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Live voice session ──────────────────────────────────────────────
    #[error("live: {0}")]
    Live(#[from] LiveError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Generation endpoint errors ─────────────────────────────────────────────
//
// One variant per failure class the UI must distinguish. None of these are
// retried automatically by the client itself; retry policy lives in the
// pipeline and only ever touches `Transport` and `RateLimited`.

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate-limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("content refused by endpoint: {reason}")]
    ContentRefusal { reason: String },

    #[error("endpoint error ({status}): {message}")]
    Endpoint { status: u16, message: String },
}

impl GenerateError {
    /// Transient failures that a bounded retry may resolve. Auth failures,
    /// safety refusals, and other 4xx responses never are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RateLimited { .. })
    }
}

// ─── Response validation errors ─────────────────────────────────────────────
//
// A malformed model response is an expected outcome, not an exception path:
// pipeline callers receive these inside an `Ok(AdviceResponse)`, never as a
// panic or an `Err` that aborts the surrounding view.

#[derive(Debug, Clone, Error)]
pub enum ValidateError {
    #[error("response is not valid JSON: {0}")]
    Json(String),

    #[error("expected top-level {expected}, got {actual}")]
    TopLevel {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("field `{path}` expected {expected}, got {actual}")]
    FieldType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
}

// ─── Media errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMime(String),

    #[error("image too large: {size_bytes} bytes (limit {limit_bytes})")]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("camera/microphone access denied: {0}")]
    AccessDenied(String),
}

// ─── Store errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    Backend(String),
}

// ─── Live session errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("session closed by server")]
    Closed,

    #[error("unexpected server payload: {0}")]
    Protocol(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CoachError>;
