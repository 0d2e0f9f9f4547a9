// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod factory;
pub mod http;

// ── Backend implementations ─────────────────────────────────────────────────
pub mod gemini;

pub use factory::{create_backend, create_pipeline};
pub use gemini::GeminiClient;
pub use http::{build_endpoint_client, build_endpoint_client_with_timeout};

use crate::advice::schema::Schema;
use crate::advice::types::AdviceRequest;
use crate::error::GenerateError;
use std::future::Future;
use std::pin::Pin;

/// A hosted generation endpoint.
///
/// Implementations perform one network round trip per call and classify
/// failures into the [`GenerateError`] taxonomy; they never retry on their
/// own. The schema is passed as a response-shape constraint so the endpoint
/// is steered toward conformant JSON; steering is best-effort, which is why
/// the raw text goes through validation afterwards.
pub trait GenerationBackend: Send + Sync {
    /// Backend identifier (e.g. "gemini").
    fn name(&self) -> &str;

    fn generate<'a>(
        &'a self,
        request: &'a AdviceRequest,
        schema: &'a Schema,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send + 'a>>;
}
