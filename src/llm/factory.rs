//! Construct backends and pipelines from loaded config.

use super::gemini::GeminiClient;
use crate::advice::{AdvicePipeline, RetryPolicy};
use crate::config::Config;

/// Build the generation client the config describes.
#[must_use]
pub fn create_backend(config: &Config) -> GeminiClient {
    let api_key = config.resolved_api_key();
    GeminiClient::with_base_url(
        api_key.as_deref(),
        config.generation.model.as_str(),
        config.generation.base_url.as_deref(),
    )
    .with_temperature(config.generation.temperature)
    .with_timeout(config.generation.timeout_secs)
}

/// Build a ready-to-use advice pipeline from config.
#[must_use]
pub fn create_pipeline(config: &Config) -> AdvicePipeline {
    AdvicePipeline::new(Box::new(create_backend(config)))
        .with_retry(RetryPolicy::from(&config.retry))
}
