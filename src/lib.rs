#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod advice;
pub mod bus;
pub mod config;
pub mod error;
pub mod identity;
pub mod live;
pub mod llm;
pub mod media;
#[doc(hidden)]
pub mod observability;
pub mod store;

pub use advice::{
    AdviceOutcome, AdvicePayload, AdvicePipeline, AdviceRequest, AdviceResponse, AdviceType,
    RetryPolicy,
};
pub use bus::{DashboardEvent, EventBus, EventKind};
pub use config::Config;
pub use error::{CoachError, GenerateError, Result, ValidateError};
pub use identity::{Role, Tier};
pub use llm::{GeminiClient, GenerationBackend};
pub use media::{ImagePayload, normalize_image};
