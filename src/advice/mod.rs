// ── Request/response shapes ─────────────────────────────────────────────────
pub mod payload;
pub mod schema;
pub mod types;

// ── Pipeline stages ─────────────────────────────────────────────────────────
pub mod pipeline;
pub mod prompt;
pub mod validate;

pub use payload::{AdvicePayload, ClientProfile, DailyLog, SessionSlot, StackItem};
pub use pipeline::{AdvicePipeline, RetryPolicy};
pub use prompt::{PERSONA, assemble, instruction_for};
pub use schema::{FieldKind, FieldSpec, Schema, UnknownAdviceType, get_schema};
pub use types::{AdviceOutcome, AdviceRequest, AdviceResponse, AdviceType};
pub use validate::{strip_code_fence, validate};
