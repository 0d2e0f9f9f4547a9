pub mod schema;

pub use schema::{Config, GenerationSettings, LiveSettings, MediaSettings, RetrySettings};
