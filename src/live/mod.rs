pub mod protocol;
pub mod session;

pub use protocol::{
    FRAME_BYTES, INPUT_SAMPLE_RATE_HZ, LiveEvent, LiveSetup, OUTPUT_SAMPLE_RATE_HZ,
    parse_server_text,
};
pub use session::LiveSession;
