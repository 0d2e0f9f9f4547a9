pub mod image;

pub use image::{ImagePayload, detect_mime, normalize_image, strip_data_url};
