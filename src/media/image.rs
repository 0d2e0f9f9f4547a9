//! Shared image payload normalization.
//!
//! Every multimodal request builder goes through [`normalize_image`]; nothing
//! else in the crate strips data-URL prefixes or decodes base64. Payloads hold
//! raw bytes; re-encoding to base64 happens once, at the wire, in the
//! generation client.

use crate::error::MediaError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub mime_type: String,
    #[serde(with = "serde_bytes_base64")]
    pub data: Vec<u8>,
}

impl ImagePayload {
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Base64 form for wire embedding.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and base64
/// body. Input that is not a data URL is returned whole with no MIME type.
#[must_use]
pub fn strip_data_url(input: &str) -> (Option<&str>, &str) {
    let Some(rest) = input.strip_prefix("data:") else {
        return (None, input);
    };
    let Some((header, body)) = rest.split_once(",") else {
        return (None, input);
    };
    let mime = header.strip_suffix(";base64").unwrap_or(header);
    let mime = if mime.is_empty() { None } else { Some(mime) };
    (mime, body)
}

/// Sniff the MIME type from magic bytes.
#[must_use]
pub fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

/// Normalize caller-supplied image data into an [`ImagePayload`].
///
/// Accepts either a raw base64 string or a full `data:` URL (UI layers hand
/// over whatever their file pickers produced). The declared MIME type, if
/// any, wins; otherwise the data-URL header, then magic-byte sniffing.
/// Non-image MIME types and oversized payloads are rejected.
pub fn normalize_image(
    input: &str,
    declared_mime: Option<&str>,
    max_bytes: u64,
) -> Result<ImagePayload, MediaError> {
    let (url_mime, body) = strip_data_url(input);

    // Base64 payloads are often wrapped by UI layers; whitespace is not data.
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let data = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| MediaError::InvalidBase64(e.to_string()))?;

    let size_bytes = data.len() as u64;
    if size_bytes > max_bytes {
        return Err(MediaError::TooLarge {
            size_bytes,
            limit_bytes: max_bytes,
        });
    }

    let mime_type = declared_mime
        .map(str::to_string)
        .or_else(|| url_mime.map(str::to_string))
        .or_else(|| detect_mime(&data))
        .ok_or_else(|| MediaError::UnsupportedMime("unknown".into()))?;

    let parsed: mime::Mime = mime_type
        .parse()
        .map_err(|_| MediaError::UnsupportedMime(mime_type.clone()))?;
    if parsed.type_() != mime::IMAGE {
        return Err(MediaError::UnsupportedMime(mime_type));
    }

    Ok(ImagePayload::new(mime_type, data))
}

mod serde_bytes_base64 {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        BASE64.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
