//! Input checks applied before anything touches the message log.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};
use crate::error::{ChatError, Result};

/// An image attached to a message, kept as an opaque `data:` URL.
///
/// The only way to build one is [`ImageAttachment::from_data_url`], so a
/// value of this type has already passed the type and size checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ImageAttachment(String);

impl ImageAttachment {
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (mime, payload) = split_data_url(url)?;
        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| ChatError::validation(format!("Image payload is not valid base64: {e}")))?;
        validate_image(mime, decoded.len())?;
        Ok(Self(url.to_string()))
    }

    pub fn mime_type(&self) -> &str {
        split_data_url(&self.0).map(|(mime, _)| mime).unwrap_or("")
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }
}

/// Check an image's MIME type and decoded size against the upload limits.
pub fn validate_image(mime: &str, size: usize) -> Result<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&mime) {
        return Err(ChatError::validation(
            "Invalid file type. Please upload JPEG, PNG, GIF, or WebP images.",
        ));
    }
    if size > MAX_IMAGE_SIZE {
        return Err(ChatError::validation(
            "File size too large. Please upload images smaller than 5MB.",
        ));
    }
    Ok(())
}

/// Trim outgoing text and reject sends that carry nothing at all.
pub fn normalize_outgoing(text: &str, has_image: bool) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() && !has_image {
        return Err(ChatError::validation("Message must contain text or an image"));
    }
    Ok(trimmed.to_string())
}

fn split_data_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ChatError::validation("Image must be a data: URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ChatError::validation("Malformed data: URL"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| ChatError::validation("Image data must be base64-encoded"))?;
    Ok((mime, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    #[test]
    fn accepts_small_png() {
        let url = data_url("image/png", &[0x89, b'P', b'N', b'G']);
        let img = ImageAttachment::from_data_url(&url).unwrap();
        assert_eq!(img.mime_type(), "image/png");
        assert_eq!(img.as_data_url(), url);
    }

    #[test]
    fn rejects_disallowed_type() {
        let url = data_url("image/bmp", b"BM");
        let err = ImageAttachment::from_data_url(&url).unwrap_err();
        assert!(matches!(err, ChatError::ValidationRejected(_)));
    }

    #[test]
    fn rejects_oversized_image() {
        assert!(validate_image("image/jpeg", MAX_IMAGE_SIZE).is_ok());
        assert!(validate_image("image/jpeg", MAX_IMAGE_SIZE + 1).is_err());
    }

    #[test]
    fn rejects_non_data_url() {
        assert!(ImageAttachment::from_data_url("https://example.com/cat.png").is_err());
        assert!(ImageAttachment::from_data_url("data:image/png,plain").is_err());
        assert!(ImageAttachment::from_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn outgoing_text_is_trimmed() {
        assert_eq!(normalize_outgoing("  hi \n", false).unwrap(), "hi");
        assert_eq!(normalize_outgoing("   ", true).unwrap(), "");
        assert!(matches!(
            normalize_outgoing(" \t ", false),
            Err(ChatError::ValidationRejected(_))
        ));
    }
}
