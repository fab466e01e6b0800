//! Attachment validation and storage keys.

use aduan_common::{AppError, AppResult, config::AttachmentConfig};

/// An uploaded file accompanying a complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentInput {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl AttachmentInput {
    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PDF_MAGIC: &[u8] = b"%PDF-";

fn signature_for(content_type: &str) -> Option<&'static [u8]> {
    match content_type {
        "image/jpeg" => Some(JPEG_MAGIC),
        "image/png" => Some(PNG_MAGIC),
        "application/pdf" => Some(PDF_MAGIC),
        _ => None,
    }
}

/// Size and type limits for attachments.
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl AttachmentPolicy {
    /// Build the policy from configuration.
    #[must_use]
    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            allowed_types: config
                .allowed_types
                .iter()
                .map(|t| t.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Maximum accepted payload size.
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check size, declared type, and that the payload's leading bytes agree
    /// with the declared type.
    pub fn validate(&self, input: &AttachmentInput) -> AppResult<()> {
        if input.data.is_empty() {
            return Err(AppError::Validation("Attachment is empty".to_string()));
        }
        if input.size() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "Attachment is {} bytes; the limit is {} bytes",
                input.size(),
                self.max_bytes
            )));
        }

        let declared = input.content_type.trim().to_ascii_lowercase();
        if !self.allowed_types.contains(&declared) {
            return Err(AppError::Validation(format!(
                "Attachment type not allowed: {declared}"
            )));
        }

        if let Some(magic) = signature_for(&declared) {
            if !input.data.starts_with(magic) {
                return Err(AppError::Validation(format!(
                    "Attachment content does not match {declared}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::from_config(&AttachmentConfig::default())
    }
}

/// Reduce a client-supplied file name to a safe single path segment.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

/// Storage key for one uploaded payload.
///
/// `upload_id` is fresh per upload so a replacement never overwrites the
/// payload the stored record still points at.
#[must_use]
pub fn storage_key(complaint_id: &str, upload_id: &str, file_name: &str) -> String {
    format!(
        "complaints/{complaint_id}/{upload_id}-{}",
        sanitize_file_name(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(content_type: &str, data: &[u8]) -> AttachmentInput {
        AttachmentInput {
            file_name: "bukti.bin".to_string(),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        }
    }

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut data = PNG_MAGIC.to_vec();
        data.resize(len, 0);
        data
    }

    #[test]
    fn test_accepts_allowed_types() {
        let policy = AttachmentPolicy::default();
        assert!(policy.validate(&input("image/png", &png_bytes(64))).is_ok());
        assert!(policy.validate(&input("image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0])).is_ok());
        assert!(policy.validate(&input("application/pdf", b"%PDF-1.4\n")).is_ok());
    }

    #[test]
    fn test_rejects_oversize() {
        let policy = AttachmentPolicy::default();
        let limit = usize::try_from(policy.max_bytes()).unwrap_or(usize::MAX);

        assert!(policy.validate(&input("image/png", &png_bytes(limit))).is_ok());
        assert!(matches!(
            policy.validate(&input("image/png", &png_bytes(limit + 1))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let policy = AttachmentPolicy::default();
        assert!(matches!(
            policy.validate(&input("image/gif", b"GIF89a")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_mismatched_content() {
        let policy = AttachmentPolicy::default();
        assert!(policy.validate(&input("image/png", b"%PDF-1.4")).is_err());
        assert!(policy.validate(&input("application/pdf", &[])).is_err());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\ali\\gambar 1.png"), "gambar_1.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "attachment");
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(
            storage_key("ADU01ABC", "01jx", "resit kantin.jpg"),
            "complaints/ADU01ABC/01jx-resit_kantin.jpg"
        );
        assert_ne!(
            storage_key("ADU01ABC", "01jx", "bukti.png"),
            storage_key("ADU01ABC", "01jy", "bukti.png")
        );
    }
}
