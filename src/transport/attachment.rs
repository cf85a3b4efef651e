use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
}

/// Media sent alongside a message: base64 payload plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip)]
    pub kind: AttachmentKind,
    pub data: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl Attachment {
    pub fn from_bytes(bytes: &[u8], filename: Option<&str>) -> Result<Self> {
        let mime_type = detect_mime(bytes)
            .or_else(|| filename.and_then(mime_from_extension))
            .with_context(|| {
                format!(
                    "unsupported attachment type{}",
                    filename.map(|f| format!(" for {f}")).unwrap_or_default()
                )
            })?;
        let kind = if mime_type.starts_with("image/") {
            AttachmentKind::Image
        } else if mime_type.starts_with("video/") {
            AttachmentKind::Video
        } else {
            anyhow::bail!("only images and videos can be attached, got {mime_type}");
        };
        Ok(Self {
            kind,
            data: STANDARD.encode(bytes),
            mime_type,
        })
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read attachment {}", path.display()))?;
        let name = path.file_name().and_then(|n| n.to_str());
        Self::from_bytes(&bytes, name)
    }
}

fn detect_mime(data: &[u8]) -> Option<String> {
    infer::get(data).map(|info| info.mime_type().to_string())
}

fn mime_from_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let mime = match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "3gp" => "video/3gpp",
        _ => return None,
    };
    Some(mime.to_string())
}
