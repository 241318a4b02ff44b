use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Attachment;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {}", .detail.as_deref().unwrap_or("request failed"))]
    Server {
        status: u16,
        detail: Option<String>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub file_text: String,
    pub file_name: String,
    pub file_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(prompt: String, attachment: Attachment, max_tokens: Option<u32>) -> Self {
        Self {
            prompt,
            file_text: attachment.text,
            file_name: attachment.name,
            file_type: attachment.mime_type,
            max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub context_used: bool,
}

/// Body of an upload response. Present on success and on failure alike.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub file_text: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl UploadResponse {
    pub fn to_attachment(&self) -> Attachment {
        Attachment::new(
            self.file_text.clone().unwrap_or_default(),
            self.file_name.clone().unwrap_or_default(),
            self.file_type.clone().unwrap_or_default(),
        )
    }
}

/// Outcome of an upload that produced a parseable body, whatever the status.
#[derive(Debug, Clone)]
pub struct UploadReply {
    pub success: bool,
    pub status: u16,
    pub body: UploadResponse,
}

/// A picked file, read into memory.
#[derive(Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub data: Bytes,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("data", &format!("[{} bytes]", self.data.len()))
            .finish()
    }
}
