use async_trait::async_trait;

use super::types::{BackendError, FileUpload, GenerateRequest, GenerateResponse, UploadReply};

/// The remote generation service, seen from the client.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Obtain the session cookie the service keys conversation history on.
    async fn open_session(&self) -> Result<(), BackendError>;

    /// Any non-2xx status is an error, whatever the body says.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, BackendError>;

    /// Returns a reply for every status as long as the body parses.
    async fn upload_file(&self, file: FileUpload) -> Result<UploadReply, BackendError>;
}
