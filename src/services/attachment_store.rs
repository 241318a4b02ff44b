use crate::locale;
use crate::models::Attachment;

/// State of the upload indicator next to the file picker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading(String),
    Ready(String),
    Error,
}

impl UploadStatus {
    pub fn label(&self) -> String {
        match self {
            UploadStatus::Idle => locale::NO_FILE_SELECTED.to_string(),
            UploadStatus::Uploading(name) => locale::uploading(name),
            UploadStatus::Ready(name) => locale::upload_ready(name),
            UploadStatus::Error => locale::UPLOAD_FAILED_STATUS.to_string(),
        }
    }
}

/// Holds at most one pending attachment between an upload and the next send.
///
/// There is no way to look at the attachment without consuming it.
#[derive(Debug, Default)]
pub struct AttachmentStore {
    pending: Option<Attachment>,
    status: UploadStatus,
}

impl AttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is pending. Last write wins.
    pub fn set(&mut self, attachment: Attachment) {
        if self.pending.is_some() {
            tracing::debug!("Replacing pending attachment with {:?}", attachment.name);
        }
        self.pending = Some(attachment);
    }

    /// Return the pending attachment (empty if none) and leave the store empty.
    pub fn take_and_clear(&mut self) -> Attachment {
        self.pending.take().unwrap_or_default()
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: UploadStatus) {
        tracing::debug!("Upload status: {:?} -> {:?}", self.status, status);
        self.status = status;
    }
}
