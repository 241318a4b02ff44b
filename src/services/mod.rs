pub mod attachment_store;
pub mod composer;
pub mod conversation;
pub mod renderer;
pub mod transcript;

pub use attachment_store::{AttachmentStore, UploadStatus};
pub use conversation::ConversationController;
pub use transcript::Transcript;
