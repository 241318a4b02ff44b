use crate::models::Message;
use crate::services::attachment_store::UploadStatus;

/// Everything the controller shows to the user goes through this seam.
pub trait ChatView {
    /// Show a new transcript entry. `markup` is already sanitized.
    fn append(&mut self, message: &Message, markup: &str);

    /// Show or hide the "typing" indicator.
    fn set_pending(&mut self, pending: bool);

    fn set_upload_status(&mut self, status: &UploadStatus);

    /// Empty the input control and shrink it back to a single row.
    fn clear_input(&mut self);

    /// Resize the input to `rows` visible lines, scrolling past that if `scrolls`.
    fn set_input_rows(&mut self, rows: usize, scrolls: bool);

    fn focus_input(&mut self);
}
