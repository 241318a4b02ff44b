/// Extracted text of an uploaded document, waiting to be sent with the next prompt.
///
/// Every field is empty when nothing is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub text: String,
    pub name: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(
        text: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.name.is_empty() && self.mime_type.is_empty()
    }
}
