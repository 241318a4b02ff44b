use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Bot,
    Document,
}

impl Origin {
    /// Styling class of the message container.
    pub fn css_class(&self) -> &'static str {
        match self {
            Origin::User => "user-message",
            Origin::Bot => "bot-message",
            Origin::Document => "document-message",
        }
    }
}

/// A single turn of the transcript. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    origin: Origin,
    timestamp: String,
}

impl Message {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            text: text.into(),
            origin,
            timestamp: Local::now().format("%H:%M").to_string(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Bot)
    }

    pub fn document(text: impl Into<String>) -> Self {
        Self::new(text, Origin::Document)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_css_classes_are_distinct() {
        assert_eq!(Origin::User.css_class(), "user-message");
        assert_eq!(Origin::Document.css_class(), "document-message");
    }

    #[test]
    fn test_message_timestamp_is_hour_minute() {
        let msg = Message::bot("hola");
        assert_eq!(msg.timestamp().len(), 5);
        assert_eq!(&msg.timestamp()[2..3], ":");
        assert_eq!(msg.origin().css_class(), "bot-message");
    }
}
