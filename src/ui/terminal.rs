use std::io::Write;

use crate::models::Message;
use crate::services::attachment_store::UploadStatus;
use crate::ui::view::ChatView;

/// Writes transcript markup to one stream and indicator changes to another.
pub struct TerminalView<O: Write, S: Write> {
    out: O,
    status: S,
}

impl TerminalView<std::io::Stdout, std::io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, S: Write> TerminalView<O, S> {
    pub fn new(out: O, status: S) -> Self {
        Self { out, status }
    }

    fn write_out(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write transcript entry: {}", e);
        }
    }

    fn write_status(&mut self, line: &str) {
        if let Err(e) = writeln!(self.status, "{}", line).and_then(|_| self.status.flush()) {
            tracing::warn!("Failed to write status: {}", e);
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (O, S) {
        (self.out, self.status)
    }
}

impl<O: Write, S: Write> ChatView for TerminalView<O, S> {
    fn append(&mut self, message: &Message, markup: &str) {
        let line = format!(
            r#"<div class="message {}">{}</div>"#,
            message.origin().css_class(),
            markup
        );
        self.write_out(&line);
    }

    fn set_pending(&mut self, pending: bool) {
        if pending {
            self.write_status("…");
        }
    }

    fn set_upload_status(&mut self, status: &UploadStatus) {
        self.write_status(&format!("[{}]", status.label()));
    }

    fn clear_input(&mut self) {}

    // The terminal line editor sizes itself.
    fn set_input_rows(&mut self, rows: usize, scrolls: bool) {
        tracing::trace!(rows, scrolls, "Input resized");
    }

    fn focus_input(&mut self) {
        self.write_status("> ");
    }
}
