use std::fmt;

use uuid::Uuid;

use crate::config::ClientConfig;
use crate::locale;
use crate::models::Message;
use crate::providers::{
    BackendError, FileUpload, GenerateRequest, GenerateResponse, UploadReply,
};
use crate::services::attachment_store::{AttachmentStore, UploadStatus};
use crate::services::composer::{Composer, KeyAction, KeyPress};
use crate::services::renderer;
use crate::services::transcript::Transcript;
use crate::ui::view::ChatView;

/// Correlates a send with its completion in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network work the controller wants done. The host runs it and reports back
/// with a [`Completion`].
#[derive(Debug)]
pub enum Command {
    Generate {
        id: RequestId,
        request: GenerateRequest,
    },
    Upload {
        file: FileUpload,
    },
}

#[derive(Debug)]
pub enum Completion {
    Generated {
        id: RequestId,
        result: Result<GenerateResponse, BackendError>,
    },
    Uploaded {
        file_name: String,
        result: Result<UploadReply, BackendError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Composing,
    Submitting,
    Rendering,
    Failed,
}

/// Owns the transcript, the pending attachment and the input for one session.
///
/// Sends are not serialized: every submit issues its own request, and
/// completions are applied in whatever order they arrive.
pub struct ConversationController<V: ChatView> {
    view: V,
    transcript: Transcript,
    attachments: AttachmentStore,
    composer: Composer,
    state: SendState,
    in_flight: usize,
    max_tokens: Option<u32>,
    keep_fields_on_failed_upload: bool,
}

impl<V: ChatView> ConversationController<V> {
    pub fn new(config: &ClientConfig, view: V) -> Self {
        Self {
            view,
            transcript: Transcript::new(),
            attachments: AttachmentStore::new(),
            composer: Composer::new(config.input_max_rows),
            state: SendState::Idle,
            in_flight: 0,
            max_tokens: config.max_tokens,
            keep_fields_on_failed_upload: config.keep_fields_on_failed_upload,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    #[cfg(test)]
    pub fn attachments_mut(&mut self) -> &mut AttachmentStore {
        &mut self.attachments
    }

    pub fn upload_status(&self) -> &UploadStatus {
        self.attachments.status()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // --- Send path ---

    pub fn handle_key(&mut self, press: KeyPress) -> Option<Command> {
        match self.composer.handle_key(press) {
            KeyAction::Submit => self.submit(),
            KeyAction::Edited => {
                self.settle();
                None
            }
        }
    }

    /// Paste or type a run of text without going through key bindings.
    pub fn input_text(&mut self, text: &str) {
        self.composer.insert_str(text);
        self.settle();
    }

    pub fn click_send(&mut self) -> Option<Command> {
        self.submit()
    }

    pub fn input_blurred(&mut self) {
        self.composer.blur();
    }

    /// Whitespace-only input is dropped without any visible effect.
    pub fn submit(&mut self) -> Option<Command> {
        let prompt = self.composer.text().trim().to_string();
        if prompt.is_empty() {
            tracing::trace!("Ignoring submit of empty input");
            return None;
        }

        self.transition(SendState::Submitting);
        self.append(Message::user(prompt.clone()));
        self.composer.clear();
        self.view.clear_input();
        self.resize_input();
        self.view.set_pending(true);

        let attachment = self.attachments.take_and_clear();
        let id = RequestId::new();
        self.in_flight += 1;
        tracing::info!(
            request_id = %id,
            attachment = %attachment.name,
            in_flight = self.in_flight,
            "Sending prompt"
        );

        Some(Command::Generate {
            id,
            request: GenerateRequest::new(prompt, attachment, self.max_tokens),
        })
    }

    pub fn complete_send(&mut self, id: RequestId, result: Result<GenerateResponse, BackendError>) {
        match result {
            Ok(response) => {
                self.transition(SendState::Rendering);
                tracing::debug!(
                    request_id = %id,
                    model = response.model.as_deref().unwrap_or("unknown"),
                    context_used = response.context_used,
                    "Received response"
                );
                self.append(Message::bot(response.response));
                if let Some(sources) = response.sources.filter(|s| !s.is_empty()) {
                    self.append(Message::bot(locale::sources(&sources)));
                }
            }
            Err(e) => {
                self.transition(SendState::Failed);
                match &e {
                    BackendError::MalformedResponse(_) => {
                        tracing::error!(request_id = %id, "Unreadable response: {}", e)
                    }
                    _ => tracing::error!(request_id = %id, "Send failed: {}", e),
                }
                self.append(Message::bot(locale::SEND_FAILED));
            }
        }

        self.in_flight = self.in_flight.saturating_sub(1);
        self.settle();
        self.view.set_pending(false);
        self.composer.focus();
        self.view.focus_input();
    }

    // --- Upload path ---

    /// A file-picker change. `None` means the selection was cleared.
    pub fn file_picked(&mut self, file: Option<FileUpload>) -> Option<Command> {
        let Some(file) = file else {
            self.set_upload_status(UploadStatus::Idle);
            return None;
        };

        tracing::info!("Uploading {:?}", file);
        self.set_upload_status(UploadStatus::Uploading(file.file_name.clone()));
        Some(Command::Upload { file })
    }

    pub fn complete_upload(&mut self, file_name: String, result: Result<UploadReply, BackendError>) {
        match result {
            Ok(reply) => {
                if reply.success || self.keep_fields_on_failed_upload {
                    self.attachments.set(reply.body.to_attachment());
                }
                if reply.success {
                    self.set_upload_status(UploadStatus::Ready(file_name.clone()));
                    self.append(Message::document(locale::upload_succeeded(&file_name)));
                } else {
                    tracing::warn!(
                        status = reply.status,
                        "Upload of {} rejected: {:?}",
                        file_name,
                        reply.body.detail
                    );
                    self.set_upload_status(UploadStatus::Error);
                    self.append(Message::bot(locale::upload_rejected(
                        reply.body.detail.as_deref(),
                    )));
                }
            }
            Err(e) => {
                tracing::error!("Upload of {} failed: {}", file_name, e);
                self.set_upload_status(UploadStatus::Error);
                self.append(Message::bot(locale::UPLOAD_CONNECTION_FAILED));
            }
        }
    }

    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Generated { id, result } => self.complete_send(id, result),
            Completion::Uploaded { file_name, result } => self.complete_upload(file_name, result),
        }
    }

    // --- Helpers ---

    fn append(&mut self, message: Message) {
        let markup = renderer::render(message.text());
        let message = self.transcript.append(message);
        self.view.append(message, &markup);
    }

    fn set_upload_status(&mut self, status: UploadStatus) {
        self.attachments.set_status(status);
        self.view.set_upload_status(self.attachments.status());
    }

    fn transition(&mut self, next: SendState) {
        if self.state != next {
            tracing::debug!("Send state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn resize_input(&mut self) {
        self.view
            .set_input_rows(self.composer.visible_rows(), self.composer.scrolls());
    }

    /// Come to rest after an edit or a completion.
    fn settle(&mut self) {
        self.resize_input();
        let next = if self.in_flight > 0 {
            SendState::Submitting
        } else if self.composer.text().is_empty() {
            SendState::Idle
        } else {
            SendState::Composing
        };
        self.transition(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, Origin};
    use crate::providers::UploadResponse;
    use crate::services::composer::Key;
    use crate::ui::view::testing::{RecordingView, ViewEvent};
    use bytes::Bytes;

    fn controller() -> ConversationController<RecordingView> {
        ConversationController::new(&ClientConfig::default(), RecordingView::default())
    }

    fn type_text(ctl: &mut ConversationController<RecordingView>, text: &str) {
        for c in text.chars() {
            assert!(ctl.handle_key(KeyPress::plain(Key::Char(c))).is_none());
        }
    }

    fn expect_generate(command: Option<Command>) -> (RequestId, GenerateRequest) {
        match command {
            Some(Command::Generate { id, request }) => (id, request),
            other => panic!("Expected Generate, got {:?}", other),
        }
    }

    fn ok_response(text: &str, sources: Option<Vec<&str>>) -> Result<GenerateResponse, BackendError> {
        Ok(GenerateResponse {
            response: text.to_string(),
            sources: sources.map(|s| s.into_iter().map(String::from).collect()),
            model: None,
            context_used: false,
        })
    }

    fn upload_reply(success: bool, body: &str) -> Result<UploadReply, BackendError> {
        Ok(UploadReply {
            success,
            status: if success { 200 } else { 500 },
            body: serde_json::from_str::<UploadResponse>(body).unwrap(),
        })
    }

    fn bot_texts(ctl: &ConversationController<RecordingView>) -> Vec<String> {
        ctl.transcript()
            .messages()
            .iter()
            .filter(|m| m.origin() == Origin::Bot)
            .map(|m| m.text().to_string())
            .collect()
    }

    #[test]
    fn test_whitespace_input_is_ignored() {
        let mut ctl = controller();
        type_text(&mut ctl, "  \t ");
        ctl.input_text("\n  ");

        assert!(ctl.click_send().is_none());
        assert!(ctl.handle_key(KeyPress::plain(Key::Enter)).is_none());

        assert!(ctl.transcript().is_empty());
        assert_eq!(ctl.in_flight(), 0);
        assert!(!ctl
            .view()
            .events
            .iter()
            .any(|e| matches!(e, ViewEvent::Pending(_) | ViewEvent::InputCleared)));
    }

    #[test]
    fn test_enter_submits_and_shift_enter_does_not() {
        let mut ctl = controller();
        type_text(&mut ctl, "hola");

        assert!(ctl.handle_key(KeyPress::with_shift(Key::Enter)).is_none());
        assert!(ctl.transcript().is_empty());
        assert_eq!(ctl.composer().text(), "hola\n");
        assert_eq!(ctl.state(), SendState::Composing);

        type_text(&mut ctl, "mundo");
        let (_, request) = expect_generate(ctl.handle_key(KeyPress::plain(Key::Enter)));
        assert_eq!(request.prompt, "hola\nmundo");
        assert_eq!(ctl.transcript().len(), 1);
    }

    #[test]
    fn test_submit_is_optimistic() {
        let mut ctl = controller();
        ctl.input_text("  ¿qué tal?  ");
        let (_, request) = expect_generate(ctl.click_send());

        assert_eq!(request.prompt, "¿qué tal?");
        assert_eq!(request.file_text, "");
        assert_eq!(ctl.state(), SendState::Submitting);

        let user = ctl.transcript().last().unwrap();
        assert_eq!(user.origin(), Origin::User);
        assert_eq!(user.text(), "¿qué tal?");

        assert_eq!(ctl.composer().text(), "");
        assert_eq!(ctl.composer().visible_rows(), 1);
        assert!(ctl.view().pending_visible());
        assert!(ctl.view().events.contains(&ViewEvent::InputCleared));
    }

    #[test]
    fn test_input_grows_to_cap_then_scrolls_and_shrinks_on_submit() {
        let config = ClientConfig {
            input_max_rows: 3,
            ..ClientConfig::default()
        };
        let mut ctl = ConversationController::new(&config, RecordingView::default());

        ctl.input_text("uno");
        assert_eq!(ctl.view().last_input_rows(), Some((1, false)));

        assert!(ctl.handle_key(KeyPress::with_shift(Key::Enter)).is_none());
        type_text(&mut ctl, "dos");
        assert_eq!(ctl.view().last_input_rows(), Some((2, false)));

        ctl.input_text("\ntres\ncuatro");
        assert_eq!(ctl.view().last_input_rows(), Some((3, true)));

        expect_generate(ctl.click_send());
        assert_eq!(ctl.view().last_input_rows(), Some((1, false)));
        let cleared = ctl
            .view()
            .events
            .iter()
            .position(|e| *e == ViewEvent::InputCleared)
            .unwrap();
        assert_eq!(
            ctl.view().events[cleared + 1],
            ViewEvent::InputRows { rows: 1, scrolls: false }
        );
    }

    #[test]
    fn test_success_with_sources_appends_two_bot_messages() {
        let mut ctl = controller();
        ctl.input_text("pregunta");
        let (id, _) = expect_generate(ctl.click_send());
        let before = ctl.transcript().len();

        ctl.apply(Completion::Generated {
            id,
            result: ok_response("hi", Some(vec!["doc1", "doc2"])),
        });

        assert_eq!(ctl.transcript().len(), before + 2);
        assert_eq!(
            bot_texts(&ctl),
            vec!["hi".to_string(), "Fuentes consultadas: doc1, doc2".to_string()]
        );
        assert!(!ctl.view().pending_visible());
        assert_eq!(ctl.view().events.last(), Some(&ViewEvent::Focused));
        assert!(ctl.composer().is_focused());
        assert_eq!(ctl.state(), SendState::Idle);
    }

    #[test]
    fn test_empty_sources_append_one_message() {
        let mut ctl = controller();
        ctl.input_text("pregunta");
        let (id, _) = expect_generate(ctl.click_send());
        ctl.complete_send(id, ok_response("respuesta", Some(vec![])));
        assert_eq!(bot_texts(&ctl), vec!["respuesta".to_string()]);
    }

    #[test]
    fn test_failure_appends_fixed_error_and_hides_indicator() {
        let mut ctl = controller();
        ctl.input_text("pregunta");
        let (id, _) = expect_generate(ctl.click_send());
        assert!(ctl.view().pending_visible());

        ctl.complete_send(
            id,
            Err(BackendError::Server {
                status: 500,
                detail: Some("Error interno del servidor".to_string()),
            }),
        );

        assert_eq!(bot_texts(&ctl), vec![locale::SEND_FAILED.to_string()]);
        assert!(!ctl.view().pending_visible());
        assert!(ctl.composer().is_focused());
        assert_eq!(ctl.state(), SendState::Idle);
    }

    #[test]
    fn test_malformed_response_renders_like_network_failure() {
        let mut ctl = controller();
        ctl.input_text("pregunta");
        let (id, _) = expect_generate(ctl.click_send());
        ctl.complete_send(id, Err(BackendError::MalformedResponse("eof".to_string())));
        assert_eq!(bot_texts(&ctl), vec![locale::SEND_FAILED.to_string()]);
    }

    #[test]
    fn test_bot_text_is_rendered_safely() {
        let mut ctl = controller();
        ctl.input_text("x");
        let (id, _) = expect_generate(ctl.click_send());
        ctl.complete_send(id, ok_response("<b>hola</b> `code`", None));

        let markup = ctl
            .view()
            .events
            .iter()
            .rev()
            .find_map(|e| match e {
                ViewEvent::Appended { markup, .. } => Some(markup.clone()),
                _ => None,
            })
            .unwrap();
        assert!(markup.starts_with("&lt;b&gt;hola&lt;/b&gt; <code class=\"inline-code\">code</code>"));
    }

    #[test]
    fn test_attachment_is_consumed_by_the_next_send_only() {
        let mut ctl = controller();
        ctl.attachments_mut()
            .set(Attachment::new("texto extraído", "informe.pdf", "documento"));

        ctl.input_text("resume");
        let (first_id, first) = expect_generate(ctl.click_send());
        assert_eq!(first.file_text, "texto extraído");
        assert_eq!(first.file_name, "informe.pdf");
        assert_eq!(first.file_type, "documento");

        // A failed send does not bring the attachment back.
        ctl.complete_send(first_id, Err(BackendError::Network("refused".to_string())));

        ctl.input_text("otra vez");
        let (_, second) = expect_generate(ctl.click_send());
        assert_eq!(second.file_text, "");
        assert_eq!(second.file_name, "");
        assert_eq!(second.file_type, "");
    }

    #[test]
    fn test_upload_landing_during_send_goes_to_next_send() {
        let mut ctl = controller();
        ctl.input_text("primera");
        let (first_id, first) = expect_generate(ctl.click_send());
        assert_eq!(first.file_name, "");

        ctl.complete_upload(
            "b.txt".to_string(),
            upload_reply(true, r#"{"file_text":"B","file_name":"b.txt","file_type":"documento"}"#),
        );
        ctl.complete_send(first_id, ok_response("ok", None));

        ctl.input_text("segunda");
        let (_, second) = expect_generate(ctl.click_send());
        assert_eq!(second.file_text, "B");
    }

    #[test]
    fn test_concurrent_sends_render_in_arrival_order() {
        let mut ctl = controller();
        ctl.input_text("uno");
        let (first, _) = expect_generate(ctl.click_send());
        ctl.input_text("dos");
        let (second, _) = expect_generate(ctl.click_send());
        assert_ne!(first, second);
        assert_eq!(ctl.in_flight(), 2);

        ctl.complete_send(second, ok_response("respuesta dos", None));
        assert_eq!(ctl.state(), SendState::Submitting);
        ctl.complete_send(first, ok_response("respuesta uno", None));

        assert_eq!(
            bot_texts(&ctl),
            vec!["respuesta dos".to_string(), "respuesta uno".to_string()]
        );
        assert_eq!(ctl.in_flight(), 0);
        assert_eq!(ctl.state(), SendState::Idle);
    }

    #[test]
    fn test_empty_file_pick_resets_status_without_request() {
        let mut ctl = controller();
        assert!(ctl.file_picked(None).is_none());
        assert_eq!(ctl.upload_status(), &UploadStatus::Idle);
        assert_eq!(ctl.view().last_upload_status(), Some(&UploadStatus::Idle));
        assert!(ctl.transcript().is_empty());
    }

    #[test]
    fn test_successful_upload() {
        let mut ctl = controller();
        let command = ctl.file_picked(Some(FileUpload {
            file_name: "notas.txt".to_string(),
            data: Bytes::from_static(b"hola"),
        }));
        assert!(matches!(command, Some(Command::Upload { ref file }) if file.file_name == "notas.txt"));
        assert_eq!(
            ctl.upload_status(),
            &UploadStatus::Uploading("notas.txt".to_string())
        );

        ctl.apply(Completion::Uploaded {
            file_name: "notas.txt".to_string(),
            result: upload_reply(
                true,
                r#"{"file_text":"hola","file_name":"notas.txt","file_type":"documento"}"#,
            ),
        });

        assert_eq!(ctl.upload_status(), &UploadStatus::Ready("notas.txt".to_string()));
        let last = ctl.transcript().last().unwrap();
        assert_eq!(last.origin(), Origin::Document);
        assert_eq!(last.text(), "📄 Archivo cargado correctamente: notas.txt");

        ctl.input_text("¿de qué trata?");
        let (_, request) = expect_generate(ctl.click_send());
        assert_eq!(request.file_text, "hola");
    }

    #[test]
    fn test_rejected_upload_reports_detail_and_overwrites_store() {
        let mut ctl = controller();
        ctl.attachments_mut().set(Attachment::new("viejo", "viejo.pdf", "documento"));

        ctl.complete_upload(
            "video.mp4".to_string(),
            upload_reply(false, r#"{"detail":"Formato de archivo no soportado"}"#),
        );

        assert_eq!(ctl.upload_status(), &UploadStatus::Error);
        assert_eq!(
            bot_texts(&ctl),
            vec!["❌ Error al procesar el archivo: Formato de archivo no soportado".to_string()]
        );

        ctl.input_text("hola");
        let (_, request) = expect_generate(ctl.click_send());
        assert_eq!(request.file_text, "");
        assert_eq!(request.file_name, "");
    }

    #[test]
    fn test_rejected_upload_can_leave_store_untouched() {
        let config = ClientConfig {
            keep_fields_on_failed_upload: false,
            ..ClientConfig::default()
        };
        let mut ctl = ConversationController::new(&config, RecordingView::default());
        ctl.attachments_mut().set(Attachment::new("viejo", "viejo.pdf", "documento"));

        ctl.complete_upload(
            "video.mp4".to_string(),
            upload_reply(false, r#"{"file_text":"nuevo","detail":"no"}"#),
        );

        ctl.input_text("hola");
        let (_, request) = expect_generate(ctl.click_send());
        assert_eq!(request.file_text, "viejo");
    }

    #[test]
    fn test_upload_connection_failure() {
        let mut ctl = controller();
        ctl.attachments_mut().set(Attachment::new("previo", "p.txt", "documento"));
        ctl.complete_upload(
            "a.pdf".to_string(),
            Err(BackendError::Network("connection reset".to_string())),
        );

        assert_eq!(ctl.upload_status(), &UploadStatus::Error);
        assert_eq!(bot_texts(&ctl), vec![locale::UPLOAD_CONNECTION_FAILED.to_string()]);

        ctl.input_text("hola");
        let (_, request) = expect_generate(ctl.click_send());
        assert_eq!(request.file_text, "previo");
    }

    #[test]
    fn test_max_tokens_is_forwarded() {
        let config = ClientConfig {
            max_tokens: Some(64),
            ..ClientConfig::default()
        };
        let mut ctl = ConversationController::new(&config, RecordingView::default());
        ctl.input_text("hola");
        let (_, request) = expect_generate(ctl.click_send());
        assert_eq!(request.max_tokens, Some(64));
    }
}
