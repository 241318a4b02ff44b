use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::providers::{ChatBackend, FileUpload};
use crate::services::composer::{Key, KeyPress};
use crate::services::conversation::{Command, Completion, ConversationController};
use crate::ui::view::ChatView;

#[derive(Debug)]
pub enum UiEvent {
    Key(KeyPress),
    Text(String),
    SendClicked,
    /// File-picker change; `None` when the selection was cleared.
    FilePicked(Option<PathBuf>),
    InputBlurred,
}

/// Single-threaded event loop.
///
/// UI events run to completion against the controller. Network commands run
/// as tasks and report back through a channel; their completions are applied
/// in arrival order, one at a time.
pub struct App<V: ChatView> {
    controller: ConversationController<V>,
    backend: Arc<dyn ChatBackend>,
    open_session_on_start: bool,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl<V: ChatView> App<V> {
    pub fn new(config: &ClientConfig, backend: Arc<dyn ChatBackend>, view: V) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: ConversationController::new(config, view),
            backend,
            open_session_on_start: config.open_session_on_start,
            tx,
            rx,
            outstanding: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController<V> {
        &self.controller
    }

    /// Obtain the session cookie. The chat stays usable if this fails.
    pub async fn start(&mut self) {
        if !self.open_session_on_start {
            return;
        }
        match self.backend.open_session().await {
            Ok(()) => tracing::info!("Session opened"),
            Err(e) => tracing::warn!("Failed to open session: {}", e),
        }
    }

    pub async fn dispatch(&mut self, event: UiEvent) {
        let command = match event {
            UiEvent::Key(press) => self.controller.handle_key(press),
            UiEvent::Text(text) => {
                self.controller.input_text(&text);
                None
            }
            UiEvent::SendClicked => self.controller.click_send(),
            UiEvent::FilePicked(path) => {
                let file = match path {
                    Some(path) => read_file(path).await,
                    None => None,
                };
                self.controller.file_picked(file)
            }
            UiEvent::InputBlurred => {
                self.controller.input_blurred();
                None
            }
        };

        if let Some(command) = command {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.outstanding += 1;

        tokio::spawn(async move {
            let completion = match command {
                Command::Generate { id, request } => Completion::Generated {
                    id,
                    result: backend.generate(request).await,
                },
                Command::Upload { file } => {
                    let file_name = file.file_name.clone();
                    Completion::Uploaded {
                        file_name,
                        result: backend.upload_file(file).await,
                    }
                }
            };
            if tx.send(completion).is_err() {
                tracing::debug!("Session closed before a request completed");
            }
        });
    }

    pub fn apply(&mut self, completion: Completion) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.controller.apply(completion);
    }

    /// Wait for every issued request to finish and apply its outcome.
    pub async fn run_until_idle(&mut self) {
        while self.outstanding > 0 {
            match self.rx.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    /// Drive the session from stdin, one line per submission.
    ///
    /// `/upload <path>` picks a file, `/upload` clears the pick, `/quit` ends
    /// the session. A trailing `\` continues the message on the next line.
    pub async fn run_terminal(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if !self.handle_line(&line).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(completion) = self.rx.recv() => self.apply(completion),
            }
        }

        self.run_until_idle().await;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> bool {
        for event in parse_line(line) {
            match event {
                LineEvent::Quit => return false,
                LineEvent::Ui(event) => self.dispatch(event).await,
            }
        }
        true
    }
}

#[derive(Debug)]
enum LineEvent {
    Ui(UiEvent),
    Quit,
}

fn parse_line(line: &str) -> Vec<LineEvent> {
    let trimmed = line.trim();
    if trimmed == "/quit" {
        return vec![LineEvent::Quit];
    }
    if trimmed == "/upload" {
        return vec![LineEvent::Ui(UiEvent::FilePicked(None))];
    }
    if let Some(path) = trimmed.strip_prefix("/upload ") {
        return vec![LineEvent::Ui(UiEvent::FilePicked(Some(PathBuf::from(
            path.trim(),
        ))))];
    }

    match line.strip_suffix('\\') {
        Some(partial) => vec![
            LineEvent::Ui(UiEvent::Text(partial.to_string())),
            LineEvent::Ui(UiEvent::Key(KeyPress::with_shift(Key::Enter))),
        ],
        None => vec![
            LineEvent::Ui(UiEvent::Text(line.to_string())),
            LineEvent::Ui(UiEvent::Key(KeyPress::plain(Key::Enter))),
        ],
    }
}

async fn read_file(path: PathBuf) -> Option<FileUpload> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match tokio::fs::read(&path).await {
        Ok(data) => Some(FileUpload {
            file_name,
            data: Bytes::from(data),
        }),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
