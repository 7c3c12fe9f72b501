use crate::api::models::{directory_failure_help, select_model, sort_models};
use crate::api::{ModelInfo, ModelsResponse};
use crate::core::chat_stream::{StreamMessage, StreamParams, TokenEvent};
use crate::core::config::data::Config;
use crate::core::error::TransportError;
use crate::core::message::Message;
use crate::core::session::{Conversation, Session};
use crate::core::store::SessionStore;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;
use crate::utils::scroll::ScrollCalculator;
use ratatui::text::Line;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub mod chats;
pub mod pickers;
pub mod ui_state;


pub use ui_state::{NamePromptKind, Notice, UiMode, UiState, AUTO_SCROLL_SNAP_ROWS};

/// Everything needed to build the controller at startup.
pub struct AppInit {
    pub client: reqwest::Client,
    pub host: String,
    pub store: SessionStore,
    pub markdown_enabled: bool,
    pub log_file: Option<String>,
}

#[derive(Debug, Default)]
struct StreamState {
    cancel_token: Option<CancellationToken>,
    current_stream_id: u64,
}

pub struct App {
    pub conversation: Conversation,
    pub store: SessionStore,
    pub ui: UiState,
    pub client: reqwest::Client,
    pub host: String,
    pub models: Vec<ModelInfo>,
    pub logging: LoggingState,
    /// Name the active chat was last saved or loaded under.
    pub active_session_name: Option<String>,
    pub notices: Vec<Notice>,
    stream: StreamState,
}

impl App {
    pub fn new(init: AppInit) -> Result<Self, Box<dyn std::error::Error>> {
        let system_prompt = match init.store.system_prompt() {
            Ok(prompt) => prompt.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Could not read the stored system prompt");
                String::new()
            }
        };
        let logging = LoggingState::new(init.log_file)?;

        Ok(Self {
            conversation: Conversation::new(Session::new(String::new(), system_prompt)),
            store: init.store,
            ui: UiState::new(Theme::dark_default(), init.markdown_enabled),
            client: init.client,
            host: init.host,
            models: Vec::new(),
            logging,
            active_session_name: None,
            notices: Vec::new(),
            stream: StreamState::default(),
        })
    }

    pub fn session(&self) -> &Session {
        self.conversation.session()
    }

    pub fn model(&self) -> &str {
        &self.conversation.session().model
    }

    pub fn set_status<S: Into<String>>(&mut self, s: S) {
        self.ui.set_status(s);
    }

    pub fn request_exit(&mut self) {
        self.ui.exit_requested = true;
    }

    /// Show an app-authored line after the current end of the transcript.
    pub fn add_notice(&mut self, message: Message) {
        self.notices.push(Notice {
            anchor: self.conversation.session().transcript.len(),
            message,
        });
        self.ui.invalidate_lines();
    }

    /// Transcript turns with notices interleaved at their anchors.
    pub fn display_messages(&self) -> Vec<&Message> {
        merge_notices(&self.conversation.session().transcript, &self.notices)
    }

    pub fn display_lines(&mut self, width: u16) -> &[Line<'static>] {
        let transcript = &self.conversation.session().transcript;
        let notices = &self.notices;
        self.ui.display_lines_with(width, |theme, markdown_enabled| {
            ScrollCalculator::build_display_lines(
                merge_notices(transcript, notices),
                theme,
                markdown_enabled,
                width,
            )
        })
    }

    pub fn max_scroll(&mut self, width: u16, available_height: u16) -> u16 {
        let total = self.display_lines(width).len();
        ScrollCalculator::max_scroll_offset(total, available_height)
    }

    pub fn update_scroll_position(&mut self, width: u16, available_height: u16) {
        let max_scroll = self.max_scroll(width, available_height);
        self.ui.update_scroll_position(max_scroll);
    }

    // ---- model directory ----

    /// Apply the result of a model listing request.
    ///
    /// The requested model is kept when listed, otherwise the first listed
    /// model is selected; either way the choice is remembered. A failed
    /// listing opens the blocking diagnostic dialog.
    pub fn apply_model_listing(
        &mut self,
        result: Result<ModelsResponse, TransportError>,
        requested: Option<&str>,
    ) {
        match result {
            Ok(response) => {
                let mut models = response.models;
                sort_models(&mut models);
                debug!(host = %self.host, count = models.len(), "Loaded model listing");
                let selected = select_model(&models, requested);
                self.models = models;
                match selected {
                    Some(model) => {
                        self.conversation.set_model(model.clone());
                        remember_model(&model);
                    }
                    None => self.add_notice(Message::app_error(format!(
                        "The server at {} has no models installed. Pull one with `ollama pull <model>`.",
                        self.host
                    ))),
                }
            }
            Err(err) => {
                warn!(host = %self.host, error = %err, "Model listing failed");
                self.models.clear();
                let body = directory_failure_help(&self.host, &err);
                self.ui.show_error_dialog("Unable to load models", body);
            }
        }
    }

    // ---- streaming lifecycle ----

    pub fn is_streaming(&self) -> bool {
        self.stream.cancel_token.is_some()
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.stream.current_stream_id == stream_id
    }

    /// Start a generation for `text`.
    ///
    /// Returns the parameters for the stream task, or `None` when nothing
    /// should be sent: blank input, an in-flight generation, or no model.
    pub fn submit_prompt(&mut self, text: String) -> Option<StreamParams> {
        if text.trim().is_empty() {
            return None;
        }
        if self.is_streaming() {
            self.set_status("Still answering; press Esc to stop it first");
            return None;
        }
        if self.model().is_empty() {
            self.set_status("No model selected (Ctrl+P to pick one)");
            return None;
        }

        if let Err(err) = self.conversation.append_user_turn(text.clone()) {
            self.set_status(format!("Cannot send: {err}"));
            return None;
        }
        if let Some(last) = self.conversation.session().transcript.last() {
            if let Err(err) = self.logging.log_entry(last) {
                self.set_status(format!("Log error: {err}"));
            }
        }
        if let Err(err) = self.conversation.begin_assistant_turn() {
            self.set_status(format!("Cannot send: {err}"));
            return None;
        }

        let request = self.conversation.request_for(text);
        let (cancel_token, stream_id) = self.start_new_stream();
        self.ui.auto_scroll = true;
        self.ui.invalidate_lines();

        Some(StreamParams {
            client: self.client.clone(),
            host: self.host.clone(),
            request,
            cancel_token,
            stream_id,
        })
    }

    pub fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        if let Some(token) = self.stream.cancel_token.take() {
            token.cancel();
        }
        self.stream.current_stream_id += 1;

        let token = CancellationToken::new();
        self.stream.cancel_token = Some(token.clone());
        self.ui.begin_streaming();

        (token, self.stream.current_stream_id)
    }

    /// Stop the in-flight generation. Returns false when nothing was running.
    ///
    /// The open turn is closed immediately, so events the stream task sends
    /// afterwards are ignored.
    pub fn cancel_current_stream(&mut self) -> bool {
        let Some(token) = self.stream.cancel_token.take() else {
            return false;
        };
        token.cancel();
        self.conversation.abort_turn();
        self.ui.end_streaming();
        self.ui.invalidate_lines();
        self.set_status("Response stopped");
        debug!(stream_id = self.stream.current_stream_id, "Generation cancelled by user");
        true
    }

    /// Apply one message from the stream task.
    ///
    /// Messages from superseded streams, or arriving after the stream reached
    /// its first terminal outcome, leave the session untouched.
    pub fn handle_stream_message(&mut self, message: StreamMessage, stream_id: u64) {
        if !self.is_current_stream(stream_id) || !self.is_streaming() {
            return;
        }

        match message {
            StreamMessage::Token(event) => self.apply_token(event),
            StreamMessage::Failed(err) => {
                warn!(stream_id, error = %err, "Generation failed");
                self.finish_stream();
                self.conversation.abort_turn();
                self.add_notice(Message::app_error(format!("Error: {err}")));
            }
            StreamMessage::Cancelled => {
                debug!(stream_id, "Generation cancelled");
                self.finish_stream();
                self.conversation.abort_turn();
                self.ui.invalidate_lines();
            }
        }
    }

    fn apply_token(&mut self, event: TokenEvent) {
        if let Err(err) = self.conversation.apply_token(&event) {
            warn!(error = %err, "Dropping token without an open turn");
            self.finish_stream();
            return;
        }
        self.ui.invalidate_lines();

        if event.is_final {
            self.finish_stream();
            match self.conversation.finalize_turn(event.continuation) {
                Ok(text) => {
                    if let Err(err) = self.logging.log_entry(&Message::assistant(text)) {
                        self.set_status(format!("Log error: {err}"));
                    }
                }
                Err(err) => warn!(error = %err, "Final token without an open turn"),
            }
        }
    }

    fn finish_stream(&mut self) {
        self.stream.cancel_token = None;
        self.ui.end_streaming();
    }
}

fn merge_notices<'a>(transcript: &'a [Message], notices: &'a [Notice]) -> Vec<&'a Message> {
    let mut merged = Vec::with_capacity(transcript.len() + notices.len());
    let mut pending = notices.iter().peekable();
    for (index, message) in transcript.iter().enumerate() {
        while let Some(notice) = pending.next_if(|notice| notice.anchor <= index) {
            merged.push(&notice.message);
        }
        merged.push(message);
    }
    merged.extend(pending.map(|notice| &notice.message));
    merged
}

/// Persist the model choice so the next start prefers it.
pub(crate) fn remember_model(model: &str) {
    let model = model.to_string();
    let result = Config::mutate(move |config| {
        if config.last_model.as_deref() != Some(model.as_str()) {
            config.last_model = Some(model);
        }
        Ok(())
    });
    if let Err(err) = result {
        warn!(error = %err, "Could not remember the selected model");
    }
}
