use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::{ContinuationToken, GenerateRequest};
use crate::core::chat_stream::TokenEvent;
use crate::core::message::Message;

/// One conversation: its turns, the server's continuation token, and the
/// settings the conversation runs with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "history", default)]
    pub transcript: Vec<Message>,
    #[serde(rename = "context", default)]
    pub continuation_token: Option<ContinuationToken>,
    #[serde(rename = "system", default)]
    pub system_prompt: String,
    #[serde(default)]
    pub model: String,
}

impl Session {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            ..Self::default()
        }
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|message| message.is_assistant())
            .map(|message| message.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnError {
    /// A token arrived while no assistant turn was open.
    NoOpenTurn,
    /// A new turn was requested before the previous one closed.
    TurnAlreadyOpen,
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::NoOpenTurn => write!(f, "no assistant turn is open"),
            TurnError::TurnAlreadyOpen => write!(f, "an assistant turn is already open"),
        }
    }
}

impl std::error::Error for TurnError {}

#[derive(Debug, Clone)]
struct OpenTurn {
    index: usize,
    buffer: String,
}

/// Turn state machine over a [`Session`].
///
/// The session is idle or has exactly one open assistant turn. Tokens are
/// accumulated into a raw buffer that is mirrored into the transcript entry,
/// so a renderer can be handed the full markup after every token.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    session: Session,
    open_turn: Option<OpenTurn>,
}

impl Conversation {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            open_turn: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the active session. Any open turn is discarded.
    pub fn replace_session(&mut self, session: Session) {
        self.session = session;
        self.open_turn = None;
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.session.model = model.into();
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.session.system_prompt = prompt.into();
    }

    pub fn is_turn_open(&self) -> bool {
        self.open_turn.is_some()
    }

    /// Raw markup accumulated for the open turn.
    pub fn open_turn_text(&self) -> Option<&str> {
        self.open_turn.as_ref().map(|turn| turn.buffer.as_str())
    }

    pub fn append_user_turn(&mut self, text: impl Into<String>) -> Result<(), TurnError> {
        if self.open_turn.is_some() {
            return Err(TurnError::TurnAlreadyOpen);
        }
        self.session.transcript.push(Message::user(text));
        Ok(())
    }

    pub fn begin_assistant_turn(&mut self) -> Result<(), TurnError> {
        if self.open_turn.is_some() {
            return Err(TurnError::TurnAlreadyOpen);
        }
        self.session.transcript.push(Message::assistant(String::new()));
        self.open_turn = Some(OpenTurn {
            index: self.session.transcript.len() - 1,
            buffer: String::new(),
        });
        Ok(())
    }

    /// Append a token's text to the open turn and return the accumulated buffer.
    pub fn apply_token(&mut self, event: &TokenEvent) -> Result<&str, TurnError> {
        let turn = self.open_turn.as_mut().ok_or(TurnError::NoOpenTurn)?;
        turn.buffer.push_str(&event.text);
        if let Some(message) = self.session.transcript.get_mut(turn.index) {
            message.content.push_str(&event.text);
        }
        Ok(turn.buffer.as_str())
    }

    /// Close the open turn and store the new continuation token.
    ///
    /// The token is replaced even when the server sent none.
    pub fn finalize_turn(
        &mut self,
        continuation: Option<ContinuationToken>,
    ) -> Result<String, TurnError> {
        let turn = self.open_turn.take().ok_or(TurnError::NoOpenTurn)?;
        self.session.continuation_token = continuation;
        Ok(turn.buffer)
    }

    /// Close the open turn after a cancellation or failure.
    ///
    /// Partial text stays in the transcript; an empty assistant entry is
    /// removed. The continuation token keeps its previous value.
    pub fn abort_turn(&mut self) -> Option<String> {
        let turn = self.open_turn.take()?;
        if turn.buffer.is_empty() && turn.index + 1 == self.session.transcript.len() {
            self.session.transcript.pop();
        }
        Some(turn.buffer)
    }

    pub fn request_for(&self, prompt: impl Into<String>) -> GenerateRequest {
        GenerateRequest {
            model: self.session.model.clone(),
            prompt: prompt.into(),
            context: self.session.continuation_token.clone(),
            system: self.session.system_prompt.clone(),
        }
    }

    /// Start over with an empty transcript, keeping model and system prompt.
    pub fn reset(&mut self) {
        let model = std::mem::take(&mut self.session.model);
        let system_prompt = std::mem::take(&mut self.session.system_prompt);
        self.replace_session(Session::new(model, system_prompt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(text: &str) -> TokenEvent {
        TokenEvent {
            text: text.to_string(),
            is_final: false,
            continuation: None,
        }
    }

    fn final_token(context: serde_json::Value) -> TokenEvent {
        TokenEvent {
            text: String::new(),
            is_final: true,
            continuation: Some(ContinuationToken::new(context)),
        }
    }

    fn run_turn(conversation: &mut Conversation, prompt: &str, events: &[TokenEvent]) -> String {
        conversation.append_user_turn(prompt).expect("user turn");
        conversation.begin_assistant_turn().expect("assistant turn");
        for event in events {
            conversation.apply_token(event).expect("token");
            if event.is_final {
                return conversation
                    .finalize_turn(event.continuation.clone())
                    .expect("finalize");
            }
        }
        panic!("events had no final token");
    }

    #[test]
    fn completed_turn_stores_token_and_concatenated_text() {
        let mut conversation = Conversation::new(Session::new("llama2", ""));
        let events = [token("Hel"), token("lo"), final_token(json!([1, 2, 3]))];

        let text = run_turn(&mut conversation, "hi", &events);

        assert_eq!(text, "Hello");
        assert_eq!(
            conversation.session().continuation_token,
            Some(ContinuationToken::new(json!([1, 2, 3])))
        );
        assert_eq!(
            conversation.session().transcript,
            vec![Message::user("hi"), Message::assistant("Hello")]
        );
        assert!(!conversation.is_turn_open());
    }

    #[test]
    fn apply_token_returns_accumulated_buffer() {
        let mut conversation = Conversation::default();
        conversation.begin_assistant_turn().expect("open");
        assert_eq!(conversation.apply_token(&token("**bo")).expect("a"), "**bo");
        assert_eq!(conversation.apply_token(&token("ld**")).expect("b"), "**bold**");
        assert_eq!(conversation.open_turn_text(), Some("**bold**"));
    }

    #[test]
    fn tokens_require_an_open_turn() {
        let mut conversation = Conversation::default();
        assert_eq!(
            conversation.apply_token(&token("x")).err(),
            Some(TurnError::NoOpenTurn)
        );
        assert_eq!(
            conversation.finalize_turn(None).err(),
            Some(TurnError::NoOpenTurn)
        );
        assert!(conversation.session().transcript.is_empty());
    }

    #[test]
    fn cannot_open_two_turns() {
        let mut conversation = Conversation::default();
        conversation.begin_assistant_turn().expect("open");
        assert_eq!(
            conversation.begin_assistant_turn(),
            Err(TurnError::TurnAlreadyOpen)
        );
        assert_eq!(
            conversation.append_user_turn("again"),
            Err(TurnError::TurnAlreadyOpen)
        );
    }

    #[test]
    fn abort_keeps_partial_text_and_previous_token() {
        let mut conversation = Conversation::default();
        run_turn(&mut conversation, "one", &[token("a"), final_token(json!([5]))]);

        conversation.append_user_turn("two").expect("user");
        conversation.begin_assistant_turn().expect("open");
        conversation.apply_token(&token("part")).expect("token");
        assert_eq!(conversation.abort_turn(), Some("part".to_string()));

        assert_eq!(
            conversation.session().continuation_token,
            Some(ContinuationToken::new(json!([5])))
        );
        assert_eq!(
            conversation.session().last_assistant_text(),
            Some("part")
        );
        assert_eq!(conversation.abort_turn(), None);
    }

    #[test]
    fn abort_drops_empty_assistant_entry() {
        let mut conversation = Conversation::default();
        conversation.append_user_turn("hello").expect("user");
        conversation.begin_assistant_turn().expect("open");
        conversation.abort_turn();
        assert_eq!(conversation.session().transcript, vec![Message::user("hello")]);
    }

    #[test]
    fn finalize_replaces_token_even_when_absent() {
        let mut conversation = Conversation::default();
        run_turn(&mut conversation, "one", &[final_token(json!([1]))]);
        conversation.begin_assistant_turn().expect("open");
        conversation.finalize_turn(None).expect("finalize");
        assert_eq!(conversation.session().continuation_token, None);
    }

    #[test]
    fn request_snapshots_session_fields() {
        let mut conversation = Conversation::new(Session::new("mistral", "be terse"));
        run_turn(&mut conversation, "one", &[final_token(json!([4, 2]))]);

        let request = conversation.request_for("next");
        assert_eq!(request.model, "mistral");
        assert_eq!(request.prompt, "next");
        assert_eq!(request.system, "be terse");
        assert_eq!(request.context, Some(ContinuationToken::new(json!([4, 2]))));
    }

    #[test]
    fn reset_keeps_model_and_system_prompt() {
        let mut conversation = Conversation::new(Session::new("llama2", "sys"));
        run_turn(&mut conversation, "one", &[final_token(json!([1]))]);
        conversation.reset();
        assert_eq!(conversation.session(), &Session::new("llama2", "sys"));
    }

    #[test]
    fn session_serializes_with_history_context_system_model() {
        let session = Session {
            transcript: vec![Message::user("hi"), Message::assistant("yo")],
            continuation_token: Some(ContinuationToken::new(json!([1, 2]))),
            system_prompt: "sys".to_string(),
            model: "llama2".to_string(),
        };
        let value = serde_json::to_value(&session).expect("serialize");
        assert_eq!(
            value,
            json!({
                "history": [
                    { "role": "user", "content": "hi" },
                    { "role": "assistant", "content": "yo" }
                ],
                "context": [1, 2],
                "system": "sys",
                "model": "llama2"
            })
        );
        let back: Session = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, session);
    }
}
