use crate::api::{ModelInfo, ModelsResponse};
use crate::core::app::{App, AppInit};
use crate::core::chat_stream::{StreamMessage, TokenEvent};
use crate::core::store::SessionStore;

pub fn create_test_app() -> App {
    create_test_app_with_store(SessionStore::in_memory())
}

pub fn create_test_app_with_store(store: SessionStore) -> App {
    let mut app = App::new(AppInit {
        client: reqwest::Client::new(),
        host: "http://127.0.0.1:11434".to_string(),
        store,
        markdown_enabled: true,
        log_file: None,
    })
    .expect("test app");
    app.apply_model_listing(Ok(create_test_listing(&["test-model", "other-model"])), Some("test-model"));
    app
}

pub fn create_test_listing(names: &[&str]) -> ModelsResponse {
    ModelsResponse {
        models: names
            .iter()
            .map(|name| ModelInfo {
                name: name.to_string(),
                size: None,
                modified_at: None,
            })
            .collect(),
    }
}

pub fn token(text: &str) -> StreamMessage {
    StreamMessage::Token(TokenEvent {
        text: text.to_string(),
        is_final: false,
        continuation: None,
    })
}

pub fn final_token(text: &str, context: serde_json::Value) -> StreamMessage {
    StreamMessage::Token(TokenEvent {
        text: text.to_string(),
        is_final: true,
        continuation: Some(crate::api::ContinuationToken::new(context)),
    })
}
