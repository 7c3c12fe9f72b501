use serde::{Deserialize, Serialize};

/// Who a transcript entry belongs to.
///
/// Only user and assistant turns are part of a saved session; app messages
/// are shown in the transcript but never persisted or sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TranscriptRole {
    User,
    Assistant,
    AppInfo,
    AppError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: TranscriptRole,
    pub content: String,
}

impl TranscriptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Assistant => "assistant",
            TranscriptRole::AppInfo => "app/info",
            TranscriptRole::AppError => "app/error",
        }
    }

    pub fn is_user(self) -> bool {
        self == TranscriptRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == TranscriptRole::Assistant
    }

    pub fn is_app(self) -> bool {
        matches!(self, TranscriptRole::AppInfo | TranscriptRole::AppError)
    }
}

impl AsRef<str> for TranscriptRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for TranscriptRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(TranscriptRole::User),
            "assistant" => Ok(TranscriptRole::Assistant),
            "app/info" => Ok(TranscriptRole::AppInfo),
            "app/error" => Ok(TranscriptRole::AppError),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for TranscriptRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TranscriptRole> for String {
    fn from(value: TranscriptRole) -> Self {
        value.as_str().to_string()
    }
}

impl Message {
    pub fn new(role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::Assistant, content)
    }

    pub fn app_info(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::AppInfo, content)
    }

    pub fn app_error(content: impl Into<String>) -> Self {
        Self::new(TranscriptRole::AppError, content)
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn is_app(&self) -> bool {
        self.role.is_app()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        for role in [
            TranscriptRole::User,
            TranscriptRole::Assistant,
            TranscriptRole::AppInfo,
            TranscriptRole::AppError,
        ] {
            assert_eq!(TranscriptRole::try_from(role.as_str()), Ok(role));
        }
        assert!(TranscriptRole::try_from("system").is_err());
    }

    #[test]
    fn message_serializes_role_as_string() {
        let json = serde_json::to_string(&Message::user("hi")).expect("serialize");
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let parsed: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"yo"}"#).expect("parse");
        assert!(parsed.is_assistant());
        assert!(serde_json::from_str::<Message>(r#"{"role":"tool","content":""}"#).is_err());
    }
}
