use crate::core::config::data::path_display;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Failures talking to the model server.
///
/// Messages are kept as plain strings so the error can be cloned across the
/// stream channel and shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    Request { message: String },
    /// The server answered with a non-success status.
    Status { status: u16, body: String },
    /// A streamed line was not a well-formed response object.
    Malformed { line: String, message: String },
    /// The server reported an error inside the stream.
    Server { message: String },
    /// The body ended before the final response object arrived.
    Disconnected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request { message } => write!(f, "{message}"),
            TransportError::Status { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "request failed with status {status}")
                } else {
                    write!(f, "request failed with status {status}: {body}")
                }
            }
            TransportError::Malformed { line, message } => {
                write!(f, "malformed response line ({message}): {line}")
            }
            TransportError::Server { message } => write!(f, "server error: {message}"),
            TransportError::Disconnected => {
                write!(f, "connection closed before the response was complete")
            }
        }
    }
}

impl StdError for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request {
            message: err.to_string(),
        }
    }
}

/// Terminal outcome of a generation that did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// The user stopped the generation.
    Cancelled,
    Transport(TransportError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Cancelled => write!(f, "generation cancelled"),
            StreamError::Transport(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Cancelled => None,
            StreamError::Transport(err) => Some(err),
        }
    }
}

impl From<TransportError> for StreamError {
    fn from(err: TransportError) -> Self {
        StreamError::Transport(err)
    }
}

/// Errors raised by the session store and its key-value backends.
#[derive(Debug)]
pub enum StoreError {
    /// No session is stored under the name.
    NotFound { name: String },
    /// The stored value is not a well-formed session.
    Corrupt { name: String, message: String },
    /// The name is empty or collides with a reserved configuration key.
    InvalidName { name: String },
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The backing file exists but is not a JSON object of strings.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { name } => write!(f, "No saved chat named '{name}'"),
            StoreError::Corrupt { name, message } => {
                write!(f, "Saved chat '{name}' is corrupt: {message}")
            }
            StoreError::InvalidName { name } => {
                if name.trim().is_empty() {
                    write!(f, "Chat name cannot be empty")
                } else {
                    write!(f, "'{name}' is reserved and cannot be used as a chat name")
                }
            }
            StoreError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path_display(path), source)
            }
            StoreError::Write { path, source } => {
                write!(f, "Failed to write {}: {}", path_display(path), source)
            }
            StoreError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Read { source, .. } | StoreError::Write { source, .. } => Some(source),
            StoreError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_body_when_present() {
        let err = TransportError::Status {
            status: 404,
            body: "model 'nope' not found\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 404: model 'nope' not found"
        );

        let bare = TransportError::Status {
            status: 500,
            body: "  ".to_string(),
        };
        assert_eq!(bare.to_string(), "request failed with status 500");
    }

    #[test]
    fn cancellation_is_distinct_from_transport_failures() {
        let cancelled = StreamError::Cancelled;
        let failed = StreamError::from(TransportError::Disconnected);
        assert_ne!(cancelled, failed);
        assert!(cancelled.source().is_none());
        assert!(failed.source().is_some());
    }

    #[test]
    fn invalid_name_message_distinguishes_empty_and_reserved() {
        let empty = StoreError::InvalidName {
            name: "  ".to_string(),
        };
        let reserved = StoreError::InvalidName {
            name: "host-address".to_string(),
        };
        assert_eq!(empty.to_string(), "Chat name cannot be empty");
        assert!(reserved.to_string().contains("reserved"));
    }
}
