//! Failures of resource requests and their reduction to a display message

use serde::Deserialize;
use thiserror::Error;

/// No usable response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// A response arrived with a non-success status.
    #[error("{}", server_text(.status, .message))]
    Server { status: u16, message: Option<String> },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A success response whose body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

fn server_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => m.clone(),
        _ => transport_text(*status),
    }
}

fn transport_text(status: u16) -> String {
    format!("Request failed with status code {status}")
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Builds a server error from a failed response body, picking up the
    /// `{"error": {"message": ...}}` envelope when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|env| env.error)
            .and_then(|err| err.message)
            .filter(|m| !m.is_empty());
        ApiError::Server { status, message }
    }

    /// Message shown to the user: the server's message, else the
    /// transport-level message, else `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        let server = match self {
            ApiError::Server {
                message: Some(m), ..
            } if !m.is_empty() => Some(m.clone()),
            _ => None,
        };
        let transport = match self {
            ApiError::Server { status, .. } => Some(transport_text(*status)),
            ApiError::Transport(e) => Some(e.to_string()),
            ApiError::Decode(_) => Some(self.to_string()),
        }
        .filter(|m| !m.trim().is_empty());

        server
            .or(transport)
            .unwrap_or_else(|| fallback.to_string())
    }
}
