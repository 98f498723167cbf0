use crate::domain::types::{ConversationTurn, ToolCall};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Backend-facing translation of a [`crate::domain::types::ToolDescriptor`].
/// The parameters document has already been stripped of schema meta-fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One completion request: the growing conversation, the tool declarations,
/// and the system instruction.
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    pub system: &'a str,
    pub turns: &'a [ConversationTurn],
    pub tools: &'a [ToolDeclaration],
}

/// Classified backend response: final text when `tool_calls` is empty,
/// otherwise a set of invocations to execute before continuing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
}

impl BackendReply {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Backend failures. Unlike tool failures these stop the current question:
/// there is no answer text to fall back to.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend '{backend}' requires an API key")]
    MissingApiKey { backend: String },
    #[error("network error calling backend '{backend}': {source}")]
    Network {
        backend: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend '{backend}' returned an unusable response: {reason}")]
    InvalidResponse { backend: String, reason: String },
}

impl BackendError {
    pub fn missing_api_key(backend: impl Into<String>) -> Self {
        Self::MissingApiKey {
            backend: backend.into(),
        }
    }

    pub fn network(backend: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            backend: backend.into(),
            source,
        }
    }

    pub fn invalid_response(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// User-facing error message in French.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::MissingApiKey { backend } => {
                format!("Le modèle '{backend}' nécessite une clé API.")
            }
            BackendError::Network { backend, source } => {
                if source.is_connect() {
                    format!("Impossible de se connecter au modèle '{backend}'.")
                } else if source.is_timeout() {
                    format!("La requête vers le modèle '{backend}' a dépassé le délai imparti.")
                } else if let Some(status) = source.status() {
                    match status {
                        StatusCode::TOO_MANY_REQUESTS => {
                            format!("Le modèle '{backend}' est saturé, réessayez plus tard.")
                        }
                        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                            format!("Le modèle '{backend}' est momentanément indisponible.")
                        }
                        _ => format!(
                            "La requête vers le modèle '{backend}' a échoué : {}",
                            status.as_u16()
                        ),
                    }
                } else {
                    format!("Erreur réseau lors de l'appel au modèle '{backend}'.")
                }
            }
            BackendError::InvalidResponse { backend, .. } => {
                format!("La réponse du modèle '{backend}' est invalide.")
            }
        }
    }
}
