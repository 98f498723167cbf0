use thiserror::Error;

/// Failures raised while talking to the tool-provider service.
///
/// These are non-fatal per call: `call_tool` converts them to inline error
/// text, and a failed call leaves the session usable for the next one.
#[derive(Debug, Error)]
pub enum McpClientError {
    #[error("request to tool provider failed: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
    },
    #[error("tool provider answered with HTTP status {status}")]
    Status { status: u16 },
    #[error("tool provider returned a malformed body: {reason}")]
    MalformedBody { reason: String },
    #[error("tool provider reported error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl McpClientError {
    pub fn http(source: reqwest::Error) -> Self {
        Self::Http { source }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedBody {
            reason: reason.into(),
        }
    }

    /// User-facing error message in French.
    pub fn user_message(&self) -> String {
        match self {
            McpClientError::Http { source } => {
                if source.is_timeout() {
                    "La requête vers le service data.gouv.fr a dépassé le délai imparti."
                        .to_string()
                } else if source.is_connect() {
                    "Impossible de se connecter au service data.gouv.fr.".to_string()
                } else {
                    "Erreur réseau lors de l'appel au service data.gouv.fr.".to_string()
                }
            }
            McpClientError::Status { status } => {
                format!("Le service data.gouv.fr a répondu avec le statut HTTP {status}.")
            }
            McpClientError::MalformedBody { .. } => {
                "La réponse du service data.gouv.fr est illisible.".to_string()
            }
            McpClientError::Rpc { message, .. } => {
                format!("Le service data.gouv.fr a signalé une erreur : {message}")
            }
        }
    }
}
