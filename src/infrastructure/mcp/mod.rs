mod client;
mod error;

pub use client::{DEFAULT_REQUEST_TIMEOUT, McpHttpClient, PROTOCOL_VERSION, SESSION_HEADER};
pub use error::McpClientError;
