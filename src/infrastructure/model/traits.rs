use super::types::{BackendError, BackendReply, BackendRequest};
use async_trait::async_trait;

/// Generative-model collaborator.
///
/// Takes the conversation so far plus the tool declarations and answers with
/// either final text or a set of requested tool invocations. The orchestrator
/// never assumes a vendor wire format beyond this contract.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, request: BackendRequest<'_>) -> Result<BackendReply, BackendError>;
}
