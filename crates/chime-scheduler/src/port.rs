//! Chat-platform boundary. The engine never talks to Discord/Slack/…
//! directly; an adapter implements [`ChatPort`] and is injected into the
//! dispatcher and lifecycle service.

use async_trait::async_trait;
use thiserror::Error;

/// An opaque, resolved send handle (a user's DM inbox or a channel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendTarget {
    Inbox(String),
    Channel(String),
}

#[derive(Debug, Error)]
pub enum PortError {
    /// The user or channel no longer exists / is not reachable.
    #[error("not found: {0}")]
    NotFound(String),

    /// The platform rejected or failed the send.
    #[error("send failed: {0}")]
    Send(String),
}

/// External identity-resolution and send primitives.
///
/// Implementations must be cheap to call concurrently; the engine bounds
/// each delivery attempt with a timeout but never retries within a tick.
#[async_trait]
pub trait ChatPort: Send + Sync {
    async fn resolve_user_inbox(&self, owner_id: &str) -> Result<SendTarget, PortError>;

    async fn resolve_channel(&self, channel_id: &str) -> Result<SendTarget, PortError>;

    async fn send(&self, target: &SendTarget, text: &str) -> Result<(), PortError>;
}
