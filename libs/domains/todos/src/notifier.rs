use async_trait::async_trait;

use crate::error::TodoResult;

/// Outbound notification trait.
///
/// A send is synchronous from the caller's point of view and is never
/// retried; callers own the policy for what a failed send means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message to a single contact
    async fn send(&self, contact: &str, message: &str) -> TodoResult<()>;
}
