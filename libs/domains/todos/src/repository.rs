use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TodoResult;
use crate::models::TodoItem;

/// Primary store trait for todo items.
///
/// This trait defines the data access interface for items.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a new item
    async fn insert(&self, item: &TodoItem) -> TodoResult<()>;

    /// Get an item by ID
    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<TodoItem>>;

    /// List all items in store order
    async fn list(&self) -> TodoResult<Vec<TodoItem>>;

    /// Replace an existing item (full record)
    async fn replace(&self, item: &TodoItem) -> TodoResult<()>;

    /// Delete an item by ID. Returns false when the id was absent;
    /// a missing record is not an error here.
    async fn delete(&self, id: Uuid) -> TodoResult<bool>;
}
