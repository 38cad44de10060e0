use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::TodoResult;
use crate::models::TodoItem;

/// The derived payload mirrored into the search index.
///
/// Only title and body are searchable; subscribers, the done flag, the
/// modification token, and timestamps are never indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IndexDoc {
    pub title: String,
    pub body: Option<String>,
}

impl From<&TodoItem> for IndexDoc {
    fn from(item: &TodoItem) -> Self {
        Self {
            title: item.title.clone(),
            body: item.body.clone(),
        }
    }
}

/// Search index trait for the full-text mirror of todo items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Write or overwrite the indexed payload for an item
    async fn put(&self, id: Uuid, doc: &IndexDoc) -> TodoResult<()>;

    /// Remove an item's payload from the index
    async fn delete(&self, id: Uuid) -> TodoResult<()>;

    /// Run a full-text query and return matching ids in relevance order.
    /// An index-reported query error means "no matches", never a failure.
    async fn query(&self, query: &str) -> TodoResult<Vec<Uuid>>;
}
