//! MongoDB implementation of TodoStore

use async_trait::async_trait;
use mongodb::{
    Collection, Database,
    bson::{Bson, doc, to_bson},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::TodoResult;
use crate::models::TodoItem;
use crate::repository::TodoStore;

/// MongoDB implementation of the TodoStore
pub struct MongoTodoStore {
    collection: Collection<TodoItem>,
}

impl MongoTodoStore {
    /// Create a new MongoTodoStore
    ///
    /// # Arguments
    /// * `db` - MongoDB database instance
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let db = client.database("mydb");
    /// let store = MongoTodoStore::new(db);
    /// ```
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<TodoItem>("todo-items");
        Self { collection }
    }

    /// Create a new MongoTodoStore with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<TodoItem>(collection_name);
        Self { collection }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<TodoItem> {
        &self.collection
    }

    fn id_filter(id: Uuid) -> mongodb::bson::Document {
        doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) }
    }
}

#[async_trait]
impl TodoStore for MongoTodoStore {
    #[instrument(skip(self, item), fields(todo_id = %item.id))]
    async fn insert(&self, item: &TodoItem) -> TodoResult<()> {
        self.collection.insert_one(item).await?;

        tracing::info!("Todo item inserted successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> TodoResult<Option<TodoItem>> {
        let item = self.collection.find_one(Self::id_filter(id)).await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> TodoResult<Vec<TodoItem>> {
        use futures_util::TryStreamExt;

        let cursor = self.collection.find(doc! {}).await?;
        let items: Vec<TodoItem> = cursor.try_collect().await?;

        Ok(items)
    }

    #[instrument(skip(self, item), fields(todo_id = %item.id))]
    async fn replace(&self, item: &TodoItem) -> TodoResult<()> {
        self.collection
            .replace_one(Self::id_filter(item.id), item)
            .await?;

        tracing::info!("Todo item replaced successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TodoResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!(todo_id = %id, "Todo item deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}
