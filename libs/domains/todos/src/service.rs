//! Todo Service - lifecycle orchestration layer.
//!
//! The service sequences the store, the search index, and the notifier, and
//! owns every success/failure policy:
//!
//! - create: store write then index write; an index failure rolls the store
//!   write back (an unsearchable item is unusable, no orphan may remain)
//! - update/remove: the store write is authoritative; index maintenance is
//!   best-effort and never rolls a committed write back
//! - notifications: fanned out concurrently after persistence, each failure
//!   suppressed individually
//! - subscribe: the confirmation SMS must succeed before the subscription
//!   is recorded

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TodoError, TodoResult};
use crate::index::{IndexDoc, SearchIndex};
use crate::models::{CreateTodo, TodoItem, UpdateTodo};
use crate::notifier::Notifier;
use crate::phone::normalize_phone_number;
use crate::repository::TodoStore;

/// Todo service orchestrating the store, search index, and notifier
pub struct TodoService<R: TodoStore, S: SearchIndex, N: Notifier> {
    store: Arc<R>,
    index: Arc<S>,
    notifier: Arc<N>,
}

impl<R: TodoStore, S: SearchIndex, N: Notifier> TodoService<R, S, N> {
    /// Create a new TodoService with the given collaborators
    pub fn new(store: R, index: S, notifier: N) -> Self {
        Self {
            store: Arc::new(store),
            index: Arc::new(index),
            notifier: Arc::new(notifier),
        }
    }

    /// Create a new todo item.
    ///
    /// The item is inserted into the store first, then mirrored into the
    /// search index. If indexing fails the store write is rolled back and
    /// the indexing error is surfaced.
    #[instrument(skip(self, input), fields(todo_title = %input.title))]
    pub async fn create_todo(&self, input: CreateTodo) -> TodoResult<TodoItem> {
        input
            .validate()
            .map_err(|e| TodoError::Validation(e.to_string()))?;

        let item = TodoItem::new(input);
        self.store.insert(&item).await?;

        if let Err(e) = self.index.put(item.id, &IndexDoc::from(&item)).await {
            tracing::error!(todo_id = %item.id, "Indexing failed after store write, rolling back: {}", e);
            if let Err(rollback_err) = self.store.delete(item.id).await {
                tracing::error!(todo_id = %item.id, "Rollback delete failed: {}", rollback_err);
            }
            return Err(e);
        }

        Ok(item)
    }

    /// Get a todo item by ID
    #[instrument(skip(self))]
    pub async fn get_todo(&self, id: Uuid) -> TodoResult<TodoItem> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))
    }

    /// List all todo items in store order
    #[instrument(skip(self))]
    pub async fn list_todos(&self) -> TodoResult<Vec<TodoItem>> {
        self.store.list().await
    }

    /// Update an existing todo item.
    ///
    /// Requires the modification token. The store write is authoritative;
    /// refreshing the index is best-effort. Subscribers are notified after
    /// persistence when the textual done flag parsed to a modifier.
    #[instrument(skip(self, input))]
    pub async fn update_todo(&self, id: Uuid, input: UpdateTodo) -> TodoResult<TodoItem> {
        let mut item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        if item.modification_token != input.modification_token {
            return Err(TodoError::Unauthorized);
        }

        let done_state = item.apply_update(&input);
        self.store.replace(&item).await?;

        if let Err(e) = self.index.put(item.id, &IndexDoc::from(&item)).await {
            tracing::warn!(todo_id = %item.id, "Failed to refresh search index after update: {}", e);
        }

        if let Some(state_word) = done_state.message() {
            self.notify_subscribers(&item, state_word).await;
        }

        Ok(item)
    }

    /// Remove a todo item.
    ///
    /// Requires the modification token. A leftover index entry is harmless
    /// because search rehydrates from the store, so an index delete failure
    /// is only logged.
    #[instrument(skip(self, token))]
    pub async fn remove_todo(&self, id: Uuid, token: &str) -> TodoResult<()> {
        let item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        if item.modification_token != token {
            return Err(TodoError::Unauthorized);
        }

        self.store.delete(id).await?;

        if let Err(e) = self.index.delete(id).await {
            tracing::warn!(todo_id = %id, "Failed to remove search index entry: {}", e);
        }

        Ok(())
    }

    /// Subscribe a contact to completion-state changes of an item.
    ///
    /// The confirmation SMS is sent before the subscription is recorded; a
    /// failed send leaves the item untouched. Subscribing an already
    /// subscribed contact is an idempotent no-op.
    #[instrument(skip(self, phone))]
    pub async fn subscribe(&self, id: Uuid, phone: &str) -> TodoResult<String> {
        let mut item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TodoError::NotFound(id))?;

        let contact = normalize_phone_number(phone);
        let message = format!(
            "You have subscribed to the changes of task \"{}\".",
            item.title
        );

        if item.has_subscriber(&contact) {
            tracing::debug!(todo_id = %id, "Contact already subscribed");
            return Ok(message);
        }

        self.notifier.send(&contact, &message).await?;

        item.add_subscriber(contact);
        self.store.replace(&item).await?;

        Ok(message)
    }

    /// Full-text search, rehydrated from the store.
    ///
    /// Ids returned by the index that have no store record are stale and
    /// silently skipped; the index relevance order is otherwise preserved.
    #[instrument(skip(self))]
    pub async fn search_todos(&self, query: &str) -> TodoResult<Vec<TodoItem>> {
        let ids = self.index.query(query).await?;

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            match self.store.get_by_id(id).await? {
                Some(item) => items.push(item),
                None => tracing::debug!(todo_id = %id, "Skipping stale search hit"),
            }
        }

        Ok(items)
    }

    /// Fan out the state-change message to every subscriber concurrently.
    /// Each failed send is logged and suppressed; one failing contact never
    /// blocks the others.
    async fn notify_subscribers(&self, item: &TodoItem, state_word: &str) {
        let message = format!("\"{}\" task has been marked as {}.", item.title, state_word);

        let sends = item.subscribers.iter().map(|contact| {
            let notifier = Arc::clone(&self.notifier);
            let message = message.clone();
            let contact = contact.clone();
            async move {
                if let Err(e) = notifier.send(&contact, &message).await {
                    tracing::warn!(contact = %contact, "Failed to notify subscriber: {}", e);
                }
            }
        });

        futures::future::join_all(sends).await;
    }
}

impl<R: TodoStore, S: SearchIndex, N: Notifier> Clone for TodoService<R, S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MockSearchIndex;
    use crate::notifier::MockNotifier;
    use crate::repository::MockTodoStore;
    use mockall::predicate::eq;

    fn sample_item(title: &str) -> TodoItem {
        let mut item = TodoItem::new(CreateTodo {
            title: title.to_string(),
            body: Some("body text".to_string()),
        });
        item.modification_token = "valid-token-1234".to_string();
        item
    }

    fn service(
        store: MockTodoStore,
        index: MockSearchIndex,
        notifier: MockNotifier,
    ) -> TodoService<MockTodoStore, MockSearchIndex, MockNotifier> {
        TodoService::new(store, index, notifier)
    }

    #[tokio::test]
    async fn test_create_todo_success() {
        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        let notifier = MockNotifier::new();

        store.expect_insert().times(1).returning(|_| Ok(()));
        index
            .expect_put()
            .times(1)
            .withf(|_, doc| doc.title == "Buy milk" && doc.body.as_deref() == Some("the body"))
            .returning(|_, _| Ok(()));

        let service = service(store, index, notifier);
        let item = service
            .create_todo(CreateTodo {
                title: "Buy milk".to_string(),
                body: Some("the body".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(item.title, "Buy milk");
        assert_eq!(item.body.as_deref(), Some("the body"));
        assert!(!item.done);
        assert!(item.subscribers.is_empty());
        assert_eq!(item.modification_token.len(), 32);
    }

    #[tokio::test]
    async fn test_create_todo_empty_title_fails_without_store_write() {
        // No expectations set: any store or index call would panic
        let service = service(
            MockTodoStore::new(),
            MockSearchIndex::new(),
            MockNotifier::new(),
        );

        let result = service
            .create_todo(CreateTodo {
                title: String::new(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(TodoError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_todo_rolls_back_store_on_index_failure() {
        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();

        store.expect_insert().times(1).returning(|_| Ok(()));
        index
            .expect_put()
            .times(1)
            .returning(|_, _| Err(TodoError::Indexing("index down".to_string())));
        // The compensation delete must target the freshly inserted id
        store.expect_delete().times(1).returning(|_| Ok(true));

        let service = service(store, index, MockNotifier::new());
        let result = service
            .create_todo(CreateTodo {
                title: "Buy milk".to_string(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(TodoError::Indexing(_))));
    }

    #[tokio::test]
    async fn test_get_todo_not_found() {
        let mut store = MockTodoStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));

        let service = service(store, MockSearchIndex::new(), MockNotifier::new());
        let id = Uuid::now_v7();
        let result = service.get_todo(id).await;

        assert!(matches!(result, Err(TodoError::NotFound(e)) if e == id));
    }

    #[tokio::test]
    async fn test_update_todo_wrong_token_unauthorized() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        store
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(item.clone())));
        // No replace expectation: the record must stay untouched

        let service = service(store, MockSearchIndex::new(), MockNotifier::new());
        let result = service
            .update_todo(
                id,
                UpdateTodo {
                    modification_token: "wrong-token".to_string(),
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(TodoError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_todo_unrecognized_done_is_silent_noop() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        store.expect_replace().times(1).returning(|_| Ok(()));
        index.expect_put().times(1).returning(|_, _| Ok(()));
        // No notifier expectation: an unrecognized flag must not notify

        let service = service(store, index, MockNotifier::new());
        let updated = service
            .update_todo(
                id,
                UpdateTodo {
                    modification_token: "valid-token-1234".to_string(),
                    done: Some("maybe".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.done);
    }

    #[tokio::test]
    async fn test_update_todo_index_failure_does_not_roll_back() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        store.expect_replace().times(1).returning(|_| Ok(()));
        index
            .expect_put()
            .times(1)
            .returning(|_, _| Err(TodoError::Indexing("index down".to_string())));
        // No store.delete expectation: the committed write stays

        let service = service(store, index, MockNotifier::new());
        let result = service
            .update_todo(
                id,
                UpdateTodo {
                    modification_token: "valid-token-1234".to_string(),
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(result.unwrap().title, "Renamed");
    }

    #[tokio::test]
    async fn test_done_transition_notifies_each_subscriber_once() {
        let mut item = sample_item("Ship release");
        item.add_subscriber("+16505550001".to_string());
        item.add_subscriber("+16505550002".to_string());
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        let mut notifier = MockNotifier::new();

        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        store.expect_replace().times(1).returning(|_| Ok(()));
        index.expect_put().times(1).returning(|_, _| Ok(()));

        let expected = "\"Ship release\" task has been marked as done.";
        notifier
            .expect_send()
            .withf(move |contact, message| contact == "+16505550001" && message == expected)
            .times(1)
            .returning(|_, _| Err(TodoError::Delivery("number unreachable".to_string())));
        notifier
            .expect_send()
            .withf(move |contact, message| contact == "+16505550002" && message == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(store, index, notifier);
        // One failing subscriber must not block the other or the update
        let updated = service
            .update_todo(
                id,
                UpdateTodo {
                    modification_token: "valid-token-1234".to_string(),
                    done: Some("true".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.done);
    }

    #[tokio::test]
    async fn test_not_done_transition_uses_not_done_wording() {
        let mut item = sample_item("Ship release");
        item.done = true;
        item.add_subscriber("+16505550001".to_string());
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        let mut notifier = MockNotifier::new();

        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        store.expect_replace().times(1).returning(|_| Ok(()));
        index.expect_put().times(1).returning(|_, _| Ok(()));
        notifier
            .expect_send()
            .withf(|_, message| message == "\"Ship release\" task has been marked as not done.")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(store, index, notifier);
        let updated = service
            .update_todo(
                id,
                UpdateTodo {
                    modification_token: "valid-token-1234".to_string(),
                    done: Some("false".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.done);
    }

    #[tokio::test]
    async fn test_remove_todo_missing_id_not_found() {
        let mut store = MockTodoStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        // No index.delete expectation: nothing may touch the index

        let service = service(store, MockSearchIndex::new(), MockNotifier::new());
        let result = service.remove_todo(Uuid::now_v7(), "any-token").await;

        assert!(matches!(result, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_todo_index_delete_failure_is_non_fatal() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        store
            .expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(true));
        index
            .expect_delete()
            .times(1)
            .returning(|_| Err(TodoError::Indexing("index down".to_string())));

        let service = service(store, index, MockNotifier::new());
        let result = service.remove_todo(id, "valid-token-1234").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_normalizes_sends_then_records() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut notifier = MockNotifier::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        notifier
            .expect_send()
            .withf(|contact, message| {
                contact == "+16506207470"
                    && message == "You have subscribed to the changes of task \"Task\"."
            })
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_replace()
            .withf(|item| item.has_subscriber("+16506207470"))
            .times(1)
            .returning(|_| Ok(()));

        let service = service(store, MockSearchIndex::new(), notifier);
        let message = service.subscribe(id, "0016506207470").await.unwrap();

        assert_eq!(
            message,
            "You have subscribed to the changes of task \"Task\"."
        );
    }

    #[tokio::test]
    async fn test_subscribe_twice_same_normalized_contact_is_noop() {
        let mut item = sample_item("Task");
        item.add_subscriber("+16506207470".to_string());
        let id = item.id;

        let mut store = MockTodoStore::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        // No send and no replace expectations: the second subscribe is a no-op

        let service = service(store, MockSearchIndex::new(), MockNotifier::new());
        let result = service.subscribe(id, " 16506207470").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_failed_send_is_not_recorded() {
        let item = sample_item("Task");
        let id = item.id;

        let mut store = MockTodoStore::new();
        let mut notifier = MockNotifier::new();
        store
            .expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        notifier
            .expect_send()
            .times(1)
            .returning(|_, _| Err(TodoError::Delivery("gateway down".to_string())));
        // No replace expectation: a failed send must not commit anything

        let service = service(store, MockSearchIndex::new(), notifier);
        let result = service.subscribe(id, "+16506207470").await;

        assert!(matches!(result, Err(TodoError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_search_skips_stale_hits_and_preserves_order() {
        let first = sample_item("First");
        let third = sample_item("Third");
        let stale_id = Uuid::now_v7();
        let first_id = first.id;
        let third_id = third.id;

        let mut store = MockTodoStore::new();
        let mut index = MockSearchIndex::new();

        index
            .expect_query()
            .with(eq("task"))
            .returning(move |_| Ok(vec![first_id, stale_id, third_id]));

        let first_clone = first.clone();
        store
            .expect_get_by_id()
            .with(eq(first_id))
            .returning(move |_| Ok(Some(first_clone.clone())));
        store
            .expect_get_by_id()
            .with(eq(stale_id))
            .returning(|_| Ok(None));
        let third_clone = third.clone();
        store
            .expect_get_by_id()
            .with(eq(third_id))
            .returning(move |_| Ok(Some(third_clone.clone())));

        let service = service(store, index, MockNotifier::new());
        let results = service.search_todos("task").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, first_id);
        assert_eq!(results[1].id, third_id);
    }

    #[tokio::test]
    async fn test_list_todos_passes_through_store_order() {
        let a = sample_item("A");
        let b = sample_item("B");
        let (a_id, b_id) = (a.id, b.id);

        let mut store = MockTodoStore::new();
        store
            .expect_list()
            .returning(move || Ok(vec![a.clone(), b.clone()]));

        let service = service(store, MockSearchIndex::new(), MockNotifier::new());
        let items = service.list_todos().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, a_id);
        assert_eq!(items[1].id, b_id);
    }
}
