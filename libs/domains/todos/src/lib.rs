//! Todos Domain
//!
//! This module provides a complete domain implementation for managing to-do
//! items. MongoDB is the primary store, an Elasticsearch-compatible index
//! mirrors a `{title, body}` projection of each item for full-text search,
//! and subscribers are notified by SMS when an item's completion state
//! changes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Lifecycle orchestration, rollback policy
//! └──────┬──────┘
//!        │
//! ┌──────▼─────────────────────────────┐
//! │ TodoStore │ SearchIndex │ Notifier │  ← Collaborator traits
//! │ (MongoDB) │ (Elastic)   │ (Twilio) │
//! └──────┬─────────────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_todos::{
//!     elastic::ElasticIndex,
//!     handlers,
//!     mongodb::MongoTodoStore,
//!     service::TodoService,
//!     twilio::TwilioNotifier,
//! };
//! use core_config::{search::SearchConfig, twilio::TwilioConfig, FromEnv};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! let store = MongoTodoStore::new(db);
//! let index = ElasticIndex::new(SearchConfig::from_env()?)?;
//! let notifier = TwilioNotifier::new(TwilioConfig::from_env()?)?;
//! let service = TodoService::new(store, index, notifier);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod elastic;
pub mod error;
pub mod handlers;
pub mod index;
pub mod models;
pub mod mongodb;
pub mod notifier;
pub mod phone;
pub mod repository;
pub mod service;
pub mod twilio;

// Re-export commonly used types
pub use elastic::ElasticIndex;
pub use error::{TodoError, TodoResult};
pub use handlers::ApiDoc;
pub use index::{IndexDoc, SearchIndex};
pub use models::{CreateTodo, DoneState, SubscribeRequest, TodoItem, UpdateTodo};
pub use mongodb::MongoTodoStore;
pub use notifier::Notifier;
pub use phone::normalize_phone_number;
pub use repository::TodoStore;
pub use service::TodoService;
pub use twilio::TwilioNotifier;
