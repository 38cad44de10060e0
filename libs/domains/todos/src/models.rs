use chrono::{DateTime, Utc};
use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Length of the modification token returned by the create endpoint
const MODIFICATION_TOKEN_LEN: usize = 32;

/// Outcome of parsing the textual `done` field of an update request.
///
/// Only `Done` and `NotDone` are modifiers: they alter the item's completion
/// flag and trigger subscriber notifications. Anything unrecognized is a
/// silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneState {
    Done,
    NotDone,
    Unchanged,
}

impl DoneState {
    /// Parse the textual done flag. Case-insensitive "true"/"1" mark the item
    /// done, "false"/"0" mark it not done, everything else (including absent)
    /// leaves it unchanged.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => DoneState::Done,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => DoneState::NotDone,
            _ => DoneState::Unchanged,
        }
    }

    /// Whether this state alters the completion flag
    pub fn is_modifier(&self) -> bool {
        !matches!(self, DoneState::Unchanged)
    }

    /// The completion flag value this state sets, if any
    pub fn target(&self) -> Option<bool> {
        match self {
            DoneState::Done => Some(true),
            DoneState::NotDone => Some(false),
            DoneState::Unchanged => None,
        }
    }

    /// The plain-English fragment used in the notification text
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DoneState::Done => Some("done"),
            DoneState::NotDone => Some("not done"),
            DoneState::Unchanged => None,
        }
    }
}

/// Todo item entity - stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Item title
    pub title: String,
    /// Optional item body
    #[serde(default)]
    pub body: Option<String>,
    /// Completion flag
    pub done: bool,
    /// Deduplicated subscriber contact numbers
    #[serde(default)]
    pub subscribers: Vec<String>,
    /// Secret required to update or remove the item
    pub modification_token: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TodoItem {
    /// Create a new item from the CreateTodo DTO.
    ///
    /// Assigns the id and the modification token; the item starts not done
    /// and with no subscribers.
    pub fn new(input: CreateTodo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            body: input.body,
            done: false,
            subscribers: Vec::new(),
            modification_token: generate_modification_token(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from the UpdateTodo DTO.
    ///
    /// A non-empty title replaces the current one (the title can never be
    /// blanked). A provided body (including the empty string) replaces the
    /// current one. The textual done flag goes through [`DoneState::parse`];
    /// the parse result is returned so the caller can decide whether to
    /// notify subscribers.
    pub fn apply_update(&mut self, update: &UpdateTodo) -> DoneState {
        if let Some(ref title) = update.title {
            if !title.is_empty() {
                self.title = title.clone();
            }
        }
        if update.body.is_some() {
            self.body = update.body.clone();
        }
        let state = DoneState::parse(update.done.as_deref());
        if let Some(target) = state.target() {
            self.done = target;
        }
        self.updated_at = Utc::now();
        state
    }

    /// Whether the contact is already subscribed
    pub fn has_subscriber(&self, contact: &str) -> bool {
        self.subscribers.iter().any(|s| s == contact)
    }

    /// Add a subscriber contact, keeping the list deduplicated
    pub fn add_subscriber(&mut self, contact: String) {
        if !self.has_subscriber(&contact) {
            self.subscribers.push(contact);
        }
    }
}

/// Generate a random alphanumeric modification token
fn generate_modification_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(MODIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// DTO for creating a new todo item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTodo {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub body: Option<String>,
}

/// DTO for updating an existing todo item.
///
/// All fields besides the token are optional; an absent field means
/// "no change". `done` is textual and parsed with [`DoneState::parse`].
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTodo {
    #[serde(default)]
    pub modification_token: String,
    #[validate(length(max = 500))]
    pub title: Option<String>,
    pub body: Option<String>,
    pub done: Option<String>,
}

/// DTO for subscribing to completion-state changes of an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    /// Contact number, normalized before use
    #[validate(length(min = 1))]
    pub phone: String,
}

/// Query parameters authorizing a removal
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct RemoveParams {
    pub modification_token: String,
}

/// Public view of a todo item. Subscribers and the token are never exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub done: bool,
}

impl From<TodoItem> for TodoResponse {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            body: item.body,
            done: item.done,
        }
    }
}

/// Creation response. The only place the modification token ever appears.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedTodoResponse {
    pub id: Uuid,
    pub title: String,
    pub body: Option<String>,
    pub done: bool,
    pub modification_token: String,
}

impl From<TodoItem> for CreatedTodoResponse {
    fn from(item: TodoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            body: item.body,
            done: item.done,
            modification_token: item.modification_token,
        }
    }
}

/// Subscription confirmation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscribeResponse {
    pub message: String,
}
