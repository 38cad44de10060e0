use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TodoResult;
use crate::index::SearchIndex;
use crate::models::{
    CreateTodo, CreatedTodoResponse, RemoveParams, SubscribeRequest, SubscribeResponse,
    TodoResponse, UpdateTodo,
};
use crate::notifier::Notifier;
use crate::repository::TodoStore;
use crate::service::TodoService;

/// OpenAPI documentation for the Todos API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_todos,
        create_todo,
        get_todo,
        update_todo,
        remove_todo,
        subscribe,
        search_todos,
    ),
    components(
        schemas(
            CreateTodo,
            UpdateTodo,
            SubscribeRequest,
            TodoResponse,
            CreatedTodoResponse,
            SubscribeResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Todos", description = "Todo item endpoints (MongoDB + search)")
    )
)]
pub struct ApiDoc;

/// Create the todos router with all HTTP endpoints
pub fn router<R, S, N>(service: TodoService<R, S, N>) -> Router
where
    R: TodoStore + 'static,
    S: SearchIndex + 'static,
    N: Notifier + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route(
            "/{id}",
            get(get_todo).put(update_todo).delete(remove_todo),
        )
        .route("/{id}/subscribe", post(subscribe))
        .route("/search/{query}", get(search_todos))
        .with_state(shared_service)
}

/// List all todo items
#[utoipa::path(
    get,
    path = "",
    tag = "Todos",
    responses(
        (status = 200, description = "List of todo items", body = Vec<TodoResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_todos<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
) -> TodoResult<Json<Vec<TodoResponse>>>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let items = service.list_todos().await?;
    Ok(Json(items.into_iter().map(TodoResponse::from).collect()))
}

/// Create a new todo item.
///
/// The response is the only place the modification token is ever returned;
/// the caller must keep it to update or remove the item later.
#[utoipa::path(
    post,
    path = "",
    tag = "Todos",
    request_body = CreateTodo,
    responses(
        (status = 201, description = "Todo item created successfully", body = CreatedTodoResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_todo<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    ValidatedJson(input): ValidatedJson<CreateTodo>,
) -> TodoResult<impl IntoResponse>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let item = service.create_todo(input).await?;
    Ok((StatusCode::CREATED, Json(CreatedTodoResponse::from(item))))
}

/// Get a todo item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Todos",
    params(
        ("id" = Uuid, Path, description = "Todo item ID")
    ),
    responses(
        (status = 200, description = "Todo item found", body = TodoResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_todo<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    UuidPath(id): UuidPath,
) -> TodoResult<Json<TodoResponse>>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let item = service.get_todo(id).await?;
    Ok(Json(TodoResponse::from(item)))
}

/// Update a todo item. Requires the modification token in the body.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Todos",
    params(
        ("id" = Uuid, Path, description = "Todo item ID")
    ),
    request_body = UpdateTodo,
    responses(
        (status = 200, description = "Todo item updated successfully", body = TodoResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_todo<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateTodo>,
) -> TodoResult<Json<TodoResponse>>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let item = service.update_todo(id, input).await?;
    Ok(Json(TodoResponse::from(item)))
}

/// Remove a todo item. Requires the modification token as a query parameter.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Todos",
    params(
        ("id" = Uuid, Path, description = "Todo item ID"),
        RemoveParams
    ),
    responses(
        (status = 204, description = "Todo item removed successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_todo<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    UuidPath(id): UuidPath,
    Query(params): Query<RemoveParams>,
) -> TodoResult<impl IntoResponse>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    service.remove_todo(id, &params.modification_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Subscribe a phone number to completion-state changes of an item
#[utoipa::path(
    post,
    path = "/{id}/subscribe",
    tag = "Todos",
    params(
        ("id" = Uuid, Path, description = "Todo item ID")
    ),
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscription confirmed", body = SubscribeResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn subscribe<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SubscribeRequest>,
) -> TodoResult<Json<SubscribeResponse>>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let message = service.subscribe(id, &input.phone).await?;
    Ok(Json(SubscribeResponse { message }))
}

/// Full-text search over titles and bodies
#[utoipa::path(
    get,
    path = "/search/{query}",
    tag = "Todos",
    params(
        ("query" = String, Path, description = "Free-text search query")
    ),
    responses(
        (status = 200, description = "Matching todo items", body = Vec<TodoResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_todos<R, S, N>(
    State(service): State<Arc<TodoService<R, S, N>>>,
    Path(query): Path<String>,
) -> TodoResult<Json<Vec<TodoResponse>>>
where
    R: TodoStore,
    S: SearchIndex,
    N: Notifier,
{
    let items = service.search_todos(&query).await?;
    Ok(Json(items.into_iter().map(TodoResponse::from).collect()))
}
