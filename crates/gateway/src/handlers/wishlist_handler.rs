//! Wishlist handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{WishlistItem, WishlistItemDraft};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Create-or-edit request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrEditRequest {
    /// Key of the item to edit; absent or blank creates a new item
    #[schema(example = "3f2a7c1e-9d44-4b8e-a3c5-0e8d2f6b1a90")]
    pub id: Option<String>,
    /// Display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Globe")]
    pub name: String,
}

impl From<CreateOrEditRequest> for WishlistItemDraft {
    fn from(request: CreateOrEditRequest) -> Self {
        WishlistItemDraft {
            id: request.id,
            name: request.name,
            deleted: None,
        }
    }
}

/// Key of the saved item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SavedItemResponse {
    pub id: String,
}

/// Create wishlist routes
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items))
        .route("/get/:id", get(get_item))
        .route("/create-or-edit", post(create_or_edit))
        .route("/delete/:id", delete(delete_item))
        .route("/soft-delete/:id", delete(soft_delete_item))
}

/// Unparseable identifiers are treated like the nil identifier.
fn parse_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_default()
}

/// List live wishlist items
#[utoipa::path(
    get,
    path = "/list",
    tag = "Wishlist",
    responses(
        (status = 200, description = "Live wishlist items", body = Vec<WishlistItem>),
        (status = 504, description = "Store did not answer in time")
    )
)]
pub async fn list_items(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
) -> AppResult<Json<Vec<WishlistItem>>> {
    let items = state.items.list(&cancellation).await?;
    Ok(Json(items))
}

/// Get wishlist item by ID
#[utoipa::path(
    get,
    path = "/list/get/{id}",
    tag = "Wishlist",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Wishlist item", body = WishlistItem),
        (status = 404, description = "Item not found or soft deleted")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
    Path(id): Path<String>,
) -> AppResult<Json<WishlistItem>> {
    let item = state.items.get_by_id(parse_id(&id), &cancellation).await?;
    Ok(Json(item))
}

/// Create a new item, or edit an existing one
#[utoipa::path(
    post,
    path = "/list/create-or-edit",
    tag = "Wishlist",
    request_body = CreateOrEditRequest,
    responses(
        (status = 200, description = "Item saved", body = SavedItemResponse),
        (status = 400, description = "Validation error or nothing to change"),
        (status = 404, description = "Edited item not found or soft deleted")
    )
)]
pub async fn create_or_edit(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
    ValidatedJson(payload): ValidatedJson<CreateOrEditRequest>,
) -> AppResult<Json<SavedItemResponse>> {
    let id = state
        .items
        .create_or_edit(payload.into(), &cancellation)
        .await?;
    Ok(Json(SavedItemResponse { id }))
}

/// Permanently delete an item
#[utoipa::path(
    delete,
    path = "/list/delete/{id}",
    tag = "Wishlist",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item removed, including soft-deleted items"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Item changed while deleting")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.items.delete(parse_id(&id), false, &cancellation).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark an item as deleted, keeping the document
#[utoipa::path(
    delete,
    path = "/list/soft-delete/{id}",
    tag = "Wishlist",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item soft deleted"),
        (status = 404, description = "Item not found or already soft deleted")
    )
)]
pub async fn soft_delete_item(
    State(state): State<AppState>,
    Extension(cancellation): Extension<CancellationToken>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.items.delete(parse_id(&id), true, &cancellation).await?;
    Ok(StatusCode::NO_CONTENT)
}
