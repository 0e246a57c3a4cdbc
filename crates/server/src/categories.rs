//! Categories API endpoints

use api_types::{
    Status,
    category::{CategoryBody, CategoryList, CategoryNew, CategoryPatch, CategoryType, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{Category, CategoryKind};
use uuid::Uuid;

use crate::{AuthUser, ServerError, server::ServerState};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        user_id: category.user_id,
        name: category.name,
        kind: match category.kind {
            CategoryKind::Income => CategoryType::Income,
            CategoryKind::Expense => CategoryType::Expense,
        },
        is_system: category.is_system,
        created_at: category.created_at,
        updated_at: category.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryList>, ServerError> {
    let categories = state.engine.list_categories(user.user_id).await?;
    Ok(Json(CategoryList {
        categories: categories.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<CategoryNew>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryBody>), ServerError> {
    let Json(payload) = payload?;
    let kind = match payload.kind {
        CategoryType::Income => CategoryKind::Income,
        CategoryType::Expense => CategoryKind::Expense,
    };
    let category = state
        .engine
        .create_category(user.user_id, &payload.name, kind)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CategoryBody {
            category: view(category),
        }),
    ))
}

/// Handle requests for renaming one of the caller's categories
pub async fn patch(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> Result<Json<CategoryBody>, ServerError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let Some(name) = payload.name.filter(|name| !name.is_empty()) else {
        return Err(ServerError::bad_request("nothing to update"));
    };

    let category = state
        .engine
        .rename_category(user.user_id, id, &name)
        .await?;
    Ok(Json(CategoryBody {
        category: view(category),
    }))
}

/// Handle requests for deleting a category; its transactions move to "Other"
pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Status>, ServerError> {
    let Path(id) = id?;
    state.engine.delete_category(user.user_id, id).await?;
    Ok(Json(Status::ok()))
}
