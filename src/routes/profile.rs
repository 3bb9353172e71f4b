use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use crate::domain::{ProfileUpdate, User, UserId};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::Profile;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(show_profile).patch(update_profile))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(show_user))
}

async fn show_profile(State(state): State<AppState>) -> AppResult<Json<Profile>> {
    let store = state.store.lock().await;
    Ok(Json(store.profile()?))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<User>> {
    let mut store = state.store.lock().await;
    let user = store.update_profile(update)?;
    Ok(Json(user.clone()))
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.store.lock().await.users().to_vec())
}

async fn show_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<User>> {
    let store = state.store.lock().await;
    store
        .user(&UserId::new(id))
        .cloned()
        .map(Json)
        .ok_or(AppError::NotFound)
}
