use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::domain::User;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::state::AppState;
use crate::store::Snapshot;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub profession: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(current_session))
        .route("/api/session/login", post(login))
        .route("/api/session/register", post(register))
        .route("/api/session/logout", post(logout))
        .route("/api/snapshot", get(snapshot))
}

async fn current_session(MaybeUser(user): MaybeUser) -> Json<Option<User>> {
    Json(user)
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    let mut store = state.store.lock().await;
    let user = store.login(&req.email)?;
    Ok(Json(user.clone()))
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let mut store = state.store.lock().await;
    let user = store.register(&req.name, &req.email, &req.profession)?;
    Ok((StatusCode::CREATED, Json(user.clone())).into_response())
}

async fn logout(State(state): State<AppState>) -> StatusCode {
    let mut store = state.store.lock().await;
    if !store.is_logged_in() {
        tracing::debug!("Logout without a session");
    }
    store.logout();
    StatusCode::NO_CONTENT
}

async fn snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.lock().await.snapshot())
}
