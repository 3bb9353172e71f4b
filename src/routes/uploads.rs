use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;
use crate::uploads::serve_path;

#[derive(Serialize)]
pub struct PreviewResponse {
    pub url: String,
    pub path: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/uploads/preview",
            post(set_preview).delete(discard_preview),
        )
        .route("/uploads/{id}", get(serve))
}

/// Read an uploaded image field. The declared content type wins; otherwise
/// it is guessed from the file name.
pub async fn read_image(field: Field<'_>) -> AppResult<(String, Bytes)> {
    let content_type = match field.content_type() {
        Some(ct) if ct != "application/octet-stream" => ct.to_string(),
        _ => field
            .file_name()
            .map(|name| mime_guess::from_path(name).first_or_octet_stream().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    };
    let data = field.bytes().await?;
    Ok((content_type, data))
}

async fn set_preview(
    State(state): State<AppState>,
    _user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<PreviewResponse>> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            image = Some(read_image(field).await?);
        }
    }
    let (content_type, data) =
        image.ok_or_else(|| AppError::BadRequest("An image is required".into()))?;

    let mut guard = state.media.lock().await;
    let media = &mut *guard;
    let url = media
        .preview
        .replace(&mut media.registry, &content_type, data)?
        .to_string();

    Ok(Json(PreviewResponse {
        path: serve_path(&url),
        url,
    }))
}

async fn discard_preview(State(state): State<AppState>) -> StatusCode {
    let mut guard = state.media.lock().await;
    let media = &mut *guard;
    let Some(url) = media.preview.current().map(str::to_string) else {
        return StatusCode::NOT_FOUND;
    };
    media.preview.discard(&mut media.registry);
    tracing::debug!(url = %url, live = media.registry.len(), "Discarded preview");
    StatusCode::NO_CONTENT
}

async fn serve(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let media = state.media.lock().await;
    match media.registry.get(&id) {
        Some(blob) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, blob.content_type.clone()),
                (header::CACHE_CONTROL, "private, no-store".to_string()),
            ],
            blob.data.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
