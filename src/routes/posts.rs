use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, Post, PostId, User};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::routes::uploads::read_image;
use crate::state::AppState;
use crate::store::FeedEntry;
use crate::uploads::serve_path;

// --- Views ---

#[derive(Serialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    pub author: Option<User>,
    pub image_path: Option<String>,
    pub created_at: String,
    pub like_count: usize,
    pub comment_count: usize,
    pub liked_by_me: bool,
}

#[derive(Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct LikeState {
    pub post_id: PostId,
    pub liked: bool,
    pub like_count: usize,
}

impl FeedPost {
    fn new(entry: FeedEntry, now: DateTime<Utc>) -> Self {
        Self {
            image_path: serve_path(&entry.post.image_url),
            created_at: format_relative_time(&entry.post.timestamp, now),
            author: entry.author,
            like_count: entry.like_count,
            comment_count: entry.comment_count,
            liked_by_me: entry.liked_by_me,
            post: entry.post,
        }
    }
}

impl CommentView {
    fn new(comment: Comment, now: DateTime<Utc>) -> Self {
        Self {
            created_at: format_relative_time(&comment.timestamp, now),
            comment,
        }
    }
}

// --- Forms ---

#[derive(Deserialize)]
pub struct CreateCommentForm {
    pub text: String,
}

#[derive(Default)]
struct CreatePostForm {
    title: String,
    description: String,
    image: Option<(String, Bytes)>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/feed", get(feed))
        .route("/api/posts", post(create_post))
        .route("/api/posts/{id}", get(show_post))
        .route("/api/posts/{id}/likes", post(toggle_like))
        .route(
            "/api/posts/{id}/comments",
            get(list_comments).post(create_comment),
        )
}

// --- Handlers ---

async fn feed(State(state): State<AppState>) -> Json<Vec<FeedPost>> {
    let now = Utc::now();
    let entries = state.store.lock().await.feed();
    Json(
        entries
            .into_iter()
            .map(|entry| FeedPost::new(entry, now))
            .collect(),
    )
}

async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<FeedPost>> {
    let id = PostId::new(id);
    let entry = state
        .store
        .lock()
        .await
        .feed()
        .into_iter()
        .find(|entry| entry.post.id == id)
        .ok_or(AppError::NotFound)?;
    Ok(Json(FeedPost::new(entry, Utc::now())))
}

async fn create_post(
    State(state): State<AppState>,
    _user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut form = CreatePostForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await?,
            "description" => form.description = field.text().await?,
            "image" => form.image = Some(read_image(field).await?),
            _ => {}
        }
    }

    if form.title.trim().is_empty() || form.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Title and description are required".into(),
        ));
    }
    let (content_type, data) = form
        .image
        .ok_or_else(|| AppError::BadRequest("An image is required".into()))?;

    // Lock order: media, then store
    let mut media = state.media.lock().await;
    let image_url = media.registry.create(&content_type, data)?;

    let mut store = state.store.lock().await;
    let created = store.create_post(&form.title, &form.description, &image_url, Utc::now());
    let post = match created {
        Ok(post) => post.clone(),
        Err(e) => {
            media.registry.revoke(&image_url);
            return Err(e.into());
        }
    };
    let entry = store
        .feed()
        .into_iter()
        .find(|entry| entry.post.id == post.id)
        .ok_or_else(|| AppError::Internal("Created post missing from feed".into()))?;

    Ok((StatusCode::CREATED, Json(FeedPost::new(entry, Utc::now()))).into_response())
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeState>> {
    let post_id = PostId::new(id);
    let mut store = state.store.lock().await;
    let liked = store.toggle_like(&post_id)?;
    let like_count = store.post(&post_id).map(|p| p.likes.len()).unwrap_or(0);

    Ok(Json(LikeState {
        post_id,
        liked,
        like_count,
    }))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CommentView>>> {
    let store = state.store.lock().await;
    let post = store.post(&PostId::new(id)).ok_or(AppError::NotFound)?;
    let now = Utc::now();

    Ok(Json(
        post.comments
            .iter()
            .cloned()
            .map(|comment| CommentView::new(comment, now))
            .collect(),
    ))
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<CreateCommentForm>,
) -> AppResult<Response> {
    let mut store = state.store.lock().await;
    let now = Utc::now();
    let comment = store
        .add_comment(&PostId::new(id), &form.text, now)?
        .clone();

    Ok((StatusCode::CREATED, Json(CommentView::new(comment, now))).into_response())
}

// --- Time formatting ---

pub fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}

// --- Tests ---
