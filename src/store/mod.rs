//! In-memory domain store: users, posts and the single active session.
//!
//! Every operation is synchronous and all-or-nothing. A rejected operation
//! returns a `StoreError` and leaves the collections and the session exactly
//! as they were.

pub mod seed;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::domain::{Comment, Post, PostId, ProfileUpdate, User, UserId};

const NEW_USER_BIO: &str = "I am new here! checking out the app.";
const NEW_USER_LOCATION: &str = "Unknown";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("No active session")]
    NoSession,

    #[error("No user with email {0}")]
    UnknownEmail(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Comment cannot be empty")]
    EmptyComment,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A post joined with its author and per-viewer reaction state.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub post: Post,
    pub author: Option<User>,
    pub like_count: usize,
    pub comment_count: usize,
    pub liked_by_me: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub posts: Vec<Post>,
    pub post_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub current_user: Option<User>,
    pub users: Vec<User>,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    users: Vec<User>,
    posts: Vec<Post>,
    session: Option<UserId>,
}

fn required(value: &str, field: &'static str) -> StoreResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

impl Store {
    /// Empty store, no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store loaded with the fixed seed data, post times relative to `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            users: seed::users(),
            posts: seed::posts(now),
            session: None,
        }
    }

    // --- Reads ---

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|p| &p.id == id)
    }

    pub fn posts_by(&self, user_id: &UserId) -> Vec<&Post> {
        self.posts.iter().filter(|p| &p.user_id == user_id).collect()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().and_then(|id| self.user(id))
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn feed(&self) -> Vec<FeedEntry> {
        let viewer = self.session.as_ref();
        self.posts
            .iter()
            .map(|post| FeedEntry {
                post: post.clone(),
                author: self.user(&post.user_id).cloned(),
                like_count: post.likes.len(),
                comment_count: post.comments.len(),
                liked_by_me: viewer.map(|id| post.is_liked_by(id)).unwrap_or(false),
            })
            .collect()
    }

    pub fn profile(&self) -> StoreResult<Profile> {
        let user = self.current_user().ok_or(StoreError::NoSession)?;
        let posts: Vec<Post> = self.posts_by(&user.id).into_iter().cloned().collect();
        Ok(Profile {
            user: user.clone(),
            post_count: posts.len(),
            posts,
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_user: self.current_user().cloned(),
            users: self.users.clone(),
            posts: self.posts.clone(),
        }
    }

    // --- Session ---

    pub fn login(&mut self, email: &str) -> StoreResult<&User> {
        let email = email.trim();
        let index = self
            .users
            .iter()
            .position(|u| u.has_email(email))
            .ok_or_else(|| StoreError::UnknownEmail(email.to_string()))?;

        let user = &self.users[index];
        self.session = Some(user.id.clone());
        tracing::info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    pub fn register(&mut self, name: &str, email: &str, profession: &str) -> StoreResult<&User> {
        let name = required(name, "name")?;
        let email = required(email, "email")?;
        let profession = required(profession, "profession")?;

        if self.users.iter().any(|u| u.has_email(&email)) {
            return Err(StoreError::EmailTaken(email));
        }

        let user = User {
            id: UserId::generate(),
            avatar: default_avatar(&name),
            name,
            email,
            profession,
            bio: NEW_USER_BIO.to_string(),
            location: NEW_USER_LOCATION.to_string(),
        };
        tracing::info!(user_id = %user.id, "Registered new user");

        self.session = Some(user.id.clone());
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    pub fn logout(&mut self) {
        if let Some(id) = self.session.take() {
            tracing::info!(user_id = %id, "Logged out");
        }
    }

    // --- Attributed mutations ---

    fn session_index(&self) -> StoreResult<usize> {
        let id = self.session.as_ref().ok_or(StoreError::NoSession)?;
        self.users
            .iter()
            .position(|u| &u.id == id)
            .ok_or(StoreError::NoSession)
    }

    fn post_index(&self, id: &PostId) -> StoreResult<usize> {
        self.posts
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::PostNotFound(id.clone()))
    }

    /// Merge `update` into the session user. The session points at the user
    /// set entry by id, so there is only one copy to change.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> StoreResult<&User> {
        let index = self.session_index()?;
        let user = &mut self.users[index];
        user.apply(update);
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(&*user)
    }

    pub fn create_post(
        &mut self,
        title: &str,
        description: &str,
        image_url: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<&Post> {
        let index = self.session_index()?;
        let title = required(title, "title")?;
        let description = required(description, "description")?;
        let image_url = required(image_url, "image")?;

        let post = Post {
            id: PostId::generate(),
            user_id: self.users[index].id.clone(),
            image_url,
            title,
            description,
            timestamp: now,
            likes: BTreeSet::new(),
            comments: Vec::new(),
        };
        tracing::info!(post_id = %post.id, user_id = %post.user_id, "Post created");

        // Most recent first
        self.posts.insert(0, post);
        Ok(&self.posts[0])
    }

    /// Returns whether the session user likes the post after the toggle.
    pub fn toggle_like(&mut self, post_id: &PostId) -> StoreResult<bool> {
        let user_id = self.users[self.session_index()?].id.clone();
        let index = self.post_index(post_id)?;
        let liked = self.posts[index].toggle_like(&user_id);
        tracing::debug!(post_id = %post_id, user_id = %user_id, liked, "Like toggled");
        Ok(liked)
    }

    pub fn add_comment(
        &mut self,
        post_id: &PostId,
        text: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<&Comment> {
        let author = self.session_index()?;
        let index = self.post_index(post_id)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyComment);
        }

        let comment = Comment::by(&self.users[author], post_id.clone(), text.to_string(), now);
        tracing::debug!(post_id = %post_id, comment_id = %comment.id.as_str(), "Comment added");

        let comments = &mut self.posts[index].comments;
        comments.push(comment);
        Ok(&comments[comments.len() - 1])
    }
}

/// Avatar for a fresh account. Only the first space of the name is dropped.
fn default_avatar(name: &str) -> String {
    format!(
        "https://picsum.photos/seed/{}/150/150",
        name.replacen(' ', "", 1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in(email: &str) -> Store {
        let mut store = Store::seeded(Utc::now());
        store.login(email).unwrap();
        store
    }

    #[test]
    fn login_known_email_sets_session() {
        let mut store = Store::seeded(Utc::now());
        let user = store.login("sarah@design.com").unwrap();
        assert_eq!(user.name, "Sarah Jenkins");
        assert_eq!(store.current_user().unwrap().id, UserId::new("u1"));
    }

    #[test]
    fn login_is_case_insensitive() {
        let mut store = Store::seeded(Utc::now());
        store.login("  SARAH@Design.COM ").unwrap();
        assert_eq!(store.current_user().unwrap().id, UserId::new("u1"));
    }

    #[test]
    fn login_unknown_email_keeps_session() {
        let mut store = logged_in("david@photo.com");
        let err = store.login("nobody@x.com").unwrap_err();
        assert_eq!(err, StoreError::UnknownEmail("nobody@x.com".into()));
        assert_eq!(store.current_user().unwrap().id, UserId::new("u2"));

        let mut fresh = Store::seeded(Utc::now());
        assert!(fresh.login("nobody@x.com").is_err());
        assert!(fresh.current_user().is_none());
    }

    #[test]
    fn register_creates_user_with_defaults_and_logs_in() {
        let mut store = Store::seeded(Utc::now());
        let id = store
            .register("Mary Ann Lee", "mary@studio.io", "Painter")
            .unwrap()
            .id
            .clone();

        assert_eq!(store.users().len(), 4);
        let user = store.current_user().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.bio, "I am new here! checking out the app.");
        assert_eq!(user.location, "Unknown");
        assert_eq!(
            user.avatar,
            "https://picsum.photos/seed/MaryAnn Lee/150/150"
        );
        assert_eq!(store.users().last().unwrap().id, id);
    }

    #[test]
    fn register_rejects_taken_email_regardless_of_case() {
        let mut store = Store::seeded(Utc::now());
        let err = store
            .register("Fake Sarah", "Sarah@Design.com", "Designer")
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));
        assert_eq!(store.users().len(), 3);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn register_rejects_blank_fields() {
        let mut store = Store::seeded(Utc::now());
        assert_eq!(
            store.register("  ", "a@b.c", "x").unwrap_err(),
            StoreError::MissingField("name")
        );
        assert_eq!(
            store.register("A", "a@b.c", "").unwrap_err(),
            StoreError::MissingField("profession")
        );
        assert_eq!(store.users().len(), 3);
    }

    #[test]
    fn logout_clears_session() {
        let mut store = logged_in("sarah@design.com");
        store.logout();
        assert!(store.current_user().is_none());
        store.logout();
        assert!(!store.is_logged_in());
    }

    #[test]
    fn update_profile_requires_session() {
        let mut store = Store::seeded(Utc::now());
        let before = store.users().to_vec();
        let err = store
            .update_profile(ProfileUpdate {
                name: Some("Nobody".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, StoreError::NoSession);
        assert_eq!(store.users(), before.as_slice());
    }

    #[test]
    fn update_profile_changes_session_user_and_user_set() {
        let mut store = logged_in("sarah@design.com");
        store
            .update_profile(ProfileUpdate {
                name: Some("Sarah J.".into()),
                location: Some("Oakland, CA".into()),
                ..Default::default()
            })
            .unwrap();

        let current = store.current_user().unwrap();
        assert_eq!(current.name, "Sarah J.");
        assert_eq!(current.email, "sarah@design.com");
        let stored = store.user(&UserId::new("u1")).unwrap();
        assert_eq!(stored.location, "Oakland, CA");
        assert_eq!(stored, current);
    }

    #[test]
    fn profile_edit_does_not_rewrite_comment_snapshots() {
        let mut store = logged_in("david@photo.com");
        store
            .update_profile(ProfileUpdate {
                name: Some("Dave".into()),
                avatar: Some("new.png".into()),
                ..Default::default()
            })
            .unwrap();

        let c1 = &store.post(&PostId::new("p1")).unwrap().comments[0];
        assert_eq!(c1.user_name, "David Chen");
        assert_eq!(c1.user_avatar, "https://picsum.photos/seed/david/150/150");
    }

    #[test]
    fn create_post_without_session_is_rejected() {
        let mut store = Store::seeded(Utc::now());
        let err = store
            .create_post("Title", "Desc", "blob:folio/x", Utc::now())
            .unwrap_err();
        assert_eq!(err, StoreError::NoSession);
        assert_eq!(store.posts().len(), 3);
    }

    #[test]
    fn create_post_requires_all_fields() {
        let mut store = logged_in("sarah@design.com");
        let now = Utc::now();
        assert!(store.create_post("", "d", "img", now).is_err());
        assert!(store.create_post("t", " ", "img", now).is_err());
        assert_eq!(
            store.create_post("t", "d", "", now).unwrap_err(),
            StoreError::MissingField("image")
        );
        assert_eq!(store.posts().len(), 3);
    }

    #[test]
    fn create_post_prepends_owned_by_session_user() {
        let mut store = logged_in("elena@arch.com");
        let now = Utc::now();
        let id = store
            .create_post("Kitchen", "Oak and stone", "blob:folio/abc", now)
            .unwrap()
            .id
            .clone();

        assert_eq!(store.posts().len(), 4);
        let first = &store.posts()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.user_id, UserId::new("u3"));
        assert_eq!(first.timestamp, now);
        assert!(first.likes.is_empty());
        assert!(first.comments.is_empty());
        assert_eq!(store.posts_by(&UserId::new("u3")).len(), 2);
    }

    #[test]
    fn toggle_like_twice_restores_likes() {
        let mut store = logged_in("elena@arch.com");
        let p2 = PostId::new("p2");
        let before = store.post(&p2).unwrap().likes.clone();

        assert!(store.toggle_like(&p2).unwrap());
        assert_eq!(store.post(&p2).unwrap().likes.len(), before.len() + 1);
        assert!(!store.toggle_like(&p2).unwrap());
        assert_eq!(store.post(&p2).unwrap().likes, before);
    }

    #[test]
    fn toggle_like_removes_existing_like() {
        let mut store = logged_in("sarah@design.com");
        let p3 = PostId::new("p3");
        assert!(!store.toggle_like(&p3).unwrap());
        assert!(!store.post(&p3).unwrap().is_liked_by(&UserId::new("u1")));
    }

    #[test]
    fn toggle_like_rejections() {
        let mut store = Store::seeded(Utc::now());
        assert_eq!(
            store.toggle_like(&PostId::new("p1")).unwrap_err(),
            StoreError::NoSession
        );
        store.login("sarah@design.com").unwrap();
        assert_eq!(
            store.toggle_like(&PostId::new("nope")).unwrap_err(),
            StoreError::PostNotFound(PostId::new("nope"))
        );
    }

    #[test]
    fn add_comment_appends_snapshot() {
        let mut store = logged_in("elena@arch.com");
        let p1 = PostId::new("p1");
        let before = store.post(&p1).unwrap().comments.clone();

        let comment = store
            .add_comment(&p1, "  Great contrast  ", Utc::now())
            .unwrap()
            .clone();
        assert_eq!(comment.text, "Great contrast");
        assert_eq!(comment.user_name, "Elena Rodriguez");
        assert_eq!(comment.post_id, p1);

        let after = &store.post(&p1).unwrap().comments;
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], before.as_slice());
        assert_eq!(after.last().unwrap(), &comment);
    }

    #[test]
    fn add_comment_rejections_leave_comments_alone() {
        let mut store = Store::seeded(Utc::now());
        let p1 = PostId::new("p1");
        assert_eq!(
            store.add_comment(&p1, "hi", Utc::now()).unwrap_err(),
            StoreError::NoSession
        );

        store.login("sarah@design.com").unwrap();
        assert_eq!(
            store.add_comment(&p1, "   ", Utc::now()).unwrap_err(),
            StoreError::EmptyComment
        );
        assert!(matches!(
            store.add_comment(&PostId::new("p404"), "hi", Utc::now()),
            Err(StoreError::PostNotFound(_))
        ));
        assert_eq!(store.post(&p1).unwrap().comments.len(), 1);
    }

    #[test]
    fn feed_reports_viewer_state() {
        let store = logged_in("sarah@design.com");
        let feed = store.feed();
        assert_eq!(feed.len(), 3);

        let p1 = &feed[0];
        assert_eq!(p1.author.as_ref().unwrap().name, "Sarah Jenkins");
        assert_eq!(p1.like_count, 2);
        assert_eq!(p1.comment_count, 1);
        assert!(!p1.liked_by_me);
        assert!(feed[1].liked_by_me);
    }

    #[test]
    fn profile_lists_own_posts() {
        let store = logged_in("david@photo.com");
        let profile = store.profile().unwrap();
        assert_eq!(profile.user.name, "David Chen");
        assert_eq!(profile.post_count, 1);
        assert_eq!(profile.posts[0].id, PostId::new("p2"));

        assert_eq!(
            Store::seeded(Utc::now()).profile().unwrap_err(),
            StoreError::NoSession
        );
    }

    #[test]
    fn snapshot_includes_session() {
        let store = logged_in("sarah@design.com");
        let snap = store.snapshot();
        assert_eq!(snap.current_user.unwrap().id, UserId::new("u1"));
        assert_eq!(snap.users.len(), 3);
        assert_eq!(snap.posts.len(), 3);
        assert!(Store::new().snapshot().users.is_empty());
    }
}
