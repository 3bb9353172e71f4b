// Domain types - plain records, no side effects
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// New types for compile-time safety
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("u{}", uuid::Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("p{}", uuid::Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("c{}", uuid::Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub profession: String,
    pub bio: String,
    pub location: String,
}

impl User {
    /// Case-insensitive match on the login key.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Overwrite every field present in `update`. `id` and `email` are not
    /// part of `ProfileUpdate` and never change.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            avatar,
            profession,
            bio,
            location,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(avatar) = avatar {
            self.avatar = avatar;
        }
        if let Some(profession) = profession {
            self.profession = profession;
        }
        if let Some(bio) = bio {
            self.bio = bio;
        }
        if let Some(location) = location {
            self.location = location;
        }
    }
}

/// Partial profile edit. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub profession: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub likes: BTreeSet<UserId>,
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likes.contains(user_id)
    }

    /// Flip membership of `user_id` in the like set. Returns the new state.
    pub fn toggle_like(&mut self, user_id: &UserId) -> bool {
        if self.likes.remove(user_id) {
            false
        } else {
            self.likes.insert(user_id.clone());
            true
        }
    }
}

/// A comment carries a copy of its author's name and avatar as they were
/// when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub user_name: String,
    pub user_avatar: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn by(author: &User, post_id: PostId, text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::generate(),
            post_id,
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_avatar: author.avatar.clone(),
            text,
            timestamp: now,
        }
    }
}
