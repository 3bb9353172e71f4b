pub mod models;

pub use models::{Comment, CommentId, Post, PostId, ProfileUpdate, User, UserId};
