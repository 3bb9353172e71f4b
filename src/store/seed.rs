use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;

use crate::domain::{Comment, CommentId, Post, PostId, User, UserId};

fn user(
    id: &str,
    name: &str,
    email: &str,
    seed: &str,
    profession: &str,
    bio: &str,
    location: &str,
) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        avatar: format!("https://picsum.photos/seed/{}/150/150", seed),
        profession: profession.to_string(),
        bio: bio.to_string(),
        location: location.to_string(),
    }
}

fn likes(ids: &[&str]) -> BTreeSet<UserId> {
    ids.iter().map(|id| UserId::new(*id)).collect()
}

pub fn users() -> Vec<User> {
    vec![
        user(
            "u1",
            "Sarah Jenkins",
            "sarah@design.com",
            "sarah",
            "UX/UI Designer",
            "Crafting digital experiences that humans love. 5+ years in Figma & React.",
            "San Francisco, CA",
        ),
        user(
            "u2",
            "David Chen",
            "david@photo.com",
            "david",
            "Event Photographer",
            "Capturing moments that last a lifetime. Weddings, corporate, and portraits.",
            "New York, NY",
        ),
        user(
            "u3",
            "Elena Rodriguez",
            "elena@arch.com",
            "elena",
            "Interior Architect",
            "Minimalist spaces for modern living. Sustainable design advocate.",
            "Barcelona, ES",
        ),
    ]
}

/// Seed posts with timestamps relative to `now`.
pub fn posts(now: DateTime<Utc>) -> Vec<Post> {
    vec![
        Post {
            id: PostId::new("p1"),
            user_id: UserId::new("u1"),
            image_url: "https://picsum.photos/seed/design1/800/600".to_string(),
            title: "Fintech Mobile App Redesign".to_string(),
            description: "A complete overhaul of a banking application focusing on accessibility and dark mode aesthetics.".to_string(),
            timestamp: now - Duration::milliseconds(10_000_000),
            likes: likes(&["u2", "u3"]),
            comments: vec![Comment {
                id: CommentId::new("c1"),
                post_id: PostId::new("p1"),
                user_id: UserId::new("u2"),
                user_name: "David Chen".to_string(),
                user_avatar: "https://picsum.photos/seed/david/150/150".to_string(),
                text: "Love the color palette!".to_string(),
                timestamp: now - Duration::milliseconds(500_000),
            }],
        },
        Post {
            id: PostId::new("p2"),
            user_id: UserId::new("u2"),
            image_url: "https://picsum.photos/seed/wedding/800/600".to_string(),
            title: "Sunset Wedding at The Pier".to_string(),
            description: "Golden hour shots are always the best. The lighting was absolutely perfect for this couple.".to_string(),
            timestamp: now - Duration::milliseconds(5_000_000),
            likes: likes(&["u1"]),
            comments: vec![],
        },
        Post {
            id: PostId::new("p3"),
            user_id: UserId::new("u3"),
            image_url: "https://picsum.photos/seed/interior/800/600".to_string(),
            title: "Modern Loft Renovation".to_string(),
            description: "Converting an old industrial warehouse into a cozy, modern living space using reclaimed wood.".to_string(),
            timestamp: now - Duration::milliseconds(2_000_000),
            likes: likes(&["u1", "u2"]),
            comments: vec![],
        },
    ]
}
