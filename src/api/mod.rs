//! Typed wrappers over the service's endpoints.
//!
//! Every function goes through [`Gateway`](crate::Gateway), so
//! classification, notification and forced sign-out apply uniformly.
//! User-scoped endpoints take the user id from the stored session.

pub mod auth;
pub mod chat;
pub mod health;
pub mod tasks;

fn user_path(user_id: &crate::types::UserId, rest: &str) -> String {
    format!("/api/{}/{rest}", urlencoding::encode(user_id.as_str()))
}
