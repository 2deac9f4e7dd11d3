use crate::domain::model::{Post, User};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Source of users, posts and vocabulary. Fakes and the HTTP client both implement it.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn get_users(&self) -> Result<Vec<User>>;
    async fn get_posts(&self) -> Result<Vec<Post>>;
    async fn get_posts_by_user_id(&self, user_id: i64) -> Result<Vec<Post>>;
    async fn get_vocabulary(&self) -> Result<Vec<String>>;
}

/// A single change to the output log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Append(String),
    ReplaceLast(String),
    Clear,
}

/// The external surface that shows the output log.
pub trait DisplaySurface: Send + 'static {
    fn render(&mut self, event: &OutputEvent);
}

/// Surface that shows nothing; useful when only the buffer matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySurface for NullDisplay {
    fn render(&mut self, _event: &OutputEvent) {}
}
