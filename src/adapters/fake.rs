use crate::domain::model::{Post, User};
use crate::domain::ports::DataProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

const LOREM: &str = "Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor incididunt ut \
    labore et dolore magna aliqua Ut enim ad minim veniam quis nostrud exercitation ullamco \
    laboris nisi ut aliquip ex ea commodo consequat Duis aute irure dolor in reprehenderit in \
    voluptate velit esse cillum dolore eu fugiat nulla pariatur Excepteur sint occaecat cupidatat \
    non proident sunt in culpa qui officia deserunt mollit anim id est laborum";

/// A canned response handed out after a fixed delay.
///
/// Nothing happens until the returned future is polled, and every call
/// produces a fresh copy of the same backing value.
#[derive(Debug, Clone)]
pub struct FakeResource<T> {
    response: T,
    delay: Duration,
}

impl<T: Clone + Send + Sync> FakeResource<T> {
    pub fn new(response: T, delay: Duration) -> Self {
        Self { response, delay }
    }

    pub async fn get(&self) -> T {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

/// In-memory users, posts and vocabulary standing in for the REST API.
#[derive(Debug, Clone)]
pub struct FakeDataProvider {
    users: FakeResource<Vec<User>>,
    posts: FakeResource<Vec<Post>>,
    vocabulary: FakeResource<Vec<String>>,
}

impl FakeDataProvider {
    pub fn new(latency: Duration) -> Self {
        Self::with_fixture(default_users(), default_posts(), default_vocabulary(), latency)
    }

    pub fn with_fixture(
        users: Vec<User>,
        posts: Vec<Post>,
        vocabulary: Vec<String>,
        latency: Duration,
    ) -> Self {
        Self {
            users: FakeResource::new(users, latency),
            posts: FakeResource::new(posts, latency),
            // 字彙是本地資料，不模擬延遲
            vocabulary: FakeResource::new(vocabulary, Duration::ZERO),
        }
    }
}

impl Default for FakeDataProvider {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl DataProvider for FakeDataProvider {
    async fn get_users(&self) -> Result<Vec<User>> {
        Ok(self.users.get().await)
    }

    async fn get_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.get().await)
    }

    async fn get_posts_by_user_id(&self, user_id: i64) -> Result<Vec<Post>> {
        let posts = self.posts.get().await;
        Ok(posts.into_iter().filter(|p| p.user_id == user_id).collect())
    }

    async fn get_vocabulary(&self) -> Result<Vec<String>> {
        Ok(self.vocabulary.get().await)
    }
}

pub fn default_users() -> Vec<User> {
    vec![User::new(1, "Jan", "Kowalski"), User::new(2, "Anna", "Nowak")]
}

pub fn default_posts() -> Vec<Post> {
    vec![
        Post::new(1, 1, "title", "some insightful dissertation..."),
        Post::new(2, 1, "another title", "a follow-up nobody asked for"),
        Post::new(3, 2, "hello", "first post from the second user"),
    ]
}

pub fn default_vocabulary() -> Vec<String> {
    LOREM
        .split_whitespace()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
