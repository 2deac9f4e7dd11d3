use crate::adapters::fake::default_vocabulary;
use crate::domain::model::{Post, User};
use crate::domain::ports::DataProvider;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// REST client for a jsonplaceholder-style API (`/users`, `/posts`, `/posts?userId=`).
pub struct JsonPlaceholderProvider {
    base_url: String,
    client: Client,
}

impl JsonPlaceholderProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(AppError::ApiStatusError {
                status: response.status().as_u16(),
                url,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DataProvider for JsonPlaceholderProvider {
    async fn get_users(&self) -> Result<Vec<User>> {
        self.get_json("users", &[]).await
    }

    async fn get_posts(&self) -> Result<Vec<Post>> {
        self.get_json("posts", &[]).await
    }

    async fn get_posts_by_user_id(&self, user_id: i64) -> Result<Vec<Post>> {
        self.get_json("posts", &[("userId", user_id.to_string())]).await
    }

    async fn get_vocabulary(&self) -> Result<Vec<String>> {
        // API 沒有字彙端點，沿用本地字彙
        Ok(default_vocabulary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_posts_by_user_id_sends_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/posts").query_param("userId", "1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": 1, "userId": 1, "title": "a", "body": "b"}
                ]));
        });

        let provider = JsonPlaceholderProvider::new(&server.base_url());
        let posts = provider.get_posts_by_user_id(1).await.unwrap();

        mock.assert();
        assert_eq!(posts, vec![Post::new(1, 1, "a", "b")]);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users");
            then.status(503);
        });

        let provider = JsonPlaceholderProvider::new(&format!("{}/", server.base_url()));
        let result = provider.get_users().await;

        assert!(matches!(result, Err(AppError::ApiStatusError { status: 503, .. })));
    }
}
