use async_trait::async_trait;
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use stream_samples::adapters::{FakeDataProvider, JsonPlaceholderProvider};
use stream_samples::core::{DataProvider, Post, User};
use stream_samples::domain::ports::NullDisplay;
use stream_samples::{AppConfig, AppError, MainScreen, Result};

struct BrokenProvider;

#[async_trait]
impl DataProvider for BrokenProvider {
    async fn get_users(&self) -> Result<Vec<User>> {
        Err(AppError::ApiStatusError {
            status: 500,
            url: "/users".to_string(),
        })
    }

    async fn get_posts(&self) -> Result<Vec<Post>> {
        Err(AppError::ApiStatusError {
            status: 500,
            url: "/posts".to_string(),
        })
    }

    async fn get_posts_by_user_id(&self, _user_id: i64) -> Result<Vec<Post>> {
        Ok(Vec::new())
    }

    async fn get_vocabulary(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

fn open_fake_screen() -> MainScreen {
    let config = AppConfig::default();
    let provider = Arc::new(FakeDataProvider::new(config.data_latency()));
    MainScreen::open(config, provider, NullDisplay).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_fetch_click_shows_posts_of_all_users() {
    let screen = open_fake_screen();

    screen.click_fetch().await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    screen.output().sync().await;

    let lines = screen.output().lines();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "title = title");
    assert_eq!(lines[1], "body=some insightful dissertation...");
    assert_eq!(lines[4], "title = hello");
}

#[tokio::test(start_paused = true)]
async fn test_fetch_clicks_are_throttled() {
    let screen = open_fake_screen();

    screen.click_fetch().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    screen.click_fetch().await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    screen.output().sync().await;
    assert_eq!(screen.output().lines().len(), 6);

    // 視窗過後可以再次觸發
    screen.click_fetch().await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    screen.output().sync().await;
    assert_eq!(screen.output().lines().len(), 12);
}

#[tokio::test]
async fn test_fetch_failure_leaves_output_untouched() {
    let screen = MainScreen::open(AppConfig::default(), Arc::new(BrokenProvider), NullDisplay).unwrap();
    screen.output().append_line("before");

    screen.fetch_posts();
    screen.fetch_posts_of_all_users();
    tokio::time::sleep(Duration::from_millis(100)).await;
    screen.output().sync().await;

    assert_eq!(screen.output().lines(), vec!["before".to_string()]);
    assert!(!screen.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_double_tap_clears_output() {
    let screen = open_fake_screen();
    screen.output().append_line("something");

    screen.tap_output().await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    screen.output().sync().await;
    assert_eq!(screen.output().lines().len(), 1);

    screen.tap_output().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    screen.tap_output().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    screen.output().sync().await;
    assert!(screen.output().lines().is_empty());
}

#[tokio::test]
async fn test_vocabulary_lookup_through_screen() {
    let screen = open_fake_screen();
    let words = screen.find_vocabulary("E").await.unwrap();
    assert_eq!(
        words,
        vec!["ea", "eiusmod", "elit", "enim", "esse", "est", "et", "eu", "ex", "excepteur", "exercitation"]
    );

    let all = screen.find_vocabulary("").await.unwrap();
    let mut sorted = all.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(all, sorted);
}

#[tokio::test(start_paused = true)]
async fn test_close_tears_down_once() {
    let screen = open_fake_screen();
    screen.dispatcher().dispatch("timer");
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(screen.samples().active_count(), 1);

    assert!(screen.close());
    assert!(!screen.close());
    assert!(screen.is_closed());

    screen.output().sync().await;
    let frozen = screen.output().lines();

    // 關閉後輸入不再被執行，計時器也不再更新
    screen.type_command("error-fallback").await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    screen.output().sync().await;
    assert_eq!(screen.output().lines(), frozen);
    assert_eq!(screen.samples().active_count(), 0);
}

#[tokio::test]
async fn test_open_rejects_invalid_config() {
    let mut config = AppConfig::default();
    config.timer.period_ms = 0;
    let provider = Arc::new(FakeDataProvider::new(Duration::ZERO));

    let result = MainScreen::open(config, provider, NullDisplay);
    assert!(matches!(
        result,
        Err(AppError::InvalidConfigValueError { field, .. }) if field == "timer.period_ms"
    ));
}

#[tokio::test]
async fn test_posts_from_rest_api() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/posts");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!([
                {"id": 1, "userId": 1, "title": "remote", "body": "from the api"}
            ]));
    });

    let provider = Arc::new(JsonPlaceholderProvider::new(&server.base_url()));
    let screen = MainScreen::open(AppConfig::default(), provider, NullDisplay).unwrap();

    screen.fetch_posts();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while screen.output().lines().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
        screen.output().sync().await;
    }

    assert_eq!(
        screen.output().lines(),
        vec!["title = remote".to_string(), "body=from the api".to_string()]
    );
}
