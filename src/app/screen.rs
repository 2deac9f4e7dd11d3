use crate::adapters::{FakeDataProvider, JsonPlaceholderProvider};
use crate::config::AppConfig;
use crate::core::cancel::CancellationGroup;
use crate::core::dispatcher::Dispatcher;
use crate::core::operators::{filter_double_tap, throttle_first};
use crate::core::output::OutputHandle;
use crate::core::samples::SampleRunner;
use crate::core::vocabulary::find_vocabulary;
use crate::domain::model::Post;
use crate::domain::ports::{DataProvider, DisplaySurface};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const INPUT_BUFFER: usize = 32;

/// Picks the data source named by the configuration.
pub fn provider_from_config(config: &AppConfig) -> Arc<dyn DataProvider> {
    match &config.data.api_base_url {
        Some(url) => {
            tracing::info!("🌐 Using REST API at {}", url);
            Arc::new(JsonPlaceholderProvider::new(url))
        }
        None => Arc::new(FakeDataProvider::new(config.data_latency())),
    }
}

/// The owning view: command input, vocabulary query, fetch trigger and the
/// output area, with everything it started torn down on [`close`](Self::close).
pub struct MainScreen {
    provider: Arc<dyn DataProvider>,
    output: OutputHandle,
    samples: Arc<CancellationGroup>,
    scope: CancellationGroup,
    dispatcher: Arc<Dispatcher>,
    command_tx: mpsc::Sender<String>,
    fetch_tx: mpsc::Sender<()>,
    tap_tx: mpsc::Sender<()>,
    closed: AtomicBool,
}

impl MainScreen {
    pub fn open<D: DisplaySurface>(config: AppConfig, provider: Arc<dyn DataProvider>, display: D) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let samples = Arc::new(CancellationGroup::new("ongoing samples"));
        let scope = CancellationGroup::new("screen");

        let (output, _display_task) = OutputHandle::spawn(display, samples.generation_counter());

        let runner = Arc::new(SampleRunner::new(Arc::clone(&samples), output.clone(), Arc::clone(&config)));
        let table = runner.command_table()?;
        let dispatcher = Arc::new(Dispatcher::new(table, Arc::clone(&samples), output.clone()));

        let (command_tx, command_rx) = mpsc::channel(INPUT_BUFFER);
        dispatcher.spawn_debounced(command_rx, config.debounce_period(), &scope);

        let (fetch_tx, fetch_rx) = mpsc::channel(INPUT_BUFFER);
        {
            let provider = Arc::clone(&provider);
            let output = output.clone();
            let window = config.fetch_throttle();
            scope.spawn(move |_token| async move {
                let mut clicks = throttle_first(fetch_rx, window);
                while clicks.recv().await.is_some() {
                    load_posts_of_all_users(Arc::clone(&provider), output.clone()).await;
                }
            });
        }

        let (tap_tx, tap_rx) = mpsc::channel(INPUT_BUFFER);
        {
            let output = output.clone();
            let period = config.double_tap_period();
            scope.spawn(move |_token| async move {
                let mut double_taps = filter_double_tap(tap_rx, period);
                while double_taps.recv().await.is_some() {
                    output.clear();
                }
            });
        }

        tracing::debug!(commands = ?dispatcher.table(), "screen opened");

        Ok(Self {
            provider,
            output,
            samples,
            scope,
            dispatcher,
            command_tx,
            fetch_tx,
            tap_tx,
            closed: AtomicBool::new(false),
        })
    }

    pub fn output(&self) -> &OutputHandle {
        &self.output
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn samples(&self) -> &CancellationGroup {
        &self.samples
    }

    /// An input-change event from the command field.
    pub async fn type_command(&self, text: impl Into<String>) {
        if self.command_tx.send(text.into()).await.is_err() {
            tracing::debug!("command input is closed");
        }
    }

    /// A click on the fetch trigger.
    pub async fn click_fetch(&self) {
        let _ = self.fetch_tx.send(()).await;
    }

    /// A tap on the output area.
    pub async fn tap_output(&self) {
        let _ = self.tap_tx.send(()).await;
    }

    pub async fn find_vocabulary(&self, prefix: &str) -> Result<Vec<String>> {
        find_vocabulary(self.provider.as_ref(), prefix).await
    }

    /// Lists all posts in the background. Failures are only logged.
    pub fn fetch_posts(&self) {
        let provider = Arc::clone(&self.provider);
        let output = self.output.clone();
        self.scope.spawn(move |_token| async move {
            match provider.get_posts().await {
                Ok(posts) => show_posts(&output, &posts),
                Err(e) => tracing::error!("❌ Fetching posts failed: {}", e),
            }
        });
    }

    /// Fetches every user's posts and shows them in user order. Failures are only logged.
    pub fn fetch_posts_of_all_users(&self) {
        let provider = Arc::clone(&self.provider);
        let output = self.output.clone();
        self.scope
            .spawn(move |_token| async move { load_posts_of_all_users(provider, output).await });
    }

    /// Tears down screen subscriptions and running samples. Only the first
    /// call does anything; returns whether this call did it.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let samples = self.samples.cancel_all();
        let subscriptions = self.scope.cancel_all();
        tracing::info!(samples, subscriptions, "screen closed");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for MainScreen {
    fn drop(&mut self) {
        self.close();
    }
}

fn show_posts(output: &OutputHandle, posts: &[Post]) {
    let blocks: Vec<String> = posts.iter().map(Post::display_block).collect();
    output.append_line(blocks.join("\n"));
}

async fn posts_of_all_users(provider: Arc<dyn DataProvider>) -> Result<Vec<Post>> {
    let users = provider.get_users().await?;

    // 同時抓取，但依使用者順序合併
    let fetches: Vec<_> = users
        .iter()
        .map(|user| {
            let provider = Arc::clone(&provider);
            let user_id = user.id;
            tokio::spawn(async move { provider.get_posts_by_user_id(user_id).await })
        })
        .collect();

    let mut posts = Vec::new();
    for fetch in fetches {
        posts.extend(fetch.await??);
    }
    Ok(posts)
}

async fn load_posts_of_all_users(provider: Arc<dyn DataProvider>, output: OutputHandle) {
    match posts_of_all_users(provider).await {
        Ok(posts) => {
            tracing::info!("📥 Loaded {} posts", posts.len());
            show_posts(&output, &posts);
        }
        Err(e) => tracing::error!("❌ Fetching posts of all users failed: {}", e),
    }
}
