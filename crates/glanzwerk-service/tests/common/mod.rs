use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use diesel::sqlite::SqliteConnection;
use std::sync::Mutex;
use tokio::sync::Semaphore;

use glanzwerk_service::AppState;
use glanzwerk_service::errors::GenerationError;
use glanzwerk_service::generators::{ContentGenerator, GeneratedArticle, ImageGenerator};
use glanzwerk_service::repositories::{
    SqliteGenerationLogRepository, SqlitePostRepository, SqliteTopicRepository,
};
use glanzwerk_service::scheduler::{BlogScheduler, SchedulerConfig};
use glanzwerk_service::test_helpers::establish_test_connection;

pub const FAKE_IMAGE_URL: &str = "https://images.example.com/hero.png";

pub fn sample_article() -> GeneratedArticle {
    GeneratedArticle {
        title: "Fenster putzen ohne Streifen: Die besten Profi-Tipps".to_string(),
        slug: "fenster-putzen-ohne-streifen".to_string(),
        excerpt: "So putzen Sie Fenster ohne Streifen.".to_string(),
        body: "<h2>Streifenfrei</h2><p>Mit dem richtigen Abzieher klappt es.</p>".to_string(),
        meta_description: "Streifenfrei Fenster putzen mit Profi-Tipps.".to_string(),
        keywords: vec!["Fensterreinigung".to_string(), "Streifen".to_string()],
        read_time_minutes: 4,
        image_prompt: "sparkling clean office windows".to_string(),
    }
}

/// Scripted stand-in for the text-generation upstream.
#[derive(Clone)]
pub struct FakeContentGenerator {
    article: GeneratedArticle,
    fail_with: Option<String>,
    /// When set, each call acquires one permit before returning, so a
    /// test can hold a cycle open.
    gate: Option<Arc<Semaphore>>,
    calls: Arc<AtomicU32>,
}

impl FakeContentGenerator {
    pub fn succeeding() -> Self {
        Self::with_article(sample_article())
    }

    pub fn with_article(article: GeneratedArticle) -> Self {
        FakeContentGenerator {
            article,
            fail_with: None,
            gate: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeContentGenerator {
            fail_with: Some(message.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        FakeContentGenerator {
            gate: Some(gate),
            ..Self::succeeding()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentGenerator for FakeContentGenerator {
    async fn generate(
        &self,
        _topic: &str,
        _category: &str,
        _keywords: &[String],
    ) -> Result<GeneratedArticle, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        match &self.fail_with {
            Some(message) => Err(GenerationError::Upstream(message.clone())),
            None => Ok(self.article.clone()),
        }
    }

    fn model(&self) -> &str {
        "fake-text-model"
    }
}

#[derive(Clone)]
pub struct FakeImageGenerator {
    fail_with: Option<String>,
    calls: Arc<AtomicU32>,
}

impl FakeImageGenerator {
    pub fn succeeding() -> Self {
        FakeImageGenerator {
            fail_with: None,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        FakeImageGenerator {
            fail_with: Some(message.to_string()),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate_hero_image(
        &self,
        _prompt: &str,
        _category: &str,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(message) => Err(GenerationError::Upstream(message.clone())),
            None => Ok(FAKE_IMAGE_URL.to_string()),
        }
    }

    fn model(&self) -> &str {
        "fake-image-model"
    }
}

pub type TestScheduler = BlogScheduler<
    SqliteTopicRepository,
    SqlitePostRepository,
    SqliteGenerationLogRepository,
    FakeContentGenerator,
    FakeImageGenerator,
>;

pub struct TestContext {
    pub db: Arc<Mutex<SqliteConnection>>,
    pub scheduler: Arc<TestScheduler>,
}

/// Scheduler over a fresh in-memory database and the supplied fakes.
/// The backlog threshold is zero so tests control the topic table.
pub fn build_scheduler(content: FakeContentGenerator, image: FakeImageGenerator) -> TestContext {
    let config = SchedulerConfig {
        interval: Duration::from_secs(3600),
        topic_backlog_threshold: 0,
    };
    build_scheduler_with(content, image, config)
}

pub fn build_scheduler_with(
    content: FakeContentGenerator,
    image: FakeImageGenerator,
    config: SchedulerConfig,
) -> TestContext {
    let db = Arc::new(Mutex::new(establish_test_connection()));

    let scheduler = Arc::new(BlogScheduler::new(
        SqliteTopicRepository::new(db.clone()),
        SqlitePostRepository::new(db.clone()),
        SqliteGenerationLogRepository::new(db.clone()),
        content,
        image,
        config,
    ));

    TestContext { db, scheduler }
}

pub mod server_utils {
    use super::*;
    use axum_test::TestServer;
    use glanzwerk_service::repositories::SqlitePostRepository;
    use glanzwerk_service::routes;

    #[derive(Clone)]
    pub struct TestAppState {
        posts: SqlitePostRepository,
        scheduler: Arc<TestScheduler>,
    }

    impl AppState for TestAppState {
        type Posts = SqlitePostRepository;
        type Scheduler = TestScheduler;

        fn post_repo(&self) -> Self::Posts {
            self.posts.clone()
        }

        fn scheduler(&self) -> &Self::Scheduler {
            &self.scheduler
        }
    }

    pub fn create_test_server(
        content: FakeContentGenerator,
        image: FakeImageGenerator,
    ) -> (TestServer, TestContext) {
        let context = build_scheduler(content, image);

        let state = TestAppState {
            posts: SqlitePostRepository::new(context.db.clone()),
            scheduler: context.scheduler.clone(),
        };
        let app = routes::create_router().with_state(state);

        let server = TestServer::new(app).unwrap();
        (server, context)
    }
}
