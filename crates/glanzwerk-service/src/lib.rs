use std::sync::{Arc, Mutex};

use diesel::sqlite::SqliteConnection;

pub mod categories;
pub mod config;
pub mod errors;
pub mod generators;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod scheduler;
pub mod schema;
pub mod seeds;
pub mod slug;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

use generators::{OpenAiContentGenerator, OpenAiImageGenerator};
use repositories::{
    PostRepository, SqliteGenerationLogRepository, SqlitePostRepository, SqliteTopicRepository,
};
use scheduler::{BlogScheduler, SchedulerService};

/// State handed to the HTTP layer. Repositories and the scheduler are
/// injected through this trait so routes can be exercised against fakes.
pub trait AppState: Clone + Send + Sync + 'static {
    type Posts: PostRepository;
    type Scheduler: SchedulerService;

    fn post_repo(&self) -> Self::Posts;
    fn scheduler(&self) -> &Self::Scheduler;
}

/// Scheduler wired with the SQLite stores and the OpenAI-backed clients.
pub type ProductionScheduler = BlogScheduler<
    SqliteTopicRepository,
    SqlitePostRepository,
    SqliteGenerationLogRepository,
    OpenAiContentGenerator,
    OpenAiImageGenerator,
>;

#[derive(Clone)]
pub struct DefaultAppState {
    posts: SqlitePostRepository,
    scheduler: Arc<ProductionScheduler>,
}

impl DefaultAppState {
    pub fn new(db: Arc<Mutex<SqliteConnection>>, scheduler: Arc<ProductionScheduler>) -> Self {
        DefaultAppState {
            posts: SqlitePostRepository::new(db),
            scheduler,
        }
    }
}

impl AppState for DefaultAppState {
    type Posts = SqlitePostRepository;
    type Scheduler = ProductionScheduler;

    fn post_repo(&self) -> Self::Posts {
        self.posts.clone()
    }

    fn scheduler(&self) -> &Self::Scheduler {
        &self.scheduler
    }
}
