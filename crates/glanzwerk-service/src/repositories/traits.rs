use async_trait::async_trait;

use crate::errors::GenerationError;
use crate::models::{NewGenerationLog, NewPost, NewTopic, Post, Topic};

/// Aggregate counters shown by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostStats {
    pub total_generated: i64,
    pub total_published: i64,
    pub today_generated: i64,
}

#[async_trait]
pub trait TopicRepository: Clone + Send + Sync + 'static {
    /// Up to `limit` unused topics in insertion order.
    async fn pick_unused(&self, limit: u32) -> Result<Vec<Topic>, GenerationError>;

    /// Flip `used` to true. Idempotent.
    async fn mark_used(&self, id: i32) -> Result<(), GenerationError>;

    /// Bulk insert. No dedupe check; duplicate texts are tolerated.
    async fn insert_many(&self, topics: &[NewTopic]) -> Result<usize, GenerationError>;

    async fn count_unused(&self) -> Result<i64, GenerationError>;
}

#[async_trait]
pub trait PostRepository: Clone + Send + Sync + 'static {
    async fn create(&self, post: &NewPost) -> Result<Post, GenerationError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, GenerationError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, GenerationError>;

    /// Published posts, newest first.
    async fn list_published(&self, limit: u32) -> Result<Vec<Post>, GenerationError>;

    async fn stats(&self) -> Result<PostStats, GenerationError>;
}

#[async_trait]
pub trait GenerationLogRepository: Clone + Send + Sync + 'static {
    async fn append(&self, entry: &NewGenerationLog) -> Result<(), GenerationError>;
}
