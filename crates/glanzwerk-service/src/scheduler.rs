use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::errors::GenerationError;
use crate::generators::{ContentGenerator, GeneratedArticle, ImageGenerator};
use crate::models::{NewGenerationLog, NewPost, Topic};
use crate::repositories::{GenerationLogRepository, PostRepository, TopicRepository};
use crate::seeds::seed_topics;

pub const DEFAULT_AUTHOR: &str = "Glanzwerk Redaktion";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between scheduled generation cycles.
    pub interval: Duration,
    /// Seed topics are inserted when the unused count drops below this.
    pub topic_backlog_threshold: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            interval: Duration::from_secs(12 * 60 * 60),
            topic_backlog_threshold: 5,
        }
    }
}

/// Aggregate counters exposed by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub total_generated: i64,
    pub total_published: i64,
    pub today_generated: i64,
    pub unused_topics: i64,
}

#[derive(Debug, Clone)]
pub struct ScheduleStatus {
    pub is_running: bool,
    /// Best-effort display value (`now + interval`), not the true next
    /// fire time.
    pub next_generation: Option<DateTime<Utc>>,
    pub stats: SchedulerStats,
}

/// Result of a manual trigger. Never an Err across the API boundary.
#[derive(Debug, Clone)]
pub struct ManualGenerationOutcome {
    pub success: bool,
    pub post_id: Option<i32>,
    pub error: Option<String>,
}

/// The slice of the scheduler the HTTP layer needs, fake-able in tests.
#[async_trait]
pub trait SchedulerService: Send + Sync + 'static {
    async fn trigger_manual(&self) -> ManualGenerationOutcome;
    async fn status(&self) -> Result<ScheduleStatus, GenerationError>;
}

/// Orchestrates the generation pipeline: pick topic, generate text,
/// generate image, persist post, mark topic used.
///
/// Constructed once at startup and handed to the router state; there is
/// no global instance. Timer-fired and manual cycles share one entry
/// point guarded by an in-flight flag, so two cycles can never consume
/// the same topic.
pub struct BlogScheduler<T, P, L, C, I> {
    topics: T,
    posts: P,
    logs: L,
    content: C,
    image: I,
    config: SchedulerConfig,
    running: AtomicBool,
    cycle_in_flight: AtomicBool,
    stop_tx: StdMutex<Option<watch::Sender<bool>>>,
    timer: StdMutex<Option<JoinHandle<()>>>,
}

/// Clears the in-flight flag on drop. A manual trigger runs inside the
/// HTTP request future, which can be cancelled at any await point (for
/// example by the request timeout layer), so the flag must not depend
/// on the cycle future running to completion.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T, P, L, C, I> BlogScheduler<T, P, L, C, I>
where
    T: TopicRepository,
    P: PostRepository,
    L: GenerationLogRepository,
    C: ContentGenerator,
    I: ImageGenerator,
{
    pub fn new(topics: T, posts: P, logs: L, content: C, image: I, config: SchedulerConfig) -> Self {
        BlogScheduler {
            topics,
            posts,
            logs,
            content,
            image,
            config,
            running: AtomicBool::new(false),
            cycle_in_flight: AtomicBool::new(false),
            stop_tx: StdMutex::new(None),
            timer: StdMutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stopped -> Running. Tops up the topic backlog, runs one cycle
    /// immediately, then arms the repeating timer. No effect if already
    /// running.
    pub async fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting blog scheduler");

        if let Err(err) = self.ensure_topic_backlog().await {
            error!(error = %err, "Failed to top up topic backlog");
        }

        self.run_cycle_logged().await;

        let (tx, mut rx) = watch::channel(false);
        *self.stop_tx.lock().unwrap() = Some(tx);

        let scheduler = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the startup cycle
            // already ran, so consume it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        scheduler.run_cycle_logged().await;
                    }
                    _ = rx.changed() => break,
                }
            }
            info!("Blog scheduler timer stopped");
        });
        *self.timer.lock().unwrap() = Some(handle);
    }

    /// Running -> Stopped. No effect if already stopped. An in-flight
    /// cycle finishes; only the timer is cancelled.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping blog scheduler");
        self.stop_tx.lock().unwrap().take();
        self.timer.lock().unwrap().take();
    }

    async fn ensure_topic_backlog(&self) -> Result<(), GenerationError> {
        let unused = self.topics.count_unused().await?;
        if unused >= i64::from(self.config.topic_backlog_threshold) {
            return Ok(());
        }

        let seeds = seed_topics();
        let inserted = self.topics.insert_many(&seeds).await?;
        info!(unused, inserted, "Topic backlog was low, seeded new topics");
        Ok(())
    }

    async fn run_cycle_logged(&self) {
        match self.run_cycle().await {
            Ok(Some(post_id)) => info!(post_id, "Generation cycle completed"),
            Ok(None) => {}
            Err(err) => error!(error = %err, "Generation cycle failed"),
        }
    }

    /// One full pipeline run. `Ok(None)` means no unused topic was
    /// available. Nothing is persisted until the final post insert, so
    /// a failure at any step needs no rollback.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<Option<i32>, GenerationError> {
        if self
            .cycle_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GenerationError::CycleInProgress);
        }
        let _guard = CycleGuard(&self.cycle_in_flight);
        self.run_cycle_inner().await
    }

    async fn run_cycle_inner(&self) -> Result<Option<i32>, GenerationError> {
        let Some(topic) = self.topics.pick_unused(1).await?.into_iter().next() else {
            warn!("No unused topics available, skipping generation cycle");
            return Ok(None);
        };

        info!(topic_id = topic.id, topic = %topic.text, "Generating article");

        let article = self.generate_article(&topic).await?;
        let image_url = self.generate_image(&article, &topic).await?;

        let slug = self.unique_slug(&article.slug).await?;
        let now = Utc::now().naive_utc();

        let new_post = NewPost {
            slug,
            hero_image_alt: article.title.clone(),
            title: article.title,
            excerpt: article.excerpt,
            body: article.body,
            meta_description: article.meta_description,
            keywords: serde_json::to_string(&article.keywords)
                .unwrap_or_else(|_| "[]".to_string()),
            category: topic.category.clone(),
            author: DEFAULT_AUTHOR.to_string(),
            read_time_minutes: article.read_time_minutes,
            hero_image_url: image_url,
            published: true,
            published_at: Some(now),
        };

        let post = self.posts.create(&new_post).await?;
        self.topics.mark_used(topic.id).await?;

        info!(post_id = post.id, slug = %post.slug, "Published generated post");
        Ok(Some(post.id))
    }

    async fn generate_article(&self, topic: &Topic) -> Result<GeneratedArticle, GenerationError> {
        let keywords = topic.keyword_list();
        let log = NewGenerationLog::text_call(&topic.text, self.content.model());

        match self
            .content
            .generate(&topic.text, &topic.category, &keywords)
            .await
        {
            Ok(article) => {
                self.append_log(log.succeeded()).await;
                Ok(article)
            }
            Err(err) => {
                let raw = match &err {
                    GenerationError::Parse { raw, .. } => Some(raw.clone()),
                    _ => None,
                };
                self.append_log(log.failed(err.to_string(), raw)).await;
                Err(err)
            }
        }
    }

    async fn generate_image(
        &self,
        article: &GeneratedArticle,
        topic: &Topic,
    ) -> Result<String, GenerationError> {
        let log = NewGenerationLog::image_call(&article.image_prompt, self.image.model());

        match self
            .image
            .generate_hero_image(&article.image_prompt, &topic.category)
            .await
        {
            Ok(url) => {
                self.append_log(log.succeeded()).await;
                Ok(url)
            }
            Err(err) => {
                self.append_log(log.failed(err.to_string(), None)).await;
                Err(err)
            }
        }
    }

    /// A failed diagnostic write must not abort an otherwise healthy
    /// cycle.
    async fn append_log(&self, entry: NewGenerationLog) {
        if let Err(err) = self.logs.append(&entry).await {
            warn!(error = %err, "Failed to append generation log entry");
        }
    }

    /// On collision, appends `-2`, `-3`, ... until the slug is free.
    async fn unique_slug(&self, base: &str) -> Result<String, GenerationError> {
        if !self.posts.slug_exists(base).await? {
            return Ok(base.to_string());
        }
        let mut suffix = 2u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !self.posts.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

#[async_trait]
impl<T, P, L, C, I> SchedulerService for BlogScheduler<T, P, L, C, I>
where
    T: TopicRepository,
    P: PostRepository,
    L: GenerationLogRepository,
    C: ContentGenerator,
    I: ImageGenerator,
{
    async fn trigger_manual(&self) -> ManualGenerationOutcome {
        match self.run_cycle().await {
            Ok(Some(post_id)) => ManualGenerationOutcome {
                success: true,
                post_id: Some(post_id),
                error: None,
            },
            Ok(None) => ManualGenerationOutcome {
                success: false,
                post_id: None,
                error: Some("no unused topics available".to_string()),
            },
            Err(err) => ManualGenerationOutcome {
                success: false,
                post_id: None,
                error: Some(err.to_string()),
            },
        }
    }

    async fn status(&self) -> Result<ScheduleStatus, GenerationError> {
        let post_stats = self.posts.stats().await?;
        let unused_topics = self.topics.count_unused().await?;
        let is_running = self.is_running();

        let next_generation = if is_running {
            let interval = chrono::Duration::from_std(self.config.interval)
                .unwrap_or_else(|_| chrono::Duration::hours(12));
            Some(Utc::now() + interval)
        } else {
            None
        };

        Ok(ScheduleStatus {
            is_running,
            next_generation,
            stats: SchedulerStats {
                total_generated: post_stats.total_generated,
                total_published: post_stats.total_published,
                today_generated: post_stats.today_generated,
                unused_topics,
            },
        })
    }
}
