use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use glanzwerk_service::categories::ServiceCategory;
use glanzwerk_service::models::NewTopic;
use glanzwerk_service::scheduler::{DEFAULT_AUTHOR, SchedulerService};
use glanzwerk_service::test_helpers::test_utils;

mod common;

use common::{FAKE_IMAGE_URL, FakeContentGenerator, FakeImageGenerator, build_scheduler};

fn fenster_topic() -> NewTopic {
    NewTopic::new(
        "Fenster putzen ohne Streifen",
        ServiceCategory::Fensterreinigung,
        &["Fensterreinigung", "Streifen"],
    )
}

#[tokio::test]
async fn successful_cycle_publishes_one_post_and_consumes_the_topic() {
    let context = build_scheduler(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let outcome = context.scheduler.trigger_manual().await;

    assert!(outcome.success, "unexpected error: {:?}", outcome.error);
    assert!(outcome.post_id.is_some());

    let mut conn = context.db.lock().unwrap();
    assert_eq!(test_utils::count_posts(&mut conn), 1);

    let post = test_utils::get_post_by_slug(&mut conn, "fenster-putzen-ohne-streifen")
        .expect("post should exist");
    assert!(post.published);
    assert!(post.published_at.is_some());
    assert_eq!(post.author, DEFAULT_AUTHOR);
    assert_eq!(post.category, "fensterreinigung");
    assert_eq!(post.hero_image_url, FAKE_IMAGE_URL);
    assert_eq!(post.keyword_list(), vec!["Fensterreinigung", "Streifen"]);

    let topics = test_utils::get_all_topics(&mut conn);
    assert_eq!(topics.len(), 1);
    assert!(topics[0].used, "topic should be marked used");
}

#[tokio::test]
async fn status_reports_zero_unused_topics_after_the_only_topic_is_consumed() {
    let context = build_scheduler(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let before = context.scheduler.status().await.unwrap();
    assert_eq!(before.stats.unused_topics, 1);
    assert_eq!(before.stats.total_generated, 0);

    context.scheduler.trigger_manual().await;

    let after = context.scheduler.status().await.unwrap();
    assert_eq!(after.stats.unused_topics, 0);
    assert_eq!(after.stats.total_generated, 1);
    assert_eq!(after.stats.total_published, 1);
    assert_eq!(after.stats.today_generated, 1);
    assert!(!after.is_running);
    assert!(after.next_generation.is_none());
}

#[tokio::test]
async fn content_failure_leaves_topic_unused_and_writes_no_post() {
    let context = build_scheduler(
        FakeContentGenerator::failing("text API returned 503"),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let outcome = context.scheduler.trigger_manual().await;

    assert!(!outcome.success);
    assert!(outcome.post_id.is_none());
    assert!(outcome.error.unwrap().contains("text API returned 503"));

    let mut conn = context.db.lock().unwrap();
    assert_eq!(test_utils::count_posts(&mut conn), 0);
    let topics = test_utils::get_all_topics(&mut conn);
    assert!(!topics[0].used, "failed cycle must not consume the topic");
}

#[tokio::test]
async fn image_failure_also_aborts_before_any_write() {
    let image = FakeImageGenerator::failing("image API returned 429");
    let context = build_scheduler(FakeContentGenerator::succeeding(), image.clone());
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let outcome = context.scheduler.trigger_manual().await;

    assert!(!outcome.success);
    assert_eq!(image.call_count(), 1);

    let mut conn = context.db.lock().unwrap();
    assert_eq!(test_utils::count_posts(&mut conn), 0);
    assert!(!test_utils::get_all_topics(&mut conn)[0].used);
}

#[tokio::test]
async fn manual_trigger_without_topics_reports_failure() {
    let content = FakeContentGenerator::succeeding();
    let context = build_scheduler(content.clone(), FakeImageGenerator::succeeding());

    let outcome = context.scheduler.trigger_manual().await;

    assert!(!outcome.success);
    assert!(outcome.post_id.is_none());
    assert!(outcome.error.unwrap().contains("no unused topics"));
    assert_eq!(content.call_count(), 0, "no upstream call without a topic");

    let mut conn = context.db.lock().unwrap();
    assert_eq!(test_utils::count_posts(&mut conn), 0);
}

#[tokio::test]
async fn slug_collision_appends_numeric_suffix() {
    let context = build_scheduler(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        // Two topics; the fake generator returns the same slug both times
        test_utils::insert_topic(&mut conn, &fenster_topic());
        test_utils::insert_topic(
            &mut conn,
            &NewTopic::new(
                "Fenster putzen ohne Streifen, Teil 2",
                ServiceCategory::Fensterreinigung,
                &["Fensterreinigung"],
            ),
        );
    }

    assert!(context.scheduler.trigger_manual().await.success);
    assert!(context.scheduler.trigger_manual().await.success);

    let mut conn = context.db.lock().unwrap();
    assert!(test_utils::get_post_by_slug(&mut conn, "fenster-putzen-ohne-streifen").is_some());
    assert!(test_utils::get_post_by_slug(&mut conn, "fenster-putzen-ohne-streifen-2").is_some());
}

#[tokio::test]
async fn each_upstream_call_is_recorded_in_the_generation_log() {
    let context = build_scheduler(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    context.scheduler.trigger_manual().await;

    let mut conn = context.db.lock().unwrap();
    // One text call plus one image call
    assert_eq!(test_utils::count_generation_logs(&mut conn), 2);
}

#[tokio::test]
async fn start_runs_an_immediate_cycle_and_stop_halts_the_timer() {
    let context = build_scheduler(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    context.scheduler.clone().start().await;
    assert!(context.scheduler.is_running());

    let status = context.scheduler.status().await.unwrap();
    assert!(status.is_running);
    assert!(status.next_generation.is_some());
    assert_eq!(status.stats.total_generated, 1, "startup cycle must run");

    context.scheduler.stop();
    assert!(!context.scheduler.is_running());
    // Stopping twice is a no-op
    context.scheduler.stop();
}

#[tokio::test]
async fn starting_with_an_empty_backlog_seeds_topics_first() {
    let context = common::build_scheduler_with(
        FakeContentGenerator::succeeding(),
        FakeImageGenerator::succeeding(),
        glanzwerk_service::scheduler::SchedulerConfig {
            interval: Duration::from_secs(3600),
            topic_backlog_threshold: 5,
        },
    );

    context.scheduler.clone().start().await;

    let status = context.scheduler.status().await.unwrap();
    // The startup cycle consumed one of the freshly seeded topics
    assert_eq!(status.stats.total_generated, 1);
    assert!(status.stats.unused_topics > 0);

    context.scheduler.stop();
}

#[tokio::test]
async fn cancelled_cycle_releases_the_in_flight_guard() {
    let gate = Arc::new(Semaphore::new(0));
    let context = build_scheduler(
        FakeContentGenerator::gated(gate.clone()),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let scheduler = context.scheduler.clone();
    let first = tokio::spawn(async move { scheduler.trigger_manual().await });

    // Let the cycle reach the gated generator call, then drop it the way
    // a timed-out HTTP request drops its handler future
    tokio::time::sleep(Duration::from_millis(50)).await;
    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());

    gate.add_permits(1);
    let second = context.scheduler.trigger_manual().await;
    assert!(
        second.success,
        "a cancelled cycle must not wedge the scheduler: {:?}",
        second.error
    );

    let mut conn = context.db.lock().unwrap();
    assert_eq!(test_utils::count_posts(&mut conn), 1);
}

#[tokio::test]
async fn concurrent_second_trigger_is_rejected_while_a_cycle_is_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let context = build_scheduler(
        FakeContentGenerator::gated(gate.clone()),
        FakeImageGenerator::succeeding(),
    );
    {
        let mut conn = context.db.lock().unwrap();
        test_utils::insert_topic(&mut conn, &fenster_topic());
        test_utils::insert_topic(&mut conn, &fenster_topic());
    }

    let scheduler = context.scheduler.clone();
    let first = tokio::spawn(async move { scheduler.trigger_manual().await });

    // Let the first cycle reach the gated generator call
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = context.scheduler.trigger_manual().await;
    assert!(!second.success);
    assert!(second.error.unwrap().contains("already running"));

    // Release the first cycle and let it finish
    gate.add_permits(1);
    let first = first.await.unwrap();
    assert!(first.success);

    let mut conn = context.db.lock().unwrap();
    assert_eq!(
        test_utils::count_posts(&mut conn),
        1,
        "only the guarded first cycle may publish"
    );
}
