use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn establish_test_connection() -> SqliteConnection {
    let mut connection =
        SqliteConnection::establish(":memory:").expect("Failed to create in-memory database");

    connection
        .run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    connection
}

pub mod test_utils {
    use super::*;
    use crate::models::{NewTopic, Post, Topic};
    use crate::schema::{generation_logs, posts, topics};

    pub fn count_posts(conn: &mut SqliteConnection) -> i64 {
        posts::table
            .count()
            .get_result(conn)
            .expect("Failed to count posts")
    }

    pub fn get_all_posts(conn: &mut SqliteConnection) -> Vec<Post> {
        posts::table.load::<Post>(conn).expect("Failed to load posts")
    }

    pub fn get_post_by_slug(conn: &mut SqliteConnection, slug: &str) -> Option<Post> {
        posts::table
            .filter(posts::slug.eq(slug))
            .first::<Post>(conn)
            .optional()
            .expect("Failed to query post by slug")
    }

    pub fn get_all_topics(conn: &mut SqliteConnection) -> Vec<Topic> {
        topics::table
            .load::<Topic>(conn)
            .expect("Failed to load topics")
    }

    pub fn insert_topic(conn: &mut SqliteConnection, topic: &NewTopic) {
        diesel::insert_into(topics::table)
            .values(topic)
            .execute(conn)
            .expect("Failed to insert topic");
    }

    pub fn count_generation_logs(conn: &mut SqliteConnection) -> i64 {
        generation_logs::table
            .count()
            .get_result(conn)
            .expect("Failed to count generation logs")
    }
}
