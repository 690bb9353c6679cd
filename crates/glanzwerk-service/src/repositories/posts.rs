use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

use super::traits::{PostRepository, PostStats};
use crate::errors::GenerationError;
use crate::models::{NewPost, Post};
use crate::schema::posts;

#[derive(Clone)]
pub struct SqlitePostRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqlitePostRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn create(&self, post: &NewPost) -> Result<Post, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let result = diesel::insert_into(posts::table)
            .values(post)
            .returning(Post::as_returning())
            .get_result::<Post>(&mut *conn)?;
        Ok(result)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let count: i64 = posts::table
            .filter(posts::slug.eq(slug))
            .count()
            .get_result(&mut *conn)?;
        Ok(count > 0)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let result = posts::table
            .filter(posts::slug.eq(slug))
            .first::<Post>(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn list_published(&self, limit: u32) -> Result<Vec<Post>, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let result = posts::table
            .filter(posts::published.eq(true))
            .order(posts::published_at.desc())
            .limit(i64::from(limit))
            .load::<Post>(&mut *conn)?;
        Ok(result)
    }

    async fn stats(&self) -> Result<PostStats, GenerationError> {
        let mut conn = self.db.lock().unwrap();

        let total_generated: i64 = posts::table.count().get_result(&mut *conn)?;
        let total_published: i64 = posts::table
            .filter(posts::published.eq(true))
            .count()
            .get_result(&mut *conn)?;

        let midnight = Utc::now().date_naive().and_time(chrono::NaiveTime::MIN);
        let today_generated: i64 = posts::table
            .filter(posts::created_at.ge(midnight))
            .count()
            .get_result(&mut *conn)?;

        Ok(PostStats {
            total_generated,
            total_published,
            today_generated,
        })
    }
}
