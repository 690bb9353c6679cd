use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

use super::traits::TopicRepository;
use crate::errors::GenerationError;
use crate::models::{NewTopic, Topic};
use crate::schema::topics;

#[derive(Clone)]
pub struct SqliteTopicRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteTopicRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TopicRepository for SqliteTopicRepository {
    async fn pick_unused(&self, limit: u32) -> Result<Vec<Topic>, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let result = topics::table
            .filter(topics::used.eq(false))
            .order(topics::id.asc())
            .limit(i64::from(limit))
            .load::<Topic>(&mut *conn)?;
        Ok(result)
    }

    async fn mark_used(&self, id: i32) -> Result<(), GenerationError> {
        let mut conn = self.db.lock().unwrap();
        diesel::update(topics::table.find(id))
            .set(topics::used.eq(true))
            .execute(&mut *conn)?;
        Ok(())
    }

    async fn insert_many(&self, new_topics: &[NewTopic]) -> Result<usize, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let inserted = diesel::insert_into(topics::table)
            .values(new_topics)
            .execute(&mut *conn)?;
        Ok(inserted)
    }

    async fn count_unused(&self) -> Result<i64, GenerationError> {
        let mut conn = self.db.lock().unwrap();
        let count = topics::table
            .filter(topics::used.eq(false))
            .count()
            .get_result(&mut *conn)?;
        Ok(count)
    }
}
