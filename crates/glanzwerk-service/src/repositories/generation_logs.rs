use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

use super::traits::GenerationLogRepository;
use crate::errors::GenerationError;
use crate::models::NewGenerationLog;
use crate::schema::generation_logs;

#[derive(Clone)]
pub struct SqliteGenerationLogRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteGenerationLogRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GenerationLogRepository for SqliteGenerationLogRepository {
    async fn append(&self, entry: &NewGenerationLog) -> Result<(), GenerationError> {
        let mut conn = self.db.lock().unwrap();
        diesel::insert_into(generation_logs::table)
            .values(entry)
            .execute(&mut *conn)?;
        Ok(())
    }
}
