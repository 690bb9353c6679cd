use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::categories::ServiceCategory;

/// A candidate article subject. Consumed at most once by the scheduler.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::topics)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Topic {
    pub id: i32,
    pub text: String,
    pub category: String,
    pub keywords: String,
    pub used: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl Topic {
    /// Keywords are stored as a JSON array in a TEXT column. A row that
    /// was edited by hand and no longer decodes yields an empty list
    /// instead of failing the cycle.
    pub fn keyword_list(&self) -> Vec<String> {
        serde_json::from_str(&self.keywords).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = crate::schema::topics)]
pub struct NewTopic {
    pub text: String,
    pub category: String,
    pub keywords: String,
}

impl NewTopic {
    pub fn new(text: impl Into<String>, category: ServiceCategory, keywords: &[&str]) -> Self {
        NewTopic {
            text: text.into(),
            category: category.as_str().to_string(),
            keywords: serde_json::to_string(keywords).unwrap_or_else(|_| "[]".to_string()),
        }
    }
}

/// A persisted article with publish state and SEO metadata.
///
/// Invariants maintained by the scheduler and repositories: `slug` is
/// unique, and `published_at` is non-null exactly when `published` is true.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub meta_description: String,
    pub keywords: String,
    pub category: String,
    pub author: String,
    pub read_time_minutes: i32,
    pub hero_image_url: String,
    pub hero_image_alt: String,
    pub published: bool,
    pub published_at: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl Post {
    pub fn keyword_list(&self) -> Vec<String> {
        serde_json::from_str(&self.keywords).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub meta_description: String,
    pub keywords: String,
    pub category: String,
    pub author: String,
    pub read_time_minutes: i32,
    pub hero_image_url: String,
    pub hero_image_alt: String,
    pub published: bool,
    pub published_at: Option<chrono::NaiveDateTime>,
}

/// Append-only diagnostic record, one row per upstream API call.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::generation_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GenerationLog {
    pub id: i32,
    pub kind: String,
    pub prompt: String,
    pub raw_response: Option<String>,
    pub model: String,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::generation_logs)]
pub struct NewGenerationLog {
    pub kind: String,
    pub prompt: String,
    pub raw_response: Option<String>,
    pub model: String,
    pub success: bool,
    pub error: Option<String>,
}

impl NewGenerationLog {
    pub fn text_call(prompt: &str, model: &str) -> Self {
        Self::call("text", prompt, model)
    }

    pub fn image_call(prompt: &str, model: &str) -> Self {
        Self::call("image", prompt, model)
    }

    fn call(kind: &str, prompt: &str, model: &str) -> Self {
        NewGenerationLog {
            kind: kind.to_string(),
            prompt: prompt.to_string(),
            raw_response: None,
            model: model.to_string(),
            success: false,
            error: None,
        }
    }

    pub fn succeeded(mut self) -> Self {
        self.success = true;
        self
    }

    pub fn failed(mut self, error: String, raw_response: Option<String>) -> Self {
        self.success = false;
        self.error = Some(error);
        self.raw_response = raw_response;
        self
    }
}
