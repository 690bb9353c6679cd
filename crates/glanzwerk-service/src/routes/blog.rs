use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::models::Post;
use crate::repositories::PostRepository;
use crate::AppState;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct ListPostsQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostResponse {
    id: i32,
    slug: String,
    title: String,
    excerpt: String,
    body: String,
    meta_description: String,
    keywords: Vec<String>,
    category: String,
    author: String,
    read_time: i32,
    hero_image_url: String,
    hero_image_alt: String,
    published: bool,
    published_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id,
            slug: post.slug,
            title: post.title,
            excerpt: post.excerpt,
            meta_description: post.meta_description,
            keywords: serde_json::from_str(&post.keywords).unwrap_or_default(),
            body: post.body,
            category: post.category,
            author: post.author,
            read_time: post.read_time_minutes,
            hero_image_url: post.hero_image_url,
            hero_image_alt: post.hero_image_alt,
            published: post.published,
            published_at: post.published_at,
            created_at: post.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListPostsResponse {
    success: bool,
    posts: Vec<PostResponse>,
}

#[derive(Debug, Serialize)]
struct SinglePostResponse {
    success: bool,
    post: PostResponse,
}

#[instrument(skip_all, fields(limit = query.limit))]
async fn list_posts<S: AppState>(
    State(state): State<S>,
    Query(query): Query<ListPostsQuery>,
) -> Result<ResponseJson<ListPostsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(ApiError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }

    let posts = state
        .post_repo()
        .list_published(limit.min(MAX_LIMIT))
        .await?;

    info!(returned_count = posts.len(), "Listed published posts");

    Ok(ResponseJson(ListPostsResponse {
        success: true,
        posts: posts.into_iter().map(PostResponse::from).collect(),
    }))
}

#[instrument(skip_all, fields(slug = %slug))]
async fn get_post_by_slug<S: AppState>(
    State(state): State<S>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<SinglePostResponse>, ApiError> {
    debug!("Looking up post by slug");

    match state.post_repo().find_by_slug(&slug).await? {
        Some(post) => Ok(ResponseJson(SinglePostResponse {
            success: true,
            post: post.into(),
        })),
        None => {
            debug!("Post not found");
            Err(ApiError::NotFound)
        }
    }
}

pub fn create_blog_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/", get(list_posts::<S>))
        .route("/{slug}", get(get_post_by_slug::<S>))
}
