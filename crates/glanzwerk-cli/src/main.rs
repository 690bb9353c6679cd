use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

#[derive(Parser)]
#[command(name = "glanzwerk")]
#[command(about = "Operator CLI for the Glanzwerk blog automation service")]
struct Cli {
    /// Base URL for the Glanzwerk service
    #[arg(long, default_value = "http://localhost:3000")]
    service_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show scheduler state and generation counters
    Status,
    /// Trigger one generation cycle now
    Generate,
    /// List published posts
    List {
        /// Maximum number of posts to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show a single post by slug
    Show { slug: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    is_running: bool,
    next_generation: Option<String>,
    stats: Stats,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    total_generated: i64,
    total_published: i64,
    today_generated: i64,
    unused_topics: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TriggerResponse {
    success: bool,
    message: String,
    post_id: Option<i32>,
}

#[derive(Deserialize)]
struct ListResponse {
    posts: Vec<PostSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostSummary {
    slug: String,
    title: String,
    category: String,
    published_at: Option<String>,
}

#[derive(Deserialize)]
struct SinglePostResponse {
    post: PostDetail,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostDetail {
    title: String,
    category: String,
    author: String,
    read_time: i32,
    excerpt: String,
    hero_image_url: String,
    keywords: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Status => status(&client, &cli.service_url).await?,
        Commands::Generate => generate(&client, &cli.service_url).await?,
        Commands::List { limit } => list(&client, &cli.service_url, limit).await?,
        Commands::Show { slug } => show(&client, &cli.service_url, &slug).await?,
    }

    Ok(())
}

async fn status(client: &Client, service_url: &str) -> Result<(), Box<dyn Error>> {
    let endpoint = format!("{service_url}/api/admin/blog-status");
    let response: StatusResponse = client.get(&endpoint).send().await?.json().await?;

    println!(
        "Scheduler: {}",
        if response.is_running { "running" } else { "stopped" }
    );
    if let Some(next) = response.next_generation {
        println!("Next generation (approx.): {next}");
    }
    println!("Total generated:  {}", response.stats.total_generated);
    println!("Total published:  {}", response.stats.total_published);
    println!("Generated today:  {}", response.stats.today_generated);
    println!("Unused topics:    {}", response.stats.unused_topics);
    Ok(())
}

async fn generate(client: &Client, service_url: &str) -> Result<(), Box<dyn Error>> {
    let endpoint = format!("{service_url}/api/admin/generate-blog");
    let response: TriggerResponse = client.post(&endpoint).send().await?.json().await?;

    if response.success {
        match response.post_id {
            Some(id) => println!("Generated post {id}"),
            None => println!("{}", response.message),
        }
    } else {
        eprintln!("Generation failed: {}", response.message);
        std::process::exit(1);
    }
    Ok(())
}

async fn list(client: &Client, service_url: &str, limit: u32) -> Result<(), Box<dyn Error>> {
    let endpoint = format!("{service_url}/api/blog?limit={limit}");
    let response: ListResponse = client.get(&endpoint).send().await?.json().await?;

    if response.posts.is_empty() {
        println!("No published posts yet.");
        return Ok(());
    }

    for post in response.posts {
        let published = post.published_at.unwrap_or_else(|| "-".to_string());
        println!("{published}  [{}]  {}  ({})", post.category, post.title, post.slug);
    }
    Ok(())
}

async fn show(client: &Client, service_url: &str, slug: &str) -> Result<(), Box<dyn Error>> {
    let endpoint = format!("{service_url}/api/blog/{slug}");
    let response = client.get(&endpoint).send().await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        eprintln!("No post with slug '{slug}'");
        std::process::exit(1);
    }

    let body: SinglePostResponse = response.json().await?;
    let post = body.post;

    println!("{}", post.title);
    println!("Category:   {}", post.category);
    println!("Author:     {}", post.author);
    println!("Read time:  {} min", post.read_time);
    println!("Keywords:   {}", post.keywords.join(", "));
    println!("Hero image: {}", post.hero_image_url);
    println!();
    println!("{}", post.excerpt);
    Ok(())
}
