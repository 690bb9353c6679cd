pub mod generation_logs;
pub mod posts;
pub mod topics;
pub mod traits;

pub use generation_logs::SqliteGenerationLogRepository;
pub use posts::SqlitePostRepository;
pub use topics::SqliteTopicRepository;
pub use traits::{GenerationLogRepository, PostRepository, PostStats, TopicRepository};
