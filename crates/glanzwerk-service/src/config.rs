use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::generators::{ContentGeneratorConfig, ImageGeneratorConfig};
use crate::scheduler::SchedulerConfig;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_INTERVAL_HOURS: u64 = 12;
const DEFAULT_BACKLOG_THRESHOLD: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("DATABASE_URL environment variable must be set")]
    MissingDatabaseUrl,

    #[error("invalid value for {variable}: {value}")]
    InvalidValue { variable: String, value: String },
}

/// Startup configuration, read once from the environment.
///
/// API keys are optional: a missing key disables the corresponding
/// generator client rather than failing process startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_address: String,
    pub scheduler: SchedulerConfig,
    pub content_generator: ContentGeneratorConfig,
    pub image_generator: ImageGeneratorConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;
        let bind_address =
            env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());

        let interval_hours = parse_var("GENERATION_INTERVAL_HOURS", DEFAULT_INTERVAL_HOURS)?;
        let topic_backlog_threshold =
            parse_var("TOPIC_BACKLOG_THRESHOLD", DEFAULT_BACKLOG_THRESHOLD)?;

        let mut content_generator = ContentGeneratorConfig {
            api_key: non_empty(env::var("TEXT_API_KEY").ok()),
            ..ContentGeneratorConfig::default()
        };
        if let Some(base_url) = non_empty(env::var("TEXT_API_BASE_URL").ok()) {
            content_generator.base_url = base_url;
        }
        if let Some(model) = non_empty(env::var("TEXT_API_MODEL").ok()) {
            content_generator.model = model;
        }

        let mut image_generator = ImageGeneratorConfig {
            api_key: non_empty(env::var("IMAGE_API_KEY").ok()),
            ..ImageGeneratorConfig::default()
        };
        if let Some(base_url) = non_empty(env::var("IMAGE_API_BASE_URL").ok()) {
            image_generator.base_url = base_url;
        }
        if let Some(model) = non_empty(env::var("IMAGE_API_MODEL").ok()) {
            image_generator.model = model;
        }

        Ok(ServiceConfig {
            database_url,
            bind_address,
            scheduler: SchedulerConfig {
                interval: interval_from_hours(interval_hours)?,
                topic_backlog_threshold,
            },
            content_generator,
            image_generator,
        })
    }
}

/// A zero interval would panic the timer task inside `tokio::time::interval`,
/// silently killing scheduled generation, so it is rejected at startup.
fn interval_from_hours(hours: u64) -> Result<Duration, ConfigError> {
    if hours == 0 {
        return Err(ConfigError::InvalidValue {
            variable: "GENERATION_INTERVAL_HOURS".to_string(),
            value: "0".to_string(),
        });
    }
    Ok(Duration::from_secs(hours * 60 * 60))
}

fn parse_var<T: std::str::FromStr>(variable: &str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            variable: variable.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_zero_interval_is_rejected() {
        let err = interval_from_hours(0).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref variable, .. }
                if variable == "GENERATION_INTERVAL_HOURS"
        ));
    }

    #[test]
    fn positive_intervals_convert_to_hours() {
        assert_eq!(
            interval_from_hours(12).unwrap(),
            Duration::from_secs(12 * 60 * 60)
        );
    }
}
