use crate::app_config::{AiConfig, AppConfig, Environment, ReviewSourceConfig};
use crate::review::Platform;
use crate::ConfigError;

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";
const DEFAULT_REDDIT_USER_AGENT: &str = "ORM-Review-Tool/1.0";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("REPSCORE_ENV", "development"))?;

    let bind_addr = or_default("REPSCORE_BIND_ADDR", "0.0.0.0:5000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("REPSCORE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("REPSCORE_LOG_LEVEL", "info");
    let database_url = optional("DATABASE_URL");

    let db_max_connections = parse_u32("REPSCORE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("REPSCORE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("REPSCORE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let cache_ttl_secs = parse_u64("REPSCORE_CACHE_TTL_SECS", "3600")?;
    let branch_timeout_secs = parse_u64("REPSCORE_BRANCH_TIMEOUT_SECS", "45")?;
    if branch_timeout_secs == 0 {
        return Err(invalid(
            "REPSCORE_BRANCH_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let http_timeout_secs = parse_u64("REPSCORE_HTTP_TIMEOUT_SECS", "10")?;
    let http_user_agent = or_default(
        "REPSCORE_HTTP_USER_AGENT",
        "repscore/0.1 (reputation-analysis)",
    );
    let http_max_retries = parse_u32("REPSCORE_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_base_ms = parse_u64("REPSCORE_HTTP_RETRY_BACKOFF_BASE_MS", "500")?;

    let review_platforms = parse_platforms(&or_default(
        "REPSCORE_REVIEW_PLATFORMS",
        "google,yelp,reddit",
    ))?;
    let rate_limit_per_minute = parse_usize("REPSCORE_RATE_LIMIT_PER_MINUTE", "60")?;

    let ai = AiConfig {
        anthropic_api_key: optional("ANTHROPIC_API_KEY"),
        anthropic_model: or_default("REPSCORE_ANTHROPIC_MODEL", DEFAULT_ANTHROPIC_MODEL),
        openai_api_key: optional("OPENAI_API_KEY"),
        openai_model: or_default("REPSCORE_OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
    };

    let sources = ReviewSourceConfig {
        google_places_api_key: optional("GOOGLE_PLACES_API_KEY"),
        yelp_api_key: optional("YELP_API_KEY"),
        reddit_client_id: optional("REDDIT_CLIENT_ID"),
        reddit_client_secret: optional("REDDIT_CLIENT_SECRET"),
        reddit_user_agent: or_default("REDDIT_USER_AGENT", DEFAULT_REDDIT_USER_AGENT),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        cache_ttl_secs,
        branch_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_base_ms,
        review_platforms,
        rate_limit_per_minute,
        ai,
        sources,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REPSCORE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parse a comma-separated platform list, dropping duplicates while keeping order.
fn parse_platforms(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    let mut platforms = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let platform = token
            .parse::<Platform>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "REPSCORE_REVIEW_PLATFORMS".to_string(),
                reason: e.to_string(),
            })?;
        if !platforms.contains(&platform) {
            platforms.push(platform);
        }
    }
    Ok(platforms)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
