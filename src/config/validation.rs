use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, RankingConfig, StorageBackend, StorageConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_ranking_config(&config.ranking)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.default_depth < 0 {
        return Err(ConfigError::Validation(format!(
            "default_depth must be >= 0, got {}",
            config.default_depth
        )));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max_links_per_page must be >= 1, got {}",
            config.max_links_per_page
        )));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.http_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "http_timeout_ms must be >= 100ms, got {}ms",
            config.http_timeout_ms
        )));
    }

    if config.navigation_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 100ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.shell_markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "shell_markers cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates ranking configuration
fn validate_ranking_config(config: &RankingConfig) -> Result<(), ConfigError> {
    if !config.min_score.is_finite() || config.min_score < 0.0 {
        return Err(ConfigError::Validation(format!(
            "min_score must be a non-negative number, got {}",
            config.min_score
        )));
    }

    if config.max_findings < 1 {
        return Err(ConfigError::Validation(format!(
            "max_findings must be >= 1, got {}",
            config.max_findings
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.backend == StorageBackend::Sqlite && config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty with the sqlite backend".to_string(),
        ));
    }

    Ok(())
}
