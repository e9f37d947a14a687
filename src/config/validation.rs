use crate::config::types::{
    Config, FieldConfig, IndexConfig, InstancesConfig, ScraperConfig, UserAgentConfig,
};
use crate::query::Query;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;

    match (&config.index, &config.instances) {
        (Some(index), None) => validate_index_config(index)?,
        (None, Some(instances)) => validate_instances_config(instances)?,
        (Some(_), Some(_)) => {
            return Err(ConfigError::Validation(
                "configure either [index] or [instances], not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(ConfigError::Validation(
                "one of [index] or [instances] is required".to_string(),
            ))
        }
    }

    validate_fields(&config.fields)?;
    Ok(())
}

/// Validates scraper behavior configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.cache_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "cache_dir cannot be empty".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates the index section
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.urls.is_empty() {
        return Err(ConfigError::Validation(
            "[index] must list at least one URL".to_string(),
        ));
    }

    for url in &config.urls {
        Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index URL '{}': {}", url, e)))?;
    }

    validate_selector(&config.selector, config.selector_method, "[index]")
}

/// Validates the explicit instance list
///
/// Instance URLs are not parsed here: a malformed instance URL is scraped as
/// an empty page rather than rejected up front.
fn validate_instances_config(config: &InstancesConfig) -> Result<(), ConfigError> {
    if config.urls.is_empty() {
        return Err(ConfigError::Validation(
            "[instances] must list at least one URL".to_string(),
        ));
    }
    Ok(())
}

/// Validates extracted fields
fn validate_fields(fields: &[FieldConfig]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for field in fields {
        if field.name.is_empty() {
            return Err(ConfigError::Validation(
                "field name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }

        if field.attribute.as_deref() == Some("") {
            return Err(ConfigError::Validation(format!(
                "field '{}' has an empty attribute name",
                field.name
            )));
        }

        validate_selector(
            &field.selector,
            field.selector_method,
            &format!("field '{}'", field.name),
        )?;
    }

    Ok(())
}

fn validate_selector(
    selector: &str,
    method: crate::query::SelectorMethod,
    owner: &str,
) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} selector cannot be empty",
            owner
        )));
    }

    Query::compile(selector, method)
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(format!("{}: {}", owner, e)))
}
