use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_url = |var: &str, raw: String| -> Result<String, ConfigError> {
        reqwest::Url::parse(&raw).map_err(|e| invalid(var, e.to_string()))?;
        Ok(raw)
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("CROSSDASH_ENV", "development"))?;
    let log_level = or_default("CROSSDASH_LOG_LEVEL", "info");
    let user_agent = or_default("CROSSDASH_USER_AGENT", "crossdash/0.1 (emergency-routing)");

    let resolver_url = parse_url(
        "CROSSDASH_RESOLVER_URL",
        or_default("CROSSDASH_RESOLVER_URL", "http://127.0.0.1:5000"),
    )?;
    let resolver_timeout_secs = parse_u64("CROSSDASH_RESOLVER_TIMEOUT_SECS", "30")?;

    let routing_url = parse_url(
        "CROSSDASH_ROUTING_URL",
        or_default("CROSSDASH_ROUTING_URL", "https://maps.googleapis.com/maps/api/"),
    )?;
    let routing_api_key = optional("CROSSDASH_ROUTING_API_KEY");
    let routing_timeout_secs = parse_u64("CROSSDASH_ROUTING_TIMEOUT_SECS", "30")?;

    if env == Environment::Production && routing_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "CROSSDASH_ROUTING_API_KEY".to_string(),
        ));
    }

    let location_url = optional("CROSSDASH_LOCATION_URL")
        .map(|raw| parse_url("CROSSDASH_LOCATION_URL", raw))
        .transpose()?;
    let location_timeout_secs = parse_u64("CROSSDASH_LOCATION_TIMEOUT_SECS", "10")?;

    let fixed_location = optional("CROSSDASH_FIXED_LOCATION")
        .map(|raw| {
            raw.parse::<Coordinate>()
                .map_err(|e| invalid("CROSSDASH_FIXED_LOCATION", e.to_string()))
        })
        .transpose()?;

    let eta_tick_secs = parse_u64("CROSSDASH_ETA_TICK_SECS", "60")?;
    if eta_tick_secs == 0 {
        return Err(invalid(
            "CROSSDASH_ETA_TICK_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        user_agent,
        resolver_url,
        resolver_timeout_secs,
        routing_url,
        routing_api_key,
        routing_timeout_secs,
        location_url,
        location_timeout_secs,
        fixed_location,
        eta_tick_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CROSSDASH_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
