use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "CROSSDASH_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, "crossdash/0.1 (emergency-routing)");
    assert_eq!(cfg.resolver_url, "http://127.0.0.1:5000");
    assert_eq!(cfg.resolver_timeout_secs, 30);
    assert_eq!(cfg.routing_url, "https://maps.googleapis.com/maps/api/");
    assert!(cfg.routing_api_key.is_none());
    assert_eq!(cfg.routing_timeout_secs, 30);
    assert!(cfg.location_url.is_none());
    assert_eq!(cfg.location_timeout_secs, 10);
    assert!(cfg.fixed_location.is_none());
    assert_eq!(cfg.eta_tick_secs, 60);
}

#[test]
fn build_app_config_requires_routing_key_in_production() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ENV", "production");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CROSSDASH_ROUTING_API_KEY"),
        "expected MissingEnvVar(CROSSDASH_ROUTING_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_accepts_production_with_routing_key() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ENV", "production");
    map.insert("CROSSDASH_ROUTING_API_KEY", "maps-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.routing_api_key.as_deref(), Some("maps-key"));
}

#[test]
fn build_app_config_treats_blank_routing_key_as_absent() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ROUTING_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.routing_api_key.is_none());
}

#[test]
fn build_app_config_rejects_invalid_resolver_url() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_RESOLVER_URL", "not a url");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CROSSDASH_RESOLVER_URL"),
        "expected InvalidEnvVar(CROSSDASH_RESOLVER_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_location_url() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_LOCATION_URL", "::nope::");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CROSSDASH_LOCATION_URL"),
        "expected InvalidEnvVar(CROSSDASH_LOCATION_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_parses_fixed_location() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_FIXED_LOCATION", "40.7128,-74.0060");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let fixed = cfg.fixed_location.expect("fixed location should be set");
    assert!((fixed.latitude - 40.7128).abs() < f64::EPSILON);
    assert!((fixed.longitude + 74.006).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_rejects_out_of_range_fixed_location() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_FIXED_LOCATION", "140.0,10.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CROSSDASH_FIXED_LOCATION"),
        "expected InvalidEnvVar(CROSSDASH_FIXED_LOCATION), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_tick() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ETA_TICK_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CROSSDASH_ETA_TICK_SECS"),
        "expected InvalidEnvVar(CROSSDASH_ETA_TICK_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_tick_override() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ETA_TICK_SECS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.eta_tick_secs, 5);
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_RESOLVER_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CROSSDASH_RESOLVER_TIMEOUT_SECS"),
        "expected InvalidEnvVar(CROSSDASH_RESOLVER_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn debug_redacts_routing_key() {
    let mut map = HashMap::new();
    map.insert("CROSSDASH_ROUTING_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("[redacted]"));
}
