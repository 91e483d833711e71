use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub user_agent: String,
    pub resolver_url: String,
    pub resolver_timeout_secs: u64,
    pub routing_url: String,
    pub routing_api_key: Option<String>,
    pub routing_timeout_secs: u64,
    pub location_url: Option<String>,
    pub location_timeout_secs: u64,
    pub fixed_location: Option<Coordinate>,
    pub eta_tick_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field("resolver_url", &self.resolver_url)
            .field("resolver_timeout_secs", &self.resolver_timeout_secs)
            .field("routing_url", &self.routing_url)
            .field(
                "routing_api_key",
                &self.routing_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("routing_timeout_secs", &self.routing_timeout_secs)
            .field("location_url", &self.location_url)
            .field("location_timeout_secs", &self.location_timeout_secs)
            .field("fixed_location", &self.fixed_location)
            .field("eta_tick_secs", &self.eta_tick_secs)
            .finish()
    }
}
