//! Environment detection configuration module

use serde::{Deserialize, Serialize};

/// Runtime environment the server is deployed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Development
    }
}

impl Environment {
    /// Detect the environment from the `ENVIRONMENT` variable.
    ///
    /// Unknown values fall back to development so a typo never
    /// accidentally enables production behavior.
    pub fn from_env() -> Self {
        match std::env::var("ENVIRONMENT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Default tracing filter directive for this environment.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Environment::Development => "debug,actix_web=info",
            Environment::Staging => "info",
            Environment::Production => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_environment_defaults_to_development() {
        std::env::set_var("ENVIRONMENT", "qa-sandbox");
        assert_eq!(Environment::from_env(), Environment::Development);
        std::env::remove_var("ENVIRONMENT");
    }

    #[test]
    fn test_production_aliases() {
        std::env::set_var("ENVIRONMENT", "prod");
        assert_eq!(Environment::from_env(), Environment::Production);
        std::env::remove_var("ENVIRONMENT");
    }
}
