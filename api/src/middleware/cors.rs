//! CORS middleware configuration for cross-origin requests.
//!
//! The public booking widget and the staff console are served from
//! different origins than the API, so CORS is part of the standard
//! pipeline. Development is permissive; production only admits the
//! origins named in configuration.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use tracing::info;

use sn_shared::config::{Environment, ServerConfig};

/// Creates a CORS middleware instance for the current environment.
pub fn create_cors(environment: Environment, server: &ServerConfig) -> Cors {
    if environment.is_production() {
        create_production_cors(server)
    } else {
        create_development_cors(server)
    }
}

/// Permissive CORS for local development and staging.
fn create_development_cors(server: &ServerConfig) -> Cors {
    info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            header::USER_AGENT,
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(server.cors_max_age)
}

/// Restrictive CORS for production: configured origins only.
fn create_production_cors(server: &ServerConfig) -> Cors {
    info!(
        origins = server.allowed_origins.len(),
        "Configuring CORS for production environment"
    );

    let mut cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(server.cors_max_age);

    for origin in &server.allowed_origins {
        info!(origin = %origin, "Adding allowed origin");
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cors_for_both_environments() {
        let server = ServerConfig {
            allowed_origins: vec!["https://app.serena.example".to_string()],
            ..Default::default()
        };
        let _dev = create_cors(Environment::Development, &server);
        let _prod = create_cors(Environment::Production, &server);
    }
}
