use actix_web::{web, HttpServer};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sn_api::app::create_app;
use sn_api::config::{Config, SmsProvider, StoreBackend};
use sn_api::routes::AppState;
use sn_core::domain::entities::Role;
use sn_core::services::auth::{AuthService, CredentialStore};
use sn_core::services::otp::{OtpDelivery, OtpService};
use sn_core::services::rate_limit::RateLimiter;
use sn_core::services::revocation::RevocationRegistry;
use sn_core::services::token::TokenService;
use sn_core::store::ExpiringStore;
use sn_infra::cache::{MemoryStore, RedisStore};
use sn_infra::database::{create_pool, InMemoryCredentialStore, MySqlCredentialStore};
use sn_infra::sms::{MockSmsDelivery, TwilioSmsDelivery};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Configuration problems are fatal before anything else starts
    let config = Config::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.app.environment.default_log_filter())
        }))
        .init();

    info!(
        environment = ?config.app.environment,
        bind = %config.app.server.bind_address(),
        "Starting Serena API server"
    );

    match config.store_backend {
        StoreBackend::Redis => {
            let store = RedisStore::connect(config.app.cache.clone())
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string()))?;
            run_server(Arc::new(store), config).await
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; revocations and rate limits are per-instance");
            run_server(Arc::new(MemoryStore::new()), config).await
        }
    }
}

async fn run_server<K: ExpiringStore + 'static>(store: Arc<K>, config: Config) -> io::Result<()> {
    let delivery: Arc<dyn OtpDelivery> = match config.sms_provider {
        SmsProvider::Twilio => {
            let twilio = TwilioSmsDelivery::from_env()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            Arc::new(twilio)
        }
        SmsProvider::Mock => {
            warn!("Using mock SMS delivery; passcodes are logged, not sent");
            Arc::new(MockSmsDelivery::new())
        }
    };

    let credentials: Arc<dyn CredentialStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string()))?;
            Arc::new(MySqlCredentialStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory dev accounts");
            let dev_accounts = InMemoryCredentialStore::new();
            if let (Ok(username), Ok(password)) = (
                std::env::var("DEV_ACCOUNT_USERNAME"),
                std::env::var("DEV_ACCOUNT_PASSWORD"),
            ) {
                dev_accounts.add_account(&username, &password, Role::Admin);
                info!(username, "Seeded dev account");
            }
            Arc::new(dev_accounts)
        }
    };

    let otp = Arc::new(OtpService::new(
        store.clone(),
        delivery,
        config.app.otp.clone(),
    ));
    let tokens = Arc::new(TokenService::new(config.app.jwt.clone()));
    let revocation = Arc::new(RevocationRegistry::new(store.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(store, &config.app.rate_limit));
    let auth_service = Arc::new(AuthService::new(
        credentials,
        otp,
        tokens,
        revocation,
        rate_limiter.clone(),
    ));

    let state = web::Data::new(AppState::new(auth_service, rate_limiter));
    let environment = config.app.environment;
    let server_config = config.app.server.clone();
    let bind_address = server_config.bind_address();

    info!(bind = %bind_address, "Server listening");

    HttpServer::new(move || create_app(state.clone(), environment, &server_config))
        .bind(&bind_address)?
        .run()
        .await
}
