//! Converse application composition root
//!
//! Wires configuration, the database pool, the auth backend, and the
//! completion service into a single axum application.

use std::time::Duration;

use axum::Router;
use converse_auth::{AuthBackend, AuthConfig};
use converse_chats::{ChatRepositories, ChatsState};
use converse_common::Config;
use converse_llm::{BackoffPolicy, ChatServiceFactory, LlmConfig};
use sqlx::PgPool;

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    let repos = ChatRepositories::new(pool.clone());

    let auth_config = AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        issuer: config.jwt_issuer.clone(),
        audience: config.jwt_audience.clone(),
    };
    let auth = AuthBackend::new(pool, auth_config);

    let llm_config = LlmConfig {
        api_key: config.openai_api_key.clone(),
        organization: config.openai_organization_id.clone(),
        base_url: config.openai_base_url.clone(),
        default_model: config.chat_model.clone(),
        retry: BackoffPolicy {
            max_retries: config.chat_max_retries,
            initial_delay: Duration::from_millis(config.chat_initial_delay_ms),
        },
    };
    let llm = ChatServiceFactory::create(&config.llm_provider, llm_config);

    let chats_state = ChatsState {
        repos,
        auth,
        llm,
        model: config.chat_model.clone(),
    };

    // Build router — compose domain routes with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Converse API v0.1.0" }))
        .merge(converse_chats::routes().with_state(chats_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
