//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default chat model when CHAT_MODEL is not set
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (PostgreSQL)
    pub database_url: String,

    /// OpenAI API configuration
    pub openai_api_key: String,
    pub openai_organization_id: Option<String>,
    /// Base URL override for the completion endpoint (local proxies, tests)
    pub openai_base_url: Option<String>,

    /// LLM provider selection ("openai" or "mock")
    pub llm_provider: String,

    /// Chat completion settings
    pub chat_model: String,
    pub chat_max_retries: u32,
    pub chat_initial_delay_ms: u64,

    /// JWT verification
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            openai_api_key: env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY is required"))?,
            openai_organization_id: env::var("OPENAI_ORGANIZATION_ID").ok(),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),

            llm_provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),

            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            chat_max_retries: env::var("CHAT_MAX_RETRIES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            chat_initial_delay_ms: env::var("CHAT_INITIAL_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET is required"))?,
            jwt_issuer: env::var("JWT_ISSUER").ok(),
            jwt_audience: env::var("JWT_AUDIENCE").ok(),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "converse=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}
