use crate::services::generation_service::ImageGenerator;
use crate::services::youtube_service::YoutubeDataApi;
use crate::AppState;
use anyhow::{Context, Result};
use env_logger::Builder;
use log::{info, LevelFilter};
use reqwest::Client;
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::time::Duration;

const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_TOGETHER_API_BASE: &str = "https://api.together.xyz";
const DEFAULT_GENERATION_MODEL: &str = "black-forest-labs/FLUX.1-canny";
const DEFAULT_YOUTUBE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

/// Runtime configuration, resolved once at startup. API keys travel from here
/// into the client constructors; nothing reads the environment afterwards.
pub struct AppConfig {
    pub youtube_api_key: String,
    pub together_api_key: String,
    pub youtube_api_base: String,
    pub together_api_base: String,
    pub generation_model: String,
    pub youtube_timeout: Duration,
    pub generation_timeout: Duration,
    pub allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AppConfig {
            youtube_api_key: env::var("YOUTUBE_API_KEY")
                .context("YOUTUBE_API_KEY environment variable must be set")?,
            together_api_key: env::var("TOGETHER_API_KEY")
                .context("TOGETHER_API_KEY environment variable must be set")?,
            youtube_api_base: env::var("YOUTUBE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_YOUTUBE_API_BASE.to_string()),
            together_api_base: env::var("TOGETHER_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TOGETHER_API_BASE.to_string()),
            generation_model: env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| DEFAULT_GENERATION_MODEL.to_string()),
            youtube_timeout: Duration::from_secs(env_secs(
                "YOUTUBE_TIMEOUT_SECS",
                DEFAULT_YOUTUBE_TIMEOUT_SECS,
            )),
            generation_timeout: Duration::from_secs(env_secs(
                "GENERATION_TIMEOUT_SECS",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )),
            allowed_origin: env::var("ALLOWED_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN.to_string()),
        })
    }
}

fn env_secs(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(default)
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

fn create_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

pub fn create_app_state(config: AppConfig) -> Result<AppState> {
    let youtube = YoutubeDataApi::new(
        create_http_client(config.youtube_timeout)?,
        config.youtube_api_key,
        config.youtube_api_base,
    );
    info!("Video data source: YouTube Data API v3");

    let generator = ImageGenerator::new(
        create_http_client(config.generation_timeout)?,
        config.together_api_key,
        config.together_api_base,
        config.generation_model,
    );

    Ok(AppState { youtube, generator })
}

pub fn create_cors(allowed_origin: &str) -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[allowed_origin]))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
