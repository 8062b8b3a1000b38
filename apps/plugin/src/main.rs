//! Azure virtual machine data-classification check plugin.

#![forbid(unsafe_code)]

mod host;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use azcheck_application::{DataClassificationProvider, Provider};
use azcheck_core::{AppError, AppResult};
use azcheck_infrastructure::{
    AzureComputeClientFactory, AzureEndpoints, DEFAULT_AUTHORITY_HOST,
    DEFAULT_COMPUTE_API_VERSION, DEFAULT_RESOURCE_MANAGER_ENDPOINT, EnvironmentSecretProvider,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct PluginConfig {
    authority_host: String,
    resource_manager_endpoint: String,
    compute_api_version: String,
    http_timeout_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = PluginConfig::load()?;
    let endpoints = AzureEndpoints::new(
        config.authority_host.as_str(),
        config.resource_manager_endpoint.as_str(),
        config.compute_api_version.as_str(),
    )?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_seconds))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let provider: Arc<dyn Provider> = Arc::new(DataClassificationProvider::new(
        Arc::new(AzureComputeClientFactory::new(http_client, endpoints)),
        Arc::new(EnvironmentSecretProvider::new()),
    ));

    info!(
        authority_host = %config.authority_host,
        resource_manager_endpoint = %config.resource_manager_endpoint,
        compute_api_version = %config.compute_api_version,
        http_timeout_seconds = config.http_timeout_seconds,
        "azcheck-plugin started"
    );

    host::register(provider).await
}

impl PluginConfig {
    fn load() -> AppResult<Self> {
        let authority_host = env_or_default("AZURE_AUTHORITY_HOST", DEFAULT_AUTHORITY_HOST);
        let resource_manager_endpoint = env_or_default(
            "AZURE_RESOURCE_MANAGER_ENDPOINT",
            DEFAULT_RESOURCE_MANAGER_ENDPOINT,
        );
        let compute_api_version =
            env_or_default("AZCHECK_COMPUTE_API_VERSION", DEFAULT_COMPUTE_API_VERSION);
        let http_timeout_seconds = parse_env_u64("AZCHECK_HTTP_TIMEOUT_SECONDS", 30)?;

        if http_timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "AZCHECK_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            authority_host,
            resource_manager_endpoint,
            compute_api_version,
            http_timeout_seconds,
        })
    }
}

// stdout carries the host protocol, so logs go to stderr.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
