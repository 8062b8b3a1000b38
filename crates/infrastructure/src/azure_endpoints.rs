use azcheck_core::{AppError, AppResult};
use url::Url;

/// Public-cloud Entra ID authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
/// Public-cloud Azure Resource Manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
/// ARM compute api-version used for virtual machine reads.
pub const DEFAULT_COMPUTE_API_VERSION: &str = "2024-07-01";

/// Cloud endpoints used by the credential and ARM adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureEndpoints {
    authority_host: Url,
    resource_manager: Url,
    compute_api_version: String,
}

impl AzureEndpoints {
    /// Creates endpoints from absolute base URLs.
    pub fn new(
        authority_host: &str,
        resource_manager: &str,
        compute_api_version: impl Into<String>,
    ) -> AppResult<Self> {
        let compute_api_version = compute_api_version.into();
        if compute_api_version.trim().is_empty() {
            return Err(AppError::Configuration(
                "compute api-version must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            authority_host: parse_base_url("authority host", authority_host)?,
            resource_manager: parse_base_url("resource manager endpoint", resource_manager)?,
            compute_api_version,
        })
    }

    /// Returns the public-cloud endpoints.
    pub fn public_cloud() -> AppResult<Self> {
        Self::new(
            DEFAULT_AUTHORITY_HOST,
            DEFAULT_RESOURCE_MANAGER_ENDPOINT,
            DEFAULT_COMPUTE_API_VERSION,
        )
    }

    /// Returns the authority base URL, always ending in `/`.
    #[must_use]
    pub fn authority_host(&self) -> &Url {
        &self.authority_host
    }

    /// Returns the ARM base URL, always ending in `/`.
    #[must_use]
    pub fn resource_manager(&self) -> &Url {
        &self.resource_manager
    }

    /// Returns the compute api-version.
    #[must_use]
    pub fn compute_api_version(&self) -> &str {
        self.compute_api_version.as_str()
    }

    /// Returns the OAuth scope for ARM calls.
    #[must_use]
    pub fn resource_manager_scope(&self) -> String {
        format!("{}.default", self.resource_manager.as_str())
    }
}

fn parse_base_url(label: &str, value: &str) -> AppResult<Url> {
    let trimmed = value.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/")).map_err(|error| {
        AppError::Configuration(format!("invalid {label} '{value}': {error}"))
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Configuration(format!(
            "invalid {label} '{value}': expected an http(s) base URL"
        )));
    }

    Ok(url)
}
