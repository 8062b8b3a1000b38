use std::sync::Arc;

use async_trait::async_trait;
use azcheck_application::{VirtualMachineClient, VirtualMachinePage};
use azcheck_core::{AppError, AppResult};
use azcheck_domain::{VirtualMachine, VirtualMachineRef};
use azure_core::auth::{AccessToken, TokenCredential};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::azure_endpoints::AzureEndpoints;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VirtualMachineListResponse {
    #[serde(default)]
    value: Vec<VirtualMachine>,
    #[serde(default)]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmErrorBody,
}

#[derive(Debug, Deserialize)]
struct ArmErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Azure Resource Manager client for `Microsoft.Compute/virtualMachines`.
pub struct ArmVirtualMachineClient {
    http_client: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    endpoints: AzureEndpoints,
    subscription_id: String,
}

impl ArmVirtualMachineClient {
    /// Creates a client for one subscription; bearer tokens come from
    /// `credential`, which is expected to cache them.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        credential: Arc<dyn TokenCredential>,
        endpoints: AzureEndpoints,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            credential,
            endpoints,
            subscription_id: subscription_id.into(),
        }
    }

    async fn access_token(&self) -> AppResult<AccessToken> {
        let scope = self.endpoints.resource_manager_scope();
        self.credential
            .get_token(&[scope.as_str()])
            .await
            .map_err(|error| {
                AppError::Authentication(format!(
                    "failed to acquire resource manager token: {error}"
                ))
            })
    }

    fn subscription_url(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.endpoints.resource_manager().clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal("resource manager endpoint cannot be a base URL".to_owned())
            })?
            .pop_if_empty()
            .extend(["subscriptions", self.subscription_id.as_str()])
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("api-version", self.endpoints.compute_api_version());
        Ok(url)
    }

    fn continuation_url(&self, next_link: &str) -> AppResult<Url> {
        let url = Url::parse(next_link).map_err(|error| {
            AppError::Transport(format!("invalid nextLink '{next_link}': {error}"))
        })?;

        if url.origin() != self.endpoints.resource_manager().origin() {
            return Err(AppError::Transport(format!(
                "nextLink '{next_link}' points outside the resource manager endpoint"
            )));
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, operation: &str) -> AppResult<T> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.token.secret())
            .send()
            .await
            .map_err(|error| AppError::Transport(format!("failed to {operation}: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            let detail = serde_json::from_str::<ArmErrorResponse>(&body)
                .map(|error| format!("{}: {}", error.error.code, error.error.message))
                .unwrap_or(body);
            return Err(AppError::Transport(format!(
                "failed to {operation}: resource manager returned status {}: {detail}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Transport(format!("failed to parse {operation} response body: {error}"))
        })
    }
}

#[async_trait]
impl VirtualMachineClient for ArmVirtualMachineClient {
    async fn list_all_page(&self, next_link: Option<&str>) -> AppResult<VirtualMachinePage> {
        let url = match next_link {
            Some(link) => self.continuation_url(link)?,
            None => self.subscription_url(&[
                "providers",
                "Microsoft.Compute",
                "virtualMachines",
            ])?,
        };
        debug!(url = %url, "listing virtual machines");

        let page: VirtualMachineListResponse =
            self.get_json(url, "get next page of VMs").await?;

        Ok(VirtualMachinePage {
            machines: page.value,
            next_link: page.next_link.filter(|link| !link.is_empty()),
        })
    }

    async fn get(&self, reference: &VirtualMachineRef) -> AppResult<VirtualMachine> {
        let url = self.subscription_url(&[
            "resourceGroups",
            reference.resource_group(),
            "providers",
            "Microsoft.Compute",
            "virtualMachines",
            reference.name(),
        ])?;
        debug!(url = %url, "fetching virtual machine");

        self.get_json(url, "get virtual machine").await
    }
}
