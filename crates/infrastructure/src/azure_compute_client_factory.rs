use std::sync::Arc;

use azcheck_application::{ClientSecretCredentials, ComputeClientFactory, VirtualMachineClient};
use azcheck_core::{AppError, AppResult};
use azure_core::auth::TokenCredential;
use azure_identity::ClientSecretCredential;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::arm_virtual_machine_client::ArmVirtualMachineClient;
use crate::azure_endpoints::AzureEndpoints;

/// Builds ARM virtual machine clients over a shared HTTP client.
#[derive(Clone)]
pub struct AzureComputeClientFactory {
    http_client: reqwest::Client,
    endpoints: AzureEndpoints,
    ambient_credential: Option<Arc<dyn TokenCredential>>,
}

impl AzureComputeClientFactory {
    /// Creates a factory for the given cloud endpoints.
    ///
    /// Ambient clients authenticate with the Azure SDK default credential
    /// chain, created per client from process environment.
    #[must_use]
    pub fn new(http_client: reqwest::Client, endpoints: AzureEndpoints) -> Self {
        Self {
            http_client,
            endpoints,
            ambient_credential: None,
        }
    }

    /// Uses `credential` for ambient clients instead of the default chain.
    #[must_use]
    pub fn with_ambient_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.ambient_credential = Some(credential);
        self
    }

    fn ambient_credential(&self) -> AppResult<Arc<dyn TokenCredential>> {
        if let Some(credential) = &self.ambient_credential {
            return Ok(Arc::clone(credential));
        }

        azure_identity::create_credential().map_err(|error| {
            AppError::Authentication(format!("failed to create default Azure credential: {error}"))
        })
    }
}

impl ComputeClientFactory for AzureComputeClientFactory {
    fn ambient_client(&self, subscription_id: &str) -> AppResult<Arc<dyn VirtualMachineClient>> {
        debug!(subscription_id = %subscription_id, "building client with default credential chain");
        let credential = self.ambient_credential()?;

        Ok(Arc::new(ArmVirtualMachineClient::new(
            self.http_client.clone(),
            credential,
            self.endpoints.clone(),
            subscription_id,
        )))
    }

    fn client_secret_client(
        &self,
        subscription_id: &str,
        credentials: ClientSecretCredentials,
    ) -> AppResult<Arc<dyn VirtualMachineClient>> {
        debug!(
            subscription_id = %subscription_id,
            client_id = %credentials.client_id,
            "building client with client-secret credential"
        );
        validate_tenant_id(&credentials.tenant_id)?;

        let credential: Arc<dyn TokenCredential> = Arc::new(ClientSecretCredential::new(
            azure_core::new_http_client(),
            self.endpoints.authority_host().clone(),
            credentials.tenant_id,
            credentials.client_id,
            credentials.client_secret.expose_secret().to_owned(),
        ));

        Ok(Arc::new(ArmVirtualMachineClient::new(
            self.http_client.clone(),
            credential,
            self.endpoints.clone(),
            subscription_id,
        )))
    }
}

/// The tenant id becomes a path segment of the token endpoint.
fn validate_tenant_id(tenant_id: &str) -> AppResult<()> {
    let valid = !tenant_id.is_empty()
        && tenant_id
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(AppError::Authentication(format!(
            "invalid tenant id '{tenant_id}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use azcheck_application::{ClientSecretCredentials, ComputeClientFactory};
    use azcheck_core::AppError;
    use azcheck_domain::VirtualMachineRef;
    use azure_core::auth::TokenCredential;
    use azure_identity::ClientSecretCredential;
    use secrecy::SecretString;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::AzureComputeClientFactory;
    use crate::azure_endpoints::AzureEndpoints;

    const LIST_PATH: &str = "/subscriptions/sub-1/providers/Microsoft.Compute/virtualMachines";
    const VM_ID: &str =
        "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

    fn factory(server: &MockServer) -> AzureComputeClientFactory {
        let endpoints = AzureEndpoints::new(&server.uri(), &server.uri(), "2024-07-01")
            .unwrap_or_else(|_| unreachable!());
        AzureComputeClientFactory::new(reqwest::Client::new(), endpoints)
    }

    fn service_principal(server: &MockServer, tenant_id: &str) -> Arc<dyn TokenCredential> {
        let authority = Url::parse(&server.uri()).unwrap_or_else(|_| unreachable!());
        Arc::new(ClientSecretCredential::new(
            azure_core::new_http_client(),
            authority,
            tenant_id.to_owned(),
            "ambient-client".to_owned(),
            "ambient-secret".to_owned(),
        ))
    }

    fn credentials(tenant_id: &str) -> ClientSecretCredentials {
        ClientSecretCredentials {
            tenant_id: tenant_id.to_owned(),
            client_id: "client-1".to_owned(),
            client_secret: SecretString::from("s3cret".to_owned()),
        }
    }

    async fn mount_token_endpoint(server: &MockServer, tenant_id: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{tenant_id}/oauth2/v2.0/token")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "ext_expires_in": 3599,
                "access_token": token,
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn ambient_client_lists_with_ambient_credential_token() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "ambient-tenant", "ambient-token").await;
        Mock::given(method("GET"))
            .and(path(LIST_PATH))
            .and(header("Authorization", "Bearer ambient-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": VM_ID, "name": "vm1"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = factory(&server)
            .with_ambient_credential(service_principal(&server, "ambient-tenant"))
            .ambient_client("sub-1")
            .unwrap_or_else(|_| unreachable!());

        let page = client.list_all_page(None).await.unwrap_or_else(|_| unreachable!());
        assert_eq!(page.machines[0].id, VM_ID);
    }

    #[tokio::test]
    async fn ambient_credential_failure_is_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "unauthorized_client",
                "error_description": "AADSTS700016: Application not found.",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = factory(&server)
            .with_ambient_credential(service_principal(&server, "ambient-tenant"))
            .ambient_client("sub-1")
            .unwrap_or_else(|_| unreachable!());

        let result = client.list_all_page(None).await;
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }

    #[tokio::test]
    async fn client_secret_client_authenticates_then_reads_vm() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server, "tenant-1", "secret-token").await;
        Mock::given(method("GET"))
            .and(path(VM_ID))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": VM_ID,
                "name": "vm1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = factory(&server)
            .client_secret_client("sub-1", credentials("tenant-1"))
            .unwrap_or_else(|_| unreachable!());
        let reference = VirtualMachineRef::parse(VM_ID).unwrap_or_else(|_| unreachable!());

        let machine = client.get(&reference).await.unwrap_or_else(|_| unreachable!());
        assert!(!machine.has_data_classification());
    }

    #[tokio::test]
    async fn invalid_tenant_fails_before_any_request() {
        let server = MockServer::start().await;
        let result = factory(&server).client_secret_client("sub-1", credentials("bad/tenant"));
        assert!(matches!(result, Err(AppError::Authentication(_))));
    }
}
