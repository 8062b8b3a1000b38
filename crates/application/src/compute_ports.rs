use std::sync::Arc;

use async_trait::async_trait;
use azcheck_core::AppResult;
use azcheck_domain::{VirtualMachine, VirtualMachineRef};
use secrecy::SecretString;

/// One page of a subscription-wide virtual machine listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualMachinePage {
    /// Machines on this page, in provider order.
    pub machines: Vec<VirtualMachine>,
    /// Opaque continuation for the next page; `None` when the listing is done.
    pub next_link: Option<String>,
}

/// Client port for virtual machine reads in one subscription.
#[async_trait]
pub trait VirtualMachineClient: Send + Sync {
    /// Fetches one page of all machines in the subscription.
    ///
    /// `next_link` is `None` for the first page and the previous page's
    /// continuation afterwards.
    async fn list_all_page(&self, next_link: Option<&str>) -> AppResult<VirtualMachinePage>;

    /// Fetches one machine by resource group and name.
    async fn get(&self, reference: &VirtualMachineRef) -> AppResult<VirtualMachine>;
}

/// Explicit service-principal credentials used by the check phase.
#[derive(Debug, Clone)]
pub struct ClientSecretCredentials {
    /// Entra ID tenant.
    pub tenant_id: String,
    /// Application (client) id.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
}

/// Factory port building authenticated virtual machine clients.
///
/// Construction is cheap; tokens are acquired on the first API call, so
/// credential failures surface as [`azcheck_core::AppError::Authentication`]
/// from the returned client.
pub trait ComputeClientFactory: Send + Sync {
    /// Builds a client authenticated with ambient (default chain) credentials.
    fn ambient_client(&self, subscription_id: &str) -> AppResult<Arc<dyn VirtualMachineClient>>;

    /// Builds a client authenticated with explicit client-secret credentials.
    fn client_secret_client(
        &self,
        subscription_id: &str,
        credentials: ClientSecretCredentials,
    ) -> AppResult<Arc<dyn VirtualMachineClient>>;
}

/// Port for the out-of-band client secret.
pub trait SecretProvider: Send + Sync {
    /// Returns the client secret, if one is configured.
    fn client_secret(&self) -> Option<SecretString>;
}
