//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod arm_virtual_machine_client;
mod azure_compute_client_factory;
mod azure_endpoints;
mod environment_secret_provider;

pub use arm_virtual_machine_client::ArmVirtualMachineClient;
pub use azure_compute_client_factory::AzureComputeClientFactory;
pub use azure_endpoints::{
    AzureEndpoints, DEFAULT_AUTHORITY_HOST, DEFAULT_COMPUTE_API_VERSION,
    DEFAULT_RESOURCE_MANAGER_ENDPOINT,
};
pub use environment_secret_provider::{AZURE_CLIENT_SECRET_ENV, EnvironmentSecretProvider};
