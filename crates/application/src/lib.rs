//! Application services and ports.

#![forbid(unsafe_code)]

mod check_config;
mod compute_ports;
mod data_classification_service;
mod provider_ports;
mod result_builder;

pub use check_config::{CheckConfiguration, YAML_CONFIGURATION_KEY};
pub use compute_ports::{
    ClientSecretCredentials, ComputeClientFactory, SecretProvider, VirtualMachineClient,
    VirtualMachinePage,
};
pub use data_classification_service::DataClassificationProvider;
pub use provider_ports::{EvaluateInput, EvaluateResult, ExecuteInput, ExecuteResult, Provider};
