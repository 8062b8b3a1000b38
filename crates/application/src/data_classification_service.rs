use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use azcheck_core::{AppError, AppResult};
use azcheck_domain::{ExecutionStatus, Subject, VirtualMachineRef};
use chrono::Utc;
use tracing::{debug, info};

use crate::check_config::CheckConfiguration;
use crate::compute_ports::{ComputeClientFactory, SecretProvider};
use crate::provider_ports::{EvaluateInput, EvaluateResult, ExecuteInput, ExecuteResult, Provider};
use crate::result_builder;

/// Plugin service checking Azure virtual machines for a data classification tag.
#[derive(Clone)]
pub struct DataClassificationProvider {
    client_factory: Arc<dyn ComputeClientFactory>,
    secret_provider: Arc<dyn SecretProvider>,
}

impl DataClassificationProvider {
    /// Creates the provider from its client factory and secret source.
    #[must_use]
    pub fn new(
        client_factory: Arc<dyn ComputeClientFactory>,
        secret_provider: Arc<dyn SecretProvider>,
    ) -> Self {
        Self {
            client_factory,
            secret_provider,
        }
    }

    /// Lists every virtual machine in the configured subscription as a subject.
    ///
    /// Authenticates with the ambient credential chain and follows the
    /// listing until no continuation remains. Any failed page aborts the
    /// whole listing.
    pub async fn list_subjects(&self, input: &EvaluateInput) -> AppResult<Vec<Subject>> {
        let config =
            CheckConfiguration::decode(&input.configuration, self.secret_provider.as_ref())?;
        let client = self
            .client_factory
            .ambient_client(config.subscription_id())?;

        let mut seen = HashSet::new();
        let mut subjects = Vec::new();
        let mut next_link: Option<String> = None;
        let mut pages = 0_usize;

        loop {
            let page = client.list_all_page(next_link.as_deref()).await?;
            pages = pages.saturating_add(1);
            debug!(
                page = pages,
                machines = page.machines.len(),
                "fetched virtual machine page"
            );

            for machine in page.machines {
                if seen.insert(machine.id.clone()) {
                    subjects.push(Subject::virtual_machine(machine.id));
                }
            }

            match page.next_link.filter(|link| !link.is_empty()) {
                Some(link) => next_link = Some(link),
                None => break,
            }
        }

        info!(
            subscription_id = %config.subscription_id(),
            pages,
            subjects = subjects.len(),
            "virtual machine inventory listed"
        );

        Ok(subjects)
    }

    /// Checks one subject for the data classification tag.
    ///
    /// Configuration and resource id shape are validated before any
    /// credential is built. The check authenticates with explicit
    /// client-secret credentials.
    pub async fn check_subject(&self, input: &ExecuteInput) -> AppResult<ExecuteResult> {
        let config =
            CheckConfiguration::decode(&input.configuration, self.secret_provider.as_ref())?;
        let vm_id = input.subject.resource_id_prop().ok_or_else(|| {
            AppError::Configuration("VM id is missing in subject properties".to_owned())
        })?;

        let started_at = Utc::now();
        let reference = VirtualMachineRef::parse(vm_id)?;

        let client = self
            .client_factory
            .client_secret_client(config.subscription_id(), config.client_secret_credentials())?;
        let machine = client.get(&reference).await?;

        let records = if machine.has_data_classification() {
            result_builder::tag_present(vm_id, Utc::now())
        } else {
            result_builder::tag_missing(vm_id, Utc::now())
        };

        info!(
            vm_id = %vm_id,
            resource_group = %reference.resource_group(),
            vm_name = %reference.name(),
            tagged = records.finding.is_none(),
            "data classification check completed"
        );

        Ok(ExecuteResult {
            status: ExecutionStatus::Success,
            observations: vec![records.observation],
            findings: records.finding.into_iter().collect(),
            logs: vec![result_builder::check_log_entry(started_at, Utc::now())],
        })
    }
}

#[async_trait]
impl Provider for DataClassificationProvider {
    async fn evaluate(&self, input: EvaluateInput) -> AppResult<EvaluateResult> {
        let subjects = self.list_subjects(&input).await?;
        Ok(EvaluateResult { subjects })
    }

    async fn execute(&self, input: ExecuteInput) -> AppResult<ExecuteResult> {
        self.check_subject(&input).await
    }
}
