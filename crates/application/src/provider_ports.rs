use std::collections::HashMap;

use async_trait::async_trait;
use azcheck_core::AppResult;
use azcheck_domain::{ExecutionStatus, Finding, LogEntry, Observation, Subject};
use serde::{Deserialize, Serialize};

/// Host request for the inventory phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateInput {
    /// String-keyed plugin configuration.
    #[serde(default)]
    pub configuration: HashMap<String, String>,
}

/// Subjects discovered during the inventory phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResult {
    /// One subject per discovered resource.
    pub subjects: Vec<Subject>,
}

/// Host request for the check phase of one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteInput {
    /// String-keyed plugin configuration.
    #[serde(default)]
    pub configuration: HashMap<String, String>,
    /// Subject under evaluation.
    pub subject: Subject,
}

/// Records produced by one check execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    /// Completion status.
    pub status: ExecutionStatus,
    /// Observations recorded by the check.
    pub observations: Vec<Observation>,
    /// Findings raised by the check.
    pub findings: Vec<Finding>,
    /// Log entries describing the run.
    pub logs: Vec<LogEntry>,
}

/// Plugin contract exposed to the assessment host.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Lists candidate subjects for the given configuration.
    async fn evaluate(&self, input: EvaluateInput) -> AppResult<EvaluateResult>;

    /// Checks one subject and reports observations, findings and logs.
    async fn execute(&self, input: ExecuteInput) -> AppResult<ExecuteResult>;
}
