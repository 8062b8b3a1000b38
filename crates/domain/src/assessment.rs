//! Result records in the assessment host's fixed schema.

use serde::{Deserialize, Serialize};

/// Completion status reported to the host for one check invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The check ran to completion.
    Success,
    /// The invocation aborted with an error and produced no records.
    Failure,
}

/// Named string property attached to an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Property value.
    pub value: String,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reference link attached to an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link target.
    pub href: String,
    /// Link text.
    #[serde(default)]
    pub text: String,
}

/// Evidence backing an observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Evidence description.
    pub description: String,
}

/// A recorded fact from a single check execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Generated observation id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Collection timestamp in RFC3339.
    pub collected: String,
    /// Expiry timestamp in RFC3339.
    pub expires: String,
    /// Related links.
    pub links: Vec<Link>,
    /// Observation properties.
    pub props: Vec<Property>,
    /// Evidence that led to the observation.
    pub relevant_evidence: Vec<Evidence>,
    /// Operator-facing remarks.
    pub remarks: String,
}

/// A flagged compliance gap referencing one or more observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Generated finding id.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Remediation remarks.
    pub remarks: String,
    /// Ids of the observations backing this finding.
    pub related_observations: Vec<String>,
}

/// Log entry bracketing one check execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Start timestamp in RFC3339.
    pub start: String,
    /// End timestamp in RFC3339.
    pub end: String,
}
