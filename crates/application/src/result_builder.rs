//! Fixed-shape records emitted by the data classification check.

use azcheck_domain::{DATA_CLASSIFICATION_TAG, Evidence, Finding, LogEntry, Observation, Property};
use chrono::{DateTime, Datelike, Days, Months, SecondsFormat, Utc};
use uuid::Uuid;

const MISSING_TITLE: &str = "Missing Data Classification Tag";
const PRESENT_TITLE: &str = "Data Classification Tag Present";
const VM_ID_PROP: &str = "VmId";

/// Observation and optional finding produced for one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckRecords {
    pub(crate) observation: Observation,
    pub(crate) finding: Option<Finding>,
}

/// Builds the records for a machine that carries the tag.
///
/// The observation expires at the moment it is collected.
pub(crate) fn tag_present(vm_id: &str, collected_at: DateTime<Utc>) -> CheckRecords {
    let collected = rfc3339(collected_at);

    CheckRecords {
        observation: Observation {
            id: Uuid::new_v4().to_string(),
            title: PRESENT_TITLE.to_owned(),
            description: format!(
                "The virtual machine {vm_id} has a '{DATA_CLASSIFICATION_TAG}' tag."
            ),
            collected: collected.clone(),
            expires: collected,
            links: Vec::new(),
            props: vec![Property::new(VM_ID_PROP, vm_id)],
            relevant_evidence: vec![Evidence {
                description: format!(
                    "az cli command found a '{DATA_CLASSIFICATION_TAG}' tag for the vm: {vm_id}"
                ),
            }],
            remarks: "All OK.".to_owned(),
        },
        finding: None,
    }
}

/// Builds the records for a machine missing the tag.
///
/// The observation expires one month after collection and the finding
/// references it by id.
pub(crate) fn tag_missing(vm_id: &str, collected_at: DateTime<Utc>) -> CheckRecords {
    let observation_id = Uuid::new_v4().to_string();
    let description =
        format!("The virtual machine {vm_id} does not have a '{DATA_CLASSIFICATION_TAG}' tag.");
    let expires_at = one_month_later(collected_at).unwrap_or(collected_at);

    let observation = Observation {
        id: observation_id.clone(),
        title: MISSING_TITLE.to_owned(),
        description: description.clone(),
        collected: rfc3339(collected_at),
        expires: rfc3339(expires_at),
        links: Vec::new(),
        props: vec![Property::new(VM_ID_PROP, vm_id)],
        relevant_evidence: vec![Evidence {
            description: format!(
                "az cli command did not find any '{DATA_CLASSIFICATION_TAG}' tag for the vm {vm_id}"
            ),
        }],
        remarks: format!("The '{DATA_CLASSIFICATION_TAG}' tag is required for compliance."),
    };

    let finding = Finding {
        id: Uuid::new_v4().to_string(),
        title: MISSING_TITLE.to_owned(),
        description,
        remarks: format!("Give the virtual machine {vm_id} a '{DATA_CLASSIFICATION_TAG}' tag."),
        related_observations: vec![observation_id],
    };

    CheckRecords {
        observation,
        finding: Some(finding),
    }
}

/// Builds the log entry bracketing one check run.
pub(crate) fn check_log_entry(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> LogEntry {
    LogEntry {
        title: "Data classification check".to_owned(),
        description: "Data classification check has run successfully".to_owned(),
        start: rfc3339(started_at),
        end: rfc3339(finished_at),
    }
}

/// Same day-of-month in the next month; days past that month's end carry
/// over, so January 31 becomes March 3 in a non-leap year.
fn one_month_later(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    at.with_day(1)?
        .checked_add_months(Months::new(1))?
        .checked_add_days(Days::new(u64::from(at.day() - 1)))
}

fn rfc3339(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
