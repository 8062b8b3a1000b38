use std::collections::BTreeMap;

use azcheck_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Tag key every virtual machine is required to carry.
pub const DATA_CLASSIFICATION_TAG: &str = "dataclassification";

const RESOURCE_GROUP_SEGMENT: usize = 4;
const NAME_SEGMENT: usize = 8;

/// Resource group and name addressing one virtual machine.
///
/// Parsed positionally from an ARM resource id of the shape
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Compute/virtualMachines/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachineRef {
    resource_group: String,
    name: String,
}

impl VirtualMachineRef {
    /// Splits a resource id on `/` and takes segment 4 as the resource group
    /// and segment 8 as the machine name.
    pub fn parse(resource_id: &str) -> AppResult<Self> {
        let segments: Vec<&str> = resource_id.split('/').collect();
        if segments.len() <= NAME_SEGMENT {
            return Err(AppError::Format(format!(
                "invalid VM ID format '{resource_id}': expected at least {} '/'-separated segments, found {}",
                NAME_SEGMENT + 1,
                segments.len()
            )));
        }

        Ok(Self {
            resource_group: segments[RESOURCE_GROUP_SEGMENT].to_owned(),
            name: segments[NAME_SEGMENT].to_owned(),
        })
    }

    /// Returns the resource group name.
    #[must_use]
    pub fn resource_group(&self) -> &str {
        self.resource_group.as_str()
    }

    /// Returns the virtual machine name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// The slice of a virtual machine resource the check cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    /// ARM resource id.
    pub id: String,
    /// Machine name.
    #[serde(default)]
    pub name: String,
    /// Resource tags; absent tags deserialize as an empty map.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl VirtualMachine {
    /// Returns whether the machine carries the given tag key.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// Returns whether the machine carries the data classification tag.
    #[must_use]
    pub fn has_data_classification(&self) -> bool {
        self.has_tag(DATA_CLASSIFICATION_TAG)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use azcheck_core::AppError;
    use proptest::prelude::*;
    use serde_json::json;

    use super::{VirtualMachine, VirtualMachineRef};

    #[test]
    fn parses_canonical_resource_id() {
        let reference = VirtualMachineRef::parse(
            "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(reference.resource_group(), "rg1");
        assert_eq!(reference.name(), "vm1");
    }

    #[test]
    fn rejects_short_resource_id() {
        let result = VirtualMachineRef::parse("/subscriptions/s/resourceGroups/rg1");
        assert!(matches!(result, Err(AppError::Format(_))));
    }

    #[test]
    fn tag_lookup_is_exact() {
        let machine = VirtualMachine {
            id: "vm".to_owned(),
            name: "vm".to_owned(),
            tags: BTreeMap::from([("DataClassification".to_owned(), "x".to_owned())]),
        };
        assert!(!machine.has_data_classification());

        let machine: VirtualMachine = serde_json::from_value(json!({
            "id": "vm",
            "tags": {"dataclassification": "confidential"},
        }))
        .unwrap_or_else(|_| unreachable!());
        assert!(machine.has_data_classification());
    }

    #[test]
    fn machine_without_tags_deserializes_untagged() {
        let machine: VirtualMachine =
            serde_json::from_value(json!({"id": "vm", "name": "vm"})).unwrap_or_else(|_| unreachable!());
        assert!(machine.tags.is_empty());
    }

    proptest! {
        #[test]
        fn ids_with_fewer_than_nine_segments_are_rejected(
            segments in proptest::collection::vec("[a-zA-Z0-9.]{0,8}", 1..9)
        ) {
            let resource_id = segments.join("/");
            prop_assert!(matches!(
                VirtualMachineRef::parse(&resource_id),
                Err(AppError::Format(_))
            ));
        }

        #[test]
        fn ids_with_nine_or_more_segments_use_positional_slots(
            segments in proptest::collection::vec("[a-zA-Z0-9.]{0,8}", 9..14)
        ) {
            let resource_id = segments.join("/");
            let reference = VirtualMachineRef::parse(&resource_id);
            prop_assert!(reference.is_ok());
            let reference = reference.unwrap_or_else(|_| unreachable!());
            prop_assert_eq!(reference.resource_group(), segments[4].as_str());
            prop_assert_eq!(reference.name(), segments[8].as_str());
        }
    }
}
