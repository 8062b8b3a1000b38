use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property key holding the resource id a subject was discovered under.
const ID_PROP: &str = "id";

/// Kind of subject handed back to the assessment host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    /// A discovered inventory item such as a virtual machine.
    InventoryItem,
}

/// A candidate resource identified during inventory and evaluated later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Cloud resource id.
    pub id: String,
    /// Subject kind.
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    /// Human-readable title.
    pub title: String,
    /// Free-form string properties.
    #[serde(default)]
    pub props: BTreeMap<String, String>,
}

impl Subject {
    /// Creates the inventory subject for one virtual machine resource id.
    #[must_use]
    pub fn virtual_machine(resource_id: impl Into<String>) -> Self {
        let resource_id = resource_id.into();

        Self {
            title: format!("Azure Virtual Machine {resource_id}"),
            subject_type: SubjectType::InventoryItem,
            props: BTreeMap::from([(ID_PROP.to_owned(), resource_id.clone())]),
            id: resource_id,
        }
    }

    /// Returns the resource id stored in the subject properties, if present.
    #[must_use]
    pub fn resource_id_prop(&self) -> Option<&str> {
        self.props.get(ID_PROP).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Subject, SubjectType};

    #[test]
    fn virtual_machine_subject_duplicates_id_into_props() {
        let subject = Subject::virtual_machine("/subscriptions/s/vm");

        assert_eq!(subject.id, "/subscriptions/s/vm");
        assert_eq!(subject.resource_id_prop(), Some("/subscriptions/s/vm"));
        assert_eq!(subject.subject_type, SubjectType::InventoryItem);
        assert_eq!(subject.title, "Azure Virtual Machine /subscriptions/s/vm");
    }

    #[test]
    fn subject_serializes_type_in_host_casing() {
        let subject = Subject::virtual_machine("vm-1");
        let value = serde_json::to_value(&subject).unwrap_or_else(|_| unreachable!());

        assert_eq!(value["type"], json!("INVENTORY_ITEM"));
        assert_eq!(value["props"]["id"], json!("vm-1"));
    }

    #[test]
    fn subject_without_props_deserializes_with_empty_map() {
        let subject: Subject = serde_json::from_value(json!({
            "id": "vm-1",
            "type": "INVENTORY_ITEM",
            "title": "vm",
        }))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(subject.resource_id_prop(), None);
    }

    #[test]
    fn subject_of_other_kind_is_rejected() {
        let result = serde_json::from_value::<Subject>(json!({
            "id": "vm-1",
            "type": "PARTY",
            "title": "vm",
        }));

        assert!(result.is_err());
    }
}
