//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assessment;
mod subject;
mod virtual_machine;

pub use assessment::{
    Evidence, ExecutionStatus, Finding, Link, LogEntry, Observation, Property,
};
pub use subject::{Subject, SubjectType};
pub use virtual_machine::{DATA_CLASSIFICATION_TAG, VirtualMachine, VirtualMachineRef};
