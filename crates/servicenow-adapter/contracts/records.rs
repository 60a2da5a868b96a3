//! Change request record schema
//!
//! Maps the wide ServiceNow `change_request` row onto the small schema the
//! adapter exposes to callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AdapterError, Result};

/// Raw field holding the record's unique identifier
pub const SOURCE_KEY_FIELD: &str = "sys_id";

/// Raw field holding the human-readable change number
pub const SOURCE_NUMBER_FIELD: &str = "number";

/// Workflow, approval, scheduling and audit attributes never exposed to callers
pub const DENIED_FIELDS: &[&str] = &[
    // Workflow and state
    "parent",
    "reason",
    "watch_list",
    "upon_reject",
    "type",
    "state",
    "knowledge",
    "order",
    "phase",
    "phase_state",
    "escalation",
    "upon_approval",
    "on_hold",
    "on_hold_reason",
    "on_hold_task",
    "follow_up",
    "reassignment_count",
    "unauthorized",
    "user_input",
    "contact_type",
    "scope",
    "category",
    "short_description",
    "comments",
    "work_notes",
    "work_notes_list",
    "comments_and_work_notes",
    "close_code",
    "close_notes",
    "closed_by",
    "closed_at",
    // Approval and CAB
    "approval",
    "approval_history",
    "approval_set",
    "cab_delegate",
    "cab_date",
    "cab_recommendation",
    "cab_required",
    "review_date",
    "review_status",
    "review_comments",
    "justification",
    // Planning and risk
    "test_plan",
    "change_plan",
    "implementation_plan",
    "backout_plan",
    "risk",
    "risk_impact_analysis",
    "impact",
    "priority",
    "urgency",
    "production_system",
    "outside_maintenance_schedule",
    "conflict_status",
    "conflict_last_run",
    // Scheduling and SLA
    "requested_by_date",
    "start_date",
    "end_date",
    "expected_start",
    "due_date",
    "activity_due",
    "sla_due",
    "made_sla",
    "opened_at",
    "business_duration",
    "calendar_duration",
    "time_worked",
    // Assignment and relations
    "requested_by",
    "opened_by",
    "assigned_to",
    "assignment_group",
    "additional_assignee_list",
    "group_list",
    "company",
    "location",
    "cmdb_ci",
    "business_service",
    "service_offering",
    "contract",
    "delivery_plan",
    "delivery_task",
    "std_change_producer_version",
    "correlation_id",
    "correlation_display",
    // Audit
    "sys_created_on",
    "sys_created_by",
    "sys_updated_on",
    "sys_updated_by",
    "sys_mod_count",
    "sys_class_name",
    "sys_domain",
    "sys_domain_path",
    "sys_tags",
];

/// Check whether a raw field is stripped during normalization
pub fn is_denied(field: &str) -> bool {
    DENIED_FIELDS.contains(&field)
}

/// ServiceNow table API envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSetEnvelope<T> {
    pub result: T,
}

/// Normalized change request exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Copied from the source `sys_id`
    pub change_ticket_key: String,

    /// Copied from the source `number`
    pub change_ticket_number: String,

    /// Remaining fields that are not on the deny-list
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ChangeRecord {
    /// Remap a raw table row.
    ///
    /// Both identifiers must be present as strings; a row without them cannot
    /// satisfy the external schema and is reported as malformed.
    pub fn from_raw(mut raw: Map<String, Value>) -> Result<Self> {
        let change_ticket_key = take_identifier(&mut raw, SOURCE_KEY_FIELD)?;
        let change_ticket_number = take_identifier(&mut raw, SOURCE_NUMBER_FIELD)?;

        raw.retain(|field, _| !is_denied(field));
        // Flattened fields must not shadow the identifiers.
        raw.remove("change_ticket_key");
        raw.remove("change_ticket_number");

        Ok(Self {
            change_ticket_key,
            change_ticket_number,
            fields: raw,
        })
    }

    /// Look up a retained field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

fn take_identifier(raw: &mut Map<String, Value>, field: &str) -> Result<String> {
    match raw.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => Err(AdapterError::malformed(format!(
            "record field '{}' is not a string: {}",
            field, other
        ))),
        None => Err(AdapterError::malformed(format!(
            "record is missing '{}'",
            field
        ))),
    }
}
