//! Booking and appointment shapes exchanged with the Frappe backend.

use chrono::{Local, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::datetime::{calendar_date_in, format_for_display, to_canonical_iso};
use crate::slots::{canonical_slot, same_slot, to_12_hour};

/// Approval workflow state of an appointment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkflowState {
    Approved,
    Pending,
    PendingVerification,
    Completed,
    Draft,
    Rejected,
    Cancelled,
    Other(String),
}

impl WorkflowState {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowState::Approved => "Approved",
            WorkflowState::Pending => "Pending",
            WorkflowState::PendingVerification => "Pending Verification",
            WorkflowState::Completed => "Completed",
            WorkflowState::Draft => "Draft",
            WorkflowState::Rejected => "Rejected",
            WorkflowState::Cancelled => "Cancelled",
            WorkflowState::Other(s) => s,
        }
    }

    /// States an approver still has to act on.
    pub fn awaits_review(&self) -> bool {
        matches!(
            self,
            WorkflowState::Pending | WorkflowState::PendingVerification
        )
    }
}

impl From<String> for WorkflowState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Approved" => WorkflowState::Approved,
            "Pending" => WorkflowState::Pending,
            "Pending Verification" => WorkflowState::PendingVerification,
            "Completed" => WorkflowState::Completed,
            "Draft" => WorkflowState::Draft,
            "Rejected" => WorkflowState::Rejected,
            "Cancelled" => WorkflowState::Cancelled,
            _ => WorkflowState::Other(s),
        }
    }
}

impl From<WorkflowState> for String {
    fn from(state: WorkflowState) -> Self {
        match state {
            WorkflowState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Kind of darshan a booking is for.
///
/// The backend is inconsistent about casing ("VIP Darshan" vs "Vip Darshan"),
/// so matching is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DarshanKind {
    Vip,
    BhasmArti,
    Shigra,
    Localide,
    Other(String),
}

impl DarshanKind {
    pub fn as_str(&self) -> &str {
        match self {
            DarshanKind::Vip => "VIP Darshan",
            DarshanKind::BhasmArti => "Bhasm Arti",
            DarshanKind::Shigra => "Shigra Darshan",
            DarshanKind::Localide => "Localide Darshan",
            DarshanKind::Other(s) => s,
        }
    }
}

impl From<String> for DarshanKind {
    fn from(s: String) -> Self {
        const KNOWN: [DarshanKind; 4] = [
            DarshanKind::Vip,
            DarshanKind::BhasmArti,
            DarshanKind::Shigra,
            DarshanKind::Localide,
        ];
        KNOWN
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or(DarshanKind::Other(s))
    }
}

impl From<DarshanKind> for String {
    fn from(kind: DarshanKind) -> Self {
        match kind {
            DarshanKind::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// A person accompanying the devotee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Companion {
    pub companion_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub companion_phone: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schemars(with = "String")]
    pub companion_age: String,
}

/// Frappe returns phone numbers and ages as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// A booking as listed for a devotee, approver or admin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub name: String,
    pub darshan_type: DarshanKind,
    /// Backend form, e.g. `"10:00:00"`; older records carry `"10:00 AM"`.
    pub darshan_time: String,
    pub workflow_state: WorkflowState,
    /// `YYYY-MM-DD` or a full ISO string.
    pub darshan_date: String,
    #[serde(rename = "timeNote", default, skip_serializing_if = "Option::is_none")]
    pub time_note: Option<String>,
    #[serde(default)]
    pub darshan_companion: Vec<Companion>,
    #[serde(default)]
    pub attender: Option<String>,
}

impl Booking {
    pub fn canonical_date(&self) -> Option<String> {
        to_canonical_iso(self.darshan_date.as_str())
    }

    pub fn display_when(&self) -> String {
        format_for_display(Some(&self.darshan_date), Some(&self.darshan_time))
    }

    /// The booking time as a 12-hour slot label.
    pub fn slot_label(&self) -> String {
        to_12_hour(&self.darshan_time)
    }

    pub fn is_in_slot(&self, label: &str) -> bool {
        same_slot(&self.darshan_time, label)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Blue,
    Red,
    Indigo,
    Teal,
}

/// Per-kind counters on the approver dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub kind: DarshanKind,
    pub received: u64,
    pub approved: u64,
    pub rejected: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<Accent>,
}

impl Summary {
    pub fn pending(&self) -> u64 {
        self.received
            .saturating_sub(self.approved)
            .saturating_sub(self.rejected)
    }
}

/// One row of the review queue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PendingRow {
    pub id: String,
    pub kind: DarshanKind,
    pub devotee: Option<String>,
    /// `YYYY-MM-DD` of the darshan.
    pub date_iso: String,
    pub time: Option<String>,
    pub workflow_state: Option<WorkflowState>,
    pub raw: serde_json::Value,
}

impl PendingRow {
    /// Build a row from a raw appointment object. Returns `None` without a `name`.
    pub fn from_raw(raw: &serde_json::Value) -> Option<Self> {
        Self::from_raw_in(raw, &Local)
    }

    /// [`PendingRow::from_raw`] with an explicit zone for dates that are not
    /// written as `YYYY-MM-DD`.
    pub fn from_raw_in<Tz: TimeZone>(raw: &serde_json::Value, tz: &Tz) -> Option<Self> {
        let text = |key: &str| raw.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let id = text("name")?;
        let kind = DarshanKind::from(text("darshan_type").unwrap_or_default());
        let devotee = ["devoteee_name", "devoteee", "owner"]
            .into_iter()
            .find_map(|k| text(k))
            .filter(|s| !s.is_empty());
        let date_iso = raw
            .get("darshan_date")
            .and_then(|v| calendar_date_in(v, tz))
            .map(|day| day.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Some(Self {
            id,
            kind,
            devotee,
            date_iso,
            time: text("darshan_time"),
            workflow_state: text("workflow_state").map(WorkflowState::from),
            raw: raw.clone(),
        })
    }
}

/// Actions raised from the review table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ReviewEvent {
    Approve { id: String },
    Reject { id: String },
    View { id: String },
    ApproveBulk { ids: Vec<String> },
    RejectBulk { ids: Vec<String> },
}

impl ReviewEvent {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            ReviewEvent::Approve { id } | ReviewEvent::Reject { id } | ReviewEvent::View { id } => {
                vec![id.as_str()]
            }
            ReviewEvent::ApproveBulk { ids } | ReviewEvent::RejectBulk { ids } => {
                ids.iter().map(String::as_str).collect()
            }
        }
    }
}

const VIP_DARSHAN_TYPE: &str = "Vip Darshan";

/// Body of a VIP appointment request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VipAppointmentPayload {
    pub details: VipAppointmentDetails,
    pub save_as_draft: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VipAppointmentDetails {
    pub darshan_date: String,
    /// `HH:MM:SS`
    pub darshan_time: String,
    pub darshan_with_protocol: u8,
    pub protocol_rank: String,
    pub government_authority_letter: String,
    pub darshan_type: String,
    pub darshan_companion: Vec<Companion>,
}

impl VipAppointmentPayload {
    /// `slot` may be a UI label (`"10:00 AM"`) or a 24-hour time.
    pub fn new(
        darshan_date: impl Into<String>,
        slot: &str,
        protocol_rank: impl Into<String>,
        government_authority_letter: impl Into<String>,
        companions: Vec<Companion>,
    ) -> Self {
        let darshan_time = format!("{}:00", canonical_slot(slot));
        Self {
            details: VipAppointmentDetails {
                darshan_date: darshan_date.into(),
                darshan_time,
                darshan_with_protocol: 1,
                protocol_rank: protocol_rank.into(),
                government_authority_letter: government_authority_letter.into(),
                darshan_type: VIP_DARSHAN_TYPE.to_string(),
                darshan_companion: companions,
            },
            save_as_draft: false,
        }
    }

    pub fn as_draft(mut self) -> Self {
        self.save_as_draft = true;
        self
    }
}

/// Paging and filters for appointment lists. Unset fields go out as `null`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct AppointmentFilter {
    #[serde(rename = "limitStart")]
    pub limit_start: Option<u32>,
    #[serde(rename = "pageLength")]
    pub page_length: Option<u32>,
    pub darshan_type: Option<String>,
    pub workflow_state: Option<String>,
}

impl AppointmentFilter {
    pub fn page(limit_start: u32, page_length: u32) -> Self {
        Self {
            limit_start: Some(limit_start),
            page_length: Some(page_length),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: &DarshanKind) -> Self {
        self.darshan_type = Some(kind.as_str().to_string());
        self
    }

    pub fn with_state(mut self, state: &WorkflowState) -> Self {
        self.workflow_state = Some(state.as_str().to_string());
        self
    }
}

/// Body returned by `/api/method/login`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Records of a list response: a bare array, or an array wrapped under
/// `data`, `appointments` or `appointment_list`.
pub fn list_items(message: &serde_json::Value) -> &[serde_json::Value] {
    message
        .as_array()
        .or_else(|| {
            ["data", "appointments", "appointment_list"]
                .iter()
                .find_map(|k| message.get(k).and_then(|v| v.as_array()))
        })
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Pull booking records out of a list response. Records that do not decode
/// are skipped with a warning.
pub fn bookings_from_list(message: &serde_json::Value) -> Vec<Booking> {
    list_items(message)
        .iter()
        .filter_map(|item| match Booking::deserialize(item) {
            Ok(b) => Some(b),
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable booking");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_json() -> serde_json::Value {
        json!({
            "name": "APT-0001",
            "darshan_type": "Shigra Darshan",
            "darshan_time": "10:00:00",
            "workflow_state": "Pending Verification",
            "darshan_date": "2024-01-15",
            "timeNote": "Flexible Time",
            "darshan_companion": [
                {"companion_name": "Asha", "companion_phone": 9876543210_u64, "companion_age": 34},
                {"companion_name": "Ravi", "companion_phone": "9000000000", "companion_age": "12"}
            ],
            "attender": null
        })
    }

    #[test]
    fn booking_decodes_mixed_companion_fields() {
        let b: Booking = serde_json::from_value(booking_json()).expect("booking");
        assert_eq!(b.darshan_type, DarshanKind::Shigra);
        assert_eq!(b.workflow_state, WorkflowState::PendingVerification);
        assert!(b.workflow_state.awaits_review());
        assert_eq!(b.darshan_companion[0].companion_phone, "9876543210");
        assert_eq!(b.darshan_companion[0].companion_age, "34");
        assert_eq!(b.darshan_companion[1].companion_age, "12");
        assert_eq!(b.time_note.as_deref(), Some("Flexible Time"));
        assert_eq!(b.attender, None);
    }

    #[test]
    fn booking_date_and_slot_helpers() {
        let b: Booking = serde_json::from_value(booking_json()).expect("booking");
        assert_eq!(b.canonical_date().as_deref(), Some("2024-01-15T00:00:00.000Z"));
        assert_eq!(b.slot_label(), "10:00 AM");
        assert!(b.is_in_slot("10:00 AM"));
        assert!(!b.is_in_slot("11:00 AM"));
    }

    #[test]
    fn unknown_states_and_kinds_round_trip() {
        let state: WorkflowState = serde_json::from_value(json!("On Hold")).expect("state");
        assert_eq!(state, WorkflowState::Other("On Hold".into()));
        assert_eq!(serde_json::to_value(&state).expect("ser"), json!("On Hold"));

        let kind: DarshanKind = serde_json::from_value(json!("Vip Darshan")).expect("kind");
        assert_eq!(kind, DarshanKind::Vip);
        assert_eq!(serde_json::to_value(&kind).expect("ser"), json!("VIP Darshan"));
    }

    #[test]
    fn companion_rejects_nested_age() {
        let res: Result<Companion, _> = serde_json::from_value(json!({
            "companion_name": "x", "companion_phone": "1", "companion_age": {"years": 3}
        }));
        assert!(res.is_err());
    }

    #[test]
    fn pending_row_from_raw() {
        let raw = json!({
            "name": "APT-9",
            "darshan_type": "Bhasm Arti",
            "devoteee_name": "Meera",
            "darshan_date": "2024-02-01",
            "darshan_time": "04:00:00",
            "workflow_state": "Pending"
        });
        let row = PendingRow::from_raw(&raw).expect("row");
        assert_eq!(row.id, "APT-9");
        assert_eq!(row.kind, DarshanKind::BhasmArti);
        assert_eq!(row.devotee.as_deref(), Some("Meera"));
        assert_eq!(row.date_iso, "2024-02-01");
        assert_eq!(row.workflow_state, Some(WorkflowState::Pending));
        assert!(PendingRow::from_raw(&json!({"darshan_type": "x"})).is_none());
    }

    #[test]
    fn pending_row_keeps_the_booked_day() {
        let ist = chrono::FixedOffset::east_opt(5 * 3600 + 1800).expect("IST offset");
        let raw = json!({"name": "A", "darshan_date": "2024-02-01 02:00:00"});
        let row = PendingRow::from_raw_in(&raw, &ist).expect("row");
        assert_eq!(row.date_iso, "2024-02-01");

        // epoch dates are read in the zone
        let raw = json!({"name": "B", "darshan_date": 1_706_738_400_i64});
        assert_eq!(PendingRow::from_raw_in(&raw, &ist).expect("row").date_iso, "2024-02-01");
        assert_eq!(PendingRow::from_raw_in(&raw, &chrono::Utc).expect("row").date_iso, "2024-01-31");
    }

    #[test]
    fn summary_pending_never_underflows() {
        let s = Summary {
            kind: DarshanKind::Vip,
            received: 3,
            approved: 2,
            rejected: 4,
            accent: Some(Accent::Blue),
        };
        assert_eq!(s.pending(), 0);
        let v = serde_json::to_value(&s).expect("ser");
        assert_eq!(v["accent"], "blue");
    }

    #[test]
    fn review_event_wire_shape() {
        let ev: ReviewEvent =
            serde_json::from_value(json!({"event": "approveBulk", "ids": ["a", "b"]})).expect("ev");
        assert_eq!(ev.ids(), vec!["a", "b"]);
        let ev: ReviewEvent = serde_json::from_value(json!({"event": "view", "id": "a"})).expect("ev");
        assert_eq!(ev, ReviewEvent::View { id: "a".into() });
    }

    #[test]
    fn vip_payload_normalizes_slot_label() {
        let payload = VipAppointmentPayload::new("2024-01-15", "4:30 PM", "Minister", "letter.pdf", vec![]);
        let v = serde_json::to_value(&payload).expect("ser");
        assert_eq!(v["details"]["darshan_time"], "16:30:00");
        assert_eq!(v["details"]["darshan_with_protocol"], 1);
        assert_eq!(v["details"]["darshan_type"], "Vip Darshan");
        assert_eq!(v["save_as_draft"], false);
        assert!(payload.as_draft().save_as_draft);
    }

    #[test]
    fn vip_payload_pads_every_slot_form() {
        for (slot, expected) in [
            ("9:00", "09:00:00"),
            ("09:00", "09:00:00"),
            ("09:00:00", "09:00:00"),
            ("9:00 AM", "09:00:00"),
            ("12:15 AM", "00:15:00"),
        ] {
            let payload = VipAppointmentPayload::new("2024-01-15", slot, "Judge", "l.pdf", vec![]);
            assert_eq!(payload.details.darshan_time, expected, "{slot}");
        }
    }

    #[test]
    fn vip_payload_schema_lists_details() {
        let schema = serde_json::to_value(schemars::schema_for!(VipAppointmentPayload)).expect("schema");
        assert!(schema["properties"]["details"].is_object());
        assert!(schema["properties"]["save_as_draft"].is_object());
    }

    #[test]
    fn filter_serializes_with_backend_names() {
        let f = AppointmentFilter::page(0, 20).with_state(&WorkflowState::Approved);
        let v = serde_json::to_value(&f).expect("ser");
        assert_eq!(
            v,
            json!({"limitStart": 0, "pageLength": 20, "darshan_type": null, "workflow_state": "Approved"})
        );
    }

    #[test]
    fn bookings_from_wrapped_and_bare_lists() {
        let bare = json!([booking_json(), {"name": "broken"}]);
        assert_eq!(bookings_from_list(&bare).len(), 1);
        let wrapped = json!({"data": [booking_json()], "total": 1});
        assert_eq!(bookings_from_list(&wrapped)[0].name, "APT-0001");
        assert!(bookings_from_list(&json!("nothing")).is_empty());
    }
}
