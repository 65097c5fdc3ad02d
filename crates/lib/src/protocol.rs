//! Chat backend wire types: `POST /api/chat` request body and the structured
//! reply the widget reacts to.
//!
//! The reply's `type` tag is opaque here; the widget only maps known tags to
//! affordances (see `options`). Payload arrays are optional by contract and
//! default to absent.

use serde::{Deserialize, Serialize};

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

/// Error body returned by the backend with a non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReply {
    #[serde(default)]
    pub error: String,
}

/// One structured backend reply. Consumed once per turn, never retained.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendReply {
    /// Tag the widget dispatches affordances on. Absent means plain text.
    #[serde(rename = "type", default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Pass-through option labels (blood group selection).
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub doctors: Option<Vec<DoctorSlot>>,
    #[serde(default)]
    pub dates: Option<Vec<DateSlot>>,
    #[serde(default)]
    pub time_slots: Option<Vec<TimeSlot>>,
    /// Present on booking confirmation replies.
    #[serde(default)]
    pub unique_code: Option<String>,
}

/// One doctor entry in a `doctor_selection` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSlot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub qualification: Option<String>,
    /// E.g. "Mon-Fri 9AM-5PM". Rendered as "Available" when missing.
    #[serde(default)]
    pub availability: Option<String>,
}

/// One date entry in a `date_selection` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateSlot {
    #[serde(default)]
    pub date: String,
    /// Human-readable name, e.g. "Monday, October 20, 2025".
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub total_available_slots: u32,
}

/// One slot entry in a `time_selection` reply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeSlot {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_booked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_deserializes_with_partial_payload() {
        let reply: BackendReply = serde_json::from_str(
            r#"{"type":"doctor_selection","message":"pick one","doctors":[{"name":"Dr. A","specialty":"Cardio"}]}"#,
        )
        .expect("parse reply");
        assert_eq!(reply.typ.as_deref(), Some("doctor_selection"));
        let doctors = reply.doctors.expect("doctors present");
        assert_eq!(doctors[0].name, "Dr. A");
        assert_eq!(doctors[0].availability, None);
        assert!(reply.dates.is_none());
    }

    #[test]
    fn reply_tolerates_absent_type_and_extra_fields() {
        let reply: BackendReply = serde_json::from_str(
            r#"{"message":"hello","placeholder":"Enter your age"}"#,
        )
        .expect("parse reply");
        assert_eq!(reply.typ, None);
        assert_eq!(reply.message, "hello");
    }

    #[test]
    fn request_serializes_snake_case_fields() {
        let req = ChatRequest {
            message: "Book appointment".to_string(),
            session_id: "web-1".to_string(),
        };
        let json = serde_json::to_value(&req).expect("serialize request");
        assert_eq!(json["message"], "Book appointment");
        assert_eq!(json["session_id"], "web-1");
    }
}
