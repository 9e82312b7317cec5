//! Wire payloads for the booking API.
//!
//! All instants cross the wire as RFC 3339 UTC with millisecond
//! precision, via the serde helpers at the bottom of this module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use slotwise_engine::{Gap, Interval};
use slotwise_service::{
    AvailabilityReport, BookingException, BookingRecord, BookingRequest, ConflictEntry,
    ConflictReport,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub resource_id: Uuid,
    #[serde(with = "rfc3339_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionPayload>,
}

impl CreateBookingRequest {
    pub fn into_service_request(self) -> BookingRequest {
        BookingRequest {
            resource_id: self.resource_id,
            start: self.start_time,
            end: self.end_time,
            metadata: self.metadata.unwrap_or_else(|| serde_json::json!({})),
            recurrence_rule: self.recurrence_rule,
            exceptions: self
                .exceptions
                .into_iter()
                .map(|exc| BookingException {
                    date: exc.date,
                    replace_start: exc.replace_start,
                    replace_end: exc.replace_end,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionPayload {
    pub date: NaiveDate,
    #[serde(
        default,
        with = "rfc3339_millis_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub replace_start: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "rfc3339_millis_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub replace_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub resource_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Minimum slot duration in minutes.
    #[serde(default = "default_slot_minutes")]
    pub slot: i64,
}

fn default_slot_minutes() -> i64 {
    60
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct BookingEnvelope {
    pub status: &'static str,
    pub booking: BookingPayload,
}

impl From<BookingRecord> for BookingEnvelope {
    fn from(record: BookingRecord) -> Self {
        Self {
            status: "success",
            booking: BookingPayload {
                id: record.id,
                resource_id: record.resource_id,
                start_time: record.start,
                end_time: record.end,
                metadata: record.metadata,
                created_at: record.created_at,
                is_recurring: record.is_recurring,
                recurrence_rule: record.recurrence_rule,
                exceptions: record.exceptions.into_iter().map(Into::into).collect(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingPayload {
    pub id: Uuid,
    pub resource_id: Uuid,
    #[serde(with = "rfc3339_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end_time: DateTime<Utc>,
    pub metadata: serde_json::Value,
    #[serde(with = "rfc3339_millis")]
    pub created_at: DateTime<Utc>,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    pub exceptions: Vec<ExceptionPayload>,
}

impl From<BookingException> for ExceptionPayload {
    fn from(exc: BookingException) -> Self {
        Self {
            date: exc.date,
            replace_start: exc.replace_start,
            replace_end: exc.replace_end,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConflictEnvelope {
    pub status: &'static str,
    pub message: String,
    pub conflicts: Vec<ConflictPayload>,
    pub next_available: Vec<SlotPayload>,
}

impl From<ConflictReport> for ConflictEnvelope {
    fn from(report: ConflictReport) -> Self {
        Self {
            status: "conflict",
            message: report.message,
            conflicts: report.conflicts.into_iter().map(Into::into).collect(),
            next_available: report.next_available.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConflictPayload {
    pub booking_id: Uuid,
    #[serde(with = "rfc3339_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end: DateTime<Utc>,
    pub is_recurring: bool,
    #[serde(
        with = "rfc3339_millis_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub occurrence_start: Option<DateTime<Utc>>,
    #[serde(
        with = "rfc3339_millis_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub occurrence_end: Option<DateTime<Utc>>,
}

impl From<ConflictEntry> for ConflictPayload {
    fn from(entry: ConflictEntry) -> Self {
        Self {
            booking_id: entry.booking_id,
            start: entry.start,
            end: entry.end,
            is_recurring: entry.is_recurring,
            occurrence_start: entry.occurrence_start,
            occurrence_end: entry.occurrence_end,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotPayload {
    #[serde(with = "rfc3339_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end: DateTime<Utc>,
}

impl From<Interval> for SlotPayload {
    fn from(interval: Interval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub resource_id: Uuid,
    pub resource_name: String,
    #[serde(with = "rfc3339_millis")]
    pub from: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub to: DateTime<Utc>,
    pub slot_duration_minutes: i64,
    pub available_slots: Vec<AvailableSlotPayload>,
    pub busy_slots_count: usize,
}

impl From<AvailabilityReport> for AvailabilityResponse {
    fn from(report: AvailabilityReport) -> Self {
        Self {
            resource_id: report.resource.id,
            resource_name: report.resource.name,
            from: report.from,
            to: report.to,
            slot_duration_minutes: report.slot_duration_minutes,
            available_slots: report.available_slots.into_iter().map(Into::into).collect(),
            busy_slots_count: report.busy_slots_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AvailableSlotPayload {
    #[serde(with = "rfc3339_millis")]
    pub start: DateTime<Utc>,
    #[serde(with = "rfc3339_millis")]
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl From<Gap> for AvailableSlotPayload {
    fn from(gap: Gap) -> Self {
        Self {
            start: gap.start,
            end: gap.end,
            duration_minutes: gap.duration_minutes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ---------------------------------------------------------------------------
// Time format helpers
// ---------------------------------------------------------------------------

/// RFC 3339 UTC with fixed millisecond precision, e.g.
/// `2025-12-02T10:00:00.000Z`.
pub mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`rfc3339_millis`].
pub mod rfc3339_millis_option {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn instants_serialize_with_fixed_millisecond_precision() {
        let slot = SlotPayload {
            start: instant(),
            end: instant() + chrono::Duration::hours(1),
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "2025-12-02T10:00:00.000Z");
        assert_eq!(json["end"], "2025-12-02T11:00:00.000Z");
    }

    #[test]
    fn request_parses_with_exceptions() {
        let body = serde_json::json!({
            "resource_id": "7a1e8a60-26a9-4c0f-9bfe-3a8a24c8f3a1",
            "start_time": "2025-11-03T10:00:00.000Z",
            "end_time": "2025-11-03T11:00:00.000Z",
            "recurrence_rule": "FREQ=WEEKLY;BYDAY=MO;COUNT=4",
            "exceptions": [
                { "date": "2025-11-10" },
                {
                    "date": "2025-11-17",
                    "replace_start": "2025-11-17T14:00:00.000Z",
                    "replace_end": "2025-11-17T15:00:00.000Z"
                }
            ]
        });
        let request: CreateBookingRequest = serde_json::from_value(body).unwrap();

        assert_eq!(request.exceptions.len(), 2);
        assert!(request.exceptions[0].replace_start.is_none());
        assert_eq!(
            request.exceptions[1].replace_start,
            Some(Utc.with_ymd_and_hms(2025, 11, 17, 14, 0, 0).unwrap())
        );

        let service_request = request.into_service_request();
        assert_eq!(service_request.metadata, serde_json::json!({}));
        assert_eq!(service_request.exceptions.len(), 2);
    }

    #[test]
    fn request_accepts_offset_timestamps_and_normalizes_to_utc() {
        let body = serde_json::json!({
            "resource_id": "7a1e8a60-26a9-4c0f-9bfe-3a8a24c8f3a1",
            "start_time": "2025-11-03T11:00:00.000+01:00",
            "end_time": "2025-11-03T12:00:00.000+01:00"
        });
        let request: CreateBookingRequest = serde_json::from_value(body).unwrap();
        assert_eq!(
            request.start_time,
            Utc.with_ymd_and_hms(2025, 11, 3, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn conflict_envelope_omits_absent_occurrence_fields() {
        let envelope = ConflictEnvelope {
            status: "conflict",
            message: "requested time conflicts with existing bookings".to_string(),
            conflicts: vec![ConflictPayload {
                booking_id: Uuid::nil(),
                start: instant(),
                end: instant() + chrono::Duration::hours(1),
                is_recurring: false,
                occurrence_start: None,
                occurrence_end: None,
            }],
            next_available: vec![],
        };
        let json = serde_json::to_value(&envelope).unwrap();
        let conflict = &json["conflicts"][0];
        assert!(conflict.get("occurrence_start").is_none());
        assert_eq!(conflict["is_recurring"], false);
    }

    #[test]
    fn availability_query_defaults_slot_to_sixty() {
        let query: AvailabilityQuery = serde_json::from_value(serde_json::json!({
            "resource_id": "7a1e8a60-26a9-4c0f-9bfe-3a8a24c8f3a1",
            "from": "2026-01-01T00:00:00Z",
            "to": "2026-01-02T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(query.slot, 60);
    }
}
