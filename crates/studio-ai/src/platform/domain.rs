use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Paginated envelope returned by the platform's list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(default)]
    pub payload: Vec<T>,
    #[serde(default)]
    pub pagination: PageInfo,
}

impl<T> Paginated<T> {
    pub fn empty() -> Self {
        Self {
            payload: Vec::new(),
            pagination: PageInfo::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

/// A studio customer record as the platform returns it. Every field carries
/// a default so partial payloads decode without `Option` noise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMember {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub statistics: VisitStatistics,
    pub custom_fields: Vec<CustomField>,
    pub tags: Vec<MemberTag>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitStatistics {
    pub appointments: u32,
    pub bookings: u32,
    pub open_area: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomField {
    pub id: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberTag {
    pub id: String,
    pub name: String,
}

/// A purchased plan entitling a member to sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMembership {
    pub id: String,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    /// Absent means open-ended, never expired by date comparison alone.
    pub end_date: Option<DateTime<Utc>>,
    pub is_frozen: bool,
    pub sessions_used: u32,
    pub session_limit: Option<u32>,
    pub appointments_used: u32,
    pub appointment_limit: Option<u32>,
    pub credits_remaining: Option<f64>,
}

/// A bookable class/appointment instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSession {
    pub id: String,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub capacity: u32,
    pub booking_count: u32,
    pub teacher: Option<SessionTeacher>,
    pub location: Option<SessionLocation>,
    pub is_cancelled: bool,
    pub is_draft: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionTeacher {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionLocation {
    pub id: String,
    pub name: String,
}

/// A bulk-listed session, optionally enriched with its detail record. A
/// failed detail fetch keeps the summary alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedSession {
    pub summary: RawSession,
    pub detail: Option<RawSession>,
}

impl EnrichedSession {
    /// Shallow merge: detail fields win on conflict, summary fields fill
    /// whatever the detail record left empty.
    pub fn merged(&self) -> RawSession {
        let Some(detail) = &self.detail else {
            return self.summary.clone();
        };

        let mut merged = detail.clone();
        if merged.id.is_empty() {
            merged.id = self.summary.id.clone();
        }
        if merged.name.is_empty() {
            merged.name = self.summary.name.clone();
        }
        if merged.start_time.is_none() {
            merged.start_time = self.summary.start_time;
        }
        if merged.end_time.is_none() {
            merged.end_time = self.summary.end_time;
        }
        if merged.duration_minutes == 0 {
            merged.duration_minutes = self.summary.duration_minutes;
        }
        if merged.capacity == 0 {
            merged.capacity = self.summary.capacity;
        }
        if merged.booking_count == 0 {
            merged.booking_count = self.summary.booking_count;
        }
        if merged.teacher.is_none() {
            merged.teacher = self.summary.teacher.clone();
        }
        if merged.location.is_none() {
            merged.location = self.summary.location.clone();
        }
        merged
    }
}
