//! Pure mapping from raw platform payloads into the application's canonical
//! member/session shapes. No I/O; computed fields are derived here and never
//! stored independently.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{EnrichedSession, RawMember, RawMembership, RawSession};

/// Computed standing of a member's primary membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Frozen,
    Expired,
    Inactive,
}

impl MembershipStatus {
    pub const fn label(self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Frozen => "frozen",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Inactive => "inactive",
        }
    }
}

/// Visit-count tier. Band upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    New,
    Beginner,
    Regular,
    Frequent,
    Vip,
}

impl ActivityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ActivityLevel::New => "new",
            ActivityLevel::Beginner => "beginner",
            ActivityLevel::Regular => "regular",
            ActivityLevel::Frequent => "frequent",
            ActivityLevel::Vip => "vip",
        }
    }
}

/// Frozen wins over date-based expiry; an absent end date is open-ended.
pub fn membership_status(
    membership: Option<&RawMembership>,
    now: DateTime<Utc>,
) -> MembershipStatus {
    let Some(membership) = membership else {
        return MembershipStatus::Inactive;
    };
    if membership.is_frozen {
        return MembershipStatus::Frozen;
    }
    match membership.end_date {
        Some(end) if end < now => MembershipStatus::Expired,
        _ => MembershipStatus::Active,
    }
}

pub fn activity_level(total_visits: u32) -> ActivityLevel {
    match total_visits {
        0 => ActivityLevel::New,
        1..=5 => ActivityLevel::Beginner,
        6..=20 => ActivityLevel::Regular,
        21..=50 => ActivityLevel::Frequent,
        _ => ActivityLevel::Vip,
    }
}

pub fn available_spots(capacity: u32, booking_count: u32) -> u32 {
    capacity.saturating_sub(booking_count)
}

pub fn utilization_rate(capacity: u32, booking_count: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    ((booking_count as f64 / capacity as f64) * 100.0).round() as u32
}

/// Canonical member shape consumed by the intake form. Every field is filled
/// with an empty default when the platform omits the source value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub picture: String,
    pub visits: VisitSummary,
    pub custom_fields: Vec<CustomFieldView>,
    pub tags: Vec<String>,
    pub membership_status: MembershipStatus,
    pub activity_level: ActivityLevel,
    pub memberships: Vec<MembershipView>,
    pub sessions: Vec<SessionView>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub appointments: u32,
    pub bookings: u32,
    pub open_area: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldView {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_frozen: bool,
    pub sessions_used: u32,
    pub session_limit: Option<u32>,
    pub appointments_used: u32,
    pub appointment_limit: Option<u32>,
    pub credits_remaining: f64,
    pub status: MembershipStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: u32,
    pub capacity: u32,
    pub booking_count: u32,
    pub available_spots: u32,
    pub utilization_rate: u32,
    pub teacher: String,
    pub location: String,
    pub is_cancelled: bool,
    pub is_draft: bool,
}

pub fn normalize_member(
    member: &RawMember,
    memberships: &[RawMembership],
    sessions: &[RawSession],
    now: DateTime<Utc>,
) -> MemberProfile {
    let name = format!("{} {}", member.first_name.trim(), member.last_name.trim())
        .trim()
        .to_string();

    MemberProfile {
        id: member.id.clone(),
        name,
        email: member.email.clone(),
        phone: member.phone.clone(),
        picture: member.picture.clone(),
        visits: VisitSummary {
            appointments: member.statistics.appointments,
            bookings: member.statistics.bookings,
            open_area: member.statistics.open_area,
            total: member.statistics.total,
        },
        custom_fields: member
            .custom_fields
            .iter()
            .map(|field| CustomFieldView {
                name: field.name.clone(),
                value: field.value.clone(),
            })
            .collect(),
        tags: member.tags.iter().map(|tag| tag.name.clone()).collect(),
        membership_status: membership_status(memberships.first(), now),
        activity_level: activity_level(member.statistics.total),
        memberships: memberships
            .iter()
            .map(|membership| normalize_membership(membership, now))
            .collect(),
        sessions: sessions.iter().map(session_view).collect(),
    }
}

pub fn normalize_membership(membership: &RawMembership, now: DateTime<Utc>) -> MembershipView {
    MembershipView {
        name: membership.name.clone(),
        start_date: membership.start_date,
        end_date: membership.end_date,
        is_frozen: membership.is_frozen,
        sessions_used: membership.sessions_used,
        session_limit: membership.session_limit,
        appointments_used: membership.appointments_used,
        appointment_limit: membership.appointment_limit,
        credits_remaining: membership.credits_remaining.unwrap_or(0.0),
        status: membership_status(Some(membership), now),
    }
}

/// Canonical view of a bulk-listed session after the detail merge.
pub fn normalize_session(enriched: &EnrichedSession) -> SessionView {
    session_view(&enriched.merged())
}

fn session_view(session: &RawSession) -> SessionView {
    SessionView {
        id: session.id.clone(),
        name: session.name.clone(),
        start_time: session.start_time,
        end_time: session.end_time,
        duration_minutes: session.duration_minutes,
        capacity: session.capacity,
        booking_count: session.booking_count,
        available_spots: available_spots(session.capacity, session.booking_count),
        utilization_rate: utilization_rate(session.capacity, session.booking_count),
        teacher: session
            .teacher
            .as_ref()
            .map(|teacher| teacher.name.clone())
            .unwrap_or_default(),
        location: session
            .location
            .as_ref()
            .map(|location| location.name.clone())
            .unwrap_or_default(),
        is_cancelled: session.is_cancelled,
        is_draft: session.is_draft,
    }
}
