use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Days, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::client::{PlatformClient, PlatformError};
use super::domain::{EnrichedSession, RawSession};
use super::normalize::{self, MemberProfile};

/// Fixed page size used by the bulk session listing.
pub const SESSION_PAGE_SIZE: u32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read location table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid location table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Maps human-readable studio location names to provider location ids.
/// Loadable configuration data; the bundled table covers the chain's
/// current studios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationDirectory {
    entries: BTreeMap<String, String>,
}

impl LocationDirectory {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn standard() -> Self {
        Self::new(BTreeMap::from([
            ("Downtown".to_string(), "8402".to_string()),
            ("Riverside".to_string(), "8417".to_string()),
            ("North Loop".to_string(), "8433".to_string()),
            ("West End".to_string(), "8448".to_string()),
        ]))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let entries: BTreeMap<String, String> = serde_json::from_reader(reader)?;
        Ok(Self::new(entries))
    }

    /// Exact name match first, then case-insensitive substring match on the
    /// table keys. An unresolvable name means "no filter", never an error.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if name.trim().is_empty() {
            return None;
        }
        if let Some(id) = self.entries.get(name) {
            return Some(id);
        }
        let needle = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| key.to_ascii_lowercase().contains(&needle))
            .map(|(_, id)| id.as_str())
    }
}

/// Drives multi-page session collection and the per-session detail fan-out.
pub struct SessionCollector {
    client: Arc<PlatformClient>,
    locations: LocationDirectory,
}

impl SessionCollector {
    pub fn new(client: Arc<PlatformClient>, locations: LocationDirectory) -> Self {
        Self { client, locations }
    }

    pub fn locations(&self) -> &LocationDirectory {
        &self.locations
    }

    /// Start of the next UTC calendar day, truncated to whole seconds. Bulk
    /// views exclude sessions that have not happened yet.
    pub fn default_window_end(now: DateTime<Utc>) -> DateTime<Utc> {
        let tomorrow = now.date_naive() + Days::new(1);
        tomorrow
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(now)
    }

    /// Collect up to `max_pages` pages of sessions, enriching every row with
    /// its detail record. The loop stops early on a short page or once the
    /// server-reported total is covered. A failed detail fetch keeps that
    /// session with summary fields only.
    pub async fn collect(
        &self,
        max_pages: u32,
        starts_before: Option<DateTime<Utc>>,
        location: Option<&str>,
    ) -> Result<Vec<EnrichedSession>, PlatformError> {
        let window_end = starts_before.unwrap_or_else(|| Self::default_window_end(Utc::now()));
        let location_id = location.and_then(|name| {
            let resolved = self.locations.resolve(name);
            if resolved.is_none() {
                debug!(location = name, "unknown location name, collecting without filter");
            }
            resolved
        });

        let mut collected = Vec::new();
        let mut fetched: u64 = 0;
        for page in 0..max_pages {
            let envelope = self
                .client
                .list_sessions(page, SESSION_PAGE_SIZE, Some(window_end), location_id)
                .await?;
            let row_count = envelope.payload.len();
            fetched += row_count as u64;

            let details = join_all(
                envelope
                    .payload
                    .iter()
                    .map(|session| self.fetch_detail(&session.id)),
            )
            .await;
            for (summary, detail) in envelope.payload.into_iter().zip(details) {
                collected.push(EnrichedSession { summary, detail });
            }

            if (row_count as u32) < SESSION_PAGE_SIZE {
                break;
            }
            let total = envelope.pagination.total_count;
            if total > 0 && fetched >= total {
                break;
            }
        }
        Ok(collected)
    }

    async fn fetch_detail(&self, session_id: &str) -> Option<RawSession> {
        match self.client.session_by_id(session_id).await {
            Ok(detail) => Some(detail),
            Err(error) => {
                warn!(
                    session_id,
                    error = %error,
                    "session detail fetch failed, keeping summary only"
                );
                None
            }
        }
    }

    /// Composed member detail: identity, active memberships, and recent
    /// sessions, normalized into the canonical member shape.
    pub async fn member_profile(
        &self,
        member_id: &str,
        now: DateTime<Utc>,
    ) -> Result<MemberProfile, PlatformError> {
        let (member, memberships, sessions) = futures::join!(
            self.client.member_by_id(member_id),
            self.client.member_memberships(member_id),
            self.client.member_sessions(member_id, Some(now)),
        );
        let member = member?;
        let memberships = memberships?.payload;
        let sessions = sessions?.payload;
        Ok(normalize::normalize_member(
            &member,
            &memberships,
            &sessions,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn resolve_prefers_exact_match() {
        let directory = LocationDirectory::standard();
        assert_eq!(directory.resolve("Downtown"), Some("8402"));
    }

    #[test]
    fn resolve_falls_back_to_case_insensitive_substring() {
        let directory = LocationDirectory::standard();
        assert_eq!(directory.resolve("downtown"), Some("8402"));
        assert_eq!(directory.resolve("north"), Some("8433"));
    }

    #[test]
    fn unknown_or_blank_names_resolve_to_no_filter() {
        let directory = LocationDirectory::standard();
        assert_eq!(directory.resolve("Lakeshore"), None);
        assert_eq!(directory.resolve("  "), None);
    }

    #[test]
    fn directory_loads_from_json_object() {
        let directory = LocationDirectory::from_reader(r#"{"Harbor": "9001"}"#.as_bytes())
            .expect("valid table");
        assert_eq!(directory.resolve("Harbor"), Some("9001"));
    }

    #[test]
    fn default_window_end_is_start_of_next_utc_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 17, 45, 12).unwrap();
        let end = SessionCollector::default_window_end(now);
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }
}
