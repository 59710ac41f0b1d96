//! Integration layer for the external member/session platform: bearer-token
//! lifecycle, the typed data client, multi-page session aggregation, and the
//! normalization of raw payloads into the application's canonical shapes.

pub mod aggregation;
pub mod client;
pub mod domain;
pub mod normalize;
pub mod router;
pub mod token;
pub mod transport;

#[cfg(test)]
mod tests;

pub use aggregation::{LocationDirectory, SessionCollector, SESSION_PAGE_SIZE};
pub use client::{PlatformClient, PlatformError};
pub use domain::{EnrichedSession, Paginated, RawMember, RawMembership, RawSession};
pub use normalize::{ActivityLevel, MemberProfile, MembershipStatus, SessionView};
pub use router::{directory_router, DirectoryState};
pub use token::{AuthError, PlatformCredentials, TokenManager};
pub use transport::{PlatformRequest, PlatformResponse, PlatformTransport, ReqwestTransport};
