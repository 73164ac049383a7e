use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::card::{INSTRUCTOR_NAME, is_instructor_card};

/// How long a successful swipe keeps the classroom unlocked.
pub const AUTH_TIMEOUT_HOURS: i64 = 8;

/// Upper bound on concurrently unlocked browsers.
const MAX_SESSIONS: u64 = 1_000;

pub fn default_auth_timeout() -> Duration {
    Duration::hours(AUTH_TIMEOUT_HOURS)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub authenticated: bool,
    pub timestamp: DateTime<Utc>,
    pub instructor: String,
}

impl AuthRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            timestamp: now,
            instructor: INSTRUCTOR_NAME.to_string(),
        }
    }

    /// Expired once strictly more than `timeout` has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.timestamp > timeout
    }

    pub fn expires_at(&self, timeout: Duration) -> DateTime<Utc> {
        self.timestamp + timeout
    }
}

/// Session-scoped authentication flags, one per unlocked browser.
///
/// Expiry is checked against the stored timestamp on every lookup. The cache
/// TTL only reclaims memory for sessions nobody asks about again.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, AuthRecord>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        let ttl = timeout
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(AUTH_TIMEOUT_HOURS as u64 * 3600));

        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(ttl)
                .build(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a session if the swipe carries the instructor card.
    pub async fn authenticate(
        &self,
        card_data: &str,
        now: DateTime<Utc>,
    ) -> Option<(String, AuthRecord)> {
        if !is_instructor_card(card_data) {
            return None;
        }

        let session_id = Uuid::new_v4().to_string();
        let record = AuthRecord::new(now);
        self.sessions.insert(session_id.clone(), record.clone()).await;
        Some((session_id, record))
    }

    /// Returns the live record, dropping it first if it has expired.
    pub async fn check(&self, session_id: &str, now: DateTime<Utc>) -> Option<AuthRecord> {
        let record = self.sessions.get(session_id).await?;

        if record.is_expired(now, self.timeout) {
            tracing::info!(session_id, "Instructor session expired");
            self.sessions.invalidate(session_id).await;
            return None;
        }

        record.authenticated.then_some(record)
    }

    pub async fn is_authenticated(&self, session_id: &str, now: DateTime<Utc>) -> bool {
        self.check(session_id, now).await.is_some()
    }

    pub async fn logout(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(default_auth_timeout())
    }
}
