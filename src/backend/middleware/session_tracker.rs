/**
 * Session Tracker
 *
 * Diagnostic log of what each client has been doing, keyed by client IP
 * plus user agent. Nothing in the request path reads it back; it is only
 * exposed through `GET /debug/sessions`.
 *
 * # Bounds
 *
 * - at most `capacity` sessions, least recently seen evicted first
 * - at most `MAX_ACTIONS_PER_SESSION` actions kept per session
 */

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::USER_AGENT,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use serde::Serialize;
use uuid::Uuid;

/// Actions retained per session
pub const MAX_ACTIONS_PER_SESSION: usize = 100;

/// Actions included in each session summary
pub const RECENT_ACTIONS_SHOWN: usize = 5;

/// Window within which a session counts as active
pub const ACTIVE_WINDOW_MINUTES: i64 = 30;

/// One observed request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionAction {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
}

#[derive(Debug, Clone)]
struct Session {
    id: String,
    ip: String,
    user_agent: String,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    total_actions: u64,
    actions: VecDeque<SessionAction>,
}

/// Summary of one session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub ip: String,
    pub user_agent: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub total_actions: u64,
    pub recent_actions: Vec<SessionAction>,
}

/// Aggregate view returned by the debug endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub total_actions: u64,
    pub sessions: Vec<SessionSummary>,
}

/// Shared, bounded session map
#[derive(Clone)]
pub struct SessionTracker {
    sessions: Arc<Mutex<LruCache<String, Session>>>,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("sessions", &self.lock().len())
            .finish()
    }
}

impl SessionTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    // A panic while holding the lock leaves the map usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one request from `ip` with `user_agent`
    pub fn record(&self, ip: &str, user_agent: &str, method: &str, path: &str, now: DateTime<Utc>) {
        let key = format!("{}_{}", ip, user_agent);
        let mut sessions = self.lock();

        if !sessions.contains(&key) {
            let id = format!("session_{}", &Uuid::new_v4().simple().to_string()[..12]);
            tracing::debug!("New session {} for {}", id, ip);
            sessions.put(
                key.clone(),
                Session {
                    id,
                    ip: ip.to_string(),
                    user_agent: user_agent.to_string(),
                    first_seen: now,
                    last_seen: now,
                    total_actions: 0,
                    actions: VecDeque::with_capacity(MAX_ACTIONS_PER_SESSION),
                },
            );
        }

        if let Some(session) = sessions.get_mut(&key) {
            session.last_seen = now;
            session.total_actions += 1;
            if session.actions.len() == MAX_ACTIONS_PER_SESSION {
                session.actions.pop_front();
            }
            session.actions.push_back(SessionAction {
                timestamp: now,
                method: method.to_string(),
                path: path.to_string(),
            });
        }
    }

    /// Snapshot of all tracked sessions, most recently seen first
    pub fn stats(&self, now: DateTime<Utc>) -> SessionStats {
        let sessions = self.lock();
        let active_since = now - Duration::minutes(ACTIVE_WINDOW_MINUTES);

        let summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(_, s)| SessionSummary {
                id: s.id.clone(),
                ip: s.ip.clone(),
                user_agent: s.user_agent.clone(),
                first_seen: s.first_seen,
                last_seen: s.last_seen,
                total_actions: s.total_actions,
                recent_actions: s
                    .actions
                    .iter()
                    .skip(s.actions.len().saturating_sub(RECENT_ACTIONS_SHOWN))
                    .cloned()
                    .collect(),
            })
            .collect();

        SessionStats {
            total_sessions: summaries.len(),
            active_sessions: summaries
                .iter()
                .filter(|s| s.last_seen > active_since)
                .count(),
            total_actions: summaries.iter().map(|s| s.total_actions).sum(),
            sessions: summaries,
        }
    }
}

fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip;
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Middleware recording every request into the tracker
pub async fn track_session(
    State(tracker): State<SessionTracker>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();
    tracker.record(
        &ip,
        &user_agent,
        request.method().as_str(),
        request.uri().path(),
        Utc::now(),
    );
    next.run(request).await
}
