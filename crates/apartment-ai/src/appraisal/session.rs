use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "appraisal_session";

/// Opaque random identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(format!("{:032x}", rand::random::<u128>()))
    }

    /// Accepts only ids shaped like the ones `generate` hands out.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (raw.len() == 32 && raw.chars().all(|c| c.is_ascii_hexdigit()))
            .then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the session id from the request's `Cookie` headers.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::parse(value))
    }

    pub fn set_cookie(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.0
        )
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values remembered between visits to prefill the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionValues {
    pub price: Option<i64>,
    pub area: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Server-side session storage keyed by cookie id.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &SessionId) -> Result<Option<SessionValues>, SessionError>;
    fn save(&self, id: &SessionId, values: SessionValues) -> Result<(), SessionError>;
}

/// Sessions kept before the least recently used one is evicted.
pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<SessionId, (SessionValues, u64)>,
    clock: u64,
}

impl SessionTable {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, (_, touched))| *touched)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            self.entries.remove(&id);
        }
    }
}

/// Process-local store holding at most `capacity` sessions.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<SessionTable>>,
    capacity: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionTable::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .map(|guard| guard.entries.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, id: &SessionId) -> Result<Option<SessionValues>, SessionError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        let now = guard.tick();
        Ok(guard.entries.get_mut(id).map(|(values, touched)| {
            *touched = now;
            *values
        }))
    }

    fn save(&self, id: &SessionId, values: SessionValues) -> Result<(), SessionError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;
        if !guard.entries.contains_key(id) && guard.entries.len() >= self.capacity {
            guard.evict_oldest();
        }
        let now = guard.tick();
        guard.entries.insert(id.clone(), (values, now));
        Ok(())
    }
}
