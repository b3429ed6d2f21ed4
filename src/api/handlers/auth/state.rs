//! Auth state, configuration, and session-bound login tracking.

use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::rate_limit::RateLimiter;

const DEFAULT_SESSION_TTL_SECONDS: u64 = 30 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    public_base_url: String,
    session_ttl_seconds: u64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(public_base_url: String) -> Self {
        Self {
            public_base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    pub(crate) fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub(super) fn session_cookie_secure(&self) -> bool {
        self.public_base_url.starts_with("https://")
    }
}

/// Server half of one SRP handshake, parked between challenge and proof.
pub(super) struct PendingLogin {
    pub(super) username: String,
    pub(super) b: Vec<u8>,
    pub(super) b_pub: Vec<u8>,
    pub(super) verifier: Vec<u8>,
}

impl fmt::Debug for PendingLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLogin")
            .field("username", &self.username)
            .field("b", &"***")
            .field("b_pub", &format_args!("{} bytes", self.b_pub.len()))
            .field("verifier", &"***")
            .finish()
    }
}

/// Where a session binding sits in the login protocol.
#[derive(Debug)]
pub(super) enum LoginState {
    /// No challenge outstanding; issuing one moves the binding forward.
    Init,
    /// A challenge was issued and is good for exactly one `/auth` attempt.
    Challenged(PendingLogin),
    /// The last attempt on this binding succeeded.
    Authenticated { username: String },
}

struct SessionEntry {
    state: LoginState,
    created_at: Instant,
}

/// Tracks per-cookie protocol state with a fixed TTL from binding creation.
///
/// Expiry is lazy: dead entries are dropped when new challenges are stored
/// and treated as absent on lookup.
pub struct SessionStore {
    ttl: Duration,
    bindings: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Park a pending challenge on the given binding, or mint a new one.
    ///
    /// Storing over an existing binding replaces whatever state it held, so
    /// the latest challenge is the only answerable one. Returns the binding
    /// id and whether it was newly minted (and needs a `Set-Cookie`).
    pub(super) async fn store_challenge(
        &self,
        binding: Option<Uuid>,
        pending: PendingLogin,
    ) -> (Uuid, bool) {
        let mut bindings = self.bindings.lock().await;
        bindings.retain(|_, entry| entry.created_at.elapsed() < self.ttl);

        if let Some(id) = binding {
            if let Some(entry) = bindings.get_mut(&id) {
                entry.state = LoginState::Challenged(pending);
                return (id, false);
            }
        }

        let id = Uuid::new_v4();
        bindings.insert(
            id,
            SessionEntry {
                state: LoginState::Challenged(pending),
                created_at: Instant::now(),
            },
        );
        (id, true)
    }

    /// Consume the pending challenge on a binding, leaving it in `Init`.
    ///
    /// Expired bindings are removed and report no challenge, same as a
    /// binding that never had one.
    pub(super) async fn take_pending(&self, binding: Uuid) -> Option<PendingLogin> {
        let mut bindings = self.bindings.lock().await;
        let alive = match bindings.get(&binding) {
            Some(entry) => entry.created_at.elapsed() < self.ttl,
            None => return None,
        };
        if !alive {
            bindings.remove(&binding);
            return None;
        }
        let entry = bindings.get_mut(&binding)?;
        match mem::replace(&mut entry.state, LoginState::Init) {
            LoginState::Challenged(pending) => Some(pending),
            other => {
                entry.state = other;
                None
            }
        }
    }

    /// Record a successful proof exchange on a live binding.
    pub(super) async fn mark_authenticated(&self, binding: Uuid, username: String) {
        let mut bindings = self.bindings.lock().await;
        if let Some(entry) = bindings.get_mut(&binding) {
            if entry.created_at.elapsed() < self.ttl {
                entry.state = LoginState::Authenticated { username };
            }
        }
    }

    /// Username authenticated on this binding, if any and not expired.
    pub(super) async fn authenticated_user(&self, binding: Uuid) -> Option<String> {
        let mut bindings = self.bindings.lock().await;
        let alive = match bindings.get(&binding) {
            Some(entry) => entry.created_at.elapsed() < self.ttl,
            None => return None,
        };
        if !alive {
            bindings.remove(&binding);
            return None;
        }
        match bindings.get(&binding).map(|entry| &entry.state) {
            Some(LoginState::Authenticated { username }) => Some(username.clone()),
            _ => None,
        }
    }

    pub(super) async fn remove(&self, binding: Uuid) {
        let mut bindings = self.bindings.lock().await;
        bindings.remove(&binding);
    }
}

pub struct AuthState {
    config: AuthConfig,
    sessions: SessionStore,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(config: AuthConfig, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        let ttl = Duration::from_secs(config.session_ttl_seconds());
        Self {
            config,
            sessions: SessionStore::new(ttl),
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub(super) fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}
