//! Session controller: owns the in-memory session, derives it from the
//! credential store at startup, and broadcasts every transition to
//! subscribers. This is the single injectable auth surface for the rest of
//! the app; nothing else mutates session state.
//!
//! The state machine is small: `Initializing` resolves once into
//! `Authenticated` or `Anonymous`; login and logout move between the two.
//! An unrecoverable 401 anywhere in the HTTP layer forces the
//! `Authenticated -> Anonymous` transition through the logout hook.

use crate::api::AuthHttp;
use crate::auth::client;
use crate::auth::types::{ProfileUpdate, RegisterRequest, User};
use crate::config::ClientConfig;
use crate::error::Error;
use crate::store::{CredentialStore, TOKEN_KEY, USER_KEY};
use secrecy::SecretString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Immutable snapshot of the session, as seen by guards and views.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub user: Option<User>,
    /// True only while the initial restore attempt is unresolved.
    pub loading: bool,
    /// Derived: a user is present and the persisted token still exists.
    pub is_authenticated: bool,
}

impl SessionState {
    fn initializing() -> Self {
        Self {
            user: None,
            loading: true,
            is_authenticated: false,
        }
    }
}

struct SessionInner {
    http: AuthHttp,
    store: Arc<dyn CredentialStore>,
    user: RwLock<Option<User>>,
    loading: AtomicBool,
    initialized: AtomicBool,
    tx: watch::Sender<SessionState>,
}

impl SessionInner {
    fn snapshot(&self) -> SessionState {
        let user = self
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let has_token = self.store.get(TOKEN_KEY).is_some();

        SessionState {
            is_authenticated: user.is_some() && has_token,
            loading: self.loading.load(Ordering::SeqCst),
            user,
        }
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    fn notify(&self) {
        self.tx.send_replace(self.snapshot());
    }

    /// Drops the in-memory user after the HTTP layer wiped the store.
    fn forced_logout(&self) {
        self.set_user(None);
        self.notify();
    }
}

/// Cloneable handle to the shared session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

impl SessionController {
    /// # Errors
    /// Returns an error if the HTTP layer rejects the configuration.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let http = AuthHttp::new(config, Arc::clone(&store))?;
        let (tx, _rx) = watch::channel(SessionState::initializing());

        let inner = Arc::new(SessionInner {
            http,
            store,
            user: RwLock::new(None),
            loading: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
            tx,
        });

        let hook_target = Arc::downgrade(&inner);
        inner.http.set_forced_logout_hook(move || {
            if let Some(inner) = hook_target.upgrade() {
                inner.forced_logout();
            }
        });

        Ok(Self { inner })
    }

    /// Restores the session from the store, once.
    ///
    /// No persisted token means anonymous with zero network calls. With a
    /// token, `/auth/me` is called exactly once; any failure clears the store
    /// and resolves anonymous. Errors are swallowed here because the fallback
    /// is well defined.
    pub async fn initialize(&self) -> SessionState {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        if self.inner.store.get(TOKEN_KEY).is_some() {
            match client::fetch_current_user(&self.inner.http).await {
                Ok(user) => {
                    info!(user = %user.email, "session restored");
                    self.cache_user(&user);
                    self.inner.set_user(Some(user));
                }
                Err(err) => {
                    warn!("session restore failed: {err}");
                    self.inner.store.clear(TOKEN_KEY);
                    self.inner.store.clear(USER_KEY);
                    self.inner.set_user(None);
                }
            }
        } else {
            debug!("no persisted token; starting anonymous");
        }

        self.inner.loading.store(false, Ordering::SeqCst);
        self.inner.notify();
        self.state()
    }

    /// Logs in and populates the session; both the token exchange and the
    /// follow-up user fetch must succeed.
    ///
    /// # Errors
    /// Rethrows the underlying failure after resetting to anonymous. The
    /// caller owns user-visible messaging; no retry happens here.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, Error> {
        let result = self.try_login(email, password).await;

        if result.is_err() {
            self.inner.store.clear(TOKEN_KEY);
            self.inner.store.clear(USER_KEY);
            self.inner.set_user(None);
            self.inner.notify();
        }

        result
    }

    async fn try_login(&self, email: &str, password: &SecretString) -> Result<User, Error> {
        let token = client::login(&self.inner.http, email, password).await?;
        self.inner.store.set(TOKEN_KEY, &token.access_token);

        let user = client::fetch_current_user(&self.inner.http).await?;
        info!(user = %user.email, "login succeeded");
        self.cache_user(&user);
        self.inner.set_user(Some(user.clone()));
        self.inner.notify();
        Ok(user)
    }

    /// Clears all credentials and resets to anonymous. Local-only (the
    /// backend has no logout endpoint), infallible, and idempotent.
    pub fn logout(&self) {
        self.inner.store.clear(TOKEN_KEY);
        self.inner.store.clear(USER_KEY);
        self.inner.set_user(None);
        self.inner.notify();
        info!("logged out");
    }

    /// Registers a new account. Never mutates session state; signing the new
    /// user in is an explicit, separate `login` call.
    ///
    /// # Errors
    /// Rethrows validation and transport failures for the form to display.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, Error> {
        client::register(&self.inner.http, request).await
    }

    /// Updates the current user's profile and replaces the session user with
    /// the server's response.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] when anonymous; on failure the session
    /// user is left unchanged and the error is rethrown.
    pub async fn update_profile(&self, changes: &ProfileUpdate) -> Result<User, Error> {
        let Some(current) = self.state().user else {
            return Err(Error::Unauthorized);
        };

        let user = client::update_profile(&self.inner.http, current.id, changes).await?;
        self.cache_user(&user);
        self.inner.set_user(Some(user.clone()));
        self.inner.notify();
        Ok(user)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.snapshot()
    }

    /// Watch channel receiving a snapshot on every session transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.tx.subscribe()
    }

    /// The shared HTTP layer, for feature clients beyond auth.
    #[must_use]
    pub fn http(&self) -> &AuthHttp {
        &self.inner.http
    }

    /// Last cached user record. Advisory only; startup always re-validates
    /// against the server, so this must never gate access.
    #[must_use]
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.inner.store.get(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    fn cache_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(serialized) => self.inner.store.set(USER_KEY, &serialized),
            Err(err) => warn!("failed to encode user cache: {err}"),
        }
    }
}
