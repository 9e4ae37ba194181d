//! HTTP layer shared by every API call. Attaches the stored bearer token to
//! outgoing requests and applies the session recovery policy: the first 401
//! for a request triggers exactly one token refresh behind a single-flight
//! gate, the request is replayed once, and anything unrecoverable clears the
//! stored credentials and fires the forced-logout hook.

use crate::auth::types::TokenResponse;
use crate::config::ClientConfig;
use crate::error::{Error, error_from_response};
use crate::store::{CredentialStore, TOKEN_KEY, USER_KEY};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

type LogoutHook = Box<dyn Fn() + Send + Sync>;

pub struct AuthHttp {
    client: Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    /// Single-flight gate so concurrent 401s coalesce into one refresh call.
    refresh_gate: Mutex<()>,
    on_forced_logout: RwLock<Option<LogoutHook>>,
}

impl AuthHttp {
    /// Builds the HTTP layer around a validated base URL.
    ///
    /// # Errors
    /// Returns an error if the base URL is malformed or the client cannot be
    /// constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let base = Url::parse(config.api_base_url.trim())
            .map_err(|err| Error::Config(format!("invalid API base URL: {err}")))?;

        let scheme = base.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::Config(format!("unsupported scheme {scheme}")));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim().trim_end_matches('/').to_string(),
            store,
            refresh_gate: Mutex::new(()),
            on_forced_logout: RwLock::new(None),
        })
    }

    /// Registers the hook invoked after an unrecoverable 401 wipes the store.
    pub fn set_forced_logout_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self
            .on_forced_logout
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
    }

    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path);
        self.execute("GET", &url, |client| client.get(&url), true)
            .await
    }

    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        self.execute("POST", &url, |client| client.post(&url).json(body), true)
            .await
    }

    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        self.execute("PUT", &url, |client| client.put(&url).json(body), true)
            .await
    }

    /// Form-encoded POST with the refresh policy disabled; a 401 here is a
    /// credential rejection, not an expired session.
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = self.endpoint(path);
        self.execute("POST", &url, |client| client.post(&url).form(form), false)
            .await
    }

    async fn execute<T, F>(
        &self,
        method: &str,
        url: &str,
        build: F,
        refresh_on_401: bool,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let sent_token = self.store.get(TOKEN_KEY);
        let response = self
            .send(method, url, &build, sent_token.as_deref())
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED && refresh_on_401 {
            return self.refresh_and_replay(method, url, &build, sent_token).await;
        }

        decode_response(response).await
    }

    /// One refresh attempt, then one replay. A 401 on the replay forces
    /// logout instead of a second refresh.
    async fn refresh_and_replay<T, F>(
        &self,
        method: &str,
        url: &str,
        build: &F,
        sent_token: Option<String>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        {
            let _gate = self.refresh_gate.lock().await;
            let current = self.store.get(TOKEN_KEY);
            if current == sent_token {
                match self.refresh(current.as_deref()).await {
                    Ok(token) => {
                        self.store.set(TOKEN_KEY, &token.access_token);
                        debug!("bearer token refreshed");
                    }
                    Err(err) => {
                        warn!("token refresh failed: {err}");
                        self.force_logout();
                        return Err(Error::Unauthorized);
                    }
                }
            } else {
                debug!("token already refreshed by a concurrent request");
            }
        }

        let token = self.store.get(TOKEN_KEY);
        let response = self.send(method, url, build, token.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.force_logout();
            return Err(Error::Unauthorized);
        }

        decode_response(response).await
    }

    /// Exchanges the current token for a fresh one. Called directly, outside
    /// the retry policy.
    async fn refresh(&self, token: Option<&str>) -> Result<TokenResponse, Error> {
        let url = self.endpoint("/auth/refresh");
        let span = info_span!("mentis.refresh", http.method = "POST", url = %url);

        let mut request = self.client.post(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().instrument(span).await?;
        decode_response(response).await
    }

    async fn send<F>(
        &self,
        method: &str,
        url: &str,
        build: &F,
        token: Option<&str>,
    ) -> Result<Response, Error>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut request = build(&self.client);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let span = info_span!("mentis.request", http.method = %method, url = %url);
        Ok(request.send().instrument(span).await?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn force_logout(&self) {
        warn!("session unrecoverable; clearing stored credentials");
        self.store.clear(TOKEN_KEY);
        self.store.clear(USER_KEY);

        let hook = self
            .on_forced_logout
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(hook) = hook.as_ref() {
            hook();
        }
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| Error::Parse(err.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status.as_u16(), &body))
    }
}
