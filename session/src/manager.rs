use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use common::logger::{Phase, phase_span};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Instrument, debug, error, info};

use crate::endpoints::Endpoints;
use crate::error::SessionError;
use crate::model::{Credentials, SessionToken};
use crate::store::CredentialStore;
use crate::transport::{HttpRequest, HttpTransport, Method};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub endpoints: Endpoints,
    /// Header carrying the bearer token on authenticated calls.
    pub auth_header: String,
    /// Stored tokens older than this trigger a fresh login.
    pub token_ttl: TimeDelta,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            auth_header: "x-auth-token".into(),
            token_ttl: TimeDelta::hours(1),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    encoded_contact_id: String,
}

/// Owns the authenticated session and is the only path for outbound calls.
///
/// After `initialize` the manager always holds a token. The
/// token / member id / refresh time triple is only ever replaced wholesale,
/// by a successful `login`.
pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn CredentialStore>,
    settings: SessionSettings,
    username: String,
    password: String,
    token: SessionToken,
    refreshed_at: NaiveDateTime,
}

impl SessionManager {
    /// Load credentials and make sure a usable token is held, logging in
    /// when the stored one is absent or stale.
    pub async fn initialize(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn CredentialStore>,
        settings: SessionSettings,
        now: NaiveDateTime,
    ) -> Result<Self, SessionError> {
        let credentials = store.load().await.map_err(SessionError::CredentialStore)?;

        let (token, refreshed_at) = match credentials.fresh_token(now, settings.token_ttl) {
            Some(token) => {
                info!(phase = %Phase::Login, "skipping login, stored token still valid");
                (token.clone(), credentials.refreshed_at)
            }
            None => {
                let token = authenticate(&*transport, &*store, &settings, &credentials, now)
                    .instrument(phase_span(Phase::Login))
                    .await?;
                (token, now)
            }
        };

        Ok(Self {
            transport,
            store,
            settings,
            username: credentials.username,
            password: credentials.password,
            token,
            refreshed_at,
        })
    }

    /// Force a fresh login, replacing the held token on success.
    pub async fn login(&mut self, now: NaiveDateTime) -> Result<(), SessionError> {
        let credentials = Credentials::new(self.username.clone(), self.password.clone());

        let token = authenticate(
            &*self.transport,
            &*self.store,
            &self.settings,
            &credentials,
            now,
        )
        .instrument(phase_span(Phase::Login))
        .await?;

        self.token = token;
        self.refreshed_at = now;
        Ok(())
    }

    pub fn member_id(&self) -> &str {
        &self.token.member_id
    }

    pub fn refreshed_at(&self) -> NaiveDateTime {
        self.refreshed_at
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.settings.endpoints
    }

    /// Authenticated call. 200 yields the parsed JSON body (`Null` when the
    /// body is empty), anything else a `SessionError::Request`.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<Value>,
    ) -> Result<Value, SessionError> {
        let mut request = HttpRequest::new(method, url)
            .header(self.settings.auth_header.as_str(), self.token.bearer.as_str());
        if let Some(body) = &payload {
            request = request.json(body.clone());
        }

        let response =
            self.transport
                .send(request)
                .await
                .map_err(|source| SessionError::Transport {
                    method,
                    url: url.to_string(),
                    source,
                })?;

        if response.status != 200 {
            error!(
                %method,
                url,
                status = response.status,
                payload = ?payload,
                body = %response.body,
                "request failed"
            );
            return Err(SessionError::Request {
                method,
                url: url.to_string(),
                payload,
                status: response.status,
                body: response.body,
            });
        }

        debug!(%method, url, payload = ?payload, "received 200");

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response.body).map_err(|source| SessionError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub async fn get(&self, url: &str) -> Result<Value, SessionError> {
        self.request(Method::Get, url, None).await
    }

    pub async fn post(&self, url: &str, payload: Value) -> Result<Value, SessionError> {
        self.request(Method::Post, url, Some(payload)).await
    }

    pub async fn put(&self, url: &str, payload: Value) -> Result<Value, SessionError> {
        self.request(Method::Put, url, Some(payload)).await
    }
}

/// POST username/password; on 200 persist and return the new token.
async fn authenticate(
    transport: &dyn HttpTransport,
    store: &dyn CredentialStore,
    settings: &SessionSettings,
    credentials: &Credentials,
    now: NaiveDateTime,
) -> Result<SessionToken, SessionError> {
    let url = settings.endpoints.login_url();
    let payload = json!({
        "username": credentials.username,
        "password": credentials.password,
    });

    let response = transport
        .send(HttpRequest::new(Method::Post, url.as_str()).json(payload))
        .await
        .map_err(|source| SessionError::Transport {
            method: Method::Post,
            url: url.clone(),
            source,
        })?;

    if response.status != 200 {
        error!(status = response.status, "failed to login");
        debug!(body = %response.body, "login response");
        return Err(SessionError::Authentication {
            status: response.status,
            body: response.body,
        });
    }

    let parsed: LoginResponse =
        serde_json::from_str(&response.body).map_err(|source| SessionError::Decode {
            url: url.clone(),
            source,
        })?;

    let token = SessionToken {
        bearer: parsed.token,
        member_id: parsed.encoded_contact_id,
    };

    store
        .save_token(&token, now)
        .await
        .map_err(SessionError::CredentialStore)?;

    info!("logged in successfully");
    Ok(token)
}
