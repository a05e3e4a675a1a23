use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use session::model::{Credentials, SessionToken};
use session::store::CredentialStore;
use session::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// Responses queued per (method, url); unscripted calls answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<HttpResponse>>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub async fn respond(&self, method: Method, url: impl Into<String>, status: u16, body: &str) {
        self.routes
            .lock()
            .await
            .entry((method, url.into()))
            .or_default()
            .push_back(HttpResponse {
                status,
                body: body.to_string(),
            });
    }

    pub async fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().await.push(request.clone());

        let response = self
            .routes
            .lock()
            .await
            .get_mut(&(request.method, request.url.clone()))
            .and_then(VecDeque::pop_front)
            .unwrap_or(HttpResponse {
                status: 404,
                body: String::new(),
            });
        Ok(response)
    }
}

/// Hands out the same credentials every time. Sessions here start with a
/// fresh token, so nothing is ever saved.
pub struct FixedCredentialStore(pub Credentials);

#[async_trait]
impl CredentialStore for FixedCredentialStore {
    async fn load(&self) -> anyhow::Result<Credentials> {
        Ok(self.0.clone())
    }

    async fn save_token(&self, _: &SessionToken, _: NaiveDateTime) -> anyhow::Result<()> {
        anyhow::bail!("unexpected login")
    }
}
