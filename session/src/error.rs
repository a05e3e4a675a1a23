use serde_json::Value;
use thiserror::Error;

use crate::transport::{Method, TransportError};

#[derive(Error, Debug)]
pub enum SessionError {
    /// Login rejected by the service. Ends the run.
    #[error("login rejected: status={status}, body={body}")]
    Authentication { status: u16, body: String },

    /// Authenticated call answered with something other than 200.
    #[error(
        "{method} {url} failed: status={status}, payload={}, body={body}",
        render_payload(.payload)
    )]
    Request {
        method: Method,
        url: String,
        payload: Option<Value>,
        status: u16,
        body: String,
    },

    #[error("{method} {url} not delivered: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("credential store error: {0:#}")]
    CredentialStore(#[source] anyhow::Error),
}

impl SessionError {
    /// Fatal errors abort the run; everything else only fails the current
    /// desired booking.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::Authentication { .. } | SessionError::CredentialStore(_)
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SessionError::Authentication { status, .. } | SessionError::Request { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

fn render_payload(payload: &Option<Value>) -> String {
    match payload {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}
