//! JsonCredentialStore
//! --------------------
//! Credentials live in a small JSON document next to the cron job:
//!
//! ```json
//! {
//!   "username": "member@example.com",
//!   "password": "...",
//!   "token": "...",
//!   "encodedContactId": "...",
//!   "accessTime": "21/09/2024 14:03:11"
//! }
//! ```
//!
//! Only `token`, `encodedContactId` and `accessTime` are ever written back.
//! Unknown keys survive a rewrite untouched.
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::CredentialStore;
use crate::model::{ACCESS_TIME_FORMAT, Credentials, SessionToken, epoch};

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const TOKEN: &str = "token";
const MEMBER_ID: &str = "encodedContactId";
const ACCESS_TIME: &str = "accessTime";

pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> anyhow::Result<Map<String, Value>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read credentials from {}", self.path.display()))?;

        match serde_json::from_str::<Value>(&raw)
            .with_context(|| format!("invalid credentials JSON in {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!(
                "credentials file {} must hold a JSON object",
                self.path.display()
            )),
        }
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn load(&self) -> anyhow::Result<Credentials> {
        let doc = self.read_document().await?;

        let username = required_str(&doc, USERNAME)?;
        let password = required_str(&doc, PASSWORD)?;

        let refreshed_at = match optional_str(&doc, ACCESS_TIME) {
            Some(raw) => NaiveDateTime::parse_from_str(raw, ACCESS_TIME_FORMAT)
                .with_context(|| format!("invalid {ACCESS_TIME} '{raw}'"))?,
            None => epoch(),
        };

        let token = match (optional_str(&doc, TOKEN), optional_str(&doc, MEMBER_ID)) {
            (Some(bearer), Some(member_id)) => Some(SessionToken {
                bearer: bearer.to_string(),
                member_id: member_id.to_string(),
            }),
            (None, None) => None,
            _ => {
                warn!(
                    path = %self.path.display(),
                    "credentials hold only half of token/member id, ignoring both"
                );
                None
            }
        };

        Ok(Credentials {
            username,
            password,
            token,
            refreshed_at,
        })
    }

    async fn save_token(
        &self,
        token: &SessionToken,
        refreshed_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let mut doc = self.read_document().await?;

        doc.insert(TOKEN.into(), Value::String(token.bearer.clone()));
        doc.insert(MEMBER_ID.into(), Value::String(token.member_id.clone()));
        doc.insert(
            ACCESS_TIME.into(),
            Value::String(refreshed_at.format(ACCESS_TIME_FORMAT).to_string()),
        );

        let rendered = serde_json::to_string_pretty(&Value::Object(doc))?;
        tokio::fs::write(&self.path, rendered)
            .await
            .with_context(|| format!("failed to write credentials to {}", self.path.display()))?;

        info!(path = %self.path.display(), "saved new credentials");
        Ok(())
    }
}

fn optional_str<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    doc.get(key).and_then(Value::as_str)
}

fn required_str(doc: &Map<String, Value>, key: &str) -> anyhow::Result<String> {
    optional_str(doc, key)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("credentials missing string field '{key}'"))
}
