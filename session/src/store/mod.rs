pub mod json_store;

use chrono::NaiveDateTime;

use crate::model::{Credentials, SessionToken};

pub use json_store::JsonCredentialStore;

/// Persistence for the member's credentials and last issued token.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Credentials>;

    /// Replaces token, member id and refresh time; every other stored field
    /// is left untouched.
    async fn save_token(&self, token: &SessionToken, refreshed_at: NaiveDateTime)
    -> anyhow::Result<()>;
}
