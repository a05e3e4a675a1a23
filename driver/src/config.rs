use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::TimeDelta;
use courts::{CourtPriority, SlotFormats};
use serde::Deserialize;
use session::{Endpoints, SessionSettings};

use crate::cli::Cli;

/// Clubs open bookings days or weeks ahead, never more than a year.
const MAX_LOOKAHEAD_DAYS: i64 = 366;

/// A week; longer-lived tokens are not worth trusting.
const MAX_TOKEN_TTL_SECS: i64 = 7 * 24 * 3_600;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Credentials JSON, rewritten after each login.
    pub credentials_path: PathBuf,

    /// Desired-booking database.
    pub database_url: String,

    /// Optional venue description. Built-in defaults apply when absent.
    pub venue_path: Option<PathBuf>,

    /// One JSON object per log line instead of the compact formatter.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            credentials_path: std::env::var("COURTBOT_CREDENTIALS")
                .unwrap_or_else(|_| "credentials.json".to_string())
                .into(),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bookings.db".to_string()),
            venue_path: std::env::var("COURTBOT_VENUE").ok().map(PathBuf::from),
            json_logs: std::env::var("APP_ENV").unwrap_or_default() == "production",
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(path) = &cli.credentials {
            self.credentials_path = path.clone();
        }
        if let Some(url) = &cli.database {
            self.database_url = url.clone();
        }
        if let Some(path) = &cli.venue {
            self.venue_path = Some(path.clone());
        }
        self
    }
}

/// Everything specific to one reservation site and club.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub endpoints: Endpoints,

    /// Header that carries the bearer token.
    pub auth_header: String,

    pub courts: CourtPriority,

    pub formats: SlotFormats,

    /// Stored tokens older than this are replaced by a fresh login.
    pub token_ttl_secs: i64,

    /// How far ahead the club opens bookings.
    pub lookahead_days: i64,

    /// Per-request timeout, enforced by the HTTP client.
    pub http_timeout_secs: u64,

    pub user_agent: String,

    pub sports_package_id: u32,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            auth_header: "x-auth-token".to_string(),
            courts: CourtPriority::default(),
            formats: SlotFormats::default(),
            token_ttl_secs: 3_600,
            lookahead_days: 9,
            http_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            sports_package_id: 1,
        }
    }
}

impl VenueConfig {
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let venue = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read venue config {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid venue config {}", path.display()))?
            }
            None => Self::default(),
        };

        venue.validate()?;
        Ok(venue)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let overlap = self.courts.overlapping();
        if !overlap.is_empty() {
            bail!("courts listed as both hard and carpet: {overlap:?}");
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            bail!(
                "token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}, got {}",
                self.token_ttl_secs
            );
        }
        if !(0..=MAX_LOOKAHEAD_DAYS).contains(&self.lookahead_days) {
            bail!(
                "lookahead_days must be between 0 and {MAX_LOOKAHEAD_DAYS}, got {}",
                self.lookahead_days
            );
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            endpoints: self.endpoints.clone(),
            auth_header: self.auth_header.clone(),
            token_ttl: TimeDelta::try_seconds(self.token_ttl_secs).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn lookahead(&self) -> TimeDelta {
        TimeDelta::try_days(self.lookahead_days).unwrap_or(TimeDelta::MAX)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use courts::Court;

    use super::*;

    #[test]
    fn partial_venue_file_keeps_other_defaults() {
        let venue: VenueConfig = serde_json::from_str(
            r#"{
                "endpoints": {"base_url": "https://club.test"},
                "courts": {"hard_courts": [{"id": 1, "number": 1}], "carpet_courts": []},
                "lookahead_days": 7
            }"#,
        )
        .unwrap();

        assert_eq!(venue.endpoints.base_url, "https://club.test");
        assert_eq!(venue.endpoints.login, Endpoints::default().login);
        assert_eq!(venue.courts.hard_courts, vec![Court::new(1, 1)]);
        assert_eq!(venue.lookahead(), TimeDelta::days(7));
        assert_eq!(venue.auth_header, "x-auth-token");
        assert_eq!(venue.session_settings().token_ttl, TimeDelta::hours(1));
        venue.validate().unwrap();
    }

    #[test]
    fn overlapping_tiers_are_rejected() {
        let mut venue = VenueConfig::default();
        venue.courts.carpet_courts.push(Court::new(10470, 9));
        assert!(venue.validate().is_err());
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        let huge_lookahead = VenueConfig {
            lookahead_days: 100_000_000,
            ..Default::default()
        };
        let err = huge_lookahead.validate().unwrap_err();
        assert!(err.to_string().contains("lookahead_days"));

        let negative_lookahead = VenueConfig {
            lookahead_days: -1,
            ..Default::default()
        };
        assert!(negative_lookahead.validate().is_err());

        let huge_ttl = VenueConfig {
            token_ttl_secs: i64::MAX,
            ..Default::default()
        };
        assert!(huge_ttl.validate().is_err());

        let year = VenueConfig {
            lookahead_days: MAX_LOOKAHEAD_DAYS,
            ..Default::default()
        };
        year.validate().unwrap();
        assert_eq!(year.lookahead(), TimeDelta::days(MAX_LOOKAHEAD_DAYS));
    }
}
