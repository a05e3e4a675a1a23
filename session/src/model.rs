use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// Format of the `accessTime` field in the credential file.
pub const ACCESS_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Bearer token plus the opaque member identifier issued with it.
///
/// The two always travel together: a credential record holding only one of
/// them is treated as holding neither.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub bearer: String,
    pub member_id: String,
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("bearer", &"<redacted>")
            .field("member_id", &self.member_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub token: Option<SessionToken>,
    /// When `token` was last issued. Epoch if never.
    pub refreshed_at: NaiveDateTime,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: None,
            refreshed_at: epoch(),
        }
    }

    pub fn with_token(mut self, token: SessionToken, refreshed_at: NaiveDateTime) -> Self {
        self.token = Some(token);
        self.refreshed_at = refreshed_at;
        self
    }

    /// Returns the stored token if it was refreshed no more than `ttl` ago.
    pub fn fresh_token(&self, now: NaiveDateTime, ttl: TimeDelta) -> Option<&SessionToken> {
        let token = self.token.as_ref()?;
        if now - self.refreshed_at > ttl {
            return None;
        }
        Some(token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &self.token)
            .field("refreshed_at", &self.refreshed_at)
            .finish()
    }
}

pub(crate) fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 21)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn token() -> SessionToken {
        SessionToken {
            bearer: "tok".into(),
            member_id: "MEMBER1".into(),
        }
    }

    #[test]
    fn absent_token_is_never_fresh() {
        let creds = Credentials::new("u", "p");
        assert!(creds.fresh_token(at(10, 0, 0), TimeDelta::hours(1)).is_none());
    }

    #[test]
    fn token_within_threshold_is_fresh() {
        let creds = Credentials::new("u", "p").with_token(token(), at(10, 0, 0));
        assert!(creds.fresh_token(at(10, 59, 59), TimeDelta::hours(1)).is_some());
        // exactly one hour is still fresh; only strictly older tokens expire
        assert!(creds.fresh_token(at(11, 0, 0), TimeDelta::hours(1)).is_some());
        assert!(creds.fresh_token(at(11, 0, 1), TimeDelta::hours(1)).is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("alice", "hunter2").with_token(token(), at(9, 0, 0));
        let out = format!("{creds:?}");
        assert!(out.contains("alice"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("tok\""));
    }
}
