use serde::Deserialize;
use urlencoding::encode;

/// Reservation service URL layout.
///
/// Paths are templates appended to `base_url`. Placeholders:
/// `{date}` and `{member_id}` for the availability query, `{booking_ref}`
/// for make/confirm. Substituted values are percent-encoded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub base_url: String,
    pub login: String,
    pub courts: String,
    pub check_court: String,
    pub recent_players: String,
    pub booking: String,
    pub confirm: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            login: "/api/auth/login".into(),
            courts: "/api/courts/availability/{date}?encodedContactId={member_id}".into(),
            check_court: "/api/court-bookings/check".into(),
            recent_players: "/api/members/recent-players".into(),
            booking: "/api/court-bookings/{booking_ref}".into(),
            confirm: "/api/court-bookings/{booking_ref}/confirm".into(),
        }
    }
}

impl Endpoints {
    pub fn login_url(&self) -> String {
        self.join(&self.login)
    }

    pub fn courts_url(&self, date: &str, member_id: &str) -> String {
        self.join(
            &self
                .courts
                .replace("{date}", &encode(date))
                .replace("{member_id}", &encode(member_id)),
        )
    }

    pub fn check_court_url(&self) -> String {
        self.join(&self.check_court)
    }

    pub fn recent_players_url(&self) -> String {
        self.join(&self.recent_players)
    }

    pub fn booking_url(&self, booking_ref: &str) -> String {
        self.join(&self.booking.replace("{booking_ref}", &encode(booking_ref)))
    }

    pub fn confirm_url(&self, booking_ref: &str) -> String {
        self.join(&self.confirm.replace("{booking_ref}", &encode(booking_ref)))
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_filled_and_joined() {
        let endpoints = Endpoints {
            base_url: "https://club.test/".into(),
            ..Endpoints::default()
        };

        assert_eq!(endpoints.login_url(), "https://club.test/api/auth/login");
        assert_eq!(
            endpoints.courts_url("2024-09-30", "ABC"),
            "https://club.test/api/courts/availability/2024-09-30?encodedContactId=ABC"
        );
        assert_eq!(
            endpoints.confirm_url("REF1"),
            "https://club.test/api/court-bookings/REF1/confirm"
        );
    }

    #[test]
    fn substituted_values_are_percent_encoded() {
        let endpoints = Endpoints::default();

        assert_eq!(
            endpoints.courts_url("2024-09-30", "a+b/c="),
            "http://127.0.0.1:8080/api/courts/availability/2024-09-30?encodedContactId=a%2Bb%2Fc%3D"
        );
        assert_eq!(
            endpoints.booking_url("REF 1"),
            "http://127.0.0.1:8080/api/court-bookings/REF%201"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"base_url": "https://other.test"}"#).unwrap();
        assert_eq!(endpoints.base_url, "https://other.test");
        assert_eq!(endpoints.login, Endpoints::default().login);
    }
}
