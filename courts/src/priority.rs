use std::fmt;

use serde::Deserialize;

pub type CourtId = u32;

/// A bookable court and the number painted on it, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Court {
    pub id: CourtId,
    #[serde(default)]
    pub number: Option<u32>,
}

impl Court {
    pub const fn new(id: CourtId, number: u32) -> Self {
        Self {
            id,
            number: Some(number),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hard,
    Carpet,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Hard => f.write_str("hard"),
            Tier::Carpet => f.write_str("carpet"),
        }
    }
}

/// Two-tier court preference. Hard courts always win over carpet courts;
/// courts in neither list are never booked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourtPriority {
    pub hard_courts: Vec<Court>,
    pub carpet_courts: Vec<Court>,
}

impl Default for CourtPriority {
    fn default() -> Self {
        Self {
            hard_courts: vec![
                Court::new(10470, 9),
                Court::new(10471, 10),
                Court::new(10472, 11),
                Court {
                    id: 16704,
                    number: None,
                },
                Court::new(10473, 12),
            ],
            carpet_courts: vec![
                Court::new(1603, 2),
                Court::new(1604, 3),
                Court::new(1605, 4),
                Court::new(10465, 5),
                Court::new(10467, 6),
                Court::new(10468, 7),
                Court::new(10469, 8),
            ],
        }
    }
}

impl CourtPriority {
    pub fn tier_of(&self, id: CourtId) -> Option<Tier> {
        if self.hard_courts.iter().any(|c| c.id == id) {
            Some(Tier::Hard)
        } else if self.carpet_courts.iter().any(|c| c.id == id) {
            Some(Tier::Carpet)
        } else {
            None
        }
    }

    /// Human-readable name for logs, e.g. `court 9` or `court #16704`.
    pub fn label(&self, id: CourtId) -> String {
        let number = self
            .hard_courts
            .iter()
            .chain(&self.carpet_courts)
            .find(|c| c.id == id)
            .and_then(|c| c.number);

        match number {
            Some(n) => format!("court {n}"),
            None => format!("court #{id}"),
        }
    }

    /// Court ids listed in both tiers.
    pub fn overlapping(&self) -> Vec<CourtId> {
        self.hard_courts
            .iter()
            .filter(|h| self.carpet_courts.iter().any(|c| c.id == h.id))
            .map(|h| h.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers_are_disjoint() {
        assert!(CourtPriority::default().overlapping().is_empty());
    }

    #[test]
    fn tiers_and_labels() {
        let p = CourtPriority::default();
        assert_eq!(p.tier_of(10470), Some(Tier::Hard));
        assert_eq!(p.tier_of(10465), Some(Tier::Carpet));
        assert_eq!(p.tier_of(1388), None);

        assert_eq!(p.label(10470), "court 9");
        assert_eq!(p.label(16704), "court #16704");
        assert_eq!(p.label(1), "court #1");
    }

    #[test]
    fn deserializes_with_optional_numbers() {
        let p: CourtPriority = serde_json::from_str(
            r#"{"hard_courts": [{"id": 5, "number": 1}], "carpet_courts": [{"id": 6}]}"#,
        )
        .unwrap();
        assert_eq!(p.hard_courts, vec![Court::new(5, 1)]);
        assert_eq!(p.carpet_courts[0].number, None);
    }

    #[test]
    fn overlap_is_reported() {
        let p = CourtPriority {
            hard_courts: vec![Court::new(1, 1), Court::new(2, 2)],
            carpet_courts: vec![Court::new(2, 2)],
        };
        assert_eq!(p.overlapping(), vec![2]);
    }
}
