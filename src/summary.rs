//! The canonical per-event output record.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::environment::EnvironmentSummary;
use crate::quote::{BookmakerQuotes, OddsFamily, QuoteEntry};

/// Match state codes used by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    Overtime,
    OvertimeHalfTime,
    Penalties,
    Finished,
    Cancelled,
    Postponed,
    Interrupted,
    Abandoned,
    Unknown(i64),
}

impl MatchStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => MatchStatus::NotStarted,
            2 => MatchStatus::FirstHalf,
            3 => MatchStatus::HalfTime,
            4 => MatchStatus::SecondHalf,
            5 => MatchStatus::Overtime,
            6 => MatchStatus::OvertimeHalfTime,
            7 => MatchStatus::Penalties,
            9 => MatchStatus::Finished,
            10 => MatchStatus::Cancelled,
            11 => MatchStatus::Postponed,
            12 => MatchStatus::Interrupted,
            13 => MatchStatus::Abandoned,
            other => MatchStatus::Unknown(other),
        }
    }

    /// Codes 2 through 7: the ball is (or will shortly be) rolling again.
    pub fn is_in_play(self) -> bool {
        matches!(
            self,
            MatchStatus::FirstHalf
                | MatchStatus::HalfTime
                | MatchStatus::SecondHalf
                | MatchStatus::Overtime
                | MatchStatus::OvertimeHalfTime
                | MatchStatus::Penalties
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "Not started",
            MatchStatus::FirstHalf => "First half",
            MatchStatus::HalfTime => "Half-time",
            MatchStatus::SecondHalf => "Second half",
            MatchStatus::Overtime => "Overtime",
            MatchStatus::OvertimeHalfTime => "Overtime half-time",
            MatchStatus::Penalties => "Penalty shoot-out",
            MatchStatus::Finished => "Finished",
            MatchStatus::Cancelled => "Cancelled",
            MatchStatus::Postponed => "Postponed",
            MatchStatus::Interrupted => "Interrupted",
            MatchStatus::Abandoned => "Abandoned",
            MatchStatus::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Unknown(code) => write!(f, "Unknown ({})", code),
            known => f.write_str(known.label()),
        }
    }
}

/// One event, consolidated. Field names and order are the published schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub home: String,
    pub away: String,
    pub home_id: String,
    pub away_id: String,
    pub score: String,
    pub status_id: i64,
    pub competition: String,
    pub competition_id: String,
    pub country: String,
    pub match_time: i64,
    pub kickoff: String,
    pub venue: String,
    pub home_position: String,
    pub away_position: String,
    /// Always equal to `status_id`.
    pub status: i64,

    pub home_short_name: String,
    pub home_logo: String,
    pub away_short_name: String,
    pub away_logo: String,
    pub competition_short_name: String,
    pub competition_logo: String,

    pub money_line: Vec<QuoteEntry>,
    pub money_line_american: Vec<QuoteEntry>,
    pub spread: Vec<QuoteEntry>,
    pub spread_american: Vec<QuoteEntry>,
    pub over_under: Vec<QuoteEntry>,
    pub over_under_american: Vec<QuoteEntry>,
    pub corners: Vec<QuoteEntry>,
    pub corners_american: Vec<QuoteEntry>,

    pub odds_company_id: Option<String>,
    pub odds_company_name: Option<String>,
    /// `{selected_id: native series}`, empty when nothing was selected.
    pub odds: BTreeMap<String, BookmakerQuotes>,

    pub environment: EnvironmentSummary,
    pub events: Vec<Value>,
}

impl MatchSummary {
    pub fn match_status(&self) -> MatchStatus {
        MatchStatus::from_code(self.status_id)
    }

    pub fn is_in_play(&self) -> bool {
        self.match_status().is_in_play()
    }

    pub fn status_name(&self) -> String {
        self.match_status().to_string()
    }

    /// A money line survived selection and the minute window.
    pub fn has_odds(&self) -> bool {
        !self.money_line.is_empty() || !self.money_line_american.is_empty()
    }

    /// Native series for `family`.
    pub fn series(&self, family: OddsFamily) -> &[QuoteEntry] {
        match family {
            OddsFamily::MoneyLine => &self.money_line,
            OddsFamily::Spread => &self.spread,
            OddsFamily::OverUnder => &self.over_under,
            OddsFamily::Corners => &self.corners,
        }
    }

    /// American series for `family`.
    pub fn american_series(&self, family: OddsFamily) -> &[QuoteEntry] {
        match family {
            OddsFamily::MoneyLine => &self.money_line_american,
            OddsFamily::Spread => &self.spread_american,
            OddsFamily::OverUnder => &self.over_under_american,
            OddsFamily::Corners => &self.corners_american,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert!(!MatchStatus::from_code(1).is_in_play());
        for code in 2..=7 {
            assert!(MatchStatus::from_code(code).is_in_play(), "code {}", code);
        }
        assert!(!MatchStatus::from_code(8).is_in_play());
        assert!(!MatchStatus::from_code(9).is_in_play());
        assert_eq!(MatchStatus::from_code(3), MatchStatus::HalfTime);
        assert_eq!(MatchStatus::from_code(0), MatchStatus::Unknown(0));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MatchStatus::from_code(4).to_string(), "Second half");
        assert_eq!(MatchStatus::from_code(42).to_string(), "Unknown (42)");
    }
}
