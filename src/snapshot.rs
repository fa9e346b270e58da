//! Collector snapshot boundary.
//!
//! The collector writes one loosely-typed JSON document per refresh. This module
//! is the only place that looks at it as JSON: everything past
//! [`Snapshot::from_value`] works on typed records.
//!
//! Only a missing or unusable `live_matches` section is fatal. Broken reference
//! entries are skipped with a warning, and a broken event still becomes a
//! (default) record so it shows up in the output.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::SnapshotError;
use crate::quote::{parse_quote_map, BookmakerQuoteMap, Scalar};

// ============================================================================
// Lenient field deserializers
// ============================================================================

/// Ids and labels arrive as either strings or numbers.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Integer fields that may arrive as numbers or numeric text.
fn opt_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Scalar::from_json).and_then(|s| s.as_integer()))
}

/// Any scalar; arrays and objects read as absent.
fn opt_scalar<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Scalar::from_json).filter(|s| *s != Scalar::Null))
}

/// Nested blocks of the wrong shape read as absent instead of failing the event.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value(v) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Ignoring malformed nested block: {}", e);
                None
            }
        },
    })
}

fn score_history<'de, D>(deserializer: D) -> Result<Vec<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(Scalar::from_json).collect(),
        _ => Vec::new(),
    })
}

fn inline_odds<'de, D>(deserializer: D) -> Result<Option<BookmakerQuoteMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(Value::is_object).map(|v| parse_quote_map(&v)))
}

// ============================================================================
// Raw records
// ============================================================================

/// Team reference carried inside an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamStub {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub position: Option<String>,
}

/// Competition reference carried inside an event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompetitionStub {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
}

/// Venue as either `{"name": ...}` or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Venue {
    Named {
        #[serde(default, deserialize_with = "opt_string_or_number")]
        name: Option<String>,
    },
    Plain(String),
}

impl Venue {
    pub fn name(&self) -> &str {
        match self {
            Venue::Named { name } => name.as_deref().unwrap_or(""),
            Venue::Plain(name) => name,
        }
    }
}

/// Raw ambient readings. Wind arrives under `wind`; `wind_speed` is accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEnvironment {
    #[serde(deserialize_with = "opt_scalar")]
    pub weather: Option<Scalar>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub temperature: Option<String>,
    #[serde(alias = "wind_speed", deserialize_with = "opt_string_or_number")]
    pub wind: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub humidity: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub pressure: Option<String>,
}

/// One event as produced by the collector. Also the shape of a details record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_integer")]
    pub status_id: Option<i64>,

    #[serde(deserialize_with = "lenient")]
    pub home: Option<TeamStub>,
    #[serde(deserialize_with = "lenient")]
    pub away: Option<TeamStub>,
    #[serde(alias = "competition", deserialize_with = "lenient")]
    pub league: Option<CompetitionStub>,

    /// Flat ids, as carried by details records.
    #[serde(deserialize_with = "opt_string_or_number")]
    pub home_team_id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub away_team_id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub competition_id: Option<String>,

    #[serde(deserialize_with = "score_history")]
    pub home_scores: Vec<Scalar>,
    #[serde(deserialize_with = "score_history")]
    pub away_scores: Vec<Scalar>,

    #[serde(deserialize_with = "opt_integer")]
    pub match_time: Option<i64>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub kickoff: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub venue: Option<Venue>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub home_position: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub away_position: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub environment: Option<RawEnvironment>,
    #[serde(deserialize_with = "lenient")]
    pub events: Option<Vec<Value>>,

    /// Per-bookmaker quotes embedded in the event itself, if any.
    #[serde(deserialize_with = "inline_odds")]
    pub odds: Option<BookmakerQuoteMap>,
}

/// Details records share the event shape.
pub type MatchDetails = RawEvent;

impl RawEvent {
    /// Validated construction from one entry of the event list.
    pub fn from_json(value: Value) -> Self {
        if !value.is_object() {
            warn!("Event entry is not an object; emitting a default record");
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Event entry failed validation ({}); emitting a default record", e);
            Self::default()
        })
    }

    pub fn match_id(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    fn stub_home_id(&self) -> Option<&str> {
        self.home.as_ref().and_then(|t| t.id.as_deref())
    }

    fn stub_away_id(&self) -> Option<&str> {
        self.away.as_ref().and_then(|t| t.id.as_deref())
    }

    fn stub_competition_id(&self) -> Option<&str> {
        self.league.as_ref().and_then(|c| c.id.as_deref())
    }

    /// Fold a details record into this event.
    ///
    /// Flat ids from details take precedence over the event's own stubs; every
    /// other field only fills gaps.
    pub fn enriched_with(&self, details: Option<&MatchDetails>) -> EnrichedEvent {
        let Some(details) = details else {
            return EnrichedEvent::from_event(self.clone());
        };

        let home_team_id = first_id(&[
            details.home_team_id.as_deref(),
            self.home_team_id.as_deref(),
            self.stub_home_id(),
            details.stub_home_id(),
        ]);
        let away_team_id = first_id(&[
            details.away_team_id.as_deref(),
            self.away_team_id.as_deref(),
            self.stub_away_id(),
            details.stub_away_id(),
        ]);
        let competition_id = first_id(&[
            details.competition_id.as_deref(),
            self.competition_id.as_deref(),
            self.stub_competition_id(),
            details.stub_competition_id(),
        ]);

        let event = self.clone();
        let details = details.clone();
        EnrichedEvent {
            home_position: event
                .home_position
                .or(details.home_position)
                .or_else(|| event.home.and_then(|t| t.position))
                .or_else(|| details.home.and_then(|t| t.position)),
            away_position: event
                .away_position
                .or(details.away_position)
                .or_else(|| event.away.and_then(|t| t.position))
                .or_else(|| details.away.and_then(|t| t.position)),
            match_id: event.id.or(details.id).unwrap_or_default(),
            status_id: event.status_id.or(details.status_id),
            home_team_id,
            away_team_id,
            competition_id,
            home_scores: non_empty_or(event.home_scores, details.home_scores),
            away_scores: non_empty_or(event.away_scores, details.away_scores),
            match_time: event.match_time.or(details.match_time),
            kickoff: event.kickoff.or(details.kickoff),
            venue: event.venue.or(details.venue),
            environment: event.environment.or(details.environment),
            events: event.events.or(details.events),
            odds: event.odds.or(details.odds),
        }
    }
}

fn first_id(candidates: &[Option<&str>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .find(|id| !id.is_empty())
        .map(|id| id.to_string())
}

fn non_empty_or(primary: Vec<Scalar>, fallback: Vec<Scalar>) -> Vec<Scalar> {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}

/// An event with its details folded in and ids settled.
#[derive(Debug, Clone, Default)]
pub struct EnrichedEvent {
    pub match_id: String,
    pub status_id: Option<i64>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub competition_id: Option<String>,
    pub home_scores: Vec<Scalar>,
    pub away_scores: Vec<Scalar>,
    pub match_time: Option<i64>,
    pub kickoff: Option<String>,
    pub venue: Option<Venue>,
    pub home_position: Option<String>,
    pub away_position: Option<String>,
    pub environment: Option<RawEnvironment>,
    pub events: Option<Vec<Value>>,
    pub odds: Option<BookmakerQuoteMap>,
}

impl EnrichedEvent {
    fn from_event(event: RawEvent) -> Self {
        let home_team_id = first_id(&[event.home_team_id.as_deref(), event.stub_home_id()]);
        let away_team_id = first_id(&[event.away_team_id.as_deref(), event.stub_away_id()]);
        let competition_id = first_id(&[event.competition_id.as_deref(), event.stub_competition_id()]);
        Self {
            home_position: event
                .home_position
                .or_else(|| event.home.and_then(|t| t.position)),
            away_position: event
                .away_position
                .or_else(|| event.away.and_then(|t| t.position)),
            match_id: event.id.unwrap_or_default(),
            status_id: event.status_id,
            home_team_id,
            away_team_id,
            competition_id,
            home_scores: event.home_scores,
            away_scores: event.away_scores,
            match_time: event.match_time,
            kickoff: event.kickoff,
            venue: event.venue,
            environment: event.environment,
            events: event.events,
            odds: event.odds,
        }
    }
}

// ============================================================================
// Reference records
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TeamRecord {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub short_name: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub logo: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompetitionRecord {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub short_name: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub logo: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub country_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountryRecord {
    #[serde(deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(deserialize_with = "opt_string_or_number")]
    pub name: Option<String>,
}

/// Read-only lookup tables for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub teams: HashMap<String, TeamRecord>,
    pub competitions: HashMap<String, CompetitionRecord>,
    pub countries: HashMap<String, CountryRecord>,
    pub details: HashMap<String, MatchDetails>,
    pub quotes: HashMap<String, BookmakerQuoteMap>,
}

impl ReferenceTables {
    /// Build every table from the snapshot root. Missing sections are empty.
    pub fn from_sections(root: &Map<String, Value>) -> Self {
        Self {
            teams: first_results(root.get("team_info"), "team_info"),
            competitions: first_results(root.get("competition_info"), "competition_info"),
            countries: countries(root.get("countries")),
            details: first_results(root.get("match_details"), "match_details"),
            quotes: quote_tables(root.get("match_odds")),
        }
    }
}

/// `{id: {"results": [record, ...]}}` -> `{id: record}` using the first result.
fn first_results<T: DeserializeOwned>(section: Option<&Value>, name: &str) -> HashMap<String, T> {
    let Some(entries) = section.and_then(Value::as_object) else {
        if section.is_some() {
            warn!("Section {} is not an object; treating as empty", name);
        }
        return HashMap::new();
    };

    let mut table = HashMap::with_capacity(entries.len());
    for (id, wrapper) in entries {
        let first = wrapper
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first());
        let Some(first) = first else {
            debug!("{} entry {} has no results", name, id);
            continue;
        };
        match serde_json::from_value::<T>(first.clone()) {
            Ok(record) => {
                table.insert(id.clone(), record);
            }
            Err(e) => warn!("Skipping malformed {} entry {}: {}", name, id, e),
        }
    }
    table
}

/// `{match_id: {"results": {bookmaker_id: {...}}}}`.
fn quote_tables(section: Option<&Value>) -> HashMap<String, BookmakerQuoteMap> {
    let Some(entries) = section.and_then(Value::as_object) else {
        return HashMap::new();
    };
    entries
        .iter()
        .filter_map(|(match_id, wrapper)| {
            let results = wrapper.get("results").filter(|r| r.is_object())?;
            Some((match_id.clone(), parse_quote_map(results)))
        })
        .collect()
}

/// Countries come as lists of `{id, name}` under any key, or as an id-keyed map.
fn countries(section: Option<&Value>) -> HashMap<String, CountryRecord> {
    let mut table = HashMap::new();
    let mut add = |id_hint: Option<&str>, value: &Value| {
        let Ok(record) = serde_json::from_value::<CountryRecord>(value.clone()) else {
            return;
        };
        let id = record.id.clone().or_else(|| id_hint.map(str::to_string));
        if let Some(id) = id {
            table.insert(id, record);
        }
    };

    match section {
        Some(Value::Array(items)) => items.iter().filter(|v| v.is_object()).for_each(|v| add(None, v)),
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                match value {
                    Value::Array(items) => items.iter().filter(|v| v.is_object()).for_each(|v| add(None, v)),
                    Value::Object(_) => add(Some(key), value),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    table
}

// ============================================================================
// Snapshot
// ============================================================================

/// One fully materialized collector snapshot.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Vec<RawEvent>,
    pub tables: ReferenceTables,
}

impl Snapshot {
    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        let Value::Object(mut root) = value else {
            return Err(SnapshotError::InvalidSection {
                section: "root",
                reason: "snapshot must be a JSON object".to_string(),
            });
        };

        let live = root
            .remove("live_matches")
            .ok_or(SnapshotError::MissingSection("live_matches"))?;
        let raw_events = match live {
            Value::Array(items) => items,
            Value::Object(mut wrapper) => match wrapper.remove("results") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(SnapshotError::InvalidSection {
                        section: "live_matches",
                        reason: "results is not a list".to_string(),
                    })
                }
                None => return Err(SnapshotError::MissingSection("live_matches.results")),
            },
            other => {
                return Err(SnapshotError::InvalidSection {
                    section: "live_matches",
                    reason: format!("expected an object or list, found {}", json_kind(&other)),
                })
            }
        };

        let events: Vec<RawEvent> = raw_events.into_iter().map(RawEvent::from_json).collect();
        let tables = ReferenceTables::from_sections(&root);

        info!(
            "Loaded snapshot: {} events, {} teams, {} competitions, {} countries, {} odds tables",
            events.len(),
            tables.teams.len(),
            tables.competitions.len(),
            tables.countries.len(),
            tables.quotes.len()
        );

        Ok(Self { events, tables })
    }

    /// Read and validate a snapshot file.
    pub async fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json_str(&raw)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_live_matches_is_fatal() {
        let err = Snapshot::from_value(json!({"team_info": {}})).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingSection("live_matches")));
    }

    #[test]
    fn test_unparsable_document_is_fatal() {
        assert!(matches!(
            Snapshot::from_json_str("{not json"),
            Err(SnapshotError::Json(_))
        ));
        assert!(matches!(
            Snapshot::from_value(json!([1, 2])),
            Err(SnapshotError::InvalidSection { section: "root", .. })
        ));
        assert!(matches!(
            Snapshot::from_value(json!({"live_matches": "x"})),
            Err(SnapshotError::InvalidSection { section: "live_matches", .. })
        ));
    }

    #[test]
    fn test_live_matches_as_bare_list() {
        let snapshot = Snapshot::from_value(json!({"live_matches": [{"id": "m1"}]})).unwrap();
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.events[0].match_id(), "m1");
    }

    #[test]
    fn test_malformed_event_still_counts() {
        let snapshot = Snapshot::from_value(json!({
            "live_matches": {"results": [{"id": "m1"}, 42, {"id": "m3", "home": "broken"}]}
        }))
        .unwrap();
        assert_eq!(snapshot.events.len(), 3);
        assert_eq!(snapshot.events[1].match_id(), "");
        assert_eq!(snapshot.events[2].match_id(), "m3");
        assert!(snapshot.events[2].home.is_none());
    }

    #[test]
    fn test_numeric_ids_become_text() {
        let event = RawEvent::from_json(json!({
            "id": 991,
            "status_id": "4",
            "home": {"id": 17, "position": 3},
            "venue": "Old Trafford"
        }));
        assert_eq!(event.match_id(), "991");
        assert_eq!(event.status_id, Some(4));
        let enriched = event.enriched_with(None);
        assert_eq!(enriched.home_team_id.as_deref(), Some("17"));
        assert_eq!(enriched.home_position.as_deref(), Some("3"));
        assert_eq!(enriched.venue.map(|v| v.name().to_string()).as_deref(), Some("Old Trafford"));
    }

    #[test]
    fn test_details_ids_take_precedence() {
        let event = RawEvent::from_json(json!({
            "id": "m1",
            "home": {"id": "stub-home"},
            "away": {"id": "stub-away"},
            "kickoff": "15:00"
        }));
        let details = RawEvent::from_json(json!({
            "home_team_id": "T-home",
            "away_team_id": "",
            "competition_id": "C1",
            "status_id": 3,
            "kickoff": "16:00",
            "venue": {"name": "Anfield"},
            "environment": {"weather": 5, "wind": "3.0m/s"}
        }));

        let enriched = event.enriched_with(Some(&details));
        assert_eq!(enriched.home_team_id.as_deref(), Some("T-home"));
        assert_eq!(enriched.away_team_id.as_deref(), Some("stub-away"));
        assert_eq!(enriched.competition_id.as_deref(), Some("C1"));
        assert_eq!(enriched.status_id, Some(3));
        assert_eq!(enriched.kickoff.as_deref(), Some("15:00"));
        assert_eq!(enriched.venue.map(|v| v.name().to_string()).as_deref(), Some("Anfield"));
        assert_eq!(
            enriched.environment.and_then(|e| e.wind).as_deref(),
            Some("3.0m/s")
        );
    }

    #[test]
    fn test_wind_speed_alias() {
        let env: RawEnvironment = serde_json::from_value(json!({"wind_speed": "2.0m/s"})).unwrap();
        assert_eq!(env.wind.as_deref(), Some("2.0m/s"));
    }

    #[test]
    fn test_reference_tables() {
        let snapshot = Snapshot::from_value(json!({
            "live_matches": {"results": []},
            "team_info": {
                "T1": {"results": [{"name": "Arsenal", "short_name": "ARS", "logo": "a.png"}]},
                "T2": {"results": []},
                "T3": {"results": "oops"}
            },
            "competition_info": {"C1": {"results": [{"name": "Premier League", "country_id": 44}]}},
            "countries": {"results": [{"id": "44", "name": "England"}, "junk"]},
            "match_details": {"m1": {"results": [{"home_team_id": "T1"}]}},
            "match_odds": {
                "m1": {"results": {"2": {"eu": [[1, 3, 2.1, 3.4, 3.6, 0, 0, "0-0"]]}}},
                "m2": {"results": []}
            }
        }))
        .unwrap();

        let tables = &snapshot.tables;
        assert_eq!(tables.teams.len(), 1);
        assert_eq!(tables.teams["T1"].short_name.as_deref(), Some("ARS"));
        assert_eq!(tables.competitions["C1"].country_id.as_deref(), Some("44"));
        assert_eq!(tables.countries["44"].name.as_deref(), Some("England"));
        assert!(tables.details.contains_key("m1"));
        assert_eq!(tables.quotes["m1"]["2"].money_line.len(), 1);
        assert!(!tables.quotes.contains_key("m2"));
    }

    #[test]
    fn test_countries_as_keyed_map() {
        let table = countries(Some(&json!({"7": {"name": "Spain"}})));
        assert_eq!(table["7"].name.as_deref(), Some("Spain"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let err = Snapshot::from_path(Path::new("/definitely/not/here.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
