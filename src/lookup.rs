//! Identity resolution against the reference tables.
//!
//! Resolution is best-effort: a missing id or table entry degrades the field to
//! its default and processing continues.

use tracing::debug;

use crate::snapshot::ReferenceTables;

/// Placeholder for names that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// A team as it appears in a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamIdentity {
    /// Resolved team id; empty when the team is not in the table.
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub logo: String,
}

impl TeamIdentity {
    pub fn unresolved() -> Self {
        Self {
            id: String::new(),
            name: UNKNOWN.to_string(),
            short_name: String::new(),
            logo: String::new(),
        }
    }
}

/// A competition and its country as they appear in a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionIdentity {
    /// Resolved competition id; empty when not in the table.
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub logo: String,
    pub country: String,
}

impl CompetitionIdentity {
    pub fn unresolved() -> Self {
        Self {
            id: String::new(),
            name: UNKNOWN.to_string(),
            short_name: String::new(),
            logo: String::new(),
            country: UNKNOWN.to_string(),
        }
    }
}

/// Resolves ids for one run's reference tables.
#[derive(Debug, Clone, Copy)]
pub struct LookupResolver<'a> {
    tables: &'a ReferenceTables,
}

impl<'a> LookupResolver<'a> {
    pub fn new(tables: &'a ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn team(&self, team_id: Option<&str>) -> TeamIdentity {
        let Some(id) = team_id.filter(|id| !id.is_empty()) else {
            return TeamIdentity::unresolved();
        };
        let Some(record) = self.tables.teams.get(id) else {
            debug!("Team {} not found in team table", id);
            return TeamIdentity::unresolved();
        };

        TeamIdentity {
            id: id.to_string(),
            name: record.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            short_name: record.short_name.clone().unwrap_or_default(),
            logo: record.logo.clone().unwrap_or_default(),
        }
    }

    pub fn competition(&self, competition_id: Option<&str>) -> CompetitionIdentity {
        let Some(id) = competition_id.filter(|id| !id.is_empty()) else {
            return CompetitionIdentity::unresolved();
        };
        let Some(record) = self.tables.competitions.get(id) else {
            debug!("Competition {} not found in competition table", id);
            return CompetitionIdentity::unresolved();
        };

        CompetitionIdentity {
            id: id.to_string(),
            name: record.name.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            short_name: record.short_name.clone().unwrap_or_default(),
            logo: record.logo.clone().unwrap_or_default(),
            country: self.country(record.country_id.as_deref()),
        }
    }

    /// Country name by id, `Unknown` when the id or entry is missing.
    pub fn country(&self, country_id: Option<&str>) -> String {
        country_id
            .filter(|id| !id.is_empty())
            .and_then(|id| {
                let record = self.tables.countries.get(id);
                if record.is_none() {
                    debug!("Country {} not found in country table", id);
                }
                record
            })
            .and_then(|record| record.name.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}
