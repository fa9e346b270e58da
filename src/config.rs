//! Engine and run configuration.
//!
//! `EngineConfig` is the immutable policy handed to the core: bookmaker
//! priority, display names, the minute window and the weather table.
//! `RunConfig` is what the file adapter reads from its environment.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::dedup::MinuteWindow;

/// Bookmaker ids in selection order (BET365 first).
pub const DEFAULT_BOOKMAKER_PRIORITY: &[&str] = &[
    "2", "3", "4", "5", "6", "9", "10", "11", "13", "14", "15", "16", "17", "21", "22",
];

/// Bookmaker id -> display name.
pub const DEFAULT_BOOKMAKER_NAMES: &[(&str, &str)] = &[
    ("2", "BET365"),
    ("3", "Crown"),
    ("4", "10BET"),
    ("5", "Ladbrokes"),
    ("6", "Mansion88"),
    ("7", "Macauslot"),
    ("8", "SNAI"),
    ("9", "William Hill"),
    ("10", "Easybets"),
    ("11", "Vcbet"),
    ("12", "EuroBet"),
    ("13", "Interwetten"),
    ("14", "12bet"),
    ("15", "Sbobet"),
    ("16", "Wewbet"),
    ("17", "18Bet"),
    ("18", "Fun88"),
    ("21", "188bet"),
    ("22", "Pinnacle"),
];

/// Weather code -> description.
pub const DEFAULT_WEATHER_DESCRIPTIONS: &[(i64, &str)] = &[
    (1, "Partially cloudy"),
    (2, "Cloudy"),
    (3, "Partially cloudy/rain"),
    (4, "Snow"),
    (5, "Sunny"),
    (6, "Overcast Rain/partial thunderstorm"),
    (7, "Overcast"),
    (8, "Mist"),
    (9, "Cloudy with rain"),
    (10, "Cloudy with rain"),
    (11, "Cloudy with rain/partial Thunderstorms"),
    (12, "Clouds/rains and thunderstorms locally"),
    (13, "Fog"),
];

/// Policy for one assembly run. Never mutated while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub bookmaker_priority: Vec<String>,
    pub bookmaker_names: BTreeMap<String, String>,
    pub minute_window: MinuteWindow,
    pub weather_descriptions: BTreeMap<i64, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bookmaker_priority: DEFAULT_BOOKMAKER_PRIORITY.iter().map(|id| id.to_string()).collect(),
            bookmaker_names: DEFAULT_BOOKMAKER_NAMES
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            minute_window: MinuteWindow::default(),
            weather_descriptions: DEFAULT_WEATHER_DESCRIPTIONS
                .iter()
                .map(|(code, text)| (*code, text.to_string()))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn with_priority<I, S>(mut self, priority: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bookmaker_priority = priority.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_minute_window(mut self, window: MinuteWindow) -> Self {
        self.minute_window = window;
        self
    }

    /// Display name for a bookmaker id; unknown ids read `Company {id}`.
    pub fn bookmaker_name(&self, bookmaker_id: &str) -> String {
        self.bookmaker_names
            .get(bookmaker_id)
            .cloned()
            .unwrap_or_else(|| format!("Company {}", bookmaker_id))
    }
}

/// File adapter configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Collector snapshot to read.
    pub snapshot_path: PathBuf,
    /// Summary document to write.
    pub summary_path: PathBuf,
    pub engine: EngineConfig,
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("SNAPSHOT_PATH").unwrap_or_else(|| "step1.json".to_string());
        let summary_path = lookup("SUMMARY_PATH").unwrap_or_else(|| "step2.json".to_string());

        let mut engine = EngineConfig::default();

        if let Some(raw) = lookup("ODDS_BOOKMAKER_PRIORITY") {
            let priority: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            if priority.is_empty() {
                return Err(anyhow!("ODDS_BOOKMAKER_PRIORITY is set but lists no bookmakers"));
            }
            engine = engine.with_priority(priority);
        }

        let default_window = MinuteWindow::default();
        let min = parse_minute(&lookup, "ODDS_MIN_MINUTE", default_window.min)?;
        let max = parse_minute(&lookup, "ODDS_MAX_MINUTE", default_window.max)?;
        if min > max {
            return Err(anyhow!(
                "ODDS_MIN_MINUTE ({}) is greater than ODDS_MAX_MINUTE ({})",
                min,
                max
            ));
        }
        engine = engine.with_minute_window(MinuteWindow::new(min, max));

        Ok(Self {
            snapshot_path: PathBuf::from(snapshot_path),
            summary_path: PathBuf::from(summary_path),
            engine,
        })
    }
}

fn parse_minute<F>(lookup: &F, key: &str, default: i64) -> Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be an integer minute, got '{}'", key, v)),
        Some(_) => Err(anyhow!("{} is set but empty", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("step1.json"));
        assert_eq!(config.summary_path, PathBuf::from("step2.json"));
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.engine.bookmaker_priority[0], "2");
        assert_eq!(config.engine.minute_window, MinuteWindow::new(2, 6));
    }

    #[test]
    fn test_overrides() {
        let config = RunConfig::from_lookup(lookup_from(&[
            ("SNAPSHOT_PATH", "/data/in.json"),
            ("ODDS_BOOKMAKER_PRIORITY", " 22, 2 ,,9"),
            ("ODDS_MIN_MINUTE", "0"),
            ("ODDS_MAX_MINUTE", "90"),
        ]))
        .unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("/data/in.json"));
        assert_eq!(config.engine.bookmaker_priority, vec!["22", "2", "9"]);
        assert_eq!(config.engine.minute_window, MinuteWindow::new(0, 90));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RunConfig::from_lookup(lookup_from(&[("ODDS_BOOKMAKER_PRIORITY", " , ")])).is_err());
        assert!(RunConfig::from_lookup(lookup_from(&[("ODDS_MIN_MINUTE", "two")])).is_err());
        assert!(RunConfig::from_lookup(lookup_from(&[("ODDS_MAX_MINUTE", "")])).is_err());
        assert!(RunConfig::from_lookup(lookup_from(&[
            ("ODDS_MIN_MINUTE", "7"),
            ("ODDS_MAX_MINUTE", "6"),
        ]))
        .is_err());
    }

    #[test]
    fn test_bookmaker_names() {
        let config = EngineConfig::default();
        assert_eq!(config.bookmaker_name("2"), "BET365");
        assert_eq!(config.bookmaker_name("22"), "Pinnacle");
        assert_eq!(config.bookmaker_name("99"), "Company 99");
    }
}
