//! Odds coverage over in-play summaries.
//!
//! Renderers have historically read the American fields while the native ones
//! stayed empty. The counts here make that visible after each run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::quote::OddsFamily;
use crate::summary::MatchSummary;

/// Per-field population counts for in-play matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OddsCoverage {
    pub in_play_matches: usize,
    /// Output field name -> in-play matches with a non-empty collection.
    pub populated: BTreeMap<&'static str, usize>,
}

impl OddsCoverage {
    pub fn from_summaries(summaries: &[MatchSummary]) -> Self {
        let mut coverage = Self::default();
        for family in OddsFamily::ALL {
            coverage.populated.insert(family.field_name(), 0);
            coverage.populated.insert(family.american_field_name(), 0);
        }

        for summary in summaries.iter().filter(|s| s.is_in_play()) {
            coverage.in_play_matches += 1;
            for family in OddsFamily::ALL {
                if !summary.series(family).is_empty() {
                    *coverage.populated.entry(family.field_name()).or_default() += 1;
                }
                if !summary.american_series(family).is_empty() {
                    *coverage.populated.entry(family.american_field_name()).or_default() += 1;
                }
            }
        }
        coverage
    }

    pub fn count(&self, field: &str) -> usize {
        self.populated.get(field).copied().unwrap_or(0)
    }

    /// American money line populated more often than the native one.
    pub fn has_field_mismatch(&self) -> bool {
        let native = OddsFamily::MoneyLine.field_name();
        let american = OddsFamily::MoneyLine.american_field_name();
        self.count(american) > self.count(native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::config::EngineConfig;
    use crate::snapshot::Snapshot;
    use serde_json::json;

    fn summaries() -> Vec<MatchSummary> {
        let snapshot = Snapshot::from_value(json!({
            "live_matches": {"results": [
                {"id": "a", "status_id": 2, "odds": {"2": {
                    "eu": [[1, 3, 2.0, 3.0, 4.0, 0, 0, "0-0"]],
                    "bs": [[1, 4, 0.9, 2.5, 0.95, 0, 0, "0-0"]]
                }}},
                {"id": "b", "status_id": 3, "odds": {"2": {"asia": [[1, 5, 0.9, 0.5, 0.95, 0, 0, "0-0"]]}}},
                {"id": "c", "status_id": 9, "odds": {"2": {"eu": [[1, 3, 2.0, 3.0, 4.0, 0, 0, "0-0"]]}}},
                {"id": "d", "status_id": 4}
            ]}
        }))
        .unwrap();
        assemble(&snapshot.events, &snapshot.tables, &EngineConfig::default())
    }

    #[test]
    fn test_counts_in_play_only() {
        let coverage = OddsCoverage::from_summaries(&summaries());
        assert_eq!(coverage.in_play_matches, 3);
        assert_eq!(coverage.count("money_line"), 1);
        assert_eq!(coverage.count("money_line_american"), 1);
        assert_eq!(coverage.count("spread"), 1);
        assert_eq!(coverage.count("over_under_american"), 1);
        assert_eq!(coverage.count("corners"), 0);
        assert_eq!(coverage.populated.len(), 8);
        assert!(!coverage.has_field_mismatch());
    }

    #[test]
    fn test_detects_american_only_population() {
        let mut summaries = summaries();
        summaries[0].money_line.clear();
        let coverage = OddsCoverage::from_summaries(&summaries);
        assert!(coverage.has_field_mismatch());
    }

    #[test]
    fn test_empty_input() {
        let coverage = OddsCoverage::from_summaries(&[]);
        assert_eq!(coverage.in_play_matches, 0);
        assert!(!coverage.has_field_mismatch());
    }
}
