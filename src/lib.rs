//! Live match snapshot consolidation and odds normalization.
//!
//! A collector drops a raw snapshot of live events, per-bookmaker quote series
//! and reference tables. [`assemble`] turns it into one [`MatchSummary`] per
//! event: identities resolved, one bookmaker selected, its series deduplicated
//! into a minute window and rendered in both native and American notation.
//!
//! ```no_run
//! use match_summary::{assemble, EngineConfig, Snapshot};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = std::fs::read_to_string("step1.json")?;
//! let snapshot = Snapshot::from_json_str(&raw)?;
//! let summaries = assemble(&snapshot.events, &snapshot.tables, &EngineConfig::default());
//! println!("{}", serde_json::to_string_pretty(&summaries)?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod bookmaker;
pub mod config;
pub mod dedup;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod lookup;
pub mod odds;
pub mod output;
pub mod quote;
pub mod snapshot;
pub mod summary;

pub use assembler::{assemble, assemble_event};
pub use bookmaker::{select_bookmaker, select_odds, SelectedOdds};
pub use config::{EngineConfig, RunConfig};
pub use dedup::{dedup_by_minute, MinuteWindow};
pub use diagnostics::OddsCoverage;
pub use environment::{convert_environment, EnvironmentSummary};
pub use error::{OutputError, QuoteEntryError, SnapshotError};
pub use lookup::{CompetitionIdentity, LookupResolver, TeamIdentity};
pub use odds::{decimal_to_american, hybrid_to_american};
pub use output::{RunMetadata, SummaryDocument, SCHEMA_URL, SCHEMA_VERSION};
pub use quote::{BookmakerQuoteMap, BookmakerQuotes, OddsFamily, QuoteEntry, Scalar};
pub use snapshot::{RawEvent, ReferenceTables, Snapshot};
pub use summary::{MatchStatus, MatchSummary};
