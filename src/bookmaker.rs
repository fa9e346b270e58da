//! Bookmaker selection and per-family normalization.

use tracing::debug;

use crate::config::EngineConfig;
use crate::dedup::dedup_by_minute;
use crate::odds::americanize_series;
use crate::quote::{BookmakerQuoteMap, BookmakerQuotes};

/// First bookmaker in priority order with at least one core family populated.
///
/// Bookmakers missing from `priority` are never considered, so the result only
/// depends on the map's contents and the list order.
pub fn select_bookmaker<'a>(
    quotes: &'a BookmakerQuoteMap,
    priority: &[String],
) -> Option<(&'a str, &'a BookmakerQuotes)> {
    priority.iter().find_map(|id| {
        quotes
            .get_key_value(id.as_str())
            .filter(|(_, q)| q.has_core_quotes())
            .map(|(id, q)| (id.as_str(), q))
    })
}

/// The one bookmaker chosen for an event, with its series ready for output.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedOdds {
    pub bookmaker_id: String,
    pub bookmaker_name: String,
    /// Deduplicated native series.
    pub native: BookmakerQuotes,
    /// American rendering of `native`, index-aligned per family.
    pub american: BookmakerQuotes,
}

/// Select, deduplicate and normalize. `None` when no bookmaker qualifies.
pub fn select_odds(quotes: Option<&BookmakerQuoteMap>, config: &EngineConfig) -> Option<SelectedOdds> {
    let quotes = quotes?;
    let Some((bookmaker_id, selected)) = select_bookmaker(quotes, &config.bookmaker_priority) else {
        if !quotes.is_empty() {
            debug!(
                "No eligible bookmaker among {} candidates",
                quotes.len()
            );
        }
        return None;
    };

    let window = config.minute_window;
    let native = selected.map_families(|_, series| dedup_by_minute(series, window));
    let american = native.map_families(|family, series| americanize_series(series, family));

    Some(SelectedOdds {
        bookmaker_id: bookmaker_id.to_string(),
        bookmaker_name: config.bookmaker_name(bookmaker_id),
        native,
        american,
    })
}
