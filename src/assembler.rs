//! Per-event assembly of [`MatchSummary`] records.
//!
//! Pure and synchronous: the same events, tables and config always produce the
//! same summaries. Nothing that goes wrong for one event affects another.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::bookmaker::{select_odds, SelectedOdds};
use crate::config::EngineConfig;
use crate::environment::convert_environment;
use crate::lookup::LookupResolver;
use crate::quote::{BookmakerQuotes, Scalar};
use crate::snapshot::{RawEvent, ReferenceTables};
use crate::summary::MatchSummary;

/// One summary per event, in event order.
pub fn assemble(events: &[RawEvent], tables: &ReferenceTables, config: &EngineConfig) -> Vec<MatchSummary> {
    let summaries: Vec<MatchSummary> = events
        .iter()
        .map(|event| assemble_event(event, tables, config))
        .collect();

    let in_play = summaries.iter().filter(|s| s.is_in_play()).count();
    let with_odds = summaries.iter().filter(|s| s.has_odds()).count();
    info!(
        "Assembled {} summaries ({} in play, {} with odds)",
        summaries.len(),
        in_play,
        with_odds
    );

    summaries
}

pub fn assemble_event(event: &RawEvent, tables: &ReferenceTables, config: &EngineConfig) -> MatchSummary {
    let details = Some(event.match_id())
        .filter(|id| !id.is_empty())
        .and_then(|id| tables.details.get(id));
    let enriched = event.enriched_with(details);
    let match_id = enriched.match_id.as_str();

    let resolver = LookupResolver::new(tables);
    let home = resolver.team(enriched.home_team_id.as_deref());
    let away = resolver.team(enriched.away_team_id.as_deref());
    let competition = resolver.competition(enriched.competition_id.as_deref());

    for (side, requested, resolved) in [
        ("home team", &enriched.home_team_id, &home.id),
        ("away team", &enriched.away_team_id, &away.id),
        ("competition", &enriched.competition_id, &competition.id),
    ] {
        if let Some(requested) = requested.as_deref().filter(|_| resolved.is_empty()) {
            warn!("Match {}: {} {} not found in reference tables", match_id, side, requested);
        }
    }

    let quotes = tables.quotes.get(match_id).or(enriched.odds.as_ref());
    let status_id = enriched.status_id.unwrap_or(0);

    let (company, native, american) = match select_odds(quotes, config) {
        Some(SelectedOdds {
            bookmaker_id,
            bookmaker_name,
            native,
            american,
        }) => (Some((bookmaker_id, bookmaker_name)), native, american),
        None => (None, BookmakerQuotes::default(), BookmakerQuotes::default()),
    };

    let mut odds = BTreeMap::new();
    if let Some((bookmaker_id, _)) = &company {
        odds.insert(bookmaker_id.clone(), native.clone());
    }
    let (odds_company_id, odds_company_name) = company.unzip();

    MatchSummary {
        match_id: enriched.match_id.clone(),
        score: format!(
            "{}-{}",
            last_score(&enriched.home_scores),
            last_score(&enriched.away_scores)
        ),
        status_id,
        status: status_id,
        home: home.name,
        away: away.name,
        home_id: home.id,
        away_id: away.id,
        competition: competition.name,
        competition_id: competition.id,
        country: competition.country,
        match_time: enriched.match_time.unwrap_or(0),
        kickoff: enriched.kickoff.clone().unwrap_or_default(),
        venue: enriched
            .venue
            .as_ref()
            .map(|v| v.name().to_string())
            .unwrap_or_default(),
        home_position: enriched.home_position.clone().unwrap_or_default(),
        away_position: enriched.away_position.clone().unwrap_or_default(),

        home_short_name: home.short_name,
        home_logo: home.logo,
        away_short_name: away.short_name,
        away_logo: away.logo,
        competition_short_name: competition.short_name,
        competition_logo: competition.logo,

        money_line: native.money_line,
        money_line_american: american.money_line,
        spread: native.spread,
        spread_american: american.spread,
        over_under: native.over_under,
        over_under_american: american.over_under,
        corners: native.corners,
        corners_american: american.corners,

        odds_company_id,
        odds_company_name,
        odds,

        environment: convert_environment(enriched.environment.as_ref(), config),
        events: enriched.events.clone().unwrap_or_default(),
    }
}

/// Most recent score in a history; `0` when there is none.
///
/// Whole floats keep their decimal point (`1.0`), as the feed's own reports do.
fn last_score(history: &[Scalar]) -> String {
    match history.last() {
        Some(Scalar::Float(score)) if score.is_finite() && score.fract() == 0.0 => {
            format!("{:.1}", score)
        }
        Some(score) if !score.is_blank() => score.to_string(),
        _ => "0".to_string(),
    }
}
