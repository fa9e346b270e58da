//! Odds normalization: decimal and hybrid quotes to signed American odds.
//!
//! Conversions never fail loudly. Anything that cannot be priced comes back as
//! `None` and is emitted as JSON `null` in the American series.

use crate::quote::{Notation, OddsFamily, QuoteEntry, Scalar};

/// Decimal odds to American.
///
/// - `>= 2.00` -> `(d - 1) * 100`
/// - `1.00 ..< 2.00` -> `-100 / (d - 1)`
/// - below 1.00 (or exactly 1.00, which has no finite price) -> `None`
pub fn decimal_to_american(decimal: f64) -> Option<i64> {
    if !decimal.is_finite() {
        return None;
    }
    let american = if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else if decimal >= 1.0 {
        -100.0 / (decimal - 1.0)
    } else {
        return None;
    };
    round_price(american)
}

/// Hybrid (net payout) odds to American.
///
/// - `>= 1.00` -> `h * 100`
/// - `0 <.. 1.00` -> `-100 / h`
/// - `<= 0` -> `None`
pub fn hybrid_to_american(hybrid: f64) -> Option<i64> {
    if !hybrid.is_finite() {
        return None;
    }
    let american = if hybrid >= 1.0 {
        hybrid * 100.0
    } else if hybrid > 0.0 {
        -100.0 / hybrid
    } else {
        return None;
    };
    round_price(american)
}

// Half-to-even, matching the feed's reference conversions.
fn round_price(american: f64) -> Option<i64> {
    american.is_finite().then(|| american.round_ties_even() as i64)
}

/// Render with an explicit sign: `+110`, `-200`.
pub fn format_american(odds: i64) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}

/// Convert one raw quote value in the given notation.
pub fn to_american(notation: Notation, raw: &Scalar) -> Option<String> {
    let value = raw.as_f64()?;
    let american = match notation {
        Notation::Decimal => decimal_to_american(value),
        Notation::Hybrid => hybrid_to_american(value),
    }?;
    Some(format_american(american))
}

/// American counterpart of one entry.
///
/// Prices become signed strings (or `null`). For handicap and total families the
/// middle value is a line, not a price, and is copied through unchanged.
pub fn americanize(entry: &QuoteEntry, family: OddsFamily) -> QuoteEntry {
    let notation = family.notation();
    let price = |raw: &Scalar| match to_american(notation, raw) {
        Some(american) => Scalar::Text(american),
        None => Scalar::Null,
    };

    let [first, middle, last] = &entry.values;
    let middle = if family.middle_is_price() {
        price(middle)
    } else {
        middle.clone()
    };

    QuoteEntry {
        values: [price(first), middle, price(last)],
        ..entry.clone()
    }
}

/// Index-aligned American series for a native series.
pub fn americanize_series(entries: &[QuoteEntry], family: OddsFamily) -> Vec<QuoteEntry> {
    entries.iter().map(|entry| americanize(entry, family)).collect()
}
