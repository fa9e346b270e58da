//! Quote entries and odds families.
//!
//! The collector ships every quote observation as a positional array:
//!
//! ```text
//! [timestamp, minute, value1, value2, value3, status, sealed, score]
//! ```
//!
//! Positions are kept as loosely-typed [`Scalar`]s so that the native series can
//! be emitted exactly as received. Timestamps and minutes are read numerically
//! only when deduplication needs them.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::error::QuoteEntryError;

/// Number of positions in a well-formed quote entry.
pub const QUOTE_ENTRY_LEN: usize = 8;

/// A single JSON leaf value carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// An array or object sitting where a leaf was expected.
    Nested(Value),
}

impl Scalar {
    /// Convert a JSON leaf. Arrays and objects are not scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Int(i)),
                None => n.as_f64().map(Scalar::Float),
            },
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Like [`Scalar::from_json`], but keeps nested values instead of refusing them.
    pub fn from_position(value: &Value) -> Self {
        Self::from_json(value).unwrap_or_else(|| Scalar::Nested(value.clone()))
    }

    /// Numeric reading of a quote value. Numeric text parses like a number.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Scalar::Int(i) => *i as f64,
            Scalar::Float(f) => *f,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Null | Scalar::Bool(_) | Scalar::Nested(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Integer reading of a minute marker or code.
    ///
    /// Fractional numbers truncate toward zero; text must hold an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Scalar::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Nested(v) => write!(f, "{}", v),
        }
    }
}

/// One observation of a wagering line at a point in the match.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteEntry {
    /// As received; integer or fractional epoch seconds.
    pub timestamp: Scalar,
    pub minute: Scalar,
    pub values: [Scalar; 3],
    pub status: Scalar,
    pub sealed: Scalar,
    pub score: Scalar,
}

impl QuoteEntry {
    /// Validated construction from the collector's positional array.
    ///
    /// Only the shape is checked. Positions past the eighth are ignored.
    pub fn from_json(value: &Value) -> Result<Self, QuoteEntryError> {
        let items = value.as_array().ok_or(QuoteEntryError::NotArray)?;
        if items.len() < QUOTE_ENTRY_LEN {
            return Err(QuoteEntryError::TooShort(items.len()));
        }

        let mut positions = items.iter().take(QUOTE_ENTRY_LEN).map(Scalar::from_position);
        let mut next = || positions.next().unwrap_or_default();
        Ok(Self {
            timestamp: next(),
            minute: next(),
            values: [next(), next(), next()],
            status: next(),
            sealed: next(),
            score: next(),
        })
    }

    /// Numeric reading of the timestamp; `None` when it is not a number.
    pub fn timestamp_value(&self) -> Option<f64> {
        self.timestamp.as_f64()
    }
}

impl Serialize for QuoteEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(QUOTE_ENTRY_LEN)?;
        tuple.serialize_element(&self.timestamp)?;
        tuple.serialize_element(&self.minute)?;
        for value in &self.values {
            tuple.serialize_element(value)?;
        }
        tuple.serialize_element(&self.status)?;
        tuple.serialize_element(&self.sealed)?;
        tuple.serialize_element(&self.score)?;
        tuple.end()
    }
}

/// Price notation a family's quotes are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Multiplicative payout including stake (2.10 returns 2.10x).
    Decimal,
    /// Net payout per unit staked, used for handicap and total lines.
    Hybrid,
}

/// The four quote families a bookmaker may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OddsFamily {
    MoneyLine,
    Spread,
    OverUnder,
    Corners,
}

impl OddsFamily {
    pub const ALL: [OddsFamily; 4] = [
        OddsFamily::MoneyLine,
        OddsFamily::Spread,
        OddsFamily::OverUnder,
        OddsFamily::Corners,
    ];

    /// Families that make a bookmaker eligible for selection. Corners never do.
    pub const CORE: [OddsFamily; 3] = [OddsFamily::MoneyLine, OddsFamily::Spread, OddsFamily::OverUnder];

    /// Key used by the collector feed.
    pub fn raw_key(self) -> &'static str {
        match self {
            OddsFamily::MoneyLine => "eu",
            OddsFamily::Spread => "asia",
            OddsFamily::OverUnder => "bs",
            OddsFamily::Corners => "cr",
        }
    }

    /// Output field name of the native series.
    pub fn field_name(self) -> &'static str {
        match self {
            OddsFamily::MoneyLine => "money_line",
            OddsFamily::Spread => "spread",
            OddsFamily::OverUnder => "over_under",
            OddsFamily::Corners => "corners",
        }
    }

    /// Output field name of the American series.
    pub fn american_field_name(self) -> &'static str {
        match self {
            OddsFamily::MoneyLine => "money_line_american",
            OddsFamily::Spread => "spread_american",
            OddsFamily::OverUnder => "over_under_american",
            OddsFamily::Corners => "corners_american",
        }
    }

    pub fn notation(self) -> Notation {
        match self {
            OddsFamily::MoneyLine => Notation::Decimal,
            _ => Notation::Hybrid,
        }
    }

    /// Whether the middle value is a price (money line) rather than a line.
    pub fn middle_is_price(self) -> bool {
        self == OddsFamily::MoneyLine
    }
}

impl fmt::Display for OddsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// All quote series published by one bookmaker for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookmakerQuotes {
    pub money_line: Vec<QuoteEntry>,
    pub spread: Vec<QuoteEntry>,
    pub over_under: Vec<QuoteEntry>,
    pub corners: Vec<QuoteEntry>,
}

/// Bookmaker id -> quotes. Ordered so iteration is deterministic.
pub type BookmakerQuoteMap = BTreeMap<String, BookmakerQuotes>;

impl BookmakerQuotes {
    /// Build from one bookmaker's `{"eu": [...], "asia": [...], ...}` block.
    ///
    /// Malformed entries are dropped; the rest of the family survives.
    pub fn from_json(value: &Value) -> Self {
        let mut quotes = Self::default();
        let Some(block) = value.as_object() else {
            return quotes;
        };

        for family in OddsFamily::ALL {
            let series = block
                .get(family.raw_key())
                .or_else(|| block.get(family.field_name()))
                .and_then(Value::as_array);
            let Some(series) = series else { continue };

            let target = quotes.family_mut(family);
            for raw in series {
                match QuoteEntry::from_json(raw) {
                    Ok(entry) => target.push(entry),
                    Err(e) => debug!("Dropping {} quote entry: {}", family, e),
                }
            }
        }

        quotes
    }

    pub fn family(&self, family: OddsFamily) -> &[QuoteEntry] {
        match family {
            OddsFamily::MoneyLine => &self.money_line,
            OddsFamily::Spread => &self.spread,
            OddsFamily::OverUnder => &self.over_under,
            OddsFamily::Corners => &self.corners,
        }
    }

    pub fn family_mut(&mut self, family: OddsFamily) -> &mut Vec<QuoteEntry> {
        match family {
            OddsFamily::MoneyLine => &mut self.money_line,
            OddsFamily::Spread => &mut self.spread,
            OddsFamily::OverUnder => &mut self.over_under,
            OddsFamily::Corners => &mut self.corners,
        }
    }

    /// True when money line, spread or over/under carries at least one entry.
    pub fn has_core_quotes(&self) -> bool {
        OddsFamily::CORE.iter().any(|f| !self.family(*f).is_empty())
    }

    /// Apply `transform` to every family, producing a new set of series.
    pub fn map_families<F>(&self, mut transform: F) -> Self
    where
        F: FnMut(OddsFamily, &[QuoteEntry]) -> Vec<QuoteEntry>,
    {
        let mut out = Self::default();
        for family in OddsFamily::ALL {
            *out.family_mut(family) = transform(family, self.family(family));
        }
        out
    }
}

/// Parse a `{bookmaker_id: {...families...}}` object.
pub fn parse_quote_map(value: &Value) -> BookmakerQuoteMap {
    let Some(bookmakers) = value.as_object() else {
        return BookmakerQuoteMap::new();
    };
    bookmakers
        .iter()
        .filter(|(_, block)| block.is_object())
        .map(|(id, block)| (id.clone(), BookmakerQuotes::from_json(block)))
        .collect()
}
