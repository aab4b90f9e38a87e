use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque currency identifier.
///
/// No format or registry validation is applied: "USD", "BTC" and
/// "POINTS-2024" are all equally valid codes.
///
/// # Examples
///
/// ```
/// use rate_graph::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Errors arising from building or querying a rate graph.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("exchange rate must be positive and finite, got {rate} for {from} -> {to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
    },
    #[error("no conversion path from {from} to {to}")]
    PathNotFound {
        from: CurrencyCode,
        to: CurrencyCode,
    },
    #[error("negative cycle reachable from {start}{}", describe_cycle(.cycle))]
    InvalidGraph {
        start: CurrencyCode,
        /// Currencies around the detected cycle, in traversal order. `None`
        /// when relaxation kept improving but no closed loop could be
        /// recovered from the predecessor chain.
        cycle: Option<Vec<CurrencyCode>>,
    },
    #[error("best rate from {from} to {to} is e^{log_rate}, outside the f64 range")]
    RateOutOfRange {
        from: CurrencyCode,
        to: CurrencyCode,
        /// Natural log of the rate, i.e. the negated path weight.
        log_rate: f64,
    },
    #[error("graph holds {count} rates above 1.0; label-setting search would be unsound")]
    NegativeWeight { count: usize },
    #[error("invalid rate quotes: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Render a loop as `A → B → A`.
pub(crate) fn format_cycle(cycle: &[CurrencyCode]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(CurrencyCode::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.as_str());
    }
    parts.join(" → ")
}

fn describe_cycle(cycle: &Option<Vec<CurrencyCode>>) -> String {
    match cycle {
        Some(cycle) if !cycle.is_empty() => format!(": {}", format_cycle(cycle)),
        _ => String::new(),
    }
}

/// A quoted conversion: 1 unit of `from` buys `rate` units of `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
}

impl RateQuote {
    pub fn new(from: impl Into<CurrencyCode>, to: impl Into<CurrencyCode>, rate: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rate,
        }
    }
}

impl fmt::Display for RateQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} @ {}", self.from, self.to, self.rate)
    }
}
