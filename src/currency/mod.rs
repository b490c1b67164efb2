//! Currency converter
//!
//! Rates come from a live source when it answers and from a fixed offline
//! table otherwise. Fetch failures never reach the caller; they only change
//! the reported [`RateSourceKind`].

use crate::error::ArcadeError;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const CURRENCIES: &[Currency] = &[
    Currency { code: "INR", name: "Indian Rupee", symbol: "₹" },
    Currency { code: "USD", name: "US Dollar", symbol: "$" },
    Currency { code: "EUR", name: "Euro", symbol: "€" },
    Currency { code: "GBP", name: "British Pound", symbol: "£" },
    Currency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
    Currency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
    Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
    Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
];

/// Country name → currency code, for the country-to-country converter.
const COUNTRIES: &[(&str, &str)] = &[
    ("India", "INR"),
    ("United States", "USD"),
    ("Canada", "CAD"),
    ("United Kingdom", "GBP"),
    ("European Union", "EUR"),
    ("Japan", "JPY"),
    ("Australia", "AUD"),
    ("Switzerland", "CHF"),
];

/// Offline rates used whenever the live source fails.
const FALLBACK_RATES: &[(&str, &str, f64)] = &[
    ("INR", "USD", 0.012),
    ("INR", "CAD", 0.016),
    ("INR", "EUR", 0.011),
    ("INR", "GBP", 0.0095),
    ("USD", "INR", 83.2),
    ("USD", "CAD", 1.35),
    ("USD", "EUR", 0.92),
    ("USD", "GBP", 0.79),
    ("EUR", "INR", 90.5),
    ("EUR", "USD", 1.09),
    ("EUR", "GBP", 0.86),
];

pub fn find_currency(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn currency_for_country(country: &str) -> Option<&'static Currency> {
    COUNTRIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .and_then(|(_, code)| find_currency(code))
}

pub fn fallback_rate(from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    FALLBACK_RATES
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, rate)| *rate)
}

//
// ================= Amounts =================
//

/// Parse user input. `Ok(None)` means "nothing to convert yet" (empty or a lone dot).
///
/// Only digits with at most one decimal point are accepted.
pub fn parse_amount(input: &str) -> Result<Option<f64>> {
    let invalid = || ArcadeError::InvalidAmount(input.to_string());
    let mut dots = 0;
    for c in input.chars() {
        match c {
            '0'..='9' => {}
            '.' => dots += 1,
            _ => return Err(invalid()),
        }
    }
    if dots > 1 {
        return Err(invalid());
    }
    if input.is_empty() || input == "." {
        return Ok(None);
    }

    let value = input.parse::<f64>().map_err(|_| invalid())?;
    // Digit strings past f64 range parse to infinity
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(Some(value))
}

/// `round(amount * rate, 2)`
pub fn convert(amount: f64, rate: f64) -> f64 {
    (amount * rate * 100.0).round() / 100.0
}

/// Two-decimal rendering of a converted amount.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

//
// ================= Rate sources =================
//

#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// All rates quoted against `base`, keyed by currency code.
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>>;
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: Option<HashMap<String, f64>>,
}

/// `GET {base_url}/{BASE}` returning `{ "rates": { CODE: rate } }`
pub struct HttpRateSource {
    client: Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rates(&self, base: &str) -> Result<HashMap<String, f64>> {
        let url = format!("{}/{}", self.base_url, base);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArcadeError::RateSource(format!(
                "rate source returned {} for {}",
                status, base
            )));
        }

        let body: LatestRatesResponse = response.json().await?;
        body.rates
            .ok_or_else(|| ArcadeError::RateSource("response has no rates".to_string()))
    }
}

//
// ================= Converter =================
//

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateSourceKind {
    Live,
    Fallback,
    Identity,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateQuote {
    pub from: String,
    pub to: String,
    pub rate: f64,
    pub source: RateSourceKind,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Conversion {
    pub quote: RateQuote,
    pub amount: Option<f64>,
    /// Two-decimal string, absent when there was no amount to convert
    pub converted: Option<String>,
}

pub struct CurrencyConverter {
    source: Arc<dyn RateSource>,
}

impl CurrencyConverter {
    pub fn new(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }

    /// Rate for a pair, falling back silently when the live source fails.
    pub async fn quote(&self, from: &str, to: &str) -> Result<RateQuote> {
        let from = normalize_code(from)?;
        let to = normalize_code(to)?;

        if from == to {
            return Ok(RateQuote {
                from,
                to,
                rate: 1.0,
                source: RateSourceKind::Identity,
            });
        }

        let live = match self.source.fetch_rates(&from).await {
            Ok(rates) => rates.get(&to).copied(),
            Err(e) => {
                warn!(%from, %to, error = %e, "Rate fetch failed, using fallback table");
                None
            }
        };

        if let Some(rate) = live {
            debug!(%from, %to, rate, "Live rate");
            return Ok(RateQuote { from, to, rate, source: RateSourceKind::Live });
        }

        match fallback_rate(&from, &to) {
            Some(rate) => Ok(RateQuote { from, to, rate, source: RateSourceKind::Fallback }),
            None => Err(ArcadeError::RateUnavailable { from, to }),
        }
    }

    pub async fn convert(&self, from: &str, to: &str, amount: &str) -> Result<Conversion> {
        let amount = parse_amount(amount)?;
        let quote = self.quote(from, to).await?;
        let converted = amount.map(|a| format_amount(convert(a, quote.rate)));

        Ok(Conversion { quote, amount, converted })
    }
}

fn normalize_code(code: &str) -> Result<String> {
    find_currency(code)
        .map(|c| c.code.to_string())
        .ok_or_else(|| ArcadeError::UnsupportedCurrency(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    #[async_trait::async_trait]
    impl RateSource for FailingSource {
        async fn fetch_rates(&self, _base: &str) -> Result<HashMap<String, f64>> {
            Err(ArcadeError::RateSource("offline".to_string()))
        }
    }

    struct FixedSource(HashMap<String, f64>);

    #[async_trait::async_trait]
    impl RateSource for FixedSource {
        async fn fetch_rates(&self, _base: &str) -> Result<HashMap<String, f64>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1000").unwrap(), Some(1000.0));
        assert_eq!(parse_amount("12.5").unwrap(), Some(12.5));
        assert_eq!(parse_amount(".5").unwrap(), Some(0.5));
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount(".").unwrap(), None);
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("1.2.3").is_err());
        assert!(parse_amount("12abc").is_err());
        assert!(parse_amount(" 12 ").is_err());
        assert!(parse_amount(&"9".repeat(400)).is_err());
    }

    #[test]
    fn test_convert_rounds_to_cents() {
        assert_eq!(format_amount(convert(1000.0, 0.012)), "12.00");
        assert_eq!(format_amount(convert(100.0, 0.0095)), "0.95");
        assert_eq!(format_amount(convert(3.0, 83.2)), "249.60");
        assert_eq!(format_amount(convert(0.0, 1.35)), "0.00");
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(currency_for_country("canada").map(|c| c.code), Some("CAD"));
        assert!(currency_for_country("Atlantis").is_none());
    }

    #[tokio::test]
    async fn test_fallback_on_fetch_failure() {
        let converter = CurrencyConverter::new(Arc::new(FailingSource));
        let result = converter.convert("INR", "USD", "1000").await.unwrap();

        assert_eq!(result.quote.rate, 0.012);
        assert_eq!(result.quote.source, RateSourceKind::Fallback);
        assert_eq!(result.converted.as_deref(), Some("12.00"));
    }

    #[tokio::test]
    async fn test_fallback_when_pair_missing_from_live_rates() {
        let mut rates = HashMap::new();
        rates.insert("EUR".to_string(), 0.5);
        let converter = CurrencyConverter::new(Arc::new(FixedSource(rates)));

        let quote = converter.quote("usd", "GBP").await.unwrap();
        assert_eq!(quote.rate, 0.79);
        assert_eq!(quote.source, RateSourceKind::Fallback);
    }

    #[tokio::test]
    async fn test_live_rate_preferred() {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 0.0125);
        let converter = CurrencyConverter::new(Arc::new(FixedSource(rates)));

        let result = converter.convert("INR", "USD", "200").await.unwrap();
        assert_eq!(result.quote.source, RateSourceKind::Live);
        assert_eq!(result.converted.as_deref(), Some("2.50"));
    }

    #[tokio::test]
    async fn test_unavailable_and_invalid_inputs() {
        let converter = CurrencyConverter::new(Arc::new(FailingSource));

        assert!(matches!(
            converter.quote("JPY", "AUD").await,
            Err(ArcadeError::RateUnavailable { .. })
        ));
        assert!(matches!(
            converter.quote("XYZ", "USD").await,
            Err(ArcadeError::UnsupportedCurrency(_))
        ));
        assert!(matches!(
            converter.convert("INR", "USD", "1,000").await,
            Err(ArcadeError::InvalidAmount(_))
        ));

        let same = converter.convert("EUR", "EUR", "").await.unwrap();
        assert_eq!(same.quote.source, RateSourceKind::Identity);
        assert!(same.converted.is_none());
    }
}
