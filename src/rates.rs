use log::debug;
use log::warn;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::number::Number;

/// The rate service this converter was built against.
pub const URL_RATES: &str = env!("URL_RATES");

/// Reported when the rate service does not answer with rates.
const MESSAGE_NOT_READY: &str = "Currency Rates Source Not Ready";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RateError {
    #[error("rate service unreachable: {0}")]
    Connection(String),

    #[error("{0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for RateError {
    fn from(error: reqwest::Error) -> RateError {
        if error.is_connect() || error.is_timeout() {
            RateError::Connection(error.to_string())
        }
        else {
            RateError::Unavailable(error.to_string())
        }
    }
}

/// Implements the ability to look up exchange rates.
pub trait RateSource {
    /// Returns the latest rates from the given base currency to every currency
    /// the source knows, organized by their codes.
    fn rates(&self, base: &str) -> Result<HashMap<String, Number>, RateError>;

    /// Returns the latest rate from one currency to another.
    fn rate(&self, base: &str, destination: &str) -> Result<Number, RateError> {
        let rates = self.rates(base)?;

        rates.get(destination).copied().ok_or_else(|| RateError::Unavailable(
            format!("Currency Rate {} => {} not available latest", base, destination)
        ))
    }

    /// Converts an amount from one currency to another.
    ///
    /// Converting a currency to itself requires no rate.
    fn convert(&self, base: &str, destination: &str, amount: Number)
    -> Result<Number, RateError> {
        if base == destination {
            return Ok(amount);
        }

        let rate = self.rate(base, destination)?;

        debug!("Rate {} => {}: {}", base, destination, rate);

        amount.checked_mul(rate).ok_or_else(||
            RateError::Unavailable(format!("Amount {} is out of range", amount))
        )
    }
}

/// The latest rates, as reported by the rate service.
#[derive(Debug, Deserialize)]
struct LatestRates {
    base: String,
    date: String,
    rates: HashMap<String, Number>,
}

/// A rate source backed by a Frankfurter-compatible HTTP service.
pub struct HttpRateSource {
    client: Client,
    url: String,
}

impl HttpRateSource {
    /// Creates a rate source for the service at the given URL.
    pub fn new(url: impl Into<String>) -> Result<HttpRateSource, anyhow::Error> {
        let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

        Ok(HttpRateSource::with_client(client, url))
    }

    /// Creates a rate source using the given client.
    pub fn with_client(client: Client, url: impl Into<String>) -> HttpRateSource {
        HttpRateSource {client, url: url.into()}
    }
}

impl RateSource for HttpRateSource {
    fn rates(&self, base: &str) -> Result<HashMap<String, Number>, RateError> {
        let url = Url::parse_with_params(&format!("{}/latest", self.url), &[("from", base)])
        .map_err(|error| RateError::Unavailable(format!("Illegal rate service URL: {}", error)))?;

        debug!("Requesting rates: {}", url);

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            warn!("Rate service responded with {}", status);
            return Err(RateError::Unavailable(MESSAGE_NOT_READY.to_string()));
        }

        let body = response.text()?;

        let latest = serde_json::from_str::<LatestRates>(&body).map_err(|error| {
            warn!("Malformed rates: {}", error);
            RateError::Unavailable(MESSAGE_NOT_READY.to_string())
        })?;

        debug!("Received {} rates for {} dated {}", latest.rates.len(), latest.base, latest.date);

        Ok(latest.rates)
    }
}
