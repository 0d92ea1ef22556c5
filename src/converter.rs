use log::debug;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use thiserror::Error;

use crate::arguments::Request;
use crate::number::Number;
use crate::number::DIGITS_RESULT;
use crate::rates::RateError;
use crate::rates::RateSource;
use crate::symbols::SymbolLookup;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Currency {0} is invalid")]
    InvalidCurrency(String),

    #[error("Connection error")]
    Connectivity,

    #[error("{0}")]
    Service(String),
}

impl From<RateError> for ConversionError {
    fn from(error: RateError) -> ConversionError {
        match error {
            RateError::Connection(message) => {
                debug!("{}", message);
                ConversionError::Connectivity
            }
            RateError::Unavailable(message) =>
                ConversionError::Service(message),
        }
    }
}

/// A completed conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Conversion {
    pub amount: Number,
    pub symbol_source: String,
    pub result: Number,
    pub symbol_destination: String,
}

/// Implements formatting of conversions as the converter's output line.
impl Display for Conversion {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "{}{} equals to {}{}",
            self.amount,
            self.symbol_source,
            self.result,
            self.symbol_destination
        )
    }
}

/// A currency converter.
///
/// This structure validates requests against a symbol table and converts them
/// with a rate source.
pub struct Converter<'a> {
    symbols: &'a dyn SymbolLookup,
    rates: &'a dyn RateSource,
}

impl<'a> Converter<'a> {
    pub fn new(symbols: &'a dyn SymbolLookup, rates: &'a dyn RateSource) -> Converter<'a> {
        Converter {symbols, rates}
    }

    /// Looks up the symbol of a currency, failing if the currency is unknown.
    fn symbol(&self, code: &str) -> Result<&'a str, ConversionError> {
        self.symbols.symbol(code).ok_or_else(||
            ConversionError::InvalidCurrency(code.to_string())
        )
    }

    /// Performs a currency conversion.
    ///
    /// The source currency is validated before the destination currency, and
    /// both are validated before any rate is requested.
    pub fn convert(&self, request: &Request) -> Result<Conversion, ConversionError> {
        let symbol_source = self.symbol(&request.source)?;
        let symbol_destination = self.symbol(&request.destination)?;

        debug!(
            "Converting {} from {} to {}",
            request.amount,
            self.symbols.name(&request.source).unwrap_or(request.source.as_str()),
            self.symbols.name(&request.destination).unwrap_or(request.destination.as_str())
        );

        let result = self.rates.convert(
            &request.source,
            &request.destination,
            request.amount
        )?;

        Ok(Conversion {
            amount: request.amount,
            symbol_source: symbol_source.to_string(),
            result: result.round(DIGITS_RESULT),
            symbol_destination: symbol_destination.to_string(),
        })
    }
}
