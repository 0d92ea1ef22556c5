use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::Deserialize;
use static_assertions::const_assert;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// The number of fractional digits a conversion result is rounded to.
pub const DIGITS_RESULT: u32 = 3;

/// The largest scale a `Decimal` can carry.
const SCALE_MAX: u32 = 28;

const_assert!(DIGITS_RESULT <= SCALE_MAX);

/// Represents an amount of money.
///
/// This structure represents a "number" for the purposes of the converter: a
/// decimal value with up to 28 fractional digits. Amounts entered on the
/// command line and rates received from the rate service are both numbers, so
/// no binary floating point is involved until the result is printed.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Number {
    value: Decimal,
}

impl Number {
    /// Returns the number 1.
    pub fn one() -> Number {
        Number {value: Decimal::ONE}
    }

    /// Returns this number rounded to some number of fractional digits.
    ///
    /// Midpoints round to the nearest even digit.
    pub fn round(self, digits: u32) -> Number {
        Number {
            value: self.value.round_dp_with_strategy(
                digits,
                RoundingStrategy::MidpointNearestEven
            ),
        }
    }

    /// Returns the product of this number and another, or `None` if the
    /// product is out of range.
    pub fn checked_mul(self, multiplicand: Number) -> Option<Number> {
        self.value.checked_mul(multiplicand.value).map(|value| Number {value})
    }
}

/// An error parsing a number string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumberError {
    #[error("Illegal number string")]
    Illegal,

    #[error("Number {0} is out of range")]
    Range(String),
}

/// Implements parsing of strings into numbers.
///
/// Values too small to carry round towards zero; values too large to carry
/// fail with `NumberError::Range`.
impl FromStr for Number {
    type Err = NumberError;

    fn from_str(string: &str) -> Result<Number, NumberError> {
        lazy_static! {
            static ref REGEX_DECIMAL: Regex = Regex::new(
                r"^(?P<sign>[+\-]?)(?P<integer>[0-9]*)(?:\.(?P<fraction>[0-9]*))?(?:[Ee](?P<exponent>[+\-]?[0-9]+))?$"
            ).unwrap();
        }

        // Full-width and other compatibility digits count as digits.
        let mut string = string.nfkc().collect::<String>();

        // Whitespace shall have no effect on the interpretation of number
        // strings.
        string.retain(|character| !character.is_whitespace());

        let string = string.replace('\u{2212}', "-"); // `−`, minus sign.

        let captures = REGEX_DECIMAL.captures(&string).ok_or(NumberError::Illegal)?;

        let integer = &captures["integer"];
        let fraction = captures.name("fraction").map_or("", |capture| capture.as_str());

        // Lone signs and points are not numbers.
        if integer.is_empty() && fraction.is_empty() {
            return Err(NumberError::Illegal);
        }

        // Exponents too long for an `i64` saturate; the scaling below stops
        // long before either bound is reached.
        let mut exponent = match captures.name("exponent") {
            Some(capture) => capture.as_str().parse::<i64>().unwrap_or(
                if capture.as_str().starts_with('-') {i64::MIN} else {i64::MAX}
            ),
            None => 0,
        };

        let mut mantissa = String::with_capacity(string.len() + 1);
        if &captures["sign"] == "-" {
            mantissa.push('-');
        }
        mantissa.push_str(if integer.is_empty() {"0"} else {integer});
        if !fraction.is_empty() {
            mantissa.push('.');
            mantissa.push_str(fraction);
        }

        let range = || NumberError::Range(string.clone());

        let mut value = Decimal::from_str(&mantissa).map_err(|_| range())?;

        // Apply the exponent one decimal place at a time. Division rounds once
        // the scale is exhausted, so tiny values end at zero.
        while exponent != 0 && !value.is_zero() {
            if exponent > 0 {
                value = value.checked_mul(Decimal::TEN).ok_or_else(range)?;
                exponent -= 1;
            }
            else {
                value = value.checked_div(Decimal::TEN).unwrap_or(Decimal::ZERO);
                exponent += 1;
            }
        }

        Ok(Number {value})
    }
}

/// Implements formatting of numbers in their shortest decimal form.
///
/// Integral numbers keep one fractional digit, so that `1` prints as `1.0`.
impl Display for Number {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let value = self.value.normalize();

        if value.scale() == 0 {
            write!(formatter, "{}.0", value)
        }
        else {
            write!(formatter, "{}", value)
        }
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    /// Produces a number from its canonical decimal form.
    fn n(string: &str) -> Number {
        Number {value: Decimal::from_str_exact(string).unwrap()}
    }

    /// Tests parsing number strings.
    #[rstest]
    #[case(Some(n("0"))       , "0")]
    #[case(Some(n("1"))       , "1")]
    #[case(Some(n("-1"))      , "-1")]
    #[case(Some(n("1"))       , "+1")]
    #[case(Some(n("1.5"))     , "1.5")]
    #[case(Some(n("1.5"))     , "1.50")]
    #[case(Some(n("0.5"))     , ".5")]
    #[case(Some(n("2"))       , "2.")]
    #[case(Some(n("-2.25"))   , "\u{2212}2.25")]
    #[case(Some(n("1000"))    , "1e3")]
    #[case(Some(n("1500"))    , "1.5E3")]
    #[case(Some(n("0.025"))   , "2.5e-2")]
    #[case(Some(n("12"))      , "\u{FF11}\u{FF12}")]
    #[case(Some(n("1000000")) , "1 000 000")]
    #[case(None               , "")]
    #[case(None               , "-")]
    #[case(None               , ".")]
    #[case(None               , "e3")]
    #[case(None               , "USD")]
    #[case(None               , "to")]
    #[case(None               , "1,5")]
    #[case(None               , "1.5.5")]
    #[case(None               , "inf")]
    #[case(None               , "nan")]
    #[case(Some(n("0.0000000000000000000000000001")) , "1e-28")]
    #[case(Some(n("0.0000000000000000000000000005")) , "5e-28")]
    #[case(Some(n("0.0000000000000000000000000001")) , "12e-29")]
    #[case(Some(n("0.0000000000000000000000000001")) , "0.0000000000000000000000000001")]
    #[case(Some(n("0"))       , "1e-30")]
    #[case(Some(n("0"))       , "1e-99999999999999999999")]
    #[case(Some(n("0"))       , "0e99999999999999999999")]
    #[case(Some(n("70000000000000000000000000000")) , "7e28")]
    #[trace]
    fn test_parse(#[case] expected: Option<Number>, #[case] string: &str) {
        match (expected, string.parse::<Number>()) {
            (None, Err(_)) => {
                // Pass.
            },
            (None, Ok(actual)) => {
                panic!("Expected failed parse\nActual: {}", actual);
            },
            (Some(expected), Err(error)) => {
                panic!("Expected: {}\nParse failed: {:?}", expected, error);
            },
            (Some(expected), Ok(actual)) => {
                assert_eq!(expected.value.normalize(), actual.value.normalize());
            },
        }
    }

    /// Tests that well-formed numbers too large to carry are told apart from
    /// strings that are not numbers at all.
    #[rstest]
    #[case(NumberError::Range("1e29".to_string())     , "1e29")]
    #[case(NumberError::Range("-1e29".to_string())    , "-1e29")]
    #[case(NumberError::Range("1e400".to_string())    , "1e400")]
    #[case(NumberError::Range("99999999999999999999999999999999".to_string()) , "99999999999999999999999999999999")]
    #[case(NumberError::Illegal                       , "1e")]
    #[case(NumberError::Illegal                       , "USD")]
    #[trace]
    fn test_parse_error(#[case] expected: NumberError, #[case] string: &str) {
        assert_eq!(Err(expected), string.parse::<Number>());
    }

    #[rstest]
    #[case("1.0"    , n("1"))]
    #[case("1.0"    , n("1.000"))]
    #[case("1.5"    , n("1.50"))]
    #[case("0.79"   , n("0.790"))]
    #[case("-2.25"  , n("-2.25"))]
    #[case("1000.0" , n("1000"))]
    #[case("0.001"  , n("0.001"))]
    #[trace]
    fn test_format(#[case] expected: &str, #[case] number: Number) {
        assert_eq!(expected, format!("{}", number));
    }

    #[rstest]
    #[case(n("1.234")  , n("1.23449"))]
    #[case(n("1.235")  , n("1.23451"))]
    #[case(n("1.234")  , n("1.2345"))]
    #[case(n("1.236")  , n("1.2355"))]
    #[case(n("0.79")   , n("0.79"))]
    #[case(n("-1.234") , n("-1.2341"))]
    #[trace]
    fn test_round(#[case] expected: Number, #[case] number: Number) {
        assert_eq!(expected, number.round(DIGITS_RESULT));
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(Some(n("1.185")), n("1.5").checked_mul(n("0.79")));
        assert_eq!(None, Number {value: Decimal::MAX}.checked_mul(n("2")));
    }

    #[test]
    fn test_deserialize() {
        let number = serde_json::from_str::<Number>("0.79").unwrap();

        assert_eq!(n("0.79"), number);
    }
}
