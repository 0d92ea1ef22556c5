use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::number::Number;
use crate::number::NumberError;

/// The usage text printed when the arguments cannot be interpreted.
pub const USAGE: &str = "usage:\n[<amount>] <BASE> to <DESTINATION>";

/// The token separating the source and destination currencies.
const SEPARATOR: &str = "to";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UsageError {
    #[error("no arguments given")]
    Missing,

    #[error("expected 3 arguments after the amount, got {0}")]
    Count(usize),

    #[error("expected separator \"to\", got \"{0}\"")]
    Separator(String),
}

/// An error interpreting the command line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("Amount {0} is out of range")]
    Amount(String),
}

/// A conversion request, as given on the command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub amount: Number,
    pub source: String,
    pub destination: String,
}

impl Request {
    /// Interprets the given command line arguments (excluding the program
    /// name) as a conversion request.
    ///
    /// The first argument is taken as the amount if it is a number; otherwise
    /// the amount is 1. The remaining arguments must be exactly
    /// `<SOURCE> to <DESTINATION>`. A number too large to carry is still
    /// taken as the amount, and rejected as such.
    pub fn parse<S: AsRef<str>>(arguments: &[S]) -> Result<Request, ArgumentError> {
        let (first, _) = arguments.split_first().ok_or(UsageError::Missing)?;

        let (amount, arguments) = match first.as_ref().parse::<Number>() {
            Ok(amount) => (amount, &arguments[1..]),
            Err(NumberError::Range(_)) =>
                return Err(ArgumentError::Amount(first.as_ref().to_string())),
            Err(NumberError::Illegal) => (Number::one(), arguments),
        };

        match arguments {
            [source, separator, destination] => {
                if separator.as_ref() != SEPARATOR {
                    return Err(UsageError::Separator(separator.as_ref().to_string()).into());
                }

                Ok(Request {
                    amount,
                    source: normalize(source.as_ref()),
                    destination: normalize(destination.as_ref()),
                })
            }

            _ =>
                Err(UsageError::Count(arguments.len()).into()),
        }
    }
}

/// Normalizes a currency code to its canonical (upper case) form.
fn normalize(code: &str) -> String {
    code.nfkc().collect::<String>().to_uppercase()
}



#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn request(amount: &str, source: &str, destination: &str) -> Request {
        Request {
            amount: amount.parse().unwrap(),
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[rstest]
    #[case(request("1.5", "USD", "GBP") , "1.5 USD to GBP")]
    #[case(request("1"  , "USD", "GBP") , "USD to GBP")]
    #[case(request("1"  , "USD", "GBP") , "usd to gbp")]
    #[case(request("20" , "EUR", "JPY") , "20 eUr to JpY")]
    #[case(request("-3" , "USD", "GBP") , "-3 USD to GBP")]
    #[case(request("1"  , "USD", "GBP") , "\u{FF55}\u{FF53}\u{FF44} to GBP")]
    #[case(request("1"  , "XXX", "USD") , "1 XXX to USD")]
    #[case(request("0.0000000000000000000000000001", "USD", "GBP") , "1e-28 USD to GBP")]
    #[case(request("0.0000000000000000000000000005", "USD", "GBP") , "5e-28 USD to GBP")]
    #[case(request("1"  , "INF", "USD") , "inf to USD")]
    #[case(request("1"  , "NAN", "USD") , "nan to USD")]
    #[trace]
    fn test_parse(#[case] expected: Request, #[case] command: &str) {
        let arguments = command.split(' ').collect::<Vec<&str>>();

        assert_eq!(Ok(expected), Request::parse(&arguments));
    }

    #[rstest]
    #[case(UsageError::Count(2)                  , "1.5 USD GBP")]
    #[case(UsageError::Count(4)                  , "USD to GBP extra")]
    #[case(UsageError::Count(4)                  , "1 2 USD to GBP")]
    #[case(UsageError::Count(0)                  , "1.5")]
    #[case(UsageError::Count(2)                  , "USD to")]
    #[case(UsageError::Separator("TO".into())    , "USD TO GBP")]
    #[case(UsageError::Separator("into".into())  , "5 USD into GBP")]
    #[trace]
    fn test_parse_error(#[case] expected: UsageError, #[case] command: &str) {
        let arguments = command.split(' ').collect::<Vec<&str>>();

        assert_eq!(Err(ArgumentError::Usage(expected)), Request::parse(&arguments));
    }

    /// Amounts too large to carry are consumed as amounts, not left to be
    /// read as currency codes.
    #[rstest]
    #[case("1e29"  , "1e29 USD to GBP")]
    #[case("-1e29" , "-1e29 USD to GBP")]
    #[case("1e29"  , "1e29 USD GBP")]
    #[trace]
    fn test_parse_amount_range(#[case] expected: &str, #[case] command: &str) {
        let arguments = command.split(' ').collect::<Vec<&str>>();

        assert_eq!(Err(ArgumentError::Amount(expected.to_string())), Request::parse(&arguments));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Err(ArgumentError::Usage(UsageError::Missing)), Request::parse::<String>(&[]));
    }

    /// A number in the source position is not an amount.
    #[test]
    fn test_parse_amount_position() {
        let arguments = ["USD", "5", "to", "GBP"];

        assert_eq!(Err(ArgumentError::Usage(UsageError::Count(4))), Request::parse(&arguments));
    }
}
