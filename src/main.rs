mod arguments;
mod converter;
mod number;
mod rates;
mod symbols;

use env_logger::Env;
use log::debug;
use log::warn;
use std::env;
use std::io;
use std::io::Write;
use std::process::ExitCode;

use arguments::ArgumentError;
use arguments::Request;
use arguments::USAGE;
use converter::Converter;
use rates::HttpRateSource;
use rates::RateSource;
use rates::URL_RATES;
use symbols::SymbolLookup;
use symbols::SymbolTable;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let arguments = env::args().skip(1).collect::<Vec<String>>();

    let symbols = match SymbolTable::new() {
        Ok(symbols) => symbols,
        Err(error) => {
            println!("Error loading currency symbols: {}", error);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let rates = match HttpRateSource::new(URL_RATES) {
        Ok(rates) => rates,
        Err(error) => {
            println!("Error creating rate service client: {}", error);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let status = run(&arguments, &symbols, &rates, &mut io::stdout().lock())
    .unwrap_or(EXIT_FAILURE);

    ExitCode::from(status)
}

/// Runs one conversion, writing either its result or the reason it failed to
/// `output`. Returns the process exit status.
fn run(
    arguments: &[String],
    symbols: &dyn SymbolLookup,
    rates: &dyn RateSource,
    output: &mut impl Write,
) -> io::Result<u8> {
    let request = match Request::parse(arguments) {
        Ok(request) => request,
        Err(ArgumentError::Usage(error)) => {
            debug!("Rejected arguments {:?}: {}", arguments, error);
            writeln!(output, "{}", USAGE)?;
            return Ok(EXIT_FAILURE);
        }
        Err(error) => {
            writeln!(output, "{}", error)?;
            return Ok(EXIT_FAILURE);
        }
    };

    debug!("Parsed {:?}", request);

    match Converter::new(symbols, rates).convert(&request) {
        Ok(conversion) => {
            writeln!(output, "{}", conversion)?;
            Ok(EXIT_SUCCESS)
        }
        Err(error) => {
            warn!("Conversion from {} to {} failed: {:?}", request.source, request.destination, error);
            writeln!(output, "{}", error)?;
            Ok(EXIT_FAILURE)
        }
    }
}
