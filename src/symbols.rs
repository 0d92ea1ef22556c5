use anyhow::Error;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;
#[cfg(any(test, not(mainbuild)))] use std::str::FromStr;

/// A currency known to the symbol table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Currency {
    /// The display glyph of this currency, e.g. `$`.
    pub symbol: String,

    /// The display name of this currency, e.g. `United States dollar`.
    pub name: String,
}

/// A table of currency symbols.
///
/// This structure maps currency codes to their display symbols and names. The
/// table is parsed from the database files by the build script and embedded in
/// the binary in serialized form.
#[derive(Debug, Deserialize, Serialize)]
pub struct SymbolTable {
    /// The currencies in this table, organized by their codes.
    currencies: HashMap<String, Currency>,
}

/// Implements the ability to look up currency symbols.
pub trait SymbolLookup {
    /// Returns the display symbol of the currency with the given code.
    fn symbol(&self, code: &str) -> Option<&str>;

    /// Returns the display name of the currency with the given code.
    fn name(&self, code: &str) -> Option<&str>;
}

impl SymbolTable {
    /// Loads the symbol table embedded in this binary.
    #[cfg(mainbuild)]
    pub fn new() -> Result<SymbolTable, Error> {
        static DATA_SYMBOLS: &[u8] = include_bytes!(env!("PATH_DATA_SYMBOLS"));

        let table = bincode::deserialize::<SymbolTable>(DATA_SYMBOLS)?;

        log::debug!("Loaded {} currencies", table.len());

        Ok(table)
    }

    /// Returns the number of currencies in this table.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }
}

impl SymbolLookup for SymbolTable {
    fn symbol(&self, code: &str) -> Option<&str> {
        self.currencies.get(code).map(|currency| currency.symbol.as_str())
    }

    fn name(&self, code: &str) -> Option<&str> {
        self.currencies.get(code).map(|currency| currency.name.as_str())
    }
}

/// Parsing of database records.
///
/// This code is not compiled into the main binary; it is only used by the
/// build script (and by tests).
#[cfg(any(test, not(mainbuild)))]
impl SymbolTable {
    /// Builds a symbol table from database lines, each paired with its
    /// location. Errors are reported as `<location>: <message>`.
    pub fn from_lines<L, S>(lines: impl IntoIterator<Item = (L, S)>)
    -> Result<SymbolTable, Error>
    where
        L: std::fmt::Display,
        S: AsRef<str>,
    {
        use anyhow::anyhow;
        use anyhow::bail;
        use anyhow::ensure;
        use lazy_static::lazy_static;
        use regex::Regex;

        const DELIMITER_COMMENT: char = '#';
        const DELIMITER_RECORD: char = '|';

        lazy_static! {
            static ref REGEX_CODE: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
        }

        let mut currencies = HashMap::new();

        // Processes one line of the database.
        let mut process = |line: &str| -> Result<(), Error> {
            let mut line = line;

            // Strip comments.
            if let Some((record, _)) = line.split_once(DELIMITER_COMMENT) {
                line = record;
            }

            // Strip whitespace.
            line = line.trim();

            // Skip empty lines.
            if line.is_empty() {
                return Ok(());
            }

            let mut record = line.split(DELIMITER_RECORD).map(str::trim);

            // `split` always yields at least one item.
            let type_record = record.next().unwrap_or_default();
            let record = record.collect::<Vec<&str>>();

            match type_record {
                // Currencies (C-records).
                "C" => {
                    let [code, symbol, name]: [&str; 3] = record.try_into()
                    .map_err(|_| anyhow!("Illegal argument count"))?;

                    ensure!(REGEX_CODE.is_match(code), "Illegal currency code");
                    ensure!(!symbol.is_empty(), "Empty currency symbol");
                    ensure!(!name.is_empty(), "Empty currency name");

                    let currency = Currency {
                        symbol: symbol.to_string(),
                        name: name.to_string(),
                    };

                    if currencies.insert(code.to_string(), currency).is_some() {
                        bail!("Duplicate currency");
                    }
                }

                _ =>
                    bail!("Unknown record type"),
            }

            Ok(())
        };

        for (location, line) in lines {
            process(line.as_ref()).map_err(|error| anyhow!("{}: {}", location, error))?;
        }

        Ok(SymbolTable {currencies})
    }
}

/// Implements parsing of database text into symbol tables.
///
/// Each line of the input holds at most one record. Errors are located by line
/// number, counting from 1.
#[cfg(any(test, not(mainbuild)))]
impl FromStr for SymbolTable {
    type Err = Error;

    fn from_str(input: &str) -> Result<SymbolTable, Error> {
        SymbolTable::from_lines((1..).zip(input.lines()))
    }
}
