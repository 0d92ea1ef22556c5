mod symbols;

use itertools::Itertools;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;

use symbols::SymbolTable;

const PATH_DATABASE: &str = "src/database";
const FILENAME_DATA_SYMBOLS: &str = "symbols.obj";

/// The rate service used unless overridden at build time.
const URL_RATES_DEFAULT: &str = "https://api.frankfurter.app";

/// Performs tasks necessary for building the converter.
fn main() {
    let mut path_output = PathBuf::from(env::var("OUT_DIR").unwrap());
    path_output.push(FILENAME_DATA_SYMBOLS);

    // Track changes in the database directory.
    println!("cargo:rerun-if-changed={}", PATH_DATABASE);
    println!("cargo:rerun-if-env-changed=CONVERTER_URL_RATES");

    // Prevent compilation of parsing code in the final binary.
    println!("cargo:rustc-check-cfg=cfg(mainbuild)");
    println!("cargo:rustc-cfg=mainbuild");

    // Specify location of the symbol data.
    println!("cargo:rustc-env=PATH_DATA_SYMBOLS={}", path_output.display());

    // Specify the rate service.
    let url_rates = env::var("CONVERTER_URL_RATES")
    .unwrap_or_else(|_| URL_RATES_DEFAULT.to_string());
    println!("cargo:rustc-env=URL_RATES={}", url_rates.trim_end_matches('/'));

    let mut lines = Vec::with_capacity(200);

    // Find and open the database files. These are the files in the database
    // directory that have the .dat extension.
    let paths = fs::read_dir(PATH_DATABASE).unwrap()
    .map(|entry| entry.unwrap().path())
    .filter(|path| path.is_file() && path.extension() == Some(OsStr::new("dat")))
    .sorted();

    // Each line is located by its file and line number.
    for path in paths {
        let file = File::open(&path).unwrap();

        for (number, line) in (1..).zip(BufReader::new(file).lines().map(Result::unwrap)) {
            lines.push((format!("{}:{}", path.display(), number), line));
        }
    }

    let table = SymbolTable::from_lines(lines).unwrap_or_else(|error| {
        eprintln!();
        eprintln!("Error parsing database files:");
        eprintln!("{}", error);
        eprintln!();

        panic!("Error parsing database files");
    });

    let data_symbols = bincode::serialize(&table).unwrap();

    let mut file_output = File::create(&path_output).unwrap();

    file_output.write_all(&data_symbols).unwrap();
}
