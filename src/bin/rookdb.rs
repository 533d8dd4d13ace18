//! # rookdb CLI Entry Point
//!
//! ```bash
//! rookdb <db_file>
//! ```
//!
//! Opens (creating if absent) the database file and enters the REPL. A
//! missing filename or any engine failure exits non-zero.

use std::env;
use std::process;

use eyre::{Result, WrapErr};
use rookdb::cli::Repl;
use rookdb::Table;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Must supply a database filename");
        process::exit(1);
    };

    let table =
        Table::open(&path).wrap_err_with(|| format!("failed to open database '{}'", path))?;

    Repl::new(table).run()
}
