use std::io::{self, BufRead, IsTerminal};

use eyre::Context;
use log::debug;

/// DOIs piped through stdin, one per line.
///
/// Nothing is read when stdin is an interactive terminal.
pub fn piped_dois() -> eyre::Result<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }

    let dois = read_dois(stdin.lock())?;
    debug!("read {} DOIs from stdin", dois.len());
    Ok(dois)
}

fn read_dois<R: BufRead>(reader: R) -> eyre::Result<Vec<String>> {
    let mut dois = Vec::new();
    for line in reader.lines() {
        let line = line.wrap_err("Cannot read DOIs from stdin")?;
        let doi = line.trim();
        if !doi.is_empty() {
            dois.push(doi.to_owned());
        }
    }
    Ok(dois)
}
