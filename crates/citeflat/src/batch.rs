//! Fetching, flattening and emitting the rows of a sequence of DOIs.

use log::{debug, trace, warn};

use crate::{
    record::{FlattenedRow, Record},
    schema::ResolvedSchema,
    Error,
};

/// What to do when fetching the record of a DOI fails.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Output a row of empty values so there is one row for every DOI.
    OutputAnyways,
    /// Report the failure and skip the DOI.
    #[default]
    ShowContent,
    /// Skip the DOI without reporting anything.
    Discard,
}

/// A source of records, one per DOI.
pub trait Fetcher {
    /// Fetch the record of `doi`.
    ///
    /// # Errors
    /// When no record can be produced for `doi`.
    fn fetch(&mut self, doi: &str) -> Result<Record, Error>;
}

impl<F> Fetcher for F
where
    F: FnMut(&str) -> Result<Record, Error>,
{
    fn fetch(&mut self, doi: &str) -> Result<Record, Error> {
        self(doi)
    }
}

/// A destination for flattened rows.
pub trait RowSink {
    /// Emit the row flattened from the record of `doi`.
    ///
    /// Implementations should not buffer rows, so that an interrupted batch loses at most the
    /// row being written.
    ///
    /// # Errors
    /// When the row cannot be written.
    fn emit(&mut self, doi: &str, row: &FlattenedRow) -> Result<(), Error>;
}

/// Counts describing a finished batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// DOIs taken from the input.
    pub processed: usize,
    /// Rows emitted to the sink.
    pub written: usize,
    /// DOIs whose record could not be fetched.
    pub failed: usize,
}

/// Fetch, flatten and emit every DOI of `dois` in order.
///
/// Fetch failures are handled by `policy` and never stop the batch.
///
/// # Errors
///
/// An [`Err`] is returned as soon as the sink fails to emit a row.
pub fn run<I, S, F, K>(
    dois: I,
    schema: &ResolvedSchema,
    policy: ErrorPolicy,
    fetcher: &mut F,
    sink: &mut K,
) -> Result<Summary, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fetcher + ?Sized,
    K: RowSink + ?Sized,
{
    let mut summary = Summary::default();

    for doi in dois {
        let doi = doi.as_ref();
        summary.processed += 1;
        trace!("processing '{doi}'");

        let record = match fetcher.fetch(doi) {
            Ok(record) => record,
            Err(err) => {
                summary.failed += 1;
                match policy {
                    ErrorPolicy::Discard => {
                        debug!("discarding '{doi}': {err}");
                        continue;
                    }
                    ErrorPolicy::ShowContent => {
                        warn!("skipping '{doi}': {err}");
                        continue;
                    }
                    ErrorPolicy::OutputAnyways => {
                        warn!("'{doi}' failed, writing an empty row: {err}");
                        Record::empty()
                    }
                }
            }
        };

        sink.emit(doi, &record.flatten(schema))?;
        summary.written += 1;
    }

    Ok(summary)
}
