//! Serialisation of flattened rows.
//!
//! Every output row starts with the DOI the row was flattened for, followed by the values of the
//! row in [`ResolvedSchema`] column order.
use std::io::Write;

use serde::Serialize;

use crate::{
    batch::RowSink,
    record::FlattenedRow,
    schema::{Column, ResolvedSchema},
    Error, ErrorKind,
};

/// The deepest header [`header_rows`] can produce.
pub const MAX_HEADER_ROWS: usize = 3;

/// The textual layout of output rows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RowFormat {
    /// Comma separated values.
    #[default]
    Csv,
    /// Tab separated values.
    Tsv,
    /// One JSON object per line, with `doi` and `values` keys.
    JsonLines,
}

impl RowFormat {
    /// The display name of the format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Tsv => "TSV",
            Self::JsonLines => "JSON lines",
        }
    }

    /// The file extension associated with this format.
    #[must_use]
    pub const fn ext(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::JsonLines => "jsonl",
        }
    }
}

/// The header rows describing the columns of `schema`, `depth` rows deep.
///
/// - `0`: no header.
/// - `1`: one label per column, e.g. `authors.surname.2`.
/// - `2`: the field, numbered when it repeats, above the subcolumn.
/// - `3`: the field, the subcolumn and the repetition number on separate rows.
///
/// Depths over [`MAX_HEADER_ROWS`] are treated as [`MAX_HEADER_ROWS`].
#[must_use]
pub fn header_rows(schema: &ResolvedSchema, depth: usize) -> Vec<Vec<String>> {
    let depth = depth.min(MAX_HEADER_ROWS);

    (0..depth)
        .map(|level| {
            let lead = if level == 0 { "doi" } else { "" };
            std::iter::once(lead.to_owned())
                .chain(schema.iter().map(|c| header_cell(c, depth, level)))
                .collect()
        })
        .collect()
}

fn header_cell(column: &Column, depth: usize, level: usize) -> String {
    let number = || {
        if column.repeated {
            (column.index + 1).to_string()
        } else {
            String::new()
        }
    };

    match (depth, level) {
        (1, _) => column.label(),
        (2, 0) if column.repeated => format!("{} {}", column.field, number()),
        (_, 0) => column.field.clone(),
        (_, 1) => column.subcolumn.clone(),
        _ => number(),
    }
}

enum Inner<W: Write> {
    Delimited(csv::Writer<W>),
    JsonLines(W),
}

#[derive(Serialize)]
struct JsonRow<'a> {
    doi: &'a str,
    values: &'a FlattenedRow,
}

/// Writes rows in a [`RowFormat`], flushing after every row.
pub struct RowWriter<W: Write> {
    inner: Inner<W>,
}

impl<W: Write> RowWriter<W> {
    /// Create a writer of `format` rows over `writer`.
    pub fn new(format: RowFormat, writer: W) -> Self {
        let inner = match format {
            RowFormat::Csv => Inner::Delimited(csv::Writer::from_writer(writer)),
            RowFormat::Tsv => Inner::Delimited(
                csv::WriterBuilder::new()
                    .delimiter(b'\t')
                    .from_writer(writer),
            ),
            RowFormat::JsonLines => Inner::JsonLines(writer),
        };
        Self { inner }
    }

    /// Write the header rows of `schema`, see [`header_rows`].
    ///
    /// Nothing is written for formats without a header.
    ///
    /// # Errors
    /// When the rows cannot be written.
    pub fn write_header(&mut self, schema: &ResolvedSchema, depth: usize) -> Result<(), Error> {
        if let Inner::Delimited(writer) = &mut self.inner {
            for row in header_rows(schema, depth) {
                writer.write_record(&row).map_err(io_error)?;
            }
            writer.flush().map_err(io_error)?;
        }
        Ok(())
    }
}

impl<W: Write> RowSink for RowWriter<W> {
    fn emit(&mut self, doi: &str, row: &FlattenedRow) -> Result<(), Error> {
        match &mut self.inner {
            Inner::Delimited(writer) => {
                writer
                    .write_record(std::iter::once(doi).chain(row.iter().map(String::as_str)))
                    .map_err(io_error)?;
                writer.flush().map_err(io_error)
            }
            Inner::JsonLines(writer) => {
                serde_json::to_writer(&mut *writer, &JsonRow { doi, values: row })
                    .map_err(io_error)?;
                writer.write_all(b"\n").map_err(io_error)?;
                writer.flush().map_err(io_error)
            }
        }
    }
}

fn io_error<E>(e: E) -> Error
where
    E: Into<crate::error::DynError>,
{
    Error::wrap(ErrorKind::IO, e)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        record::Record,
        schema::{resolve, Blueprint, ColumnCounts, ColumnExclusions, FieldSpec, Repeat},
    };

    fn schema() -> ResolvedSchema {
        let blueprint = Blueprint::new(vec![
            FieldSpec::single("publisher"),
            FieldSpec::new("authors", Repeat::Repeated(2), ["auid", "surname"]),
        ]);
        resolve(&blueprint, &ColumnCounts::new(), &ColumnExclusions::new()).unwrap()
    }

    fn row() -> FlattenedRow {
        Record::try_from(json!({
            "publisher": "Elsevier, B.V.",
            "authors": [{"auid": "1", "surname": "Smith"}],
        }))
        .unwrap()
        .flatten(&schema())
    }

    fn written(format: RowFormat, depth: usize) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = RowWriter::new(format, &mut buf);
            writer.write_header(&schema(), depth).unwrap();
            writer.emit("10.1/a", &row()).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn csv_rows_are_quoted_when_needed() {
        assert_eq!(
            "doi,publisher,authors.auid.1,authors.surname.1,authors.auid.2,authors.surname.2\n\
             10.1/a,\"Elsevier, B.V.\",1,Smith,,\n",
            written(RowFormat::Csv, 1)
        );
    }

    #[test]
    fn two_header_rows_number_repeated_fields() {
        let rows = header_rows(&schema(), 2);
        assert_eq!(
            vec![
                vec!["doi", "publisher", "authors 1", "authors 1", "authors 2", "authors 2"],
                vec!["", "", "auid", "surname", "auid", "surname"],
            ],
            rows
        );
    }

    #[test]
    fn three_header_rows_split_the_repetition() {
        let rows = header_rows(&schema(), 5);
        assert_eq!(3, rows.len());
        assert_eq!(vec!["", "", "1", "1", "2", "2"], rows[2]);
        assert_eq!(vec!["doi", "publisher", "authors", "authors", "authors", "authors"], rows[0]);
    }

    #[test]
    fn tsv_without_header() {
        assert_eq!(
            "10.1/a\tElsevier, B.V.\t1\tSmith\t\t\n",
            written(RowFormat::Tsv, 0)
        );
    }

    #[test]
    fn json_lines_never_have_a_header() {
        assert_eq!(
            "{\"doi\":\"10.1/a\",\"values\":[\"Elsevier, B.V.\",\"1\",\"Smith\",\"\",\"\"]}\n",
            written(RowFormat::JsonLines, 3)
        );
    }
}
