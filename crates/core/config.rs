use std::path::PathBuf;

use citeflat::{
    batch::ErrorPolicy,
    format::RowFormat,
    schema::{parse_counts, parse_exclusions, resolve, ResolvedSchema},
    MetaIndex, MetaParams,
};
use eyre::WrapErr;
use log::debug;

use crate::GlobalOpts;

/// Everything a command needs to run, built once from the command line.
#[derive(Debug)]
pub struct Config {
    pub schema: ResolvedSchema,
    pub policy: ErrorPolicy,
    pub meta_index: MetaIndex,
    pub params: MetaParams,
    pub output: Option<PathBuf>,
    pub format: RowFormat,
    pub header_rows: usize,
    pub meta_log: Option<PathBuf>,
}

impl Config {
    pub fn new(opts: GlobalOpts) -> eyre::Result<Self> {
        let GlobalOpts {
            meta_index,
            key,
            view,
            response_error_handling,
            counts,
            exclude,
            output,
            format,
            header_rows,
            meta_log,
            ..
        } = opts;

        let meta_index = MetaIndex::from(meta_index);
        let schema = resolve_columns(meta_index, &counts, &exclude)
            .wrap_err("Invalid column options (run with -h or --help for more info)")?;
        debug!(
            "{} output columns from the {} blueprint",
            schema.len(),
            meta_index.name()
        );

        Ok(Self {
            schema,
            policy: response_error_handling.into(),
            meta_index,
            params: MetaParams { key, view },
            output,
            format: format.into(),
            header_rows: header_rows.into(),
            meta_log,
        })
    }
}

fn resolve_columns(
    index: MetaIndex,
    counts: &str,
    exclude: &str,
) -> Result<ResolvedSchema, citeflat::Error> {
    let counts = parse_counts(counts)?;
    let exclusions = parse_exclusions(exclude);
    resolve(&index.blueprint(), &counts, &exclusions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeflat::ErrorKind;

    #[test]
    fn scopus_columns_resolve_with_defaults() {
        let schema = resolve_columns(MetaIndex::Scopus, "", "").unwrap();
        // affiliation 3*4, aggregation type 1, author keywords 10, authors 6*5,
        // publication date 3, 4 more singles, chemicals 0, correspondence 2*5, funding 3*6,
        // 4 more singles
        assert_eq!(12 + 1 + 10 + 30 + 3 + 4 + 10 + 18 + 4, schema.len());
    }

    #[test]
    fn counting_a_single_column_fails() {
        let err = resolve_columns(MetaIndex::Scopus, "publisher:2", "").unwrap_err();
        assert_eq!(ErrorKind::NotCountable, err.kind());
    }

    #[test]
    fn excluding_an_unknown_column_fails() {
        let err = resolve_columns(MetaIndex::Scopus, "", "references").unwrap_err();
        assert_eq!(ErrorKind::UnknownColumn, err.kind());
    }
}
