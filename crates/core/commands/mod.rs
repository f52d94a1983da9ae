use std::path::PathBuf;

use citeflat::{
    batch::{self, ErrorPolicy, Summary},
    format::RowWriter,
    record::Record,
    CitingIndex,
};

use clap::Subcommand;
use eyre::WrapErr;
use log::{debug, info, trace, warn};

use crate::{
    config::Config,
    file::{open_output, RawLog},
    input::piped_dois,
    CitingIndexArg,
};

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Find the publications citing a DOI and flatten their metadata
    ///
    /// Extra DOIs, given as arguments or piped through stdin, have their metadata flattened too
    /// even if they don't cite the first DOI.
    #[clap(arg_required_else_help = true)]
    Find {
        /// The DOI to find citing publications of
        doi: String,

        /// DOIs to flatten alongside the citing publications
        extra: Vec<String>,

        /// The index used for finding all the citing publications
        #[clap(short = 'i', long, arg_enum, default_value = "opencitations")]
        citing_index: CitingIndexArg,

        /// Append the raw citation index response to this file
        #[clap(short = 'l', long, parse(from_os_str))]
        citing_log: Option<PathBuf>,
    },

    /// Flatten the metadata of DOIs given as arguments or piped through stdin
    Get {
        /// The DOIs to flatten
        dois: Vec<String>,
    },
}

pub enum Outcome {
    Finished(Summary),
    /// No DOI was given, holds the name of the subcommand.
    NoInput(&'static str),
}

const FINDER_OUTPUT: &str = "data/finder";

impl Commands {
    pub fn execute(self, config: &Config) -> eyre::Result<Outcome> {
        match self {
            Commands::Find {
                doi,
                extra,
                citing_index,
                citing_log,
            } => {
                let index = CitingIndex::from(citing_index);
                let mut citing_log = RawLog::open(citing_log.as_deref());
                let citing = find_citing_dois(index, &doi, config.policy, &mut citing_log);
                let dois = collect_dois(citing, extra, piped_dois()?);

                let output = config.output.clone().unwrap_or_else(|| {
                    PathBuf::from(FINDER_OUTPUT).with_extension(config.format.ext())
                });

                info!(
                    "Scanning citing publications found on {} and publication data found on {}..",
                    index.name(),
                    config.meta_index.name()
                );
                flatten_dois(config, Some(output), &dois).map(Outcome::Finished)
            }
            Commands::Get { dois } => {
                let dois = collect_dois(Vec::new(), dois, piped_dois()?);
                if dois.is_empty() {
                    return Ok(Outcome::NoInput("get"));
                }

                flatten_dois(config, config.output.clone(), &dois).map(Outcome::Finished)
            }
        }
    }
}

/// The DOIs to flatten in the order they are processed: citing DOIs, then DOIs given as
/// arguments, then DOIs piped through stdin. Duplicates are kept.
fn collect_dois(citing: Vec<String>, args: Vec<String>, piped: Vec<String>) -> Vec<String> {
    let mut dois = citing;
    dois.extend(args);
    dois.extend(piped);
    dois
}

/// A failing citation index leaves only the extra DOIs to flatten.
fn find_citing_dois(
    index: CitingIndex,
    doi: &str,
    policy: ErrorPolicy,
    log: &mut RawLog,
) -> Vec<String> {
    let citing = citeflat::citations_by_doi(index, doi).and_then(|raw| {
        log.append(doi, &raw);
        index.citing_dois(&raw)
    });

    citing_or_empty(citing, doi, policy)
}

fn citing_or_empty(
    citing: Result<Vec<String>, citeflat::Error>,
    doi: &str,
    policy: ErrorPolicy,
) -> Vec<String> {
    match citing {
        Ok(dois) => {
            info!("{} publications cite '{doi}'", dois.len());
            dois
        }
        Err(err) => {
            if policy == ErrorPolicy::Discard {
                debug!("no citing publications of '{doi}': {err}");
            } else {
                warn!("no citing publications of '{doi}': {err}");
            }
            Vec::new()
        }
    }
}

fn flatten_dois(config: &Config, output: Option<PathBuf>, dois: &[String]) -> eyre::Result<Summary> {
    let mut writer = RowWriter::new(config.format, open_output(output.as_deref())?);
    writer
        .write_header(&config.schema, config.header_rows)
        .wrap_err("Cannot write the header rows")?;

    let mut meta_log = RawLog::open(config.meta_log.as_deref());
    let mut fetcher = |doi: &str| -> Result<Record, citeflat::Error> {
        let raw = citeflat::metadata_by_doi(config.meta_index, doi, &config.params)?;
        meta_log.append(doi, &raw);
        config.meta_index.to_record(&raw)
    };

    trace!("flattening {} DOIs into {} rows", dois.len(), config.format.name());
    batch::run(dois, &config.schema, config.policy, &mut fetcher, &mut writer)
        .wrap_err("Cannot write rows")
}
