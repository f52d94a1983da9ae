#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![allow(clippy::as_conversions, clippy::mod_module_files)]

use std::{path::PathBuf, process};

mod commands;
mod config;
mod file;
mod input;

use commands::{Commands, Outcome};
use config::Config;

use clap::{ArgEnum, Args, CommandFactory, Parser};
use log::{error, info};

fn main() {
    if let Err(err) = try_main() {
        error!("{err:#}");
        process::exit(2);
    }
}

fn try_main() -> eyre::Result<()> {
    let Cli {
        command,
        global_opts,
    } = Cli::parse();

    setup_errlog(global_opts.verbosity as usize, global_opts.silent)?;

    // column options are checked before any request is made
    let config = Config::new(global_opts)?;

    match command.execute(&config)? {
        Outcome::Finished(summary) => {
            info!(
                "Finished with {} records ({} of {} DOIs failed)",
                summary.written, summary.failed, summary.processed
            );
            Ok(())
        }
        Outcome::NoInput(name) => {
            eprintln!("Not enough arguments!");
            let mut cli = Cli::command();
            if let Some(subcommand) = cli.find_subcommand_mut(name) {
                subcommand.print_help()?;
            }
            process::exit(2);
        }
    }
}

fn setup_errlog(verbosity: usize, silent: bool) -> eyre::Result<()> {
    // silent hides every message, including errors
    stderrlog::new()
        .module("citeflat")
        .quiet(silent)
        .verbosity(verbosity + 2)
        .init()?;
    Ok(())
}

#[derive(Parser)]
#[clap(name = "citeflat")]
#[clap(about = "Find citing publications and flatten their metadata into rows with a fixed number of columns")]
#[clap(version, author)]
#[clap(after_help = COLUMN_HELP)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    #[clap(flatten)]
    global_opts: GlobalOpts,
}

const COLUMN_HELP: &str = "\
COLUMN OPTIONS:
    -c authors:10,chemicals:1 will result in 10 author columns and 1 chemical column per DOI
    -x \"publisher,publication name\" will result in no publisher or publication name columns
    -x \"author keywords,publisher\" -c \"chemicals:1\" will result in no author keywords or
       publisher columns, and 1 chemicals column

    Only fields that hold a list can be given a count.";

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Silence every message, only rows are written
    #[clap(short, long, global = true)]
    silent: bool,

    /// How chatty the program is when performing commands
    ///
    /// The number of times this flag is used will increase how chatty
    /// the program is.
    #[clap(short, long, parse(from_occurrences), global = true)]
    verbosity: u8,

    /// The index the metadata of each publication is gathered from
    #[clap(short = 'I', long, arg_enum, default_value = "scopus", global = true)]
    meta_index: MetaIndexArg,

    /// Key for accessing a private or credentialed API
    #[clap(short, long, default_value = "", global = true)]
    key: String,

    /// The metadata view to request from the index
    #[clap(long, default_value = "META", global = true)]
    view: String,

    /// How requests that fail are handled
    #[clap(
        short = 'e',
        long,
        arg_enum,
        default_value = "show-content",
        global = true
    )]
    response_error_handling: ErrorHandlingArg,

    /// Number of columns for fields holding a list, e.g. `authors:10,chemicals:1`
    #[clap(short, long, default_value = "", global = true)]
    counts: String,

    /// Fields to leave out of the output, e.g. `publisher,publication name`
    #[clap(short = 'x', long, default_value = "", global = true)]
    exclude: String,

    /// The file rows are written to
    #[clap(short, long, parse(from_os_str), global = true)]
    output: Option<PathBuf>,

    /// The layout of the rows
    #[clap(short, long, arg_enum, default_value = "csv", global = true)]
    format: FormatArg,

    /// Number of header rows describing the columns, from 0 to 3
    ///
    /// 1 labels each column on one row, 2 puts the field above the subcolumn and 3 also moves
    /// the repetition number onto its own row. Larger values are treated as 3.
    #[clap(short = 'q', long, default_value = "2", global = true)]
    header_rows: u8,

    /// Append every raw metadata response to this file
    #[clap(short = 'L', long, parse(from_os_str), global = true)]
    meta_log: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ArgEnum)]
pub enum MetaIndexArg {
    Scopus,
}

impl From<MetaIndexArg> for citeflat::MetaIndex {
    fn from(arg: MetaIndexArg) -> Self {
        match arg {
            MetaIndexArg::Scopus => Self::Scopus,
        }
    }
}

#[derive(Copy, Clone, Debug, ArgEnum)]
pub enum CitingIndexArg {
    Opencitations,
}

impl From<CitingIndexArg> for citeflat::CitingIndex {
    fn from(arg: CitingIndexArg) -> Self {
        match arg {
            CitingIndexArg::Opencitations => Self::OpenCitations,
        }
    }
}

#[derive(Copy, Clone, Debug, ArgEnum)]
pub enum ErrorHandlingArg {
    /// Write a row of empty values
    OutputAnyways,
    /// Report the failure and skip the DOI
    ShowContent,
    /// Skip the DOI without a message
    Discard,
}

impl From<ErrorHandlingArg> for citeflat::batch::ErrorPolicy {
    fn from(arg: ErrorHandlingArg) -> Self {
        match arg {
            ErrorHandlingArg::OutputAnyways => Self::OutputAnyways,
            ErrorHandlingArg::ShowContent => Self::ShowContent,
            ErrorHandlingArg::Discard => Self::Discard,
        }
    }
}

#[derive(Copy, Clone, Debug, ArgEnum)]
pub enum FormatArg {
    Csv,
    Tsv,
    Jsonl,
}

impl From<FormatArg> for citeflat::format::RowFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Jsonl => Self::JsonLines,
        }
    }
}
