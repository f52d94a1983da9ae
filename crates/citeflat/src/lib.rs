#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]
#![doc = include_str!("../README.md")]

mod api;
pub mod batch;
mod error;
pub mod format;
pub mod record;
pub mod schema;

pub use api::{CitingIndex, Client, MetaIndex, MetaParams};
pub use error::{Error, ErrorKind};

use log::trace;
use serde_json::Value;

type DefaultClient = reqwest::blocking::Client;

/// Request the publications citing `doi` from a citation `index`.
///
/// The raw response is returned so that it can be logged as it was received, the citing DOIs are
/// extracted from it with [`CitingIndex::citing_dois`].
///
/// # Errors
///
/// An `Err` is returned when the request fails, the index answers with a non-success status or
/// the response is not JSON.
#[inline]
pub fn citations_by_doi(index: CitingIndex, doi: &str) -> Result<Value, Error> {
    trace!("Search citations of '{doi}' using {}", index.name());
    index.fetch::<DefaultClient>(doi)
}

/// Request the metadata of `doi` from a metadata `index`.
///
/// The raw response is returned so that it can be logged as it was received, it is converted
/// with [`MetaIndex::to_record`].
///
/// # Errors
///
/// An `Err` is returned when the request fails, the index answers with a non-success status or
/// the response is not JSON.
#[inline]
pub fn metadata_by_doi(index: MetaIndex, doi: &str, params: &MetaParams) -> Result<Value, Error> {
    trace!("Search metadata of '{doi}' using {}", index.name());
    index.fetch::<DefaultClient>(doi, params)
}
