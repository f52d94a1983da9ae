use log::trace;
use serde::de::DeserializeOwned;

pub(crate) mod opencitations;
pub(crate) mod scopus;

use crate::{record::Record, schema::Blueprint};

/// A blocking HTTP client able to fetch JSON documents.
pub trait Client
where
    Self: Default,
{
    /// Send a `GET` request to `url` with the `query` parameters and deserialize the response
    /// body.
    ///
    /// # Errors
    ///
    /// An [`Err`] with [`ErrorKind::IO`] is returned when the request cannot be sent.
    /// An [`Err`] with [`ErrorKind::Status`] is returned for any non-success status code.
    /// An [`Err`] with [`ErrorKind::Deserialize`] is returned when the body is not valid JSON for
    /// `T`.
    fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, Error>
    where
        T: DeserializeOwned;
}

impl Client for reqwest::blocking::Client {
    fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let resp = self
            .get(url)
            .query(query)
            .send()
            .map_err(|e| Error::wrap(ErrorKind::IO, e))?;

        let status = resp.status();
        trace!("{url} responded with {status}");
        if !status.is_success() {
            return Err(Error::new(
                ErrorKind::Status(status.as_u16()),
                format!("GET {url}"),
            ));
        }

        resp.json().map_err(|e| Error::wrap(ErrorKind::Deserialize, e))
    }
}

/// Indexes that can list the publications citing a DOI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CitingIndex {
    /// The OpenCitations Index of Crossref open DOI-to-DOI citations.
    OpenCitations,
}

impl CitingIndex {
    /// The display name of the index.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenCitations => "opencitations",
        }
    }

    /// Request the raw list of citations of `doi`.
    ///
    /// # Errors
    ///
    /// See [`Client::get_json`].
    pub fn fetch<C: Client>(self, doi: &str) -> Result<serde_json::Value, Error> {
        match self {
            Self::OpenCitations => opencitations::get_citations::<C>(doi),
        }
    }

    /// Extract the citing DOIs from a response returned by [`CitingIndex::fetch`].
    ///
    /// # Errors
    ///
    /// An [`Err`] with [`ErrorKind::Deserialize`] is returned when the response does not have the
    /// shape this index answers with.
    pub fn citing_dois(self, response: &serde_json::Value) -> Result<Vec<String>, Error> {
        match self {
            Self::OpenCitations => opencitations::citing_dois(response),
        }
    }
}

/// Indexes that can provide the metadata of a DOI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetaIndex {
    /// The Scopus abstract retrieval API.
    Scopus,
}

/// Request options forwarded as they are to a [`MetaIndex`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaParams {
    /// Key for accessing a credentialed API.
    pub key: String,
    /// Name of the view, the set of fields, to request.
    pub view: String,
}

impl MetaIndex {
    /// The display name of the index.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scopus => "scopus",
        }
    }

    /// The fields records from this index are flattened with.
    #[must_use]
    pub fn blueprint(self) -> Blueprint {
        match self {
            Self::Scopus => Blueprint::scopus(),
        }
    }

    /// Request the raw metadata of `doi`.
    ///
    /// # Errors
    ///
    /// See [`Client::get_json`].
    pub fn fetch<C: Client>(
        self,
        doi: &str,
        params: &MetaParams,
    ) -> Result<serde_json::Value, Error> {
        match self {
            Self::Scopus => scopus::get_abstract::<C>(doi, params),
        }
    }

    /// Convert a response returned by [`MetaIndex::fetch`] into a [`Record`] keyed by the field
    /// names of [`MetaIndex::blueprint`].
    ///
    /// # Errors
    ///
    /// An [`Err`] with [`ErrorKind::InvalidRecord`] is returned when the response is not a
    /// metadata document of this index.
    pub fn to_record(self, response: &serde_json::Value) -> Result<Record, Error> {
        match self {
            Self::Scopus => scopus::to_record(response),
        }
    }
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, MockClient, NetworkErrorProducer, NotFoundProducer, Producer,
    URL_SINK,
};

use crate::{Error, ErrorKind};
