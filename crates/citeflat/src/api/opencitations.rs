use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, ErrorKind};

use super::Client;

const COCI_URL: &str = "https://opencitations.net/index/coci/api/v1/citations/";

#[inline]
pub(crate) fn get_citations<C: Client>(doi: &str) -> Result<Value, Error> {
    info!("Searching for publications citing '{doi}' using OpenCitations");
    let mut url = COCI_URL.to_owned();
    url.push_str(doi);

    let client = C::default();
    client.get_json(&url, &[])
}

#[derive(Deserialize)]
struct Citation {
    citing: String,
}

impl Citation {
    /// Newer index versions list every identifier of the citing work, e.g.
    /// `omid:br/0612 doi:10.1/abc`, so the `doi:` identifier is picked out when present.
    fn into_doi(self) -> String {
        self.citing
            .split_whitespace()
            .find_map(|id| id.strip_prefix("doi:"))
            .map_or_else(|| self.citing.trim().to_owned(), ToOwned::to_owned)
    }
}

pub(crate) fn citing_dois(response: &Value) -> Result<Vec<String>, Error> {
    let citations = Vec::<Citation>::deserialize(response)
        .map_err(|e| Error::wrap(ErrorKind::Deserialize, e))?;

    debug!("OpenCitations listed {} citations", citations.len());
    Ok(citations
        .into_iter()
        .map(Citation::into_doi)
        .filter(|doi| !doi.is_empty())
        .collect())
}
