use log::{info, trace};
use serde_json::{Map, Value};

use crate::{
    record::{stringify, Record},
    Error, ErrorKind,
};

use super::{Client, MetaParams};

const SCOPUS_ABSTRACT_URL: &str = "https://api.elsevier.com/content/abstract/doi/";

const RESPONSE_ROOT: &str = "/abstracts-retrieval-response";

pub(crate) const DEFAULT_VIEW: &str = "META";

pub(crate) fn get_abstract<C: Client>(doi: &str, params: &MetaParams) -> Result<Value, Error> {
    info!("Searching for the abstract of '{doi}' using Scopus");
    let mut url = SCOPUS_ABSTRACT_URL.to_owned();
    url.push_str(doi);

    let view = if params.view.is_empty() {
        DEFAULT_VIEW
    } else {
        params.view.as_str()
    };

    let query = [
        ("httpAccept", "application/json"),
        ("view", view),
        ("apiKey", params.key.as_str()),
    ];

    let client = C::default();
    client.get_json(&url, &query)
}

/// Where a blueprint field is found in an abstract retrieval response.
///
/// Paths are JSON pointers relative to the response root, subfield paths are relative to each
/// item found at `path`. The first subfield path that exists is used.
struct FieldPath {
    field: &'static str,
    path: &'static str,
    subfields: &'static [(&'static str, &'static [&'static str])],
}

const FIELD_PATHS: &[FieldPath] = &[
    FieldPath {
        field: "affiliation",
        path: "/affiliation",
        subfields: &[
            ("id", &["/@id"]),
            ("name", &["/affilname"]),
            ("city", &["/affiliation-city"]),
            ("country", &["/affiliation-country"]),
        ],
    },
    FieldPath {
        field: "aggregation type",
        path: "/coredata/prism:aggregationType",
        subfields: &[],
    },
    FieldPath {
        field: "author keywords",
        path: "/authkeywords/author-keyword",
        subfields: &[],
    },
    FieldPath {
        field: "authors",
        path: "/authors/author",
        subfields: &[
            ("auid", &["/@auid"]),
            ("indexed name", &["/ce:indexed-name"]),
            ("surname", &["/ce:surname"]),
            ("given name", &["/ce:given-name"]),
            ("affiliation", &["/affiliation/@id", "/affiliation/0/@id"]),
        ],
    },
    FieldPath {
        field: "citedby count",
        path: "/coredata/citedby-count",
        subfields: &[],
    },
    FieldPath {
        field: "chemicals",
        path: "/item/bibrecord/head/enhancement/chemicalgroup/chemicals",
        subfields: &[
            ("source", &["/@source"]),
            (
                "chemical name",
                &["/chemical/chemical-name", "/chemical/0/chemical-name"],
            ),
        ],
    },
    FieldPath {
        field: "conference",
        path: "/item/bibrecord/head/source/additional-srcinfo/conferenceinfo/confevent/confname",
        subfields: &[],
    },
    FieldPath {
        field: "copyright",
        path: "/item/bibrecord/item-info/copyright",
        subfields: &[],
    },
    FieldPath {
        field: "copyright owner",
        path: "/item/bibrecord/item-info/copyright/@type",
        subfields: &[],
    },
    FieldPath {
        field: "correspondence",
        path: "/item/bibrecord/head/correspondence",
        subfields: &[
            ("surname", &["/person/ce:surname"]),
            ("initials", &["/person/ce:initials"]),
            ("organization", &["/affiliation/organization"]),
            ("country", &["/affiliation/country"]),
            ("city group", &["/affiliation/city-group"]),
        ],
    },
    FieldPath {
        field: "funding",
        path: "/item/xocs:meta/xocs:funding-list/xocs:funding",
        subfields: &[
            ("agency", &["/xocs:funding-agency"]),
            ("agency id", &["/xocs:funding-agency-id"]),
            ("string", &["/xocs:funding-agency-matched-string"]),
            ("funding id", &["/xocs:funding-id"]),
            ("acronym", &["/xocs:funding-agency-acronym"]),
            ("country", &["/xocs:funding-agency-country"]),
        ],
    },
    FieldPath {
        field: "language",
        path: "/language/@xml:lang",
        subfields: &[],
    },
    FieldPath {
        field: "open access",
        path: "/coredata/openaccess",
        subfields: &[],
    },
    FieldPath {
        field: "publication name",
        path: "/coredata/prism:publicationName",
        subfields: &[],
    },
    FieldPath {
        field: "publisher",
        path: "/coredata/dc:publisher",
        subfields: &[],
    },
];

const COVER_DATE_PATH: &str = "/coredata/prism:coverDate";

pub(crate) fn to_record(response: &Value) -> Result<Record, Error> {
    let root = response
        .pointer(RESPONSE_ROOT)
        .filter(|root| root.is_object())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidRecord,
                "response has no abstracts-retrieval-response object",
            )
        })?;

    let mut record = Record::empty();

    for FieldPath {
        field,
        path,
        subfields,
    } in FIELD_PATHS
    {
        match root.pointer(path) {
            Some(Value::Null) | None => trace!("no value for \"{field}\" at {path}"),
            Some(value) => {
                record.insert(*field, project(value, subfields));
            }
        }
    }

    if let Some(date) = root.pointer(COVER_DATE_PATH).and_then(Value::as_str) {
        record.insert("publication date", split_date(date));
    }

    Ok(record)
}

fn project(value: &Value, subfields: &[(&str, &[&str])]) -> Value {
    if subfields.is_empty() {
        return text(value);
    }

    match value {
        Value::Array(items) => Value::Array(items.iter().map(|i| pick(i, subfields)).collect()),
        Value::Object(_) => pick(value, subfields),
        other => other.clone(),
    }
}

fn pick(item: &Value, subfields: &[(&str, &[&str])]) -> Value {
    let picked = subfields
        .iter()
        .filter_map(|(name, paths)| {
            paths
                .iter()
                .find_map(|p| item.pointer(p))
                .map(|v| ((*name).to_owned(), joined_text(v)))
        })
        .collect::<Map<_, _>>();

    Value::Object(picked)
}

/// Text nodes are returned as `{"$": "text", "@attr": ..}` objects.
fn text(value: &Value) -> Value {
    match value {
        Value::Object(map) => map.get("$").map_or_else(|| value.clone(), Clone::clone),
        Value::Array(items) => Value::Array(items.iter().map(text).collect()),
        other => other.clone(),
    }
}

fn joined_text(value: &Value) -> Value {
    match text(value) {
        Value::Array(items) => Value::String(
            items
                .iter()
                .map(stringify)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => other,
    }
}

fn split_date(date: &str) -> Value {
    let parts = ["year", "month", "day"]
        .into_iter()
        .zip(date.trim().split('-'))
        .map(|(name, part)| (name.to_owned(), Value::String(part.to_owned())))
        .collect::<Map<_, _>>();

    Value::Object(parts)
}
