//! Metadata records and flattening them into rows.

use std::ops::Deref;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    schema::{Column, ResolvedSchema},
    Error, ErrorKind,
};

/// One metadata object fetched for a DOI, keyed by blueprint field name.
///
/// Values may be scalars, a single nested object, or a sequence of nested objects or scalars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    /// A record without any fields, flattening it gives a row of empty strings.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set the value of a field, returning the previous value.
    pub fn insert<S: Into<String>>(&mut self, field: S, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Flatten this record into a row with exactly one value per column of `schema`.
    #[must_use]
    pub fn flatten(&self, schema: &ResolvedSchema) -> FlattenedRow {
        flatten(self, schema)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::new(
                ErrorKind::InvalidRecord,
                format!("expected a JSON object but found {}", kind_of(&other)),
            )),
        }
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The values of one record laid out in [`ResolvedSchema`] column order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlattenedRow(Vec<String>);

impl FlattenedRow {
    /// Consume the row, returning the values.
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for FlattenedRow {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for FlattenedRow {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Flatten `record` into a row with exactly one value per column of `schema`.
///
/// Missing fields, repetitions past the end of a sequence and missing subfields all give empty
/// values. Sequences longer than the number of repetitions in the schema are truncated.
#[must_use]
pub fn flatten(record: &Record, schema: &ResolvedSchema) -> FlattenedRow {
    FlattenedRow(
        schema
            .iter()
            .map(|column| record.get(&column.field).map_or_else(String::new, |v| cell(v, column)))
            .collect(),
    )
}

fn cell(value: &Value, column: &Column) -> String {
    // a field that is not a sequence only has a first repetition
    let entry = match value {
        Value::Array(items) => items.get(column.index),
        other if column.index == 0 => Some(other),
        _ => None,
    };

    let Some(entry) = entry else {
        return String::new();
    };

    if column.is_scalar() {
        stringify(entry)
    } else {
        entry
            .as_object()
            .and_then(|object| object.get(&column.subcolumn))
            .map_or_else(String::new, stringify)
    }
}

/// The text of a value as written to output.
///
/// `null` is empty, strings are used as they are and numbers and booleans are written as JSON.
/// Nested objects or sequences in a scalar position are written as compact JSON.
#[must_use]
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{resolve, Blueprint, ColumnCounts, ColumnExclusions, FieldSpec, Repeat};

    fn record(value: Value) -> Record {
        Record::try_from(value).expect("test records are objects")
    }

    fn schema(fields: Vec<FieldSpec>, counts: &[(&str, usize)]) -> ResolvedSchema {
        let counts: ColumnCounts = counts.iter().map(|(n, c)| ((*n).to_owned(), *c)).collect();
        resolve(&Blueprint::new(fields), &counts, &ColumnExclusions::new()).unwrap()
    }

    fn authors_schema(count: usize) -> ResolvedSchema {
        schema(
            vec![FieldSpec::new(
                "authors",
                Repeat::Repeated(6),
                ["auid", "surname"],
            )],
            &[("authors", count)],
        )
    }

    #[test]
    fn missing_repetitions_are_padded() {
        let row = flatten(
            &record(json!({"authors": [{"auid": "1", "surname": "Smith"}]})),
            &authors_schema(2),
        );

        assert_eq!(vec!["1", "Smith", "", ""], row.into_inner());
    }

    #[test]
    fn extra_repetitions_are_truncated() {
        let row = flatten(
            &record(json!({"authors": [
                {"auid": "1", "surname": "Smith"},
                {"auid": "2", "surname": "Jones"},
                {"auid": "3", "surname": "Brown"},
            ]})),
            &authors_schema(2),
        );

        assert_eq!(vec!["1", "Smith", "2", "Jones"], row.into_inner());
    }

    #[test]
    fn excluded_field_gives_no_values() {
        let blueprint = Blueprint::new(vec![
            FieldSpec::new("authors", Repeat::Repeated(6), ["auid", "surname"]),
            FieldSpec::single("publisher"),
        ]);
        let exclusions: ColumnExclusions = ["authors".to_owned()].into_iter().collect();
        let schema = resolve(&blueprint, &ColumnCounts::new(), &exclusions).unwrap();

        let row = flatten(
            &record(json!({"authors": [{"auid": "1"}], "publisher": "Elsevier"})),
            &schema,
        );

        assert_eq!(vec!["Elsevier"], row.into_inner());
    }

    #[test]
    fn row_width_matches_schema_for_any_record_shape() {
        let schema = schema(
            vec![
                FieldSpec::new("affiliation", Repeat::Repeated(3), ["id", "name"]),
                FieldSpec::new("author keywords", Repeat::Repeated(4), [""]),
                FieldSpec::single("language"),
            ],
            &[],
        );

        for value in [
            json!({}),
            json!({"affiliation": null, "language": ["eng", "fre"]}),
            json!({"affiliation": "not an object", "author keywords": {"$": "x"}}),
            json!({"affiliation": [1, 2, 3, 4, 5], "author keywords": [[], {}, null]}),
        ] {
            assert_eq!(schema.len(), flatten(&record(value), &schema).len());
        }
    }

    #[test]
    fn scalar_field_only_fills_first_repetition() {
        let schema = schema(
            vec![FieldSpec::new("author keywords", Repeat::Repeated(3), [""])],
            &[],
        );

        let row = flatten(&record(json!({"author keywords": "graphs"})), &schema);
        assert_eq!(vec!["graphs", "", ""], row.into_inner());

        let row = flatten(
            &record(json!({"author keywords": ["graphs", "trees"]})),
            &schema,
        );
        assert_eq!(vec!["graphs", "trees", ""], row.into_inner());
    }

    #[test]
    fn single_object_only_fills_first_repetition() {
        let row = flatten(
            &record(json!({"authors": {"auid": "7", "surname": "Lee"}})),
            &authors_schema(2),
        );

        assert_eq!(vec!["7", "Lee", "", ""], row.into_inner());
    }

    #[test]
    fn missing_subfields_and_non_objects_are_empty() {
        let row = flatten(
            &record(json!({"authors": [{"surname": "Smith"}, "Jones"]})),
            &authors_schema(2),
        );

        assert_eq!(vec!["", "Smith", "", ""], row.into_inner());
    }

    #[test]
    fn values_are_stringified_naturally() {
        let schema = schema(
            vec![
                FieldSpec::single("citedby count"),
                FieldSpec::single("open access"),
                FieldSpec::single("copyright"),
                FieldSpec::single("conference"),
                FieldSpec::single("score"),
            ],
            &[],
        );

        let row = flatten(
            &record(json!({
                "citedby count": 42,
                "open access": true,
                "copyright": null,
                "conference": {"name": "ICSE"},
                "score": 1.5,
            })),
            &schema,
        );

        assert_eq!(
            vec!["42", "true", "", r#"{"name":"ICSE"}"#, "1.5"],
            row.into_inner()
        );
    }

    #[test]
    fn non_object_payload_is_an_invalid_record() {
        let err = Record::try_from(json!(["not", "a", "record"])).unwrap_err();

        assert_eq!(ErrorKind::InvalidRecord, err.kind());
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn empty_record_flattens_to_empty_values() {
        let row = Record::empty().flatten(&authors_schema(3));
        assert_eq!(vec![""; 6], row.into_inner());
    }
}
