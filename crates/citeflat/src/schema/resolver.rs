use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use super::{Blueprint, FieldSpec, Repeat};
use crate::{Error, ErrorKind};

/// The largest repeat count a field can be given.
pub const MAX_COUNT: usize = 1000;

/// User supplied repeat counts, keyed by field name.
pub type ColumnCounts = BTreeMap<String, usize>;

/// User supplied field names to leave out of the output.
pub type ColumnExclusions = BTreeSet<String>;

/// A single output column.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Column {
    /// Name of the blueprint field the column belongs to.
    pub field: String,
    /// Name of the subcolumn, empty when the field is not decomposed.
    pub subcolumn: String,
    /// Which repetition of the field this column holds, starting at 0.
    pub index: usize,
    /// Whether the field can repeat at all.
    pub repeated: bool,
}

impl Column {
    /// Whether the column takes the value of the field itself rather than one of its subfields.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.subcolumn.is_empty()
    }

    /// A single line label for the column, such as `authors.surname.2` or `publisher`.
    ///
    /// Repetitions are numbered from 1 in labels.
    #[must_use]
    pub fn label(&self) -> String {
        let mut label = self.field.clone();
        if !self.is_scalar() {
            label.push('.');
            label.push_str(&self.subcolumn);
        }
        if self.repeated {
            label.push('.');
            label.push_str(&(self.index + 1).to_string());
        }
        label
    }
}

/// The fixed, ordered set of output columns computed from a [`Blueprint`] and the user's column
/// options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedSchema {
    columns: Vec<Column>,
}

impl ResolvedSchema {
    /// Iterate the columns in output order.
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// The columns in output order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns, and so the length of every flattened row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResolvedSchema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compute the output columns of `blueprint` after applying `counts` and `exclusions`.
///
/// Fields keep their blueprint order. For each field, every subcolumn of the first repetition is
/// laid out before any subcolumn of the second repetition and so on. A field named in both
/// `counts` and `exclusions` is left out.
///
/// # Errors
///
/// An [`Err`] with [`ErrorKind::UnknownColumn`] is returned when a count or exclusion names a
/// field that is not in the blueprint.
/// An [`Err`] with [`ErrorKind::NotCountable`] is returned when a count is given for a
/// [`Repeat::Single`] field.
/// An [`Err`] with [`ErrorKind::Syntax`] is returned when a count is over [`MAX_COUNT`].
pub fn resolve(
    blueprint: &Blueprint,
    counts: &ColumnCounts,
    exclusions: &ColumnExclusions,
) -> Result<ResolvedSchema, Error> {
    for (name, &count) in counts {
        let field = lookup(blueprint, name, "number")?;
        if !field.is_countable() {
            return Err(Error::new(
                ErrorKind::NotCountable,
                format!("Column \"{name}\" is not countable!"),
            ));
        }
        if count > MAX_COUNT {
            return Err(Error::new(
                ErrorKind::Syntax,
                format!("Cannot number column \"{name}\" {count} times, the maximum is {MAX_COUNT}"),
            ));
        }
    }

    for name in exclusions {
        lookup(blueprint, name, "remove")?;
    }

    let mut columns = Vec::new();
    for field in blueprint {
        if exclusions.contains(field.name()) {
            trace!("excluding column \"{}\"", field.name());
            continue;
        }

        let (repeated, count) = match field.repeat() {
            Repeat::Single => (false, 1),
            Repeat::Repeated(default) => (
                true,
                counts.get(field.name()).copied().unwrap_or(default),
            ),
        };

        for index in 0..count {
            columns.extend(field.subcolumns().map(|subcolumn| Column {
                field: field.name().to_owned(),
                subcolumn: subcolumn.to_owned(),
                index,
                repeated,
            }));
        }
    }

    debug!("resolved {} output columns", columns.len());
    Ok(ResolvedSchema { columns })
}

fn lookup<'b>(blueprint: &'b Blueprint, name: &str, action: &str) -> Result<&'b FieldSpec, Error> {
    blueprint.lookup(name).ok_or_else(|| {
        Error::new(
            ErrorKind::UnknownColumn,
            format!("Cannot {action} column \"{name}\" because that column does not exist!"),
        )
    })
}

/// Parse a comma separated list of `COLUMN:COUNT` pairs, e.g. `authors:10,chemicals:1`.
///
/// Empty items are skipped and names are trimmed. A later pair for the same column replaces an
/// earlier one.
///
/// # Errors
///
/// An [`Err`] with [`ErrorKind::Syntax`] is returned for an item without exactly one `:` or with
/// a count that is not a non-negative integer.
pub fn parse_counts(src: &str) -> Result<ColumnCounts, Error> {
    let mut counts = ColumnCounts::new();

    for item in src.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut parts = item.split(':');
        let (name, count) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(count), None) => (name.trim(), count.trim()),
            (_, None, _) => {
                return Err(Error::new(
                    ErrorKind::Syntax,
                    format!("\"{item}\" has too few identifiers! syntax: \"COLUMN:COUNT\""),
                ))
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::Syntax,
                    format!("\"{item}\" has too many identifiers! syntax: \"COLUMN:COUNT\""),
                ))
            }
        };

        let count = count.parse::<usize>().map_err(|_| {
            Error::new(
                ErrorKind::Syntax,
                format!("\"{count}\" is not a valid count for column \"{name}\""),
            )
        })?;

        counts.insert(name.to_owned(), count);
    }

    Ok(counts)
}

/// Parse a comma separated list of column names, e.g. `publisher,publication name`.
///
/// Empty items are skipped and names are trimmed.
#[must_use]
pub fn parse_exclusions(src: &str) -> ColumnExclusions {
    src.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authors_blueprint() -> Blueprint {
        Blueprint::new(vec![
            FieldSpec::single("publisher"),
            FieldSpec::new("authors", Repeat::Repeated(6), ["auid", "surname"]),
            FieldSpec::new("chemicals", Repeat::Repeated(0), ["source", "chemical name"]),
        ])
    }

    fn counts(pairs: &[(&str, usize)]) -> ColumnCounts {
        pairs.iter().map(|(n, c)| ((*n).to_owned(), *c)).collect()
    }

    fn exclusions(names: &[&str]) -> ColumnExclusions {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn triples(schema: &ResolvedSchema) -> Vec<(&str, &str, usize)> {
        schema
            .iter()
            .map(|c| (c.field.as_str(), c.subcolumn.as_str(), c.index))
            .collect()
    }

    #[test]
    fn count_override_lays_out_repetitions_as_outer_loop() {
        let schema = resolve(
            &authors_blueprint(),
            &counts(&[("authors", 2)]),
            &exclusions(&["publisher"]),
        )
        .unwrap();

        assert_eq!(
            vec![
                ("authors", "auid", 0),
                ("authors", "surname", 0),
                ("authors", "auid", 1),
                ("authors", "surname", 1),
            ],
            triples(&schema)
        );
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let schema = resolve(&authors_blueprint(), &counts(&[]), &exclusions(&[])).unwrap();

        // 1 publisher + 6 * 2 authors + 0 chemicals
        assert_eq!(13, schema.len());
        assert_eq!(("publisher", "", 0), triples(&schema)[0]);
        assert!(!schema.columns()[0].repeated);
    }

    #[test]
    fn resolving_twice_gives_the_same_schema() {
        let blueprint = Blueprint::scopus();
        let c = counts(&[("authors", 3), ("funding", 1)]);
        let x = exclusions(&["publisher"]);

        assert_eq!(
            resolve(&blueprint, &c, &x).unwrap(),
            resolve(&blueprint, &c, &x).unwrap()
        );
    }

    #[test]
    fn exclusion_wins_over_override() {
        let schema = resolve(
            &authors_blueprint(),
            &counts(&[("authors", 4)]),
            &exclusions(&["authors"]),
        )
        .unwrap();

        assert!(schema.iter().all(|c| c.field != "authors"));
        assert_eq!(1, schema.len());
    }

    #[test]
    fn zero_count_field_has_no_columns_but_is_validated() {
        let schema = resolve(&authors_blueprint(), &counts(&[("authors", 0)]), &exclusions(&[]))
            .unwrap();
        assert_eq!(vec![("publisher", "", 0)], triples(&schema));

        let err = resolve(&authors_blueprint(), &counts(&[]), &exclusions(&["chemical"]))
            .expect_err("chemical is not in the blueprint");
        assert_eq!(ErrorKind::UnknownColumn, err.kind());
    }

    #[test]
    fn unknown_override_is_rejected() {
        let err = resolve(&authors_blueprint(), &counts(&[("editors", 2)]), &exclusions(&[]))
            .expect_err("editors is not in the blueprint");

        assert_eq!(ErrorKind::UnknownColumn, err.kind());
        assert!(err.to_string().contains("\"editors\""));
    }

    #[test]
    fn unknown_exclusion_is_rejected_without_touching_the_blueprint() {
        let blueprint = authors_blueprint();
        let before = blueprint.clone();

        let err = resolve(&blueprint, &counts(&[("authors", 1)]), &exclusions(&["nope"]))
            .expect_err("nope is not in the blueprint");

        assert_eq!(ErrorKind::UnknownColumn, err.kind());
        assert_eq!(before, blueprint);
    }

    #[test]
    fn single_field_is_not_countable() {
        let err = resolve(&authors_blueprint(), &counts(&[("publisher", 2)]), &exclusions(&[]))
            .expect_err("publisher is a single column");

        assert_eq!(ErrorKind::NotCountable, err.kind());
    }

    #[test]
    fn huge_count_is_rejected_before_any_column_is_built() {
        let counts = parse_counts("authors:4000000000").unwrap();
        let err = resolve(&authors_blueprint(), &counts, &exclusions(&[]))
            .expect_err("the count is over the maximum");

        assert_eq!(ErrorKind::Syntax, err.kind());
        assert!(err.to_string().contains("maximum is 1000"));
    }

    #[test]
    fn maximum_count_is_accepted() {
        let schema = resolve(
            &authors_blueprint(),
            &counts(&[("authors", MAX_COUNT)]),
            &exclusions(&[]),
        )
        .unwrap();

        // 1 publisher column, 2 subcolumns per author
        assert_eq!(1 + 2 * MAX_COUNT, schema.len());
    }

    #[test]
    fn labels_number_repetitions_from_one() {
        let schema = resolve(&authors_blueprint(), &counts(&[("authors", 1)]), &exclusions(&[]))
            .unwrap();
        let labels: Vec<_> = schema.iter().map(Column::label).collect();

        assert_eq!(vec!["publisher", "authors.auid.1", "authors.surname.1"], labels);
    }

    #[test]
    fn parse_counts_accepts_pairs_and_skips_empty_items() {
        let parsed = parse_counts("authors:10, chemicals:1,,").unwrap();
        assert_eq!(counts(&[("authors", 10), ("chemicals", 1)]), parsed);
        assert!(parse_counts("").unwrap().is_empty());
    }

    #[test]
    fn parse_counts_rejects_malformed_items() {
        for src in ["authors", "authors:1:2", "authors:many", "authors:-1"] {
            let err = parse_counts(src).expect_err(src);
            assert_eq!(ErrorKind::Syntax, err.kind(), "{src}");
        }
    }

    #[test]
    fn parse_exclusions_trims_names() {
        assert_eq!(
            exclusions(&["publisher", "publication name"]),
            parse_exclusions("publisher, publication name,")
        );
    }
}
