use std::borrow::Cow;

/// How many times the subcolumns of a field are laid out in a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// The field is laid out exactly once and cannot be given a count.
    Single,
    /// The field is laid out this many times unless the user supplies a count.
    Repeated(usize),
}

/// A single named field of a [`Blueprint`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    name: Cow<'static, str>,
    repeat: Repeat,
    subcolumns: Vec<Cow<'static, str>>,
}

impl FieldSpec {
    /// Create a new field.
    ///
    /// An empty `subcolumns` list is the same as `[""]`: the field is not decomposed any further
    /// and the value of the field itself is used.
    pub fn new<N, S>(name: N, repeat: Repeat, subcolumns: S) -> Self
    where
        N: Into<Cow<'static, str>>,
        S: IntoIterator,
        S::Item: Into<Cow<'static, str>>,
    {
        let mut subcolumns: Vec<_> = subcolumns.into_iter().map(Into::into).collect();
        if subcolumns.is_empty() {
            subcolumns.push(Cow::Borrowed(""));
        }

        Self {
            name: name.into(),
            repeat,
            subcolumns,
        }
    }

    /// Shorthand for a field that is laid out once and not decomposed.
    pub fn single<N: Into<Cow<'static, str>>>(name: N) -> Self {
        Self::new(name, Repeat::Single, [""])
    }

    /// The name of the field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default repetition of the field.
    #[must_use]
    pub const fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Subcolumn names in their declared order.
    pub fn subcolumns(&self) -> impl Iterator<Item = &str> {
        self.subcolumns.iter().map(AsRef::as_ref)
    }

    /// Whether a user supplied count can be applied to this field.
    #[must_use]
    pub const fn is_countable(&self) -> bool {
        matches!(self.repeat, Repeat::Repeated(_))
    }
}

/// An ordered table of every field that may appear as output columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blueprint {
    fields: Vec<FieldSpec>,
}

impl Blueprint {
    /// Create a blueprint from fields in the order they should be laid out.
    ///
    /// Field names are expected to be unique, [`Blueprint::lookup`] only ever finds the first.
    #[must_use]
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        debug_assert!(
            fields
                .iter()
                .enumerate()
                .all(|(i, f)| fields[..i].iter().all(|g| g.name != f.name)),
            "blueprint field names must be unique"
        );
        Self { fields }
    }

    /// The blueprint of the data categories returned by the Scopus abstract retrieval API.
    ///
    /// Some categories are left out as they are redundant with others.
    #[must_use]
    pub fn scopus() -> Self {
        use Repeat::{Repeated, Single};

        Self::new(vec![
            FieldSpec::new("affiliation", Repeated(3), ["id", "name", "city", "country"]),
            FieldSpec::single("aggregation type"),
            FieldSpec::new("author keywords", Repeated(10), [""]),
            FieldSpec::new(
                "authors",
                Repeated(6),
                ["auid", "indexed name", "surname", "given name", "affiliation"],
            ),
            FieldSpec::new("publication date", Single, ["year", "month", "day"]),
            FieldSpec::single("citedby count"),
            FieldSpec::new("chemicals", Repeated(0), ["source", "chemical name"]),
            FieldSpec::single("conference"),
            FieldSpec::single("copyright"),
            FieldSpec::single("copyright owner"),
            FieldSpec::new(
                "correspondence",
                Repeated(2),
                ["surname", "initials", "organization", "country", "city group"],
            ),
            FieldSpec::new(
                "funding",
                Repeated(3),
                ["agency", "agency id", "string", "funding id", "acronym", "country"],
            ),
            FieldSpec::single("language"),
            FieldSpec::single("open access"),
            FieldSpec::single("publication name"),
            FieldSpec::single("publisher"),
        ])
    }

    /// Find a field by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Iterate the fields in their declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    /// Number of fields in the blueprint.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the blueprint has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a Blueprint {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
