//! Generic filter → sort → group pipeline behind every listing screen.
//!
//! The pipeline knows nothing about trips, activities or posts. Callers
//! describe their items through a [`FieldSet`]: named, typed accessors for
//! filtering, sorting and grouping, plus the text accessors the search box
//! matches against. A [`QuerySpec`] then says what to do with them.
//!
//! Ordering guarantees:
//! - filtering never reorders items,
//! - sorting is stable, so ties keep their original order,
//! - groups appear in first-seen order unless alphabetical order is requested.

use chrono::NaiveDate;
use shared::SortDirection;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::money::Money;

/// Label used for the group of items that have no value for the group field
pub const MISSING_GROUP_KEY: &str = "Unspecified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Money(Money),
    Date(NaiveDate),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Money,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Invalid value {value:?} for field {field}")]
    InvalidFilterValue { field: String, value: String },
}

impl FieldValue {
    /// Parse a raw UI value (dropdown selection, range bound) for a field of the given kind
    pub fn parse(field: &str, kind: FieldKind, raw: &str) -> Result<FieldValue, QueryError> {
        let invalid = || QueryError::InvalidFilterValue {
            field: field.to_string(),
            value: raw.to_string(),
        };
        let trimmed = raw.trim();
        match kind {
            FieldKind::Text => Ok(FieldValue::Text(trimmed.to_string())),
            FieldKind::Number => trimmed.parse().map(FieldValue::Number).map_err(|_| invalid()),
            FieldKind::Money => Money::parse(trimmed).map(FieldValue::Money).map_err(|_| invalid()),
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|_| invalid()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Ordering between two values of the same kind. Text compares
    /// case-insensitively first so "amsterdam" sorts next to "Amsterdam".
    fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => {
                Some(a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)))
            }
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.cmp(b)),
            (FieldValue::Money(a), FieldValue::Money(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Label of the group this value falls into
    pub fn group_key(&self) -> String {
        match self {
            FieldValue::Text(s) if s.is_empty() => MISSING_GROUP_KEY.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Money(m) => m.format(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Missing => MISSING_GROUP_KEY.to_string(),
        }
    }
}

/// Condition on one field. Items with a missing value never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(FieldValue),
    OneOf(Vec<FieldValue>),
    /// Inclusive on both ends; an absent bound is open
    Range {
        min: Option<FieldValue>,
        max: Option<FieldValue>,
    },
}

impl Predicate {
    pub fn matches(&self, value: &FieldValue) -> bool {
        if value.is_missing() {
            return false;
        }
        match self {
            Predicate::Equals(expected) => value == expected,
            Predicate::OneOf(options) => options.contains(value),
            Predicate::Range { min, max } => {
                let above_min = min.as_ref().map_or(true, |m| {
                    matches!(value.compare(m), Some(Ordering::Greater | Ordering::Equal))
                });
                let below_max = max.as_ref().map_or(true, |m| {
                    matches!(value.compare(m), Some(Ordering::Less | Ordering::Equal))
                });
                above_min && below_max
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOrder {
    #[default]
    FirstSeen,
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKey {
    pub field: String,
    pub order: GroupOrder,
}

/// Declarative description of a listing query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub search_text: Option<String>,
    pub filters: Vec<(String, Predicate)>,
    pub sort: Option<SortKey>,
    pub group: Option<GroupKey>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: &str) -> Self {
        self.search_text = Some(text.to_string());
        self
    }

    pub fn filter(mut self, field: &str, predicate: Predicate) -> Self {
        self.filters.push((field.to_string(), predicate));
        self
    }

    pub fn sort_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort = Some(SortKey {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn group_by(mut self, field: &str, order: GroupOrder) -> Self {
        self.group = Some(GroupKey {
            field: field.to_string(),
            order,
        });
        self
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> FieldValue + Send + Sync>;
type SearchAccessor<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

struct FieldDef<T> {
    name: String,
    kind: FieldKind,
    accessor: Accessor<T>,
}

/// Named accessors describing how the pipeline sees one kind of item
pub struct FieldSet<T> {
    fields: Vec<FieldDef<T>>,
    search_fields: Vec<SearchAccessor<T>>,
}

impl<T> FieldSet<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            search_fields: Vec::new(),
        }
    }

    pub fn field<F>(mut self, name: &str, kind: FieldKind, accessor: F) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.fields.push(FieldDef {
            name: name.to_string(),
            kind,
            accessor: Box::new(accessor),
        });
        self
    }

    /// Add a text accessor matched by the search box
    pub fn searchable<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.search_fields.push(Box::new(accessor));
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.position(name).map(|i| self.fields[i].kind)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn value(&self, name: &str, item: &T) -> Option<FieldValue> {
        self.position(name).map(|i| (self.fields[i].accessor)(item))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    fn resolve(&self, name: &str) -> Result<usize, QueryError> {
        self.position(name)
            .ok_or_else(|| QueryError::UnknownField(name.to_string()))
    }

    fn matches_search(&self, item: &T, needle: &str) -> bool {
        self.search_fields
            .iter()
            .any(|accessor| accessor(item).to_lowercase().contains(needle))
    }
}

impl<T> Default for FieldSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    pub key: String,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput<T> {
    Flat(Vec<T>),
    Grouped(Vec<Group<T>>),
}

impl<T> QueryOutput<T> {
    /// All items in display order, regardless of grouping
    pub fn into_items(self) -> Vec<T> {
        match self {
            QueryOutput::Flat(items) => items,
            QueryOutput::Grouped(groups) => groups.into_iter().flat_map(|g| g.items).collect(),
        }
    }
}

/// Run the filter, sort and group stages over `items`.
///
/// Every field the query names is checked against `fields` before any item is
/// looked at, so a bad request fails the same way on an empty list.
pub fn evaluate<T>(items: Vec<T>, spec: &QuerySpec, fields: &FieldSet<T>) -> Result<QueryOutput<T>, QueryError> {
    let filters = spec
        .filters
        .iter()
        .map(|(name, predicate)| fields.resolve(name).map(|index| (index, predicate)))
        .collect::<Result<Vec<_>, _>>()?;
    let sort = spec
        .sort
        .as_ref()
        .map(|key| fields.resolve(&key.field).map(|index| (index, key.direction)))
        .transpose()?;
    let group = spec
        .group
        .as_ref()
        .map(|key| fields.resolve(&key.field).map(|index| (index, key.order)))
        .transpose()?;
    let needle = spec
        .search_text
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    // Filter
    let mut selected: Vec<T> = items
        .into_iter()
        .filter(|item| {
            needle.as_deref().map_or(true, |n| fields.matches_search(item, n))
                && filters
                    .iter()
                    .all(|(index, predicate)| predicate.matches(&(fields.fields[*index].accessor)(item)))
        })
        .collect();

    // Sort
    if let Some((index, direction)) = sort {
        let accessor = &fields.fields[index].accessor;
        let mut keyed: Vec<(FieldValue, T)> = selected.into_iter().map(|item| (accessor(&item), item)).collect();
        keyed.sort_by(|(a, _), (b, _)| compare_for_sort(a, b, direction));
        selected = keyed.into_iter().map(|(_, item)| item).collect();
    }

    // Group
    let Some((index, order)) = group else {
        return Ok(QueryOutput::Flat(selected));
    };
    let accessor = &fields.fields[index].accessor;
    let mut groups: Vec<Group<T>> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for item in selected {
        let key = accessor(&item).group_key();
        match positions.get(&key) {
            Some(&position) => groups[position].items.push(item),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Group { key, items: vec![item] });
            }
        }
    }
    if order == GroupOrder::Alphabetical {
        groups.sort_by(|a, b| {
            a.key
                .to_lowercase()
                .cmp(&b.key.to_lowercase())
                .then_with(|| a.key.cmp(&b.key))
        });
    }
    Ok(QueryOutput::Grouped(groups))
}

/// Missing values go last in both directions
fn compare_for_sort(a: &FieldValue, b: &FieldValue, direction: SortDirection) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.compare(b).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Place {
        name: &'static str,
        country: &'static str,
        continent: Option<&'static str>,
        cost: i64,
    }

    fn place(name: &'static str, country: &'static str, continent: Option<&'static str>, cost: i64) -> Place {
        Place { name, country, continent, cost }
    }

    fn create_test_places() -> Vec<Place> {
        vec![
            place("Paris", "France", Some("Europe"), 300),
            place("Kyoto", "Japan", Some("Asia"), 250),
            place("Lyon", "France", Some("Europe"), 120),
            place("Cusco", "Peru", Some("South America"), 250),
            place("Atlantis", "Unknown", None, 999),
        ]
    }

    fn create_test_fields() -> FieldSet<Place> {
        FieldSet::new()
            .field("name", FieldKind::Text, |p: &Place| FieldValue::Text(p.name.to_string()))
            .field("country", FieldKind::Text, |p: &Place| FieldValue::Text(p.country.to_string()))
            .field("continent", FieldKind::Text, |p: &Place| {
                p.continent
                    .map(|c| FieldValue::Text(c.to_string()))
                    .unwrap_or(FieldValue::Missing)
            })
            .field("cost", FieldKind::Money, |p: &Place| FieldValue::Money(Money::from_dollars(p.cost)))
            .searchable(|p: &Place| p.name.to_string())
            .searchable(|p: &Place| p.country.to_string())
    }

    fn names(output: QueryOutput<Place>) -> Vec<&'static str> {
        output.into_items().into_iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let fields = create_test_fields();
        let spec = QuerySpec::new()
            .search("paris")
            .filter("country", Predicate::Equals(FieldValue::Text("France".to_string())))
            .sort_by("cost", SortDirection::Descending)
            .group_by("continent", GroupOrder::FirstSeen);

        let output = evaluate(Vec::new(), &spec, &fields).unwrap();
        assert_eq!(output, QueryOutput::Grouped(Vec::new()));

        let flat = evaluate(Vec::<Place>::new(), &QuerySpec::new(), &fields).unwrap();
        assert_eq!(flat, QueryOutput::Flat(Vec::new()));
    }

    #[test]
    fn test_no_filters_is_identity() {
        let places = create_test_places();
        let output = evaluate(places.clone(), &QuerySpec::new().search("   "), &create_test_fields()).unwrap();
        assert_eq!(output, QueryOutput::Flat(places));
    }

    #[test]
    fn test_search_is_case_insensitive_or_across_fields() {
        let fields = create_test_fields();

        let output = evaluate(create_test_places(), &QuerySpec::new().search("FRANCE"), &fields).unwrap();
        assert_eq!(names(output), vec!["Paris", "Lyon"]);

        let output = evaluate(create_test_places(), &QuerySpec::new().search("yo"), &fields).unwrap();
        assert_eq!(names(output), vec!["Kyoto", "Lyon"]);
    }

    #[test]
    fn test_filters_and_together_with_search() {
        let fields = create_test_fields();
        let spec = QuerySpec::new()
            .search("o")
            .filter(
                "cost",
                Predicate::Range {
                    min: Some(FieldValue::Money(Money::from_dollars(200))),
                    max: Some(FieldValue::Money(Money::from_dollars(300))),
                },
            )
            .filter(
                "continent",
                Predicate::OneOf(vec![
                    FieldValue::Text("Asia".to_string()),
                    FieldValue::Text("South America".to_string()),
                ]),
            );

        let output = evaluate(create_test_places(), &spec, &fields).unwrap();
        assert_eq!(names(output), vec!["Kyoto", "Cusco"]);
    }

    #[test]
    fn test_missing_values_never_match_filters() {
        let fields = create_test_fields();
        let spec = QuerySpec::new().filter("continent", Predicate::Range { min: None, max: None });
        let output = evaluate(create_test_places(), &spec, &fields).unwrap();
        assert!(!names(output).contains(&"Atlantis"));
    }

    #[test]
    fn test_sort_is_stable_and_missing_last() {
        let fields = create_test_fields();

        let output = evaluate(
            create_test_places(),
            &QuerySpec::new().sort_by("cost", SortDirection::Ascending),
            &fields,
        )
        .unwrap();
        // Kyoto and Cusco tie at 250 and keep their original order
        assert_eq!(names(output), vec!["Lyon", "Kyoto", "Cusco", "Paris", "Atlantis"]);

        let output = evaluate(
            create_test_places(),
            &QuerySpec::new().sort_by("cost", SortDirection::Descending),
            &fields,
        )
        .unwrap();
        assert_eq!(names(output), vec!["Atlantis", "Paris", "Kyoto", "Cusco", "Lyon"]);

        let output = evaluate(
            create_test_places(),
            &QuerySpec::new().sort_by("continent", SortDirection::Descending),
            &fields,
        )
        .unwrap();
        assert_eq!(names(output), vec!["Cusco", "Paris", "Lyon", "Kyoto", "Atlantis"]);
    }

    #[test]
    fn test_group_first_seen_vs_alphabetical() {
        let fields = create_test_fields();

        let output = evaluate(
            create_test_places(),
            &QuerySpec::new().group_by("continent", GroupOrder::FirstSeen),
            &fields,
        )
        .unwrap();
        let QueryOutput::Grouped(groups) = output else {
            panic!("expected grouped output");
        };
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Europe", "Asia", "South America", MISSING_GROUP_KEY]);
        assert_eq!(groups[0].items.iter().map(|p| p.name).collect::<Vec<_>>(), vec!["Paris", "Lyon"]);

        let output = evaluate(
            create_test_places(),
            &QuerySpec::new()
                .sort_by("cost", SortDirection::Ascending)
                .group_by("continent", GroupOrder::Alphabetical),
            &fields,
        )
        .unwrap();
        let QueryOutput::Grouped(groups) = output else {
            panic!("expected grouped output");
        };
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Asia", "Europe", "South America", MISSING_GROUP_KEY]);
        // Sorting happens before grouping, so items inside a group are sorted
        assert_eq!(groups[1].items.iter().map(|p| p.name).collect::<Vec<_>>(), vec!["Lyon", "Paris"]);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let fields = create_test_fields();
        let spec = QuerySpec::new().sort_by("altitude", SortDirection::Ascending);
        assert_eq!(
            evaluate(Vec::new(), &spec, &fields),
            Err(QueryError::UnknownField("altitude".to_string()))
        );
    }

    #[test]
    fn test_field_value_parsing() {
        assert_eq!(
            FieldValue::parse("cost", FieldKind::Money, "$1,200"),
            Ok(FieldValue::Money(Money::from_dollars(1_200)))
        );
        assert_eq!(
            FieldValue::parse("day", FieldKind::Number, " 3 "),
            Ok(FieldValue::Number(3))
        );
        assert_eq!(
            FieldValue::parse("start", FieldKind::Date, "2025-06-01"),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()))
        );
        assert!(matches!(
            FieldValue::parse("start", FieldKind::Date, "June 1st"),
            Err(QueryError::InvalidFilterValue { .. })
        ));
    }
}
