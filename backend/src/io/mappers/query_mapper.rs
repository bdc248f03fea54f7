use shared::{FilterCondition, ListingGroup, QueryRequest, QueryResponse};

use crate::domain::query::{
    FieldSet, FieldValue, GroupKey, GroupOrder, Predicate, QueryError, QueryOutput, QuerySpec, SortKey,
};

pub struct QueryMapper;

impl QueryMapper {
    /// Turn a listing request into a query spec, parsing each raw filter value
    /// according to the kind of field it targets.
    pub fn to_query_spec<T>(request: &QueryRequest, fields: &FieldSet<T>) -> Result<QuerySpec, QueryError> {
        let mut filters = Vec::with_capacity(request.filters.len());
        for filter in &request.filters {
            let kind = fields
                .kind_of(&filter.field)
                .ok_or_else(|| QueryError::UnknownField(filter.field.clone()))?;
            let parse = |raw: &str| FieldValue::parse(&filter.field, kind, raw);
            let parse_bound = |raw: &Option<String>| {
                raw.as_deref()
                    .filter(|r| !r.trim().is_empty())
                    .map(|r| parse(r))
                    .transpose()
            };

            let predicate = match &filter.condition {
                FilterCondition::Equals { value } => Predicate::Equals(parse(value.as_str())?),
                FilterCondition::OneOf { values } => Predicate::OneOf(
                    values.iter().map(|v| parse(v.as_str())).collect::<Result<Vec<_>, _>>()?,
                ),
                FilterCondition::Range { min, max } => Predicate::Range {
                    min: parse_bound(min)?,
                    max: parse_bound(max)?,
                },
            };
            filters.push((filter.field.clone(), predicate));
        }

        Ok(QuerySpec {
            search_text: request.search_text.clone(),
            filters,
            sort: request.sort.as_ref().map(|s| SortKey {
                field: s.field.clone(),
                direction: s.direction,
            }),
            group: request.group.as_ref().map(|g| GroupKey {
                field: g.field.clone(),
                order: if g.alphabetical {
                    GroupOrder::Alphabetical
                } else {
                    GroupOrder::FirstSeen
                },
            }),
        })
    }

    pub fn to_query_response<T, U>(output: QueryOutput<T>, mut convert: impl FnMut(T) -> U) -> QueryResponse<U> {
        match output {
            QueryOutput::Flat(items) => QueryResponse::Flat {
                items: items.into_iter().map(&mut convert).collect(),
            },
            QueryOutput::Grouped(groups) => QueryResponse::Grouped {
                groups: groups
                    .into_iter()
                    .map(|group| ListingGroup {
                        key: group.key,
                        items: group.items.into_iter().map(&mut convert).collect(),
                    })
                    .collect(),
            },
        }
    }
}
