//! Field sets for the listing screens.
//!
//! Each screen searches, filters, sorts and groups a different kind of item
//! through the same query pipeline; this module describes what each of them
//! exposes.
//!
//! | Screen     | Search box matches                 | Fields |
//! |------------|------------------------------------|--------|
//! | Trips      | name, description, destinations    | name, status, start_date, end_date, duration_days, destination_count, total_budget |
//! | Activities | name, destination                  | name, destination, day, date, time, budget |
//! | Community  | title, body, location              | title, author, location, continent, created_at, likes |

use chrono::NaiveDate;
use shared::CommunityPost;

use super::itinerary::ActivityWithContext;
use super::models::Trip;
use super::query::{FieldKind, FieldSet, FieldValue};

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

/// Trip search. Status is derived relative to `now`.
pub fn trip_fields(now: NaiveDate) -> FieldSet<Trip> {
    FieldSet::new()
        .field("name", FieldKind::Text, |t: &Trip| text(t.name()))
        .field("status", FieldKind::Text, move |t: &Trip| text(t.status(now).label()))
        .field("start_date", FieldKind::Date, |t: &Trip| FieldValue::Date(t.window().start()))
        .field("end_date", FieldKind::Date, |t: &Trip| FieldValue::Date(t.window().end()))
        .field("duration_days", FieldKind::Number, |t: &Trip| FieldValue::Number(t.duration_days()))
        .field("destination_count", FieldKind::Number, |t: &Trip| {
            FieldValue::Number(t.destinations().len() as i64)
        })
        .field("total_budget", FieldKind::Money, |t: &Trip| FieldValue::Money(t.total_budget()))
        .searchable(|t: &Trip| t.name().to_string())
        .searchable(|t: &Trip| t.description().to_string())
        .searchable(|t: &Trip| {
            t.destinations()
                .iter()
                .map(|d| d.name())
                .collect::<Vec<_>>()
                .join("\n")
        })
}

/// Activity search across a trip. Dates are resolved against `trip_start`.
pub fn activity_fields<'a>(trip_start: NaiveDate) -> FieldSet<ActivityWithContext<'a>> {
    FieldSet::new()
        .field("name", FieldKind::Text, |a: &ActivityWithContext<'a>| text(a.activity.name()))
        .field("destination", FieldKind::Text, |a: &ActivityWithContext<'a>| text(a.destination_name))
        .field("day", FieldKind::Number, |a: &ActivityWithContext<'a>| {
            a.activity
                .day_index()
                .map(|d| FieldValue::Number(i64::from(d)))
                .unwrap_or(FieldValue::Missing)
        })
        .field("date", FieldKind::Date, move |a: &ActivityWithContext<'a>| {
            a.activity
                .resolved_date(trip_start)
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Missing)
        })
        .field("time", FieldKind::Text, |a: &ActivityWithContext<'a>| {
            a.activity
                .formatted_time()
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Missing)
        })
        .field("budget", FieldKind::Money, |a: &ActivityWithContext<'a>| {
            FieldValue::Money(a.activity.budget())
        })
        .searchable(|a: &ActivityWithContext<'a>| a.activity.name().to_string())
        .searchable(|a: &ActivityWithContext<'a>| a.destination_name.to_string())
}

/// Community post search
pub fn post_fields() -> FieldSet<CommunityPost> {
    FieldSet::new()
        .field("title", FieldKind::Text, |p: &CommunityPost| text(&p.title))
        .field("author", FieldKind::Text, |p: &CommunityPost| text(&p.author))
        .field("location", FieldKind::Text, |p: &CommunityPost| text(&p.location))
        .field("continent", FieldKind::Text, |p: &CommunityPost| {
            p.continent.as_deref().map(text).unwrap_or(FieldValue::Missing)
        })
        .field("created_at", FieldKind::Date, |p: &CommunityPost| {
            NaiveDate::parse_from_str(&p.created_at, "%Y-%m-%d")
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Missing)
        })
        .field("likes", FieldKind::Number, |p: &CommunityPost| FieldValue::Number(i64::from(p.likes)))
        .searchable(|p: &CommunityPost| p.title.clone())
        .searchable(|p: &CommunityPost| p.body.clone())
        .searchable(|p: &CommunityPost| p.location.clone())
}
