//! Conversion between stored trip documents and the domain model.
//!
//! This is the persistence boundary: dates and currency strings are parsed
//! here once, and legacy bare-string activities are normalized into regular
//! undated, zero-budget activities. Blank legacy entries are dropped.
//!
//! Name lengths are checked against the configured limit when a name is
//! written, so loading stored data only requires names to be non-blank.

use chrono::NaiveDate;
use shared::{ActivityDocument, ActivityRecord, DestinationDocument, TripDocument};
use tracing::warn;

use crate::domain::commands::activities::ActivityCommand;
use crate::domain::commands::trips::DateRangeInput;
use crate::domain::date_window::DateWindow;
use crate::domain::error::PlannerError;
use crate::domain::models::{parse_time_of_day, Activity, Destination, Trip};
use crate::domain::money::Money;

const DATE_FORMAT: &str = "%Y-%m-%d";
const STORED_NAME_LIMIT: usize = usize::MAX;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Invalid {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },
    #[error("Destination {0:?} needs both a start and an end date")]
    IncompleteWindow(String),
    #[error(transparent)]
    Domain(#[from] PlannerError),
}

pub struct TripMapper;

impl TripMapper {
    /// Convert a stored document into a domain trip
    pub fn to_domain(doc: &TripDocument) -> Result<Trip, MappingError> {
        let window = Self::parse_window(&doc.start_date, &doc.end_date)?;
        let mut builder = Trip::builder(&doc.name, window)
            .max_name_length(STORED_NAME_LIMIT)
            .description(&doc.description);
        if let Some(id) = &doc.id {
            builder = builder.id(id);
        }
        if let Some(url) = &doc.cover_image {
            builder = builder.cover_image(url);
        }
        for destination in &doc.destinations {
            builder = builder.destination(Self::destination_to_domain(destination)?);
        }
        Ok(builder.build()?)
    }

    /// Convert a domain trip into its stored form
    pub fn to_document(trip: &Trip) -> TripDocument {
        TripDocument {
            id: Some(trip.id().to_string()),
            name: trip.name().to_string(),
            description: trip.description().to_string(),
            start_date: Self::format_date(trip.window().start()),
            end_date: Self::format_date(trip.window().end()),
            destinations: trip.destinations().iter().map(Self::destination_to_document).collect(),
            cover_image: trip.cover_image().map(str::to_string),
        }
    }

    /// Stored destinations are restored as-is, even when a lowered ceiling
    /// leaves them over budget.
    fn destination_to_domain(doc: &DestinationDocument) -> Result<Destination, MappingError> {
        let window = match (&doc.start_date, &doc.end_date) {
            (Some(start), Some(end)) => Some(Self::parse_window(start, end)?),
            (None, None) => None,
            _ => return Err(MappingError::IncompleteWindow(doc.name.clone())),
        };
        let ceiling = Self::parse_optional_amount(doc.budget.as_deref())?;
        let activities = doc
            .activities
            .iter()
            .filter(|activity| match activity {
                ActivityDocument::Legacy(name) if name.trim().is_empty() => {
                    warn!("Dropping blank legacy activity in destination '{}'", doc.name);
                    false
                }
                _ => true,
            })
            .map(Self::activity_to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        let destination = Destination::restore(&doc.name, window, ceiling, activities, doc.notes.clone())?;
        if destination.is_over_ceiling() {
            warn!(
                "Destination '{}' is over its budget ceiling ({} planned, ceiling {})",
                destination.name(),
                destination.total_activity_budget(),
                destination.budget_ceiling().unwrap_or_default()
            );
        }
        Ok(destination)
    }

    fn destination_to_document(destination: &Destination) -> DestinationDocument {
        DestinationDocument {
            name: destination.name().to_string(),
            start_date: destination.window().map(|w| Self::format_date(w.start())),
            end_date: destination.window().map(|w| Self::format_date(w.end())),
            budget: destination.budget_ceiling().map(|c| c.to_plain_string()),
            activities: destination
                .activities()
                .iter()
                .map(|a| ActivityDocument::Detailed(Self::activity_to_record(a)))
                .collect(),
            notes: destination.notes().map(str::to_string),
        }
    }

    /// Normalize either stored activity shape into a domain activity
    pub fn activity_to_domain(doc: &ActivityDocument) -> Result<Activity, MappingError> {
        match doc {
            ActivityDocument::Legacy(name) => {
                Ok(Activity::with_name_limit(name, Money::ZERO, STORED_NAME_LIMIT)?)
            }
            ActivityDocument::Detailed(record) => Self::record_to_activity(
                &record.name,
                record.day,
                record.time.as_deref(),
                record.budget.as_deref(),
                STORED_NAME_LIMIT,
            ),
        }
    }

    fn activity_to_record(activity: &Activity) -> ActivityRecord {
        ActivityRecord {
            name: activity.name().to_string(),
            day: activity.day_index(),
            time: activity.formatted_time(),
            budget: Some(activity.budget().to_plain_string()),
        }
    }

    /// Build an activity from user input
    pub fn command_to_activity(command: &ActivityCommand, max_name_length: usize) -> Result<Activity, MappingError> {
        Self::record_to_activity(
            &command.name,
            command.day,
            command.time.as_deref(),
            command.budget.as_deref(),
            max_name_length,
        )
    }

    fn record_to_activity(
        name: &str,
        day: Option<u32>,
        time: Option<&str>,
        budget: Option<&str>,
        max_name_length: usize,
    ) -> Result<Activity, MappingError> {
        let budget = Self::parse_optional_amount(budget)?.unwrap_or(Money::ZERO);
        let mut activity = Activity::with_name_limit(name, budget, max_name_length)?;
        if let Some(day) = day {
            activity = activity.on_day(day)?;
        }
        if let Some(time) = time.filter(|t| !t.trim().is_empty()) {
            activity = activity.at(parse_time_of_day(time)?);
        }
        Ok(activity)
    }

    /// Blank amounts count as "not set"; anything else must be a valid budget
    pub fn parse_optional_amount(raw: Option<&str>) -> Result<Option<Money>, MappingError> {
        match raw.map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => Ok(Some(Money::parse_budget(raw)?)),
            None => Ok(None),
        }
    }

    pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, MappingError> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| MappingError::InvalidDate {
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    pub fn parse_window(start: &str, end: &str) -> Result<DateWindow, MappingError> {
        let start = Self::parse_date("start_date", start)?;
        let end = Self::parse_date("end_date", end)?;
        Ok(DateWindow::create(start, end)?)
    }

    pub fn parse_range_input(input: &DateRangeInput) -> Result<DateWindow, MappingError> {
        Self::parse_window(&input.start_date, &input.end_date)
    }

    pub fn format_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_document() -> TripDocument {
        serde_json::from_str(
            r#"{
                "id": "trip::japan",
                "name": "Japan",
                "description": "Spring trip",
                "start_date": "2025-04-01",
                "end_date": "2025-04-12",
                "destinations": [
                    {
                        "name": "Tokyo",
                        "start_date": "2025-04-01",
                        "end_date": "2025-04-06",
                        "budget": "$1,000",
                        "activities": [
                            "Shibuya crossing",
                            {"name": "Sumo", "day": 2, "time": "13:00", "budget": "$120.50"}
                        ]
                    },
                    {"name": "Kyoto", "activities": [{"name": "Temples", "day": 7}]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_to_domain_normalizes_legacy_activities() {
        let trip = TripMapper::to_domain(&create_test_document()).unwrap();

        assert_eq!(trip.id(), "trip::japan");
        let tokyo = trip.destination(0).unwrap();
        assert_eq!(tokyo.budget_ceiling(), Some(Money::from_dollars(1_000)));
        assert_eq!(tokyo.window().unwrap().duration_days(), 5);

        let legacy = &tokyo.activities()[0];
        assert_eq!(legacy.name(), "Shibuya crossing");
        assert_eq!(legacy.day_index(), None);
        assert_eq!(legacy.budget(), Money::ZERO);

        let sumo = &tokyo.activities()[1];
        assert_eq!(sumo.day_index(), Some(2));
        assert_eq!(sumo.formatted_time().as_deref(), Some("13:00"));
        assert_eq!(sumo.budget(), Money::from_cents(12_050));

        let kyoto = trip.destination(1).unwrap();
        assert!(kyoto.window().is_none());
        assert_eq!(kyoto.budget_ceiling(), None);
        assert_eq!(trip.total_budget(), Money::from_dollars(1_000));
    }

    #[test]
    fn test_round_trip_keeps_values() {
        let trip = TripMapper::to_domain(&create_test_document()).unwrap();
        let document = TripMapper::to_document(&trip);

        assert_eq!(document.destinations[0].budget.as_deref(), Some("1000.00"));
        assert!(matches!(document.destinations[0].activities[0], ActivityDocument::Detailed(_)));
        assert_eq!(TripMapper::to_domain(&document).unwrap(), trip);
    }

    #[test]
    fn test_over_ceiling_documents_still_load() {
        let mut document = create_test_document();
        document.destinations[0].budget = Some("$50".to_string());

        let trip = TripMapper::to_domain(&document).unwrap();
        assert!(trip.destination(0).unwrap().is_over_ceiling());
    }

    #[test]
    fn test_invalid_documents_are_rejected() {
        let mut bad_date = create_test_document();
        bad_date.start_date = "04/01/2025".to_string();
        assert!(matches!(
            TripMapper::to_domain(&bad_date),
            Err(MappingError::InvalidDate { .. })
        ));

        let mut inverted = create_test_document();
        inverted.end_date = "2025-03-01".to_string();
        assert_eq!(
            TripMapper::to_domain(&inverted).unwrap_err(),
            MappingError::Domain(PlannerError::InvalidRange)
        );

        let mut half_window = create_test_document();
        half_window.destinations[1].start_date = Some("2025-04-07".to_string());
        assert_eq!(
            TripMapper::to_domain(&half_window).unwrap_err(),
            MappingError::IncompleteWindow("Kyoto".to_string())
        );

        let mut bad_amount = create_test_document();
        bad_amount.destinations[0].budget = Some("lots".to_string());
        assert!(matches!(
            TripMapper::to_domain(&bad_amount),
            Err(MappingError::Domain(PlannerError::InvalidAmount(_)))
        ));
    }

    #[test]
    fn test_blank_legacy_activities_are_dropped() {
        let mut document = create_test_document();
        document.destinations[1].activities.insert(0, ActivityDocument::Legacy("   ".to_string()));

        let trip = TripMapper::to_domain(&document).unwrap();

        let kyoto = trip.destination(1).unwrap();
        assert_eq!(kyoto.activities().len(), 1);
        assert_eq!(kyoto.activities()[0].name(), "Temples");
    }

    #[test]
    fn test_long_stored_names_still_load() {
        let long_name = "k".repeat(300);
        let mut document = create_test_document();
        document.name = long_name.clone();
        document.destinations[1].name = long_name.clone();
        document.destinations[1].activities.push(ActivityDocument::Legacy(long_name.clone()));

        let trip = TripMapper::to_domain(&document).unwrap();

        assert_eq!(trip.name(), long_name);
        assert_eq!(trip.destination(1).unwrap().activities()[1].name(), long_name);
    }

    #[test]
    fn test_huge_day_index_is_rejected() {
        let command = ActivityCommand {
            name: "Far future".to_string(),
            day: Some(4_000_000_000),
            ..Default::default()
        };

        assert_eq!(
            TripMapper::command_to_activity(&command, 256).unwrap_err(),
            MappingError::Domain(PlannerError::InvalidDayIndex(4_000_000_000))
        );
    }

    #[test]
    fn test_command_to_activity() {
        let command = ActivityCommand {
            name: "Ramen tour".to_string(),
            day: Some(3),
            time: Some("  ".to_string()),
            budget: Some("$45".to_string()),
        };
        let activity = TripMapper::command_to_activity(&command, 256).unwrap();
        assert_eq!(activity.day_index(), Some(3));
        assert_eq!(activity.time_of_day(), None);
        assert_eq!(activity.budget(), Money::from_dollars(45));

        let negative = ActivityCommand {
            budget: Some("-$5".to_string()),
            ..command.clone()
        };
        assert!(TripMapper::command_to_activity(&negative, 256).is_err());

        let too_long = ActivityCommand {
            name: "x".repeat(11),
            ..command
        };
        assert!(matches!(
            TripMapper::command_to_activity(&too_long, 10),
            Err(MappingError::Domain(PlannerError::NameTooLong { len: 11, max: 10 }))
        ));
    }
}
