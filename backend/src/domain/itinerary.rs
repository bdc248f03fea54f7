//! Itinerary views for a trip.
//!
//! This module turns the trip's nested destinations and activities into the
//! two views the presentation layer renders: a day-by-day list and a month
//! calendar grid. Activity day indexes are resolved against the trip's start
//! date here and nowhere else. Activities without a day index only show up in
//! the per-destination grouping.

use chrono::{Datelike, NaiveDate, Weekday};
use shared::EngineConfig;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::error::{PlannerError, PlannerResult};
use super::models::{Activity, Destination, Trip};
use super::money::Money;

/// An activity together with where it sits in the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWithContext<'a> {
    pub destination_index: usize,
    pub destination_name: &'a str,
    pub activity_index: usize,
    pub activity: &'a Activity,
}

/// Activities planned for one day of the trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup<'a> {
    pub day_number: u32,
    pub date: NaiveDate,
    pub activities: Vec<ActivityWithContext<'a>>,
}

/// Every activity of one destination, dated or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationGroup<'a> {
    pub destination_index: usize,
    pub destination: &'a Destination,
    pub activities: Vec<ActivityWithContext<'a>>,
}

/// One day of a calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    pub day: u32,
    /// Day number within the trip when the date falls inside the trip window
    pub trip_day: Option<u32>,
    pub activities: Vec<ActivityWithContext<'a>>,
}

/// Month grid laid out in 7 columns. `None` cells are padding.
///
/// The grid ends on the last day of the month unless trailing padding is
/// enabled, in which case the final row is filled up to 7 cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid<'a> {
    pub month: u32,
    pub year: i32,
    pub leading_blanks: u32,
    pub days_in_month: u32,
    pub cells: Vec<Option<CalendarCell<'a>>>,
}

impl<'a> CalendarGrid<'a> {
    /// Rows of the grid; the last row may be shorter than 7 cells
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<CalendarCell<'a>>]> {
        self.cells.chunks(7)
    }

    pub fn cell_for(&self, day: u32) -> Option<&CalendarCell<'a>> {
        if day == 0 || day > self.days_in_month {
            return None;
        }
        self.cells
            .get((self.leading_blanks + day - 1) as usize)
            .and_then(Option::as_ref)
    }
}

/// Every activity of the trip in destination-then-insertion order
pub fn activities_with_context(trip: &Trip) -> impl Iterator<Item = ActivityWithContext<'_>> {
    trip.destinations()
        .iter()
        .enumerate()
        .flat_map(|(destination_index, destination)| {
            destination
                .activities()
                .iter()
                .enumerate()
                .map(move |(activity_index, activity)| ActivityWithContext {
                    destination_index,
                    destination_name: destination.name(),
                    activity_index,
                    activity,
                })
        })
}

pub fn day_total(group: &DayGroup<'_>) -> Money {
    group.activities.iter().map(|a| a.activity.budget()).sum()
}

/// Itinerary service that builds the day-wise and calendar views
#[derive(Debug, Clone)]
pub struct ItineraryService {
    week_starts_on: Weekday,
    pad_trailing_week: bool,
}

impl ItineraryService {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            week_starts_on: config.week_starts_on,
            pad_trailing_week: config.pad_trailing_week,
        }
    }

    /// Group dated activities by day number, days ascending
    pub fn build_day_wise_view<'a>(&self, trip: &'a Trip) -> Vec<DayGroup<'a>> {
        let mut by_day: BTreeMap<u32, Vec<ActivityWithContext<'a>>> = BTreeMap::new();
        for entry in activities_with_context(trip) {
            if let Some(day_index) = entry.activity.day_index() {
                by_day.entry(day_index).or_default().push(entry);
            }
        }

        by_day
            .into_iter()
            .filter_map(|(day_number, activities)| {
                let date = activities.first()?.activity.resolved_date(trip.start()).ok()?;
                Some(DayGroup {
                    day_number,
                    date,
                    activities,
                })
            })
            .collect()
    }

    pub fn group_by_destination<'a>(&self, trip: &'a Trip) -> Vec<DestinationGroup<'a>> {
        trip.destinations()
            .iter()
            .enumerate()
            .map(|(destination_index, destination)| DestinationGroup {
                destination_index,
                destination,
                activities: activities_with_context(trip)
                    .filter(|a| a.destination_index == destination_index)
                    .collect(),
            })
            .collect()
    }

    /// Build the month grid for `month`/`year` with the trip's activities placed on their dates
    pub fn build_calendar_grid<'a>(&self, trip: &'a Trip, month: u32, year: i32) -> PlannerResult<CalendarGrid<'a>> {
        let first = first_of_month(month, year)?;
        let days_in_month = Self::days_in_month(month, year)?;
        let leading_blanks = self.first_day_offset(first);

        debug!(
            "Generating calendar for {}/{}: {} days, {} leading blanks",
            month, year, days_in_month, leading_blanks
        );

        let mut by_day = self.group_activities_by_day(trip, month, year);

        let mut cells: Vec<Option<CalendarCell<'a>>> = Vec::with_capacity((leading_blanks + days_in_month) as usize + 6);
        cells.extend((0..leading_blanks).map(|_| None));
        for (day, date) in (1..=days_in_month).zip(first.iter_days()) {
            cells.push(Some(CalendarCell {
                date,
                day,
                trip_day: trip.window().day_number_of(date),
                activities: by_day.remove(&day).unwrap_or_default(),
            }));
        }
        if self.pad_trailing_week {
            let trailing = (7 - cells.len() % 7) % 7;
            cells.extend((0..trailing).map(|_| None));
        }

        Ok(CalendarGrid {
            month,
            year,
            leading_blanks,
            days_in_month,
            cells,
        })
    }

    /// Dated activities falling in the given month, keyed by day of month
    fn group_activities_by_day<'a>(
        &self,
        trip: &'a Trip,
        month: u32,
        year: i32,
    ) -> HashMap<u32, Vec<ActivityWithContext<'a>>> {
        let mut by_day: HashMap<u32, Vec<ActivityWithContext<'a>>> = HashMap::new();
        for entry in activities_with_context(trip) {
            // Undated activities have no place on the calendar
            let Ok(date) = entry.activity.resolved_date(trip.start()) else {
                continue;
            };
            if date.month() == month && date.year() == year {
                by_day.entry(date.day()).or_default().push(entry);
            }
        }
        by_day
    }

    /// Number of blank cells before the 1st, given the configured week start
    fn first_day_offset(&self, first: NaiveDate) -> u32 {
        let weekday = first.weekday().num_days_from_monday();
        let week_start = self.week_starts_on.num_days_from_monday();
        (7 + weekday - week_start) % 7
    }

    /// Every (month, year) pair the trip touches, in order
    pub fn trip_months(&self, trip: &Trip) -> Vec<(u32, i32)> {
        let (end_month, end_year) = (trip.window().end().month(), trip.window().end().year());
        let mut current = (trip.start().month(), trip.start().year());
        let mut months = vec![current];
        while current != (end_month, end_year) {
            current = Self::next_month(current.0, current.1);
            months.push(current);
        }
        months
    }

    pub fn days_in_month(month: u32, year: i32) -> PlannerResult<u32> {
        let first = first_of_month(month, year)?;
        let (next_month, next_year) = Self::next_month(month, year);
        let next_first = first_of_month(next_month, next_year)?;
        Ok((next_first - first).num_days() as u32)
    }

    /// Get the human-readable name for a month number
    pub fn month_name(month: u32) -> PlannerResult<&'static str> {
        Ok(match month {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => return Err(PlannerError::InvalidMonth(month)),
        })
    }

    /// Format a date for human-readable display, e.g. "June 13, 2025"
    pub fn format_date_for_display(date: NaiveDate) -> String {
        // chrono months are always 1..=12
        let month = Self::month_name(date.month()).unwrap_or_default();
        format!("{} {}, {}", month, date.day(), date.year())
    }

    pub fn previous_month(month: u32, year: i32) -> (u32, i32) {
        if month == 1 {
            (12, year - 1)
        } else {
            (month - 1, year)
        }
    }

    pub fn next_month(month: u32, year: i32) -> (u32, i32) {
        if month == 12 {
            (1, year + 1)
        } else {
            (month + 1, year)
        }
    }
}

impl Default for ItineraryService {
    fn default() -> Self {
        Self::new()
    }
}

fn first_of_month(month: u32, year: i32) -> PlannerResult<NaiveDate> {
    if !(1..=12).contains(&month) {
        return Err(PlannerError::InvalidMonth(month));
    }
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(PlannerError::InvalidMonth(month))
}
