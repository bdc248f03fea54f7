use chrono::NaiveDate;
use shared::{
    ActivityView, CalendarDay, CalendarDayType, CalendarMonth, DayGroupView, DestinationGroupView,
    TripSummary,
};

use super::trip_mapper::TripMapper;
use crate::domain::itinerary::{day_total, ActivityWithContext, CalendarGrid, DayGroup, DestinationGroup, ItineraryService};
use crate::domain::models::Trip;
use crate::domain::money::Money;

/// Converts itinerary views into the presentation DTOs, formatting every
/// amount with the configured currency symbol.
pub struct ViewMapper<'c> {
    currency_symbol: &'c str,
}

impl<'c> ViewMapper<'c> {
    pub fn new(currency_symbol: &'c str) -> Self {
        Self { currency_symbol }
    }

    fn money(&self, amount: Money) -> String {
        amount.format_with(self.currency_symbol)
    }

    pub fn to_activity_view(&self, entry: &ActivityWithContext<'_>, trip_start: NaiveDate) -> ActivityView {
        let activity = entry.activity;
        ActivityView {
            destination_index: entry.destination_index,
            destination_name: entry.destination_name.to_string(),
            activity_index: entry.activity_index,
            name: activity.name().to_string(),
            day: activity.day_index(),
            date: activity.resolved_date(trip_start).ok().map(TripMapper::format_date),
            time: activity.formatted_time(),
            formatted_budget: self.money(activity.budget()),
            budget_cents: activity.budget().cents(),
        }
    }

    pub fn to_day_group_view(&self, group: &DayGroup<'_>, trip_start: NaiveDate) -> DayGroupView {
        let total = day_total(group);
        DayGroupView {
            day_number: group.day_number,
            date: TripMapper::format_date(group.date),
            formatted_date: ItineraryService::format_date_for_display(group.date),
            activities: group
                .activities
                .iter()
                .map(|a| self.to_activity_view(a, trip_start))
                .collect(),
            formatted_total: self.money(total),
            total_cents: total.cents(),
        }
    }

    pub fn to_destination_group_view(&self, group: &DestinationGroup<'_>, trip_start: NaiveDate) -> DestinationGroupView {
        let destination = group.destination;
        DestinationGroupView {
            destination_index: group.destination_index,
            name: destination.name().to_string(),
            activities: group
                .activities
                .iter()
                .map(|a| self.to_activity_view(a, trip_start))
                .collect(),
            formatted_total: self.money(destination.total_activity_budget()),
            formatted_ceiling: destination.budget_ceiling().map(|c| self.money(c)),
            over_ceiling: destination.is_over_ceiling(),
        }
    }

    pub fn to_calendar_month(&self, grid: &CalendarGrid<'_>, trip_start: NaiveDate) -> CalendarMonth {
        let days = grid
            .cells
            .iter()
            .enumerate()
            .map(|(position, cell)| match cell {
                Some(cell) => {
                    let total: Money = cell.activities.iter().map(|a| a.activity.budget()).sum();
                    CalendarDay {
                        day: cell.day,
                        date: Some(TripMapper::format_date(cell.date)),
                        trip_day: cell.trip_day,
                        activities: cell
                            .activities
                            .iter()
                            .map(|a| self.to_activity_view(a, trip_start))
                            .collect(),
                        formatted_total: self.money(total),
                        day_type: CalendarDayType::MonthDay,
                    }
                }
                None => CalendarDay {
                    day: 0,
                    date: None,
                    trip_day: None,
                    activities: Vec::new(),
                    formatted_total: self.money(Money::ZERO),
                    day_type: if (position as u32) < grid.leading_blanks {
                        CalendarDayType::PaddingBefore
                    } else {
                        CalendarDayType::PaddingAfter
                    },
                },
            })
            .collect();

        CalendarMonth {
            month: grid.month,
            year: grid.year,
            // Grids are only built for validated months
            month_name: ItineraryService::month_name(grid.month).unwrap_or_default().to_string(),
            days,
            first_day_of_week: grid.leading_blanks,
        }
    }

    pub fn to_trip_summary(&self, trip: &Trip, now: NaiveDate) -> TripSummary {
        TripSummary {
            id: trip.id().to_string(),
            name: trip.name().to_string(),
            description: trip.description().to_string(),
            status: trip.status(now),
            start_date: TripMapper::format_date(trip.window().start()),
            end_date: TripMapper::format_date(trip.window().end()),
            duration_days: trip.duration_days(),
            destination_count: trip.destinations().len(),
            total_activities: trip.total_activities(),
            formatted_total_budget: self.money(trip.total_budget()),
            formatted_total_spend: self.money(trip.total_activity_spend()),
            cover_image: trip.cover_image().map(str::to_string),
        }
    }
}
