use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored shape of a trip, as exchanged with the persistence collaborator.
///
/// Dates are `YYYY-MM-DD` strings and budgets are the raw currency strings the
/// user typed (e.g. `"$1,234.56"`). Both are parsed exactly once, when the
/// document is mapped into the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub destinations: Vec<DestinationDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

/// Stored shape of one destination section of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Budget ceiling for the section's activities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default)]
    pub activities: Vec<ActivityDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An activity as it appears in stored documents.
///
/// Older documents store an activity as a bare string (just its name). Newer
/// ones store a full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityDocument {
    Legacy(String),
    Detailed(ActivityRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub name: String,
    /// 1-based day of the trip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    /// Time of day as `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

/// Lifecycle status of a trip, derived from its dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripStatus {
    /// The trip has not started yet
    Upcoming,
    /// Today falls within the trip's dates
    Ongoing,
    /// The trip's end date has passed
    Completed,
}

impl TripStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TripStatus::Upcoming => "Upcoming",
            TripStatus::Ongoing => "Ongoing",
            TripStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Headline figures for a trip, used by trip cards and the trip detail header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: TripStatus,
    pub start_date: String,
    pub end_date: String,
    pub duration_days: i64,
    pub destination_count: usize,
    pub total_activities: usize,
    pub formatted_total_budget: String,
    pub formatted_total_spend: String,
    pub cover_image: Option<String>,
}

/// An activity formatted for display, with the destination it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    pub destination_index: usize,
    pub destination_name: String,
    pub activity_index: usize,
    pub name: String,
    pub day: Option<u32>,
    /// Resolved calendar date (`YYYY-MM-DD`) when the activity has a day
    pub date: Option<String>,
    pub time: Option<String>,
    pub formatted_budget: String,
    pub budget_cents: i64,
}

/// All activities planned for one day of the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGroupView {
    pub day_number: u32,
    pub date: String,
    pub formatted_date: String,
    pub activities: Vec<ActivityView>,
    pub formatted_total: String,
    pub total_cents: i64,
}

/// All activities of one destination section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationGroupView {
    pub destination_index: usize,
    pub name: String,
    pub activities: Vec<ActivityView>,
    pub formatted_total: String,
    pub formatted_ceiling: Option<String>,
    pub over_ceiling: bool,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding day after the end of the month (only when trailing padding is enabled)
    PaddingAfter,
}

/// Represents a calendar month with the trip's activities placed on it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    pub month_name: String,
    pub days: Vec<CalendarDay>,
    pub first_day_of_week: u32, // offset of the 1st from the configured week start
}

/// Represents a single cell in the calendar grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day of month, 0 for padding cells
    pub day: u32,
    pub date: Option<String>,
    /// Day number within the trip, when the date falls inside the trip
    pub trip_day: Option<u32>,
    pub activities: Vec<ActivityView>,
    pub formatted_total: String,
    pub day_type: CalendarDayType,
}

/// Listing request coming from a search screen: search box, dropdown filters,
/// sort button and group toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterRequest>,
    #[serde(default)]
    pub sort: Option<SortRequest>,
    #[serde(default)]
    pub group: Option<GroupRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    pub field: String,
    #[serde(flatten)]
    pub condition: FilterCondition,
}

/// Filter condition with its operands still in their raw UI form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterCondition {
    Equals { value: String },
    OneOf { values: Vec<String> },
    Range {
        #[serde(default)]
        min: Option<String>,
        #[serde(default)]
        max: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortRequest {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRequest {
    pub field: String,
    /// Order groups alphabetically instead of by first appearance
    #[serde(default)]
    pub alphabetical: bool,
}

/// Result of a listing query: either a flat list or ordered groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResponse<T> {
    Flat { items: Vec<T> },
    Grouped { groups: Vec<ListingGroup<T>> },
}

impl<T> QueryResponse<T> {
    /// Total number of items across all groups
    pub fn len(&self) -> usize {
        match self {
            QueryResponse::Flat { items } => items.len(),
            QueryResponse::Grouped { groups } => groups.iter().map(|g| g.items.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingGroup<T> {
    pub key: String,
    pub items: Vec<T>,
}

/// Community post as listed on the community screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub location: String,
    #[serde(default)]
    pub continent: Option<String>,
    /// Publication date (`YYYY-MM-DD`)
    pub created_at: String,
    #[serde(default)]
    pub likes: u32,
}

/// Engine configuration, stored as `config.yaml` in the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub currency_symbol: String,
    /// First column of the calendar grid
    pub week_starts_on: Weekday,
    /// Pad the last calendar row to a full week
    pub pad_trailing_week: bool,
    pub max_name_length: usize,
    /// Data format version for future migrations
    pub data_format_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            week_starts_on: Weekday::Sun,
            pad_trailing_week: false,
            max_name_length: 256,
            data_format_version: "1.0".to_string(),
        }
    }
}
