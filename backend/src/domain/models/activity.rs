//! Domain model for a single planned activity.
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::error::{PlannerError, PlannerResult};
use crate::domain::money::Money;

/// Names longer than this are rejected unless a configured limit says otherwise
pub const DEFAULT_MAX_NAME_LENGTH: usize = 256;

/// Highest accepted day index, roughly ten years of travel
pub const MAX_DAY_INDEX: u32 = 3_660;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    name: String,
    day_index: Option<u32>, // 1-based, relative to the trip's start date
    time_of_day: Option<NaiveTime>,
    budget: Money,
}

impl Activity {
    /// Create an undated activity with the given budget
    pub fn new(name: &str, budget: Money) -> PlannerResult<Self> {
        Self::with_name_limit(name, budget, DEFAULT_MAX_NAME_LENGTH)
    }

    pub fn with_name_limit(name: &str, budget: Money, max_name_length: usize) -> PlannerResult<Self> {
        let name = validate_name(name, max_name_length)?;
        if budget.is_negative() || budget > Money::MAX {
            return Err(PlannerError::InvalidAmount(budget.to_plain_string()));
        }
        Ok(Self {
            name,
            day_index: None,
            time_of_day: None,
            budget,
        })
    }

    /// Place the activity on a day of the trip (1 = the trip's first day)
    pub fn on_day(mut self, day_index: u32) -> PlannerResult<Self> {
        if day_index == 0 || day_index > MAX_DAY_INDEX {
            return Err(PlannerError::InvalidDayIndex(day_index));
        }
        self.day_index = Some(day_index);
        Ok(self)
    }

    pub fn at(mut self, time_of_day: NaiveTime) -> Self {
        self.time_of_day = Some(time_of_day);
        self
    }

    /// Set the time of day from an `HH:MM` string
    pub fn at_time(self, raw: &str) -> PlannerResult<Self> {
        let time = parse_time_of_day(raw)?;
        Ok(self.at(time))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn day_index(&self) -> Option<u32> {
        self.day_index
    }

    pub fn time_of_day(&self) -> Option<NaiveTime> {
        self.time_of_day
    }

    pub fn budget(&self) -> Money {
        self.budget
    }

    /// The calendar date this activity falls on for a trip starting on `trip_start`
    pub fn resolved_date(&self, trip_start: NaiveDate) -> PlannerResult<NaiveDate> {
        let day_index = self.day_index.ok_or(PlannerError::NoDayIndex)?;
        day_index
            .checked_sub(1)
            .and_then(|offset| trip_start.checked_add_days(Days::new(u64::from(offset))))
            .ok_or(PlannerError::InvalidDayIndex(day_index))
    }

    /// Time of day rendered as `HH:MM`
    pub fn formatted_time(&self) -> Option<String> {
        self.time_of_day.map(|t| t.format("%H:%M").to_string())
    }
}

pub(crate) fn validate_name(name: &str, max_name_length: usize) -> PlannerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::EmptyName);
    }
    let len = trimmed.chars().count();
    if len > max_name_length {
        return Err(PlannerError::NameTooLong { len, max: max_name_length });
    }
    Ok(trimmed.to_string())
}

pub fn parse_time_of_day(raw: &str) -> PlannerResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| PlannerError::InvalidTimeOfDay(raw.to_string()))
}
