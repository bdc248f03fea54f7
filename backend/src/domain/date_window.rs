use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{PlannerError, PlannerResult};

/// A validated date range with `start < end`.
///
/// Containment is inclusive on both ends, so a trip running from the 1st to
/// the 10th is still ongoing on the 10th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn create(start: NaiveDate, end: NaiveDate) -> PlannerResult<Self> {
        if end <= start {
            return Err(PlannerError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end; a window ending the day after it starts lasts one day
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, other: &DateWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Every date in the window, start and end included
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..=self.duration_days()).map(move |offset| start + Duration::days(offset))
    }

    /// 1-based position of `date` within the window
    pub fn day_number_of(&self, date: NaiveDate) -> Option<u32> {
        if !self.contains(date) {
            return None;
        }
        u32::try_from((date - self.start).num_days() + 1).ok()
    }
}
