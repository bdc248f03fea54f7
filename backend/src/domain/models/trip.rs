//! Domain model for a trip.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::TripStatus;

use super::activity::{validate_name, Activity, DEFAULT_MAX_NAME_LENGTH};
use super::destination::Destination;
use crate::domain::date_window::DateWindow;
use crate::domain::error::{PlannerError, PlannerResult};
use crate::domain::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    id: String,
    name: String,
    description: String,
    window: DateWindow,
    destinations: Vec<Destination>,
    cover_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TripBuilder {
    id: Option<String>,
    name: String,
    max_name_length: usize,
    description: String,
    window: DateWindow,
    destinations: Vec<Destination>,
    cover_image: Option<String>,
}

impl TripBuilder {
    /// Override the name length limit, usually from the engine config
    pub fn max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }

    /// Use an existing identifier instead of generating one
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.trim().to_string();
        self
    }

    pub fn cover_image(mut self, url: &str) -> Self {
        self.cover_image = Some(url.trim().to_string()).filter(|u| !u.is_empty());
        self
    }

    pub fn destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn build(self) -> PlannerResult<Trip> {
        let name = validate_name(&self.name, self.max_name_length)?;
        Ok(Trip {
            id: self.id.unwrap_or_else(Trip::generate_id),
            name,
            description: self.description,
            window: self.window,
            destinations: self.destinations,
            cover_image: self.cover_image,
        })
    }
}

/// Partial edit of a destination section. `None` leaves a field unchanged;
/// `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationPatch {
    pub name: Option<String>,
    pub window: Option<Option<DateWindow>>,
    pub budget_ceiling: Option<Option<Money>>,
    pub notes: Option<Option<String>>,
}

impl Trip {
    pub fn builder(name: &str, window: DateWindow) -> TripBuilder {
        TripBuilder {
            id: None,
            name: name.to_string(),
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            description: String::new(),
            window,
            destinations: Vec::new(),
            cover_image: None,
        }
    }

    pub fn generate_id() -> String {
        format!("trip::{}", uuid::Uuid::new_v4())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn start(&self) -> NaiveDate {
        self.window.start()
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.cover_image.as_deref()
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn destination(&self, index: usize) -> PlannerResult<&Destination> {
        let len = self.destinations.len();
        self.destinations
            .get(index)
            .ok_or(PlannerError::IndexOutOfRange { index, len })
    }

    fn destination_mut(&mut self, index: usize) -> PlannerResult<&mut Destination> {
        let len = self.destinations.len();
        self.destinations
            .get_mut(index)
            .ok_or(PlannerError::IndexOutOfRange { index, len })
    }

    pub fn add_destination(&mut self, destination: Destination) {
        self.destinations.push(destination);
    }

    /// Remove a destination together with all of its activities
    pub fn remove_destination(&mut self, index: usize) -> PlannerResult<Destination> {
        if index >= self.destinations.len() {
            return Err(PlannerError::IndexOutOfRange {
                index,
                len: self.destinations.len(),
            });
        }
        Ok(self.destinations.remove(index))
    }

    /// Apply a patch to one destination. The whole patch is validated before
    /// any field is changed.
    pub fn update_destination(&mut self, index: usize, patch: DestinationPatch) -> PlannerResult<()> {
        self.update_destination_with_name_limit(index, patch, DEFAULT_MAX_NAME_LENGTH)
    }

    pub fn update_destination_with_name_limit(
        &mut self,
        index: usize,
        patch: DestinationPatch,
        max_name_length: usize,
    ) -> PlannerResult<()> {
        let name = patch
            .name
            .as_deref()
            .map(|n| validate_name(n, max_name_length))
            .transpose()?;
        if let Some(Some(ceiling)) = patch.budget_ceiling {
            if ceiling.is_negative() {
                return Err(PlannerError::InvalidAmount(ceiling.to_plain_string()));
            }
        }

        let destination = self.destination_mut(index)?;
        if let Some(name) = name {
            destination.set_name(name);
        }
        if let Some(window) = patch.window {
            destination.set_window(window);
        }
        if let Some(ceiling) = patch.budget_ceiling {
            destination.set_budget_ceiling(ceiling)?;
        }
        if let Some(notes) = patch.notes {
            destination.set_notes(notes);
        }
        Ok(())
    }

    pub fn add_activity(&mut self, destination_index: usize, activity: Activity) -> PlannerResult<()> {
        self.destination_mut(destination_index)?.add_activity(activity)
    }

    pub fn update_activity(
        &mut self,
        destination_index: usize,
        activity_index: usize,
        activity: Activity,
    ) -> PlannerResult<()> {
        self.destination_mut(destination_index)?
            .update_activity(activity_index, activity)
    }

    pub fn remove_activity(
        &mut self,
        destination_index: usize,
        activity_index: usize,
    ) -> PlannerResult<&[Activity]> {
        self.destination_mut(destination_index)?
            .remove_activity(activity_index)
    }

    /// Status relative to `now`, derived fresh on every call
    pub fn status(&self, now: NaiveDate) -> TripStatus {
        if now < self.window.start() {
            TripStatus::Upcoming
        } else if now > self.window.end() {
            TripStatus::Completed
        } else {
            TripStatus::Ongoing
        }
    }

    /// Sum of destination ceilings, falling back to planned activity spend for
    /// destinations without one
    pub fn total_budget(&self) -> Money {
        self.destinations.iter().map(Destination::planned_budget).sum()
    }

    /// Sum of every activity budget across all destinations
    pub fn total_activity_spend(&self) -> Money {
        self.destinations
            .iter()
            .map(Destination::total_activity_budget)
            .sum()
    }

    pub fn total_activities(&self) -> usize {
        self.destinations.iter().map(|d| d.activities().len()).sum()
    }

    pub fn duration_days(&self) -> i64 {
        self.window.duration_days()
    }
}
