//! Trip service for the itinerary engine.
//!
//! Coordinates storage, the persistence mappers and the pure domain model.
//! Every user edit follows the same shape:
//!
//! 1. parse the raw command input (dates, amounts, times) once
//! 2. take the per-trip lock
//! 3. load the stored document and map it into a [`Trip`]
//! 4. apply exactly one domain mutation
//! 5. save the trip, unless the mutation was rejected
//!
//! Read-side methods build the day-wise, per-destination and calendar views
//! and run the listing screens through the query pipeline. Callers pass `now`
//! explicitly wherever trip status matters.

use chrono::NaiveDate;
use shared::{
    ActivityView, CalendarMonth, CommunityPost, DayGroupView, DestinationGroupView, EngineConfig,
    QueryRequest, QueryResponse, TripSummary,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::commands::activities::ActivityCommand;
use super::commands::trips::{AddDestinationCommand, CreateTripCommand, UpdateDestinationCommand};
use super::error::PlannerError;
use super::itinerary::{activities_with_context, ItineraryService};
use super::listing::{activity_fields, post_fields, trip_fields};
use super::models::activity::validate_name;
use super::models::{Activity, Destination, DestinationPatch, Trip};
use super::query::{evaluate, QueryError};
use crate::io::mappers::{MappingError, QueryMapper, TripMapper, ViewMapper};
use crate::storage::TripStorage;

#[derive(Debug, thiserror::Error)]
pub enum TripServiceError {
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type TripServiceResult<T> = Result<T, TripServiceError>;

/// Service for managing trips and deriving their views
pub struct TripService<S: TripStorage> {
    storage: Arc<S>,
    itinerary: ItineraryService,
    config: EngineConfig,
    trip_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: TripStorage> TripService<S> {
    pub fn new(storage: Arc<S>, config: EngineConfig) -> Self {
        Self {
            storage,
            itinerary: ItineraryService::with_config(&config),
            config,
            trip_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn view_mapper(&self) -> ViewMapper<'_> {
        ViewMapper::new(&self.config.currency_symbol)
    }

    /// Lock for one trip id. Entries nobody else holds are pruned on the way.
    fn trip_lock(&self, trip_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.trip_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|id, lock| id == trip_id || Arc::strong_count(lock) > 1);
        locks.entry(trip_id.to_string()).or_default().clone()
    }

    fn release_trip_lock(&self, trip_id: &str) {
        let mut locks = self.trip_locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(trip_id).map_or(false, |lock| Arc::strong_count(lock) == 1) {
            locks.remove(trip_id);
        }
    }

    fn load_trip(&self, trip_id: &str) -> TripServiceResult<Trip> {
        let document = self
            .storage
            .get_trip(trip_id)?
            .ok_or_else(|| TripServiceError::TripNotFound(trip_id.to_string()))?;
        Ok(TripMapper::to_domain(&document)?)
    }

    fn save_trip(&self, trip: &Trip) -> TripServiceResult<()> {
        self.storage.store_trip(&TripMapper::to_document(trip))?;
        Ok(())
    }

    /// Load, mutate and save one trip while holding its lock
    fn mutate_trip<F>(&self, trip_id: &str, mutation: F) -> TripServiceResult<Trip>
    where
        F: FnOnce(&mut Trip) -> Result<(), PlannerError>,
    {
        let lock = self.trip_lock(trip_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut trip = self.load_trip(trip_id)?;
        if let Err(e) = mutation(&mut trip) {
            warn!("Rejected change to trip {}: {}", trip_id, e);
            return Err(e.into());
        }
        self.save_trip(&trip)?;
        Ok(trip)
    }

    fn checked_name(&self, name: &str) -> TripServiceResult<String> {
        Ok(validate_name(name, self.config.max_name_length)?)
    }

    /// Create and store a new trip
    pub fn create_trip(&self, command: CreateTripCommand) -> TripServiceResult<Trip> {
        info!("Creating trip: {:?}", command.name);

        let name = self.checked_name(&command.name)?;
        let window = TripMapper::parse_window(&command.start_date, &command.end_date)?;
        let mut builder = Trip::builder(&name, window)
            .max_name_length(self.config.max_name_length)
            .description(&command.description);
        if let Some(url) = &command.cover_image {
            builder = builder.cover_image(url);
        }
        let trip = builder.build()?;

        self.save_trip(&trip)?;
        info!("Created trip {} ({} days)", trip.id(), trip.duration_days());
        Ok(trip)
    }

    pub fn get_trip(&self, trip_id: &str) -> TripServiceResult<Trip> {
        self.load_trip(trip_id)
    }

    /// Summaries of every stored trip, status derived relative to `now`
    pub fn list_trips(&self, now: NaiveDate) -> TripServiceResult<Vec<TripSummary>> {
        let mapper = self.view_mapper();
        Ok(self
            .load_all_trips()?
            .iter()
            .map(|trip| mapper.to_trip_summary(trip, now))
            .collect())
    }

    /// Every stored trip that maps cleanly; broken documents are logged and skipped
    fn load_all_trips(&self) -> TripServiceResult<Vec<Trip>> {
        let trips = self
            .storage
            .list_trips()?
            .iter()
            .filter_map(|doc| match TripMapper::to_domain(doc) {
                Ok(trip) => Some(trip),
                Err(e) => {
                    warn!(
                        "Skipping trip {} ('{}'): {}",
                        doc.id.as_deref().unwrap_or("<no id>"),
                        doc.name,
                        e
                    );
                    None
                }
            })
            .collect();
        Ok(trips)
    }

    pub fn delete_trip(&self, trip_id: &str) -> TripServiceResult<()> {
        let deleted = {
            let lock = self.trip_lock(trip_id);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.storage.delete_trip(trip_id)
        };
        self.release_trip_lock(trip_id);

        if !deleted? {
            return Err(TripServiceError::TripNotFound(trip_id.to_string()));
        }
        info!("Deleted trip {}", trip_id);
        Ok(())
    }

    pub fn trip_summary(&self, trip_id: &str, now: NaiveDate) -> TripServiceResult<TripSummary> {
        let trip = self.load_trip(trip_id)?;
        Ok(self.view_mapper().to_trip_summary(&trip, now))
    }

    pub fn add_destination(&self, trip_id: &str, command: AddDestinationCommand) -> TripServiceResult<Trip> {
        let name = self.checked_name(&command.name)?;
        let mut builder = Destination::builder(&name).max_name_length(self.config.max_name_length);
        if let Some(dates) = &command.dates {
            builder = builder.window(TripMapper::parse_range_input(dates)?);
        }
        if let Some(ceiling) = TripMapper::parse_optional_amount(command.budget.as_deref())? {
            builder = builder.budget_ceiling(ceiling);
        }
        if let Some(notes) = &command.notes {
            builder = builder.notes(notes);
        }
        let destination = builder.build()?;

        info!("Adding destination '{}' to trip {}", destination.name(), trip_id);
        self.mutate_trip(trip_id, |trip| {
            trip.add_destination(destination);
            Ok(())
        })
    }

    pub fn update_destination(
        &self,
        trip_id: &str,
        destination_index: usize,
        command: UpdateDestinationCommand,
    ) -> TripServiceResult<Trip> {
        let patch = DestinationPatch {
            name: command.name.as_deref().map(|n| self.checked_name(n)).transpose()?,
            window: command
                .dates
                .as_ref()
                .map(|dates| dates.as_ref().map(TripMapper::parse_range_input).transpose())
                .transpose()?,
            budget_ceiling: command
                .budget
                .as_ref()
                .map(|budget| TripMapper::parse_optional_amount(budget.as_deref()))
                .transpose()?,
            notes: command.notes,
        };

        debug!("Updating destination {} of trip {}: {:?}", destination_index, trip_id, patch);
        let max_name_length = self.config.max_name_length;
        self.mutate_trip(trip_id, |trip| {
            trip.update_destination_with_name_limit(destination_index, patch, max_name_length)
        })
    }

    /// Remove a destination and every activity planned under it
    pub fn remove_destination(&self, trip_id: &str, destination_index: usize) -> TripServiceResult<Trip> {
        self.mutate_trip(trip_id, |trip| {
            let removed = trip.remove_destination(destination_index)?;
            info!(
                "Removed destination '{}' ({} activities) from trip {}",
                removed.name(),
                removed.activities().len(),
                trip_id
            );
            Ok(())
        })
    }

    fn command_to_activity(&self, command: &ActivityCommand) -> TripServiceResult<Activity> {
        Ok(TripMapper::command_to_activity(command, self.config.max_name_length)?)
    }

    pub fn add_activity(
        &self,
        trip_id: &str,
        destination_index: usize,
        command: &ActivityCommand,
    ) -> TripServiceResult<Trip> {
        let activity = self.command_to_activity(command)?;
        info!(
            "Adding activity '{}' ({}) to destination {} of trip {}",
            activity.name(),
            activity.budget(),
            destination_index,
            trip_id
        );
        self.mutate_trip(trip_id, |trip| trip.add_activity(destination_index, activity))
    }

    pub fn update_activity(
        &self,
        trip_id: &str,
        destination_index: usize,
        activity_index: usize,
        command: &ActivityCommand,
    ) -> TripServiceResult<Trip> {
        let activity = self.command_to_activity(command)?;
        self.mutate_trip(trip_id, |trip| {
            trip.update_activity(destination_index, activity_index, activity)
        })
    }

    pub fn remove_activity(
        &self,
        trip_id: &str,
        destination_index: usize,
        activity_index: usize,
    ) -> TripServiceResult<Trip> {
        self.mutate_trip(trip_id, |trip| {
            trip.remove_activity(destination_index, activity_index).map(|_| ())
        })
    }

    /// Dated activities grouped by trip day in ascending order
    pub fn day_wise_view(&self, trip_id: &str) -> TripServiceResult<Vec<DayGroupView>> {
        let trip = self.load_trip(trip_id)?;
        let mapper = self.view_mapper();
        Ok(self
            .itinerary
            .build_day_wise_view(&trip)
            .iter()
            .map(|group| mapper.to_day_group_view(group, trip.start()))
            .collect())
    }

    /// Every activity grouped under its destination, undated ones included
    pub fn destination_view(&self, trip_id: &str) -> TripServiceResult<Vec<DestinationGroupView>> {
        let trip = self.load_trip(trip_id)?;
        let mapper = self.view_mapper();
        Ok(self
            .itinerary
            .group_by_destination(&trip)
            .iter()
            .map(|group| mapper.to_destination_group_view(group, trip.start()))
            .collect())
    }

    pub fn calendar_month(&self, trip_id: &str, month: u32, year: i32) -> TripServiceResult<CalendarMonth> {
        let trip = self.load_trip(trip_id)?;
        let grid = self.itinerary.build_calendar_grid(&trip, month, year)?;
        Ok(self.view_mapper().to_calendar_month(&grid, trip.start()))
    }

    /// Trip listing screen
    pub fn search_trips(&self, request: &QueryRequest, now: NaiveDate) -> TripServiceResult<QueryResponse<TripSummary>> {
        let fields = trip_fields(now);
        let spec = QueryMapper::to_query_spec(request, &fields)?;
        let output = evaluate(self.load_all_trips()?, &spec, &fields)?;

        let mapper = self.view_mapper();
        let response = QueryMapper::to_query_response(output, |trip| mapper.to_trip_summary(&trip, now));
        debug!("Trip search matched {} trips", response.len());
        Ok(response)
    }

    /// Activity listing across every destination of one trip
    pub fn search_activities(
        &self,
        trip_id: &str,
        request: &QueryRequest,
    ) -> TripServiceResult<QueryResponse<ActivityView>> {
        let trip = self.load_trip(trip_id)?;
        let fields = activity_fields(trip.start());
        let spec = QueryMapper::to_query_spec(request, &fields)?;
        let output = evaluate(activities_with_context(&trip).collect(), &spec, &fields)?;

        let mapper = self.view_mapper();
        Ok(QueryMapper::to_query_response(output, |entry| {
            mapper.to_activity_view(&entry, trip.start())
        }))
    }

    /// Community feed listing. Posts come from the caller; the service only
    /// runs them through the query pipeline.
    pub fn search_posts(
        &self,
        posts: Vec<CommunityPost>,
        request: &QueryRequest,
    ) -> TripServiceResult<QueryResponse<CommunityPost>> {
        let fields = post_fields();
        let spec = QueryMapper::to_query_spec(request, &fields)?;
        let output = evaluate(posts, &spec, &fields)?;
        Ok(QueryMapper::to_query_response(output, |post| post))
    }
}
