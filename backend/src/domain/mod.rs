//! # Domain Module
//!
//! Core model and business logic of the itinerary engine.
//!
//! ## Value types
//!
//! - [`money::Money`]: exact integer cents, parsed once from user input
//! - [`date_window::DateWindow`]: a non-empty `[start, end]` date span
//!
//! ## Object graph
//!
//! A [`models::Trip`] owns an ordered list of [`models::Destination`]s, each
//! owning its [`models::Activity`] list. A destination's budget ceiling gates
//! every activity add or replace; a rejected mutation leaves the graph as it
//! was.
//!
//! ## Derived views
//!
//! - [`itinerary::ItineraryService`]: day-wise, per-destination and calendar views
//! - [`query::evaluate`]: search, filter, sort and group over any listing
//! - [`trip_service::TripService`]: load, mutate and save trips through storage

pub mod commands;
pub mod date_window;
pub mod error;
pub mod itinerary;
pub mod listing;
pub mod models;
pub mod money;
pub mod query;
pub mod trip_service;

pub use date_window::DateWindow;
pub use error::{PlannerError, PlannerResult};
pub use itinerary::ItineraryService;
pub use money::Money;
pub use query::{evaluate, QueryError, QueryOutput, QuerySpec};
pub use trip_service::{TripService, TripServiceError, TripServiceResult};
