pub mod activity;
pub mod destination;
pub mod trip;

pub use activity::{parse_time_of_day, Activity};
pub use destination::{Destination, DestinationBuilder};
pub use trip::{DestinationPatch, Trip, TripBuilder};
