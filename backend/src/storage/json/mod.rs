pub mod config_repository;
pub mod connection;
pub mod trip_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::ConfigRepository;
pub use connection::JsonConnection;
pub use trip_repository::JsonTripRepository;
