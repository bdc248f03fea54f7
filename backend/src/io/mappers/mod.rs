pub mod query_mapper;
pub mod trip_mapper;
pub mod view_mapper;

pub use query_mapper::QueryMapper;
pub use trip_mapper::{MappingError, TripMapper};
pub use view_mapper::ViewMapper;
