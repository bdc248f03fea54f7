//! Domain-level command types.
//!
//! These carry user input in its raw form (dates as `YYYY-MM-DD`, amounts as
//! typed, times as `HH:MM`). The trip service parses them exactly once before
//! touching the trip.

pub mod trips {
    /// Input for creating a new trip.
    #[derive(Debug, Clone, Default)]
    pub struct CreateTripCommand {
        pub name: String,
        pub description: String,
        pub start_date: String,
        pub end_date: String,
        pub cover_image: Option<String>,
    }

    /// A start/end pair as entered in a date-range picker.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DateRangeInput {
        pub start_date: String,
        pub end_date: String,
    }

    /// Input for adding a destination section to a trip.
    #[derive(Debug, Clone, Default)]
    pub struct AddDestinationCommand {
        pub name: String,
        pub dates: Option<DateRangeInput>,
        pub budget: Option<String>,
        pub notes: Option<String>,
    }

    /// Edit of a destination section. `None` keeps the current value,
    /// `Some(None)` clears an optional one.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateDestinationCommand {
        pub name: Option<String>,
        pub dates: Option<Option<DateRangeInput>>,
        pub budget: Option<Option<String>>,
        pub notes: Option<Option<String>>,
    }
}

pub mod activities {
    /// Input for adding or replacing an activity.
    #[derive(Debug, Clone, Default)]
    pub struct ActivityCommand {
        pub name: String,
        pub day: Option<u32>,
        pub time: Option<String>,
        pub budget: Option<String>,
    }
}
