//! # Storage Module
//!
//! File-based persistence for trips and engine configuration.
//!
//! ```text
//! trip-data/
//! ├── config.yaml          ← engine configuration
//! └── trips/
//!     ├── trip__<uuid>.json
//!     └── ...
//! ```
//!
//! The domain never sees these files: the trip service reads and writes
//! [`shared::TripDocument`] values through [`TripStorage`] and maps them at
//! the boundary.

pub mod json;
pub mod traits;

pub use json::*;
pub use traits::*;
