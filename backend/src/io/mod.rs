//! Boundary conversions between stored documents, shared DTOs and the domain.

pub mod mappers;
