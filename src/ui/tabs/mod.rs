//! Tab-specific content rendering.

pub mod bookings;
pub mod profile;
pub mod rooms;
pub mod users;
