//! Data models for DockDineStay entities.
//!
//! Serde structs mirroring the wire schema of the hospitality API:
//!
//! - `HotelRoom` / `RoomStatus`: room inventory
//! - `HotelBooking` / `BookingStatus`: reservations
//! - `UserAccount` / `UserUpdate`: account records and profile edits

pub mod booking;
pub mod room;
pub mod user;

pub use booking::{BookingStatus, HotelBooking};
pub use room::{HotelRoom, RoomStatus};
pub use user::{UserAccount, UserUpdate};
