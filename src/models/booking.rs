use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "booked")]
    Booked,
    #[serde(rename = "checked-in")]
    CheckedIn,
    #[serde(rename = "checked-out")]
    CheckedOut,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "checked-out-unpaid")]
    CheckedOutUnpaid,
}

impl BookingStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::CheckedIn => "Checked In",
            BookingStatus::CheckedOut => "Checked Out",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Pending => "Pending",
            BookingStatus::CheckedOutUnpaid => "Checked Out (unpaid)",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelBooking {
    pub id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub room_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(default = "default_guests")]
    pub number_of_guests: u32,
    pub special_requests: Option<String>,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_by: Option<String>,
}

fn default_guests() -> u32 {
    1
}

impl HotelBooking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days().max(0)
    }

    pub fn stay_display(&self) -> String {
        format!(
            "{} - {}",
            self.check_in.format("%Y-%m-%d"),
            self.check_out.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_booking_from_api_json() {
        let json = r#"{
            "id": "507f1f77bcf86cd799439012",
            "customer_name": "John Doe",
            "customer_phone": "+1234567890",
            "room_id": "507f1f77bcf86cd799439011",
            "check_in": "2026-08-01T14:00:00Z",
            "check_out": "2026-08-05T11:00:00Z",
            "number_of_guests": 2,
            "special_requests": "Need a baby crib",
            "total_price": 1200.0,
            "status": "checked-in"
        }"#;

        let booking: HotelBooking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.customer_name, "John Doe");
        assert_eq!(booking.status, BookingStatus::CheckedIn);
        assert_eq!(booking.nights(), 3);
        assert_eq!(booking.stay_display(), "2026-08-01 - 2026-08-05");
    }
}
