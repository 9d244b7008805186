use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "occupied")]
    Occupied,
    #[serde(rename = "maintenance")]
    Maintenance,
}

impl RoomStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            RoomStatus::Available => "Available",
            RoomStatus::Occupied => "Occupied",
            RoomStatus::Maintenance => "Maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelRoom {
    pub id: Option<String>,
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub price: f64,
    pub status: RoomStatus,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl HotelRoom {
    pub fn features_display(&self) -> String {
        if self.features.is_empty() {
            "-".to_string()
        } else {
            self.features.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_room_from_api_json() {
        let json = r#"{
            "id": "507f1f77bcf86cd799439011",
            "room_number": "101",
            "type": "Deluxe",
            "price": 2500.0,
            "status": "available",
            "features": ["AC", "TV"],
            "image_url": null
        }"#;

        let room: HotelRoom = serde_json::from_str(json).unwrap();
        assert_eq!(room.room_number, "101");
        assert_eq!(room.room_type, "Deluxe");
        assert_eq!(room.status, RoomStatus::Available);
        assert_eq!(room.features_display(), "AC, TV");
    }
}
