use std::fmt;

use super::i32_scaled;
use crate::record::Fields;

#[derive(Debug, Clone)]
pub struct PositionRapidUpdate {
    pub pgn: u32,
    pub latitude: Option<f64>,  // degrees
    pub longitude: Option<f64>, // degrees
}

impl PositionRapidUpdate {
    pub const MIN_LEN: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 129025,
            latitude: i32_scaled(data, 0, 1e-7),
            longitude: i32_scaled(data, 4, 1e-7),
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("latitude_deg".into(), self.latitude.into());
        fields.insert("longitude_deg".into(), self.longitude.into());
        fields
    }
}

impl fmt::Display for PositionRapidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => write!(f, "      Position: {:.6}° N, {:.6}° E", lat, lon),
            _ => write!(f, "      Position: N/A"),
        }
    }
}
