use super::{u16_scaled, u8_or_missing};
use crate::record::Fields;

/// DC Detailed Status. Fast packet, 11 bytes.
#[derive(Debug, Clone)]
pub struct DcDetailedStatus {
    pub pgn: u32,
    pub sid: u8,
    pub instance: u8,
    pub dc_type: u8,
    pub state_of_charge: Option<i64>, // %
    pub state_of_health: Option<i64>, // %
    pub time_remaining: Option<f64>,  // s
    pub ripple_voltage: Option<f64>,  // V
    pub capacity: Option<f64>,        // C
}

impl DcDetailedStatus {
    pub const MIN_LEN: usize = 11;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 127506,
            sid: data[0],
            instance: data[1],
            dc_type: data[2],
            state_of_charge: u8_or_missing(data[3]),
            state_of_health: u8_or_missing(data[4]),
            time_remaining: u16_scaled(data, 5, 60.0),
            ripple_voltage: u16_scaled(data, 7, 0.001),
            capacity: u16_scaled(data, 9, 3600.0),
        })
    }

    fn dc_type_name(&self) -> &'static str {
        match self.dc_type {
            0 => "battery",
            1 => "alternator",
            2 => "converter",
            3 => "solar_cell",
            4 => "wind_generator",
            _ => "unknown",
        }
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("instance".into(), self.instance.into());
        fields.insert("dc_type".into(), self.dc_type_name().into());
        fields.insert("state_of_charge_pct".into(), self.state_of_charge.into());
        fields.insert("state_of_health_pct".into(), self.state_of_health.into());
        fields.insert("time_remaining_s".into(), self.time_remaining.into());
        fields.insert("ripple_voltage_v".into(), self.ripple_voltage.into());
        fields.insert("capacity_c".into(), self.capacity.into());
        fields
    }
}
