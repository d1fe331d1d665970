use super::{i16_scaled, u16_scaled, u32_scaled};
use crate::record::Fields;

/// Engine Parameters, Dynamic. Fast packet, 26 bytes.
#[derive(Debug, Clone)]
pub struct EngineDynamic {
    pub pgn: u32,
    pub engine_instance: u8,
    pub oil_pressure: Option<f64>,        // Pa
    pub oil_temperature: Option<f64>,     // K
    pub coolant_temperature: Option<f64>, // K
    pub alternator_potential: Option<f64>, // V
    pub fuel_rate: Option<f64>,           // L/h
    pub total_engine_hours: Option<f64>,  // s
    pub coolant_pressure: Option<f64>,    // Pa
    pub fuel_pressure: Option<f64>,       // Pa
    pub discrete_status1: u16,
    pub discrete_status2: u16,
    pub engine_load: Option<i8>,   // %
    pub engine_torque: Option<i8>, // %
}

fn percent(raw: u8) -> Option<i8> {
    let value = raw as i8;
    if value == i8::MAX { None } else { Some(value) }
}

impl EngineDynamic {
    pub const MIN_LEN: usize = 26;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 127489,
            engine_instance: data[0],
            oil_pressure: u16_scaled(data, 1, 100.0),
            oil_temperature: u16_scaled(data, 3, 0.1),
            coolant_temperature: u16_scaled(data, 5, 0.01),
            alternator_potential: i16_scaled(data, 7, 0.01),
            fuel_rate: i16_scaled(data, 9, 0.1),
            total_engine_hours: u32_scaled(data, 11, 1.0),
            coolant_pressure: u16_scaled(data, 15, 100.0),
            fuel_pressure: u16_scaled(data, 17, 1000.0),
            discrete_status1: u16::from_le_bytes([data[20], data[21]]),
            discrete_status2: u16::from_le_bytes([data[22], data[23]]),
            engine_load: percent(data[24]),
            engine_torque: percent(data[25]),
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("engine_instance".into(), self.engine_instance.into());
        fields.insert("oil_pressure_pa".into(), self.oil_pressure.into());
        fields.insert("oil_temperature_k".into(), self.oil_temperature.into());
        fields.insert("coolant_temperature_k".into(), self.coolant_temperature.into());
        fields.insert("alternator_potential_v".into(), self.alternator_potential.into());
        fields.insert("fuel_rate_lph".into(), self.fuel_rate.into());
        fields.insert("total_engine_hours_s".into(), self.total_engine_hours.into());
        fields.insert("coolant_pressure_pa".into(), self.coolant_pressure.into());
        fields.insert("fuel_pressure_pa".into(), self.fuel_pressure.into());
        fields.insert("discrete_status1".into(), self.discrete_status1.into());
        fields.insert("discrete_status2".into(), self.discrete_status2.into());
        fields.insert("engine_load_pct".into(), self.engine_load.map(i64::from).into());
        fields.insert("engine_torque_pct".into(), self.engine_torque.map(i64::from).into());
        fields
    }
}
