use std::fmt;

use super::{i16_scaled, u16_scaled};
use crate::record::Fields;

#[derive(Debug, Clone)]
pub struct BatteryStatus {
    pub pgn: u32,
    pub instance: u8,
    pub voltage: Option<f64>,     // V
    pub current: Option<f64>,     // A
    pub temperature: Option<f64>, // K
    pub sid: u8,
}

impl BatteryStatus {
    pub const MIN_LEN: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 127508,
            instance: data[0],
            voltage: i16_scaled(data, 1, 0.01),
            current: i16_scaled(data, 3, 0.1),
            temperature: u16_scaled(data, 5, 0.01),
            sid: data[7],
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("instance".into(), self.instance.into());
        fields.insert("voltage_v".into(), self.voltage.into());
        fields.insert("current_a".into(), self.current.into());
        fields.insert("temperature_k".into(), self.temperature.into());
        fields
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "      Battery #{}:", self.instance)?;
        if let Some(voltage) = self.voltage {
            write!(f, " {:.2} V", voltage)?;
        }
        if let Some(current) = self.current {
            write!(f, " | {:.1} A", current)?;
        }
        if let Some(temperature) = self.temperature {
            write!(f, " | {:.1}°C", temperature - 273.15)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_battery_status_from_bytes() {
        // 12.80 V, -5.2 A (discharging), 298.15 K
        let data = [0x00, 0x00, 0x05, 0xCC, 0xFF, 0x77, 0x74, 0x03];
        let battery = BatteryStatus::from_bytes(&data).unwrap();
        assert_relative_eq!(battery.voltage.unwrap(), 12.8, epsilon = 1e-9);
        assert_relative_eq!(battery.current.unwrap(), -5.2, epsilon = 1e-9);
        assert_relative_eq!(battery.temperature.unwrap(), 298.15, epsilon = 1e-9);
        assert_eq!(battery.sid, 3);
    }
}
