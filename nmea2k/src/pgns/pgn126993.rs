use std::fmt;

use super::u16_scaled;
use crate::record::{FieldValue, Fields};

#[derive(Debug, Clone)]
pub struct Heartbeat {
    pub pgn: u32,
    pub update_interval: Option<f64>, // seconds
    pub sequence_counter: u8,
    pub controller1_state: u8,
    pub controller2_state: u8,
    pub equipment_status: u8,
}

impl Heartbeat {
    pub const MIN_LEN: usize = 4;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 126993,
            update_interval: u16_scaled(data, 0, 0.001),
            sequence_counter: data[2],
            controller1_state: data[3] & 0x03,
            controller2_state: (data[3] >> 2) & 0x03,
            equipment_status: (data[3] >> 4) & 0x03,
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("update_interval_s".into(), self.update_interval.into());
        fields.insert("sequence_counter".into(), self.sequence_counter.into());
        fields.insert("controller1_state".into(), self.controller1_state.into());
        fields.insert("controller2_state".into(), self.controller2_state.into());
        fields.insert(
            "equipment_status".into(),
            FieldValue::from(if self.equipment_status == 0 { "operational" } else { "fault" }),
        );
        fields
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "      Heartbeat #{}", self.sequence_counter)?;
        if let Some(interval) = self.update_interval {
            write!(f, " | Interval: {:.3} s", interval)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heartbeat_from_bytes() {
        // 60 second interval, counter 7, all states zero
        let data = [0x60, 0xEA, 0x07, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let hb = Heartbeat::from_bytes(&data).unwrap();
        assert_relative_eq!(hb.update_interval.unwrap(), 60.0, epsilon = 1e-9);
        assert_eq!(hb.sequence_counter, 7);
        assert_eq!(hb.fields()["equipment_status"], FieldValue::Text("operational".into()));
    }

    #[test]
    fn test_heartbeat_short_data() {
        assert!(Heartbeat::from_bytes(&[0x60, 0xEA]).is_none());
    }
}
