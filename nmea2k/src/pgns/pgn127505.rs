use std::fmt;

use super::{i16_scaled, u32_scaled};
use crate::record::{FieldValue, Fields};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FluidType {
    Fuel,
    Water,
    GrayWater,
    LiveWell,
    Oil,
    BlackWater,
    Gasoline,
    Other(u8),
}

impl FluidType {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => FluidType::Fuel,
            1 => FluidType::Water,
            2 => FluidType::GrayWater,
            3 => FluidType::LiveWell,
            4 => FluidType::Oil,
            5 => FluidType::BlackWater,
            6 => FluidType::Gasoline,
            other => FluidType::Other(other),
        }
    }

    fn name(&self) -> String {
        match self {
            FluidType::Fuel => "fuel".to_string(),
            FluidType::Water => "water".to_string(),
            FluidType::GrayWater => "gray_water".to_string(),
            FluidType::LiveWell => "live_well".to_string(),
            FluidType::Oil => "oil".to_string(),
            FluidType::BlackWater => "black_water".to_string(),
            FluidType::Gasoline => "gasoline".to_string(),
            FluidType::Other(raw) => format!("type_{}", raw),
        }
    }
}

/// Fluid Level (tank level)
#[derive(Debug, Clone)]
pub struct FluidLevel {
    pub pgn: u32,
    pub instance: u8,
    pub fluid_type: FluidType,
    pub level: Option<f64>,    // %
    pub capacity: Option<f64>, // litres
}

impl FluidLevel {
    pub const MIN_LEN: usize = 7;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 127505,
            instance: data[0] & 0x0F,
            fluid_type: FluidType::from_raw(data[0] >> 4),
            level: i16_scaled(data, 1, 0.004),
            capacity: u32_scaled(data, 3, 0.1),
        })
    }

    /// Remaining volume in litres, when both level and capacity are known
    pub fn remaining_litres(&self) -> Option<f64> {
        Some(self.level? / 100.0 * self.capacity?)
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("instance".into(), self.instance.into());
        fields.insert("fluid_type".into(), FieldValue::Text(self.fluid_type.name()));
        fields.insert("level_pct".into(), self.level.into());
        fields.insert("capacity_l".into(), self.capacity.into());
        fields.insert("remaining_l".into(), self.remaining_litres().into());
        fields
    }
}

impl fmt::Display for FluidLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "      Tank #{} ({}): ", self.instance, self.fluid_type.name())?;
        match self.level {
            Some(level) => write!(f, "{:.1}%", level)?,
            None => write!(f, "N/A")?,
        }
        if let Some(capacity) = self.capacity {
            write!(f, " of {:.1} L", capacity)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fluid_level_from_bytes() {
        // Instance 1, fuel, 50% (12500 * 0.004), 200.0 L (2000 * 0.1)
        let data = [0x01, 0xD4, 0x30, 0xD0, 0x07, 0x00, 0x00, 0xFF];
        let tank = FluidLevel::from_bytes(&data).unwrap();
        assert_eq!(tank.instance, 1);
        assert_eq!(tank.fluid_type, FluidType::Fuel);
        assert_relative_eq!(tank.level.unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(tank.capacity.unwrap(), 200.0, epsilon = 1e-9);
        assert_relative_eq!(tank.remaining_litres().unwrap(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fluid_type_in_high_nibble() {
        let data = [0x12, 0xFF, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let tank = FluidLevel::from_bytes(&data).unwrap();
        assert_eq!(tank.instance, 2);
        assert_eq!(tank.fluid_type, FluidType::Water);
        assert_eq!(tank.level, None);
        assert_eq!(tank.capacity, None);
        assert!(tank.fields()["remaining_l"].is_missing());
    }
}
