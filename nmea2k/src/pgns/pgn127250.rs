use std::fmt;

use super::{i16_scaled, u16_scaled};
use crate::record::{FieldValue, Fields};

#[derive(Debug, Clone)]
pub struct VesselHeading {
    #[allow(dead_code)]
    pub pgn: u32,
    pub sid: u8,
    pub heading: Option<f64>, // radians
    pub deviation: Option<f64>,
    pub variation: Option<f64>,
    pub reference: HeadingReference,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingReference {
    True,
    Magnetic,
    Error,
    Null,
}

impl HeadingReference {
    fn as_str(&self) -> &'static str {
        match self {
            HeadingReference::True => "true",
            HeadingReference::Magnetic => "magnetic",
            HeadingReference::Error => "error",
            HeadingReference::Null => "null",
        }
    }
}

impl VesselHeading {
    pub const MIN_LEN: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 127250,
            sid: data[0],
            heading: u16_scaled(data, 1, 0.0001),
            deviation: i16_scaled(data, 3, 0.0001),
            variation: i16_scaled(data, 5, 0.0001),
            reference: match data[7] & 0x03 {
                0 => HeadingReference::True,
                1 => HeadingReference::Magnetic,
                2 => HeadingReference::Error,
                _ => HeadingReference::Null,
            },
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("sid".into(), self.sid.into());
        fields.insert("heading_rad".into(), self.heading.into());
        fields.insert("deviation_rad".into(), self.deviation.into());
        fields.insert("variation_rad".into(), self.variation.into());
        fields.insert("reference".into(), FieldValue::from(self.reference.as_str()));
        fields
    }
}

impl fmt::Display for VesselHeading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.heading {
            Some(heading) => write!(f, "      Heading: {:.2}° ({:?})", heading.to_degrees(), self.reference)?,
            None => write!(f, "      Heading: N/A ({:?})", self.reference)?,
        }
        if let Some(dev) = self.deviation {
            write!(f, " | Deviation: {:.2}°", dev.to_degrees())?;
        }
        if let Some(var) = self.variation {
            write!(f, " | Variation: {:.2}°", var.to_degrees())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_heading_from_bytes() {
        // Heading 1.5708 rad (15708), no deviation, variation -0.0500 rad, magnetic
        let data = [0x01, 0x5C, 0x3D, 0xFF, 0x7F, 0x0C, 0xFE, 0x01];
        let heading = VesselHeading::from_bytes(&data).unwrap();
        assert_relative_eq!(heading.heading.unwrap(), 1.5708, epsilon = 1e-9);
        assert_eq!(heading.deviation, None);
        assert_relative_eq!(heading.variation.unwrap(), -0.05, epsilon = 1e-9);
        assert_eq!(heading.reference, HeadingReference::Magnetic);
        assert!(heading.fields()["deviation_rad"].is_missing());
    }
}
