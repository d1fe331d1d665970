use std::fmt;

use super::u16_scaled;
use crate::record::{FieldValue, Fields};

#[derive(Debug, Clone)]
pub struct CogSogRapidUpdate {
    #[allow(dead_code)]
    pub pgn: u32,
    pub sid: u8,
    pub cog_reference: bool, // true = True, false = Magnetic
    pub cog: Option<f64>, // radians
    pub sog: Option<f64>, // m/s
}

impl CogSogRapidUpdate {
    pub const MIN_LEN: usize = 6;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 129026,
            sid: data[0],
            cog_reference: (data[1] & 0x03) == 0,
            cog: u16_scaled(data, 2, 0.0001),
            sog: u16_scaled(data, 4, 0.01),
        })
    }

    pub fn sog_knots(&self) -> Option<f64> {
        self.sog.map(|sog| sog * 1.94384)
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            "cog_reference".into(),
            FieldValue::from(if self.cog_reference { "true" } else { "magnetic" }),
        );
        fields.insert("cog_rad".into(), self.cog.into());
        fields.insert("sog_mps".into(), self.sog.into());
        fields.insert("sog_kn".into(), self.sog_knots().into());
        fields
    }
}

impl fmt::Display for CogSogRapidUpdate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "      COG: {:.2}° ({}) | SOG: {:.2} m/s",
            self.cog.unwrap_or(f64::NAN).to_degrees(),
            if self.cog_reference { "True" } else { "Mag" },
            self.sog.unwrap_or(f64::NAN),
        )
    }
}
