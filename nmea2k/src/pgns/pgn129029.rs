use std::fmt;

use super::{i16_scaled, i32_scaled, i64_scaled, u16_scaled, u32_scaled, u8_or_missing};
use crate::record::{FieldValue, Fields};

/// GNSS Position Data. Fast packet, 43 bytes without reference stations.
#[derive(Debug, Clone)]
pub struct GnssPositionData {
    #[allow(dead_code)]
    pub pgn: u32,
    pub sid: u8,
    pub days_since_epoch: Option<f64>,
    pub seconds_since_midnight: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub gnss_type: GnssType,
    pub method: GnssMethod,
    pub integrity: u8,
    pub num_svs: Option<i64>,
    pub hdop: Option<f64>,
    pub pdop: Option<f64>,
    pub geoidal_separation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GnssType {
    Gps,
    Glonass,
    GpsGlonass,
    GpsSbasWaas,
    GpsSbasWaasDglonass,
    Chayka,
    Integrated,
    Surveyed,
    Galileo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GnssMethod {
    NoGnss,
    GnssFix,
    DGnss,
    PreciseGnss,
    RtkFixed,
    RtkFloat,
}

impl GnssPositionData {
    pub const MIN_LEN: usize = 43;

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::MIN_LEN {
            return None;
        }
        Some(Self {
            pgn: 129029,
            sid: data[0],
            days_since_epoch: u16_scaled(data, 1, 1.0),
            seconds_since_midnight: u32_scaled(data, 3, 0.0001),
            latitude: i64_scaled(data, 7, 1e-16),
            longitude: i64_scaled(data, 15, 1e-16),
            altitude: i64_scaled(data, 23, 1e-6),
            gnss_type: match data[31] & 0x0F {
                0 => GnssType::Gps,
                1 => GnssType::Glonass,
                2 => GnssType::GpsGlonass,
                3 => GnssType::GpsSbasWaas,
                4 => GnssType::GpsSbasWaasDglonass,
                5 => GnssType::Chayka,
                6 => GnssType::Integrated,
                7 => GnssType::Surveyed,
                8 => GnssType::Galileo,
                _ => GnssType::Gps,
            },
            method: match (data[31] >> 4) & 0x0F {
                0 => GnssMethod::NoGnss,
                1 => GnssMethod::GnssFix,
                2 => GnssMethod::DGnss,
                3 => GnssMethod::PreciseGnss,
                4 => GnssMethod::RtkFixed,
                5 => GnssMethod::RtkFloat,
                _ => GnssMethod::NoGnss,
            },
            integrity: data[32] & 0x03,
            num_svs: u8_or_missing(data[33]),
            hdop: i16_scaled(data, 34, 0.01),
            pdop: i16_scaled(data, 36, 0.01),
            geoidal_separation: i32_scaled(data, 38, 0.01),
        })
    }

    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("days_since_epoch".into(), self.days_since_epoch.into());
        fields.insert("seconds_since_midnight".into(), self.seconds_since_midnight.into());
        fields.insert("latitude_deg".into(), self.latitude.into());
        fields.insert("longitude_deg".into(), self.longitude.into());
        fields.insert("altitude_m".into(), self.altitude.into());
        fields.insert("gnss_type".into(), FieldValue::Text(format!("{:?}", self.gnss_type)));
        fields.insert("method".into(), FieldValue::Text(format!("{:?}", self.method)));
        fields.insert("integrity".into(), self.integrity.into());
        fields.insert("satellites".into(), self.num_svs.into());
        fields.insert("hdop".into(), self.hdop.into());
        fields.insert("pdop".into(), self.pdop.into());
        fields.insert("geoidal_separation_m".into(), self.geoidal_separation.into());
        fields
    }
}

impl fmt::Display for GnssPositionData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "      Position: {:.6}°, {:.6}° Satellites: {:?} Type: {:?} Method: {:?}",
            self.latitude.unwrap_or(f64::NAN),
            self.longitude.unwrap_or(f64::NAN),
            self.num_svs,
            self.gnss_type,
            self.method
        )
    }
}
