use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Record category, fully determined by the PGN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Heartbeat,
    Fuel,
    Navigation,
    Engine,
    EnergyDistribution,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Heartbeat,
        Category::Fuel,
        Category::Navigation,
        Category::Engine,
        Category::EnergyDistribution,
        Category::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Heartbeat => "HEARTBEAT",
            Category::Fuel => "FUEL",
            Category::Navigation => "NAVIGATION",
            Category::Engine => "ENGINE",
            Category::EnergyDistribution => "ENERGYDISTRIBUTION",
            Category::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded field value. `Missing` is the NMEA2000 "data not available" marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Bytes(Vec<u8>),
    Missing,
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map(FieldValue::Number).unwrap_or(FieldValue::Missing)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map(FieldValue::Integer).unwrap_or(FieldValue::Missing)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Named field values of one decoded message
pub type Fields = BTreeMap<String, FieldValue>;

/// A categorized, TTL-tagged record ready for publication
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    pub pgn: u32,
    pub name: &'static str,
    pub source_address: u8,
    pub category: Category,
    pub fields: Fields,
    pub decoded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}) [{}] from {}:", self.name, self.pgn, self.category, self.source_address)?;
        for (name, value) in &self.fields {
            match value {
                FieldValue::Integer(v) => write!(f, " {}={}", name, v)?,
                FieldValue::Number(v) => write!(f, " {}={:.4}", name, v)?,
                FieldValue::Text(v) => write!(f, " {}={}", name, v)?,
                FieldValue::Bytes(v) => write!(f, " {}=[{}]", name, crate::frame::format_data_bytes(v))?,
                FieldValue::Missing => write!(f, " {}=N/A", name)?,
            }
        }
        Ok(())
    }
}
