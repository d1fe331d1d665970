use std::fmt;

use super::pgn126993::Heartbeat;
use super::pgn127250::VesselHeading;
use super::pgn127488::EngineRapidUpdate;
use super::pgn127489::EngineDynamic;
use super::pgn127505::FluidLevel;
use super::pgn127506::DcDetailedStatus;
use super::pgn127508::BatteryStatus;
use super::pgn129025::PositionRapidUpdate;
use super::pgn129026::CogSogRapidUpdate;
use super::pgn129029::GnssPositionData;
use crate::frame::format_data_bytes;
use crate::record::{Category, FieldValue, Fields};

/// The closed set of PGNs this node knows how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PgnKind {
    Heartbeat,
    VesselHeading,
    EngineRapidUpdate,
    EngineDynamic,
    FluidLevel,
    DcDetailedStatus,
    BatteryStatus,
    PositionRapidUpdate,
    CogSogRapidUpdate,
    GnssPositionData,
}

impl PgnKind {
    pub const ALL: [PgnKind; 10] = [
        PgnKind::Heartbeat,
        PgnKind::VesselHeading,
        PgnKind::EngineRapidUpdate,
        PgnKind::EngineDynamic,
        PgnKind::FluidLevel,
        PgnKind::DcDetailedStatus,
        PgnKind::BatteryStatus,
        PgnKind::PositionRapidUpdate,
        PgnKind::CogSogRapidUpdate,
        PgnKind::GnssPositionData,
    ];

    pub fn pgn(&self) -> u32 {
        match self {
            PgnKind::Heartbeat => 126993,
            PgnKind::VesselHeading => 127250,
            PgnKind::EngineRapidUpdate => 127488,
            PgnKind::EngineDynamic => 127489,
            PgnKind::FluidLevel => 127505,
            PgnKind::DcDetailedStatus => 127506,
            PgnKind::BatteryStatus => 127508,
            PgnKind::PositionRapidUpdate => 129025,
            PgnKind::CogSogRapidUpdate => 129026,
            PgnKind::GnssPositionData => 129029,
        }
    }

    #[cfg(test)]
    pub fn from_pgn(pgn: u32) -> Option<Self> {
        PgnKind::ALL.into_iter().find(|kind| kind.pgn() == pgn)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PgnKind::Heartbeat => "Heartbeat",
            PgnKind::VesselHeading => "VesselHeading",
            PgnKind::EngineRapidUpdate => "EngineRapidUpdate",
            PgnKind::EngineDynamic => "EngineDynamic",
            PgnKind::FluidLevel => "FluidLevel",
            PgnKind::DcDetailedStatus => "DcDetailedStatus",
            PgnKind::BatteryStatus => "BatteryStatus",
            PgnKind::PositionRapidUpdate => "PositionRapidUpdate",
            PgnKind::CogSogRapidUpdate => "CogSogRapidUpdate",
            PgnKind::GnssPositionData => "GnssPositionData",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            PgnKind::Heartbeat => Category::Heartbeat,
            PgnKind::FluidLevel => Category::Fuel,
            PgnKind::VesselHeading
            | PgnKind::PositionRapidUpdate
            | PgnKind::CogSogRapidUpdate
            | PgnKind::GnssPositionData => Category::Navigation,
            PgnKind::EngineRapidUpdate | PgnKind::EngineDynamic => Category::Engine,
            PgnKind::DcDetailedStatus | PgnKind::BatteryStatus => Category::EnergyDistribution,
        }
    }

    /// Shortest payload the decoder accepts
    pub fn min_len(&self) -> usize {
        match self {
            PgnKind::Heartbeat => Heartbeat::MIN_LEN,
            PgnKind::VesselHeading => VesselHeading::MIN_LEN,
            PgnKind::EngineRapidUpdate => EngineRapidUpdate::MIN_LEN,
            PgnKind::EngineDynamic => EngineDynamic::MIN_LEN,
            PgnKind::FluidLevel => FluidLevel::MIN_LEN,
            PgnKind::DcDetailedStatus => DcDetailedStatus::MIN_LEN,
            PgnKind::BatteryStatus => BatteryStatus::MIN_LEN,
            PgnKind::PositionRapidUpdate => PositionRapidUpdate::MIN_LEN,
            PgnKind::CogSogRapidUpdate => CogSogRapidUpdate::MIN_LEN,
            PgnKind::GnssPositionData => GnssPositionData::MIN_LEN,
        }
    }

    /// Decode a payload. `None` means the payload is shorter than `min_len`.
    pub fn decode(&self, data: &[u8]) -> Option<N2kMessage> {
        match self {
            PgnKind::Heartbeat => Heartbeat::from_bytes(data).map(N2kMessage::Heartbeat),
            PgnKind::VesselHeading => VesselHeading::from_bytes(data).map(N2kMessage::VesselHeading),
            PgnKind::EngineRapidUpdate => {
                EngineRapidUpdate::from_bytes(data).map(N2kMessage::EngineRapidUpdate)
            }
            PgnKind::EngineDynamic => EngineDynamic::from_bytes(data).map(N2kMessage::EngineDynamic),
            PgnKind::FluidLevel => FluidLevel::from_bytes(data).map(N2kMessage::FluidLevel),
            PgnKind::DcDetailedStatus => {
                DcDetailedStatus::from_bytes(data).map(N2kMessage::DcDetailedStatus)
            }
            PgnKind::BatteryStatus => BatteryStatus::from_bytes(data).map(N2kMessage::BatteryStatus),
            PgnKind::PositionRapidUpdate => {
                PositionRapidUpdate::from_bytes(data).map(N2kMessage::PositionRapidUpdate)
            }
            PgnKind::CogSogRapidUpdate => {
                CogSogRapidUpdate::from_bytes(data).map(N2kMessage::CogSogRapidUpdate)
            }
            PgnKind::GnssPositionData => {
                GnssPositionData::from_bytes(data).map(N2kMessage::GnssPositionData)
            }
        }
    }
}

// Enum to hold any decoded message type
#[derive(Debug, Clone)]
pub enum N2kMessage {
    Heartbeat(Heartbeat),
    VesselHeading(VesselHeading),
    EngineRapidUpdate(EngineRapidUpdate),
    EngineDynamic(EngineDynamic),
    FluidLevel(FluidLevel),
    DcDetailedStatus(DcDetailedStatus),
    BatteryStatus(BatteryStatus),
    PositionRapidUpdate(PositionRapidUpdate),
    CogSogRapidUpdate(CogSogRapidUpdate),
    GnssPositionData(GnssPositionData),
    Unknown(u32, Vec<u8>),
}

impl N2kMessage {
    pub fn fields(&self) -> Fields {
        match self {
            N2kMessage::Heartbeat(msg) => msg.fields(),
            N2kMessage::VesselHeading(msg) => msg.fields(),
            N2kMessage::EngineRapidUpdate(msg) => msg.fields(),
            N2kMessage::EngineDynamic(msg) => msg.fields(),
            N2kMessage::FluidLevel(msg) => msg.fields(),
            N2kMessage::DcDetailedStatus(msg) => msg.fields(),
            N2kMessage::BatteryStatus(msg) => msg.fields(),
            N2kMessage::PositionRapidUpdate(msg) => msg.fields(),
            N2kMessage::CogSogRapidUpdate(msg) => msg.fields(),
            N2kMessage::GnssPositionData(msg) => msg.fields(),
            N2kMessage::Unknown(_pgn, data) => {
                let mut fields = Fields::new();
                fields.insert("raw".into(), FieldValue::Bytes(data.clone()));
                fields
            }
        }
    }
}

impl fmt::Display for N2kMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            N2kMessage::Heartbeat(msg) => write!(f, "{}", msg),
            N2kMessage::VesselHeading(msg) => write!(f, "{}", msg),
            N2kMessage::EngineRapidUpdate(msg) => write!(f, "{}", msg),
            N2kMessage::FluidLevel(msg) => write!(f, "{}", msg),
            N2kMessage::BatteryStatus(msg) => write!(f, "{}", msg),
            N2kMessage::PositionRapidUpdate(msg) => write!(f, "{}", msg),
            N2kMessage::CogSogRapidUpdate(msg) => write!(f, "{}", msg),
            N2kMessage::GnssPositionData(msg) => write!(f, "{}", msg),
            N2kMessage::EngineDynamic(msg) => write!(f, "      Engine #{} dynamic", msg.engine_instance),
            N2kMessage::DcDetailedStatus(msg) => write!(f, "      DC #{} detailed", msg.instance),
            N2kMessage::Unknown(_pgn, data) => {
                write!(f, "      Raw data: [{}]", format_data_bytes(data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup_matches_pgn() {
        for kind in PgnKind::ALL {
            assert_eq!(PgnKind::from_pgn(kind.pgn()), Some(kind));
        }
        assert_eq!(PgnKind::from_pgn(130306), None);
    }

    #[test]
    fn test_every_kind_decodes_its_minimum_length() {
        for kind in PgnKind::ALL {
            let data = vec![0u8; kind.min_len()];
            assert!(kind.decode(&data).is_some(), "{:?}", kind);
            assert!(kind.decode(&data[..kind.min_len() - 1]).is_none(), "{:?}", kind);
        }
    }

    #[test]
    fn test_fast_packet_kinds_are_registered_as_fast_packet() {
        for kind in [PgnKind::EngineDynamic, PgnKind::DcDetailedStatus, PgnKind::GnssPositionData] {
            assert!(super::super::is_fast_packet_pgn(kind.pgn()));
        }
    }

    #[test]
    fn test_unknown_message_exposes_raw_bytes() {
        let msg = N2kMessage::Unknown(65280, vec![1, 2, 3]);
        assert_eq!(msg.fields()["raw"], FieldValue::Bytes(vec![1, 2, 3]));
        assert_eq!(msg.to_string(), "      Raw data: [01 02 03]");
    }
}
