pub mod message;
pub mod pgn126993;
pub mod pgn127250;
pub mod pgn127488;
pub mod pgn127489;
pub mod pgn127505;
pub mod pgn127506;
pub mod pgn127508;
pub mod pgn129025;
pub mod pgn129026;
pub mod pgn129029;

// Re-export commonly used types
pub use message::{N2kMessage, PgnKind};
pub use pgn126993::Heartbeat;
pub use pgn127250::VesselHeading;
pub use pgn127488::EngineRapidUpdate;
pub use pgn127489::EngineDynamic;
pub use pgn127505::FluidLevel;
pub use pgn127506::DcDetailedStatus;
pub use pgn127508::BatteryStatus;
pub use pgn129025::PositionRapidUpdate;
pub use pgn129026::CogSogRapidUpdate;
pub use pgn129029::GnssPositionData;

/// PGNs transmitted with the fast packet protocol. Includes PGNs without a decoder so
/// they are reassembled before being published as unknown traffic.
pub fn is_fast_packet_pgn(pgn: u32) -> bool {
    matches!(
        pgn,
        126208 | 126464 | 126720 | 126983..=126988 | 126996 | 126998 | 127233 | 127237
            | 127489 | 127493 | 127496 | 127497 | 127498 | 127503 | 127504 | 127506
            | 127510 | 128275 | 129029 | 129038 | 129039 | 129040 | 129041 | 129044
            | 129045 | 129284 | 129285 | 129540 | 129541 | 129542 | 129545 | 129547
            | 129549 | 129551 | 129556 | 129794 | 129795 | 129797 | 129798 | 129801
            | 129802 | 129808 | 129809 | 129810 | 130064..=130074 | 130320..=130324
            | 130567 | 130577 | 130578
    )
}

// Little-endian readers honouring the NMEA2000 "not available" sentinels:
// all ones for unsigned fields, the maximum positive value for signed ones.

pub(crate) fn u8_or_missing(raw: u8) -> Option<i64> {
    if raw == u8::MAX { None } else { Some(raw as i64) }
}

pub(crate) fn u16_scaled(data: &[u8], offset: usize, scale: f64) -> Option<f64> {
    let raw = u16::from_le_bytes([data[offset], data[offset + 1]]);
    if raw == u16::MAX { None } else { Some(raw as f64 * scale) }
}

pub(crate) fn i16_scaled(data: &[u8], offset: usize, scale: f64) -> Option<f64> {
    let raw = i16::from_le_bytes([data[offset], data[offset + 1]]);
    if raw == i16::MAX { None } else { Some(raw as f64 * scale) }
}

pub(crate) fn u32_scaled(data: &[u8], offset: usize, scale: f64) -> Option<f64> {
    let raw = u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]);
    if raw == u32::MAX { None } else { Some(raw as f64 * scale) }
}

pub(crate) fn i32_scaled(data: &[u8], offset: usize, scale: f64) -> Option<f64> {
    let raw = i32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]);
    if raw == i32::MAX { None } else { Some(raw as f64 * scale) }
}

pub(crate) fn i64_scaled(data: &[u8], offset: usize, scale: f64) -> Option<f64> {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    let raw = i64::from_le_bytes(bytes);
    if raw == i64::MAX { None } else { Some(raw as f64 * scale) }
}
