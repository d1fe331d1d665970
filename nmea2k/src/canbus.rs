use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Frame, Socket};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::frame::{RawFrame, SourceTag};

const RETRY_INTERVAL: Duration = Duration::from_secs(10);
const RETRY_POLL: Duration = Duration::from_millis(250);

/// Opens a CAN socket, retrying until it succeeds or `cancelled` returns true
///
/// # Arguments
/// * `interface` - Name of the CAN interface (e.g., "can0", "vcan0")
/// * `cancelled` - Polled between attempts; returning true aborts the retry loop
///
/// # Returns
/// A connected CanSocket, or None when the retry loop was cancelled
pub fn open_can_socket_with_retry(interface: &str, cancelled: impl Fn() -> bool) -> Option<CanSocket> {
    while !cancelled() {
        match CanSocket::open(interface) {
            Ok(socket) => {
                info!("Successfully opened CAN interface: {}", interface);
                return Some(socket);
            }
            Err(e) => {
                warn!("Failed to open CAN interface '{}': {}", interface, e);
                warn!("Retrying in {} seconds...", RETRY_INTERVAL.as_secs());
                let deadline = Instant::now() + RETRY_INTERVAL;
                while Instant::now() < deadline && !cancelled() {
                    std::thread::sleep(RETRY_POLL);
                }
            }
        }
    }
    None
}

/// Configures a CAN socket with NMEA2000-specific settings
///
/// The read timeout keeps the reader loop responsive to stop requests on a quiet bus.
pub fn configure_nmea2k_socket(socket: &mut CanSocket) -> std::io::Result<()> {
    socket.set_read_timeout(Duration::from_millis(500))?;
    socket.set_write_timeout(Duration::from_millis(100))?;
    Ok(())
}

/// Builds an extended data frame
///
/// # Returns
/// `InvalidInput` when the id does not fit 29 bits or the data exceeds 8 bytes
pub fn build_nmea2k_frame(arbitration_id: u32, data: &[u8]) -> std::io::Result<CanFrame> {
    let id = ExtendedId::new(arbitration_id).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("arbitration id {:#X} exceeds 29 bits", arbitration_id),
        )
    })?;
    CanFrame::new(id, data).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} data bytes do not fit in a CAN frame", data.len()),
        )
    })
}

/// Opens and configures a CAN socket in one attempt, for writers that must not wait
pub fn open_nmea2k_socket(interface: &str) -> std::io::Result<CanSocket> {
    let mut socket = CanSocket::open(interface)?;
    configure_nmea2k_socket(&mut socket)?;
    Ok(socket)
}

/// Writes one frame built by `build_nmea2k_frame`
pub fn write_nmea2k_frame(socket: &CanSocket, frame: &CanFrame) -> std::io::Result<()> {
    socket.write_frame(frame)
}

/// Reads one CAN frame and tags it as live traffic
///
/// # Returns
/// The frame, or an error. Timeouts surface as `WouldBlock`/`TimedOut`.
pub fn read_nmea2k_frame(socket: &CanSocket) -> std::io::Result<RawFrame> {
    let frame = socket.read_frame()?;
    let received_at = Instant::now();

    // NMEA2000 uses 29-bit extended CAN identifiers
    let extended_id = ExtendedId::new(frame.can_id().as_raw()).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "Invalid CAN ID for NMEA2000")
    })?;

    Ok(RawFrame::new(extended_id.as_raw(), frame.data(), received_at, SourceTag::Live))
}

/// True for read errors that only mean "no frame arrived before the timeout"
pub fn is_read_timeout(error: &std::io::Error) -> bool {
    matches!(error.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
}
