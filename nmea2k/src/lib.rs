//! NMEA2000 Protocol Library
//!
//! Protocol core of the CAN controller node:
//! - Arbitration identifier decoding (priority, PGN, source, PDU1 destination)
//! - Fast packet reassembly keyed by source, PGN and sequence id, with timeout eviction
//! - PGN registry mapping each supported PGN to its category, decoder and TTL
//! - SocketCAN helpers for the live bus
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use chrono::Utc;
//! use nmea2k::{CanBus, FastPacketReassembler, Header, PgnRegistry, TtlPolicy};
//!
//! let mut socket = CanBus::open_can_socket_with_retry("can0", || false).unwrap();
//! CanBus::configure_nmea2k_socket(&mut socket).unwrap();
//!
//! let registry = PgnRegistry::new(&TtlPolicy::new(Duration::from_secs(30)));
//! let mut reassembler = FastPacketReassembler::new(Duration::from_millis(750));
//!
//! loop {
//!     let Ok(frame) = CanBus::read_nmea2k_frame(&socket) else { continue };
//!     let Ok(header) = Header::from_arbitration_id(frame.arbitration_id) else { continue };
//!     if let Ok(Some(payload)) = reassembler.push(header, &frame) {
//!         if let Ok(record) = registry.decode(&payload, Utc::now()) {
//!             println!("{}", record);
//!         }
//!     }
//! }
//! ```

pub mod canbus;
pub mod error;
pub mod fast_packet;
pub mod frame;
pub mod identifier;
pub mod pgns;
pub mod record;
pub mod registry;

// Re-export commonly used types
pub use canbus as CanBus;
pub use error::N2kError;
pub use fast_packet::{FastPacketReassembler, MAX_FAST_PACKET_LEN, Payload, ReassemblyKey};
pub use frame::{RawFrame, SourceTag};
pub use identifier::{BROADCAST_ADDRESS, Destination, Header};
pub use pgns::{N2kMessage, PgnKind};
pub use record::{Category, DecodedRecord, FieldValue, Fields};
pub use registry::{PgnRegistry, RegistryEntry, TtlPolicy};

// Re-export external types for convenience
pub use socketcan::{CanSocket, ExtendedId};
