use std::fmt;

use serde::Serialize;

use crate::error::N2kError;

/// Largest value representable by an extended (29-bit) CAN identifier
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Global address used for broadcast messages
pub const BROADCAST_ADDRESS: u8 = 0xFF;

/// PDU format values below this carry a destination address in the PDU specific byte
const PDU2_THRESHOLD: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Address(u8),
    Broadcast,
}

impl Destination {
    pub fn as_u8(&self) -> u8 {
        match self {
            Destination::Address(address) => *address,
            Destination::Broadcast => BROADCAST_ADDRESS,
        }
    }
}

/// NMEA2000 header fields carried by a 29-bit arbitration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub priority: u8,
    pub pgn: u32,
    pub source_address: u8,
    pub destination: Destination,
}

impl Header {
    /// Decode an arbitration identifier
    ///
    /// Layout (MSB first): priority (3) | reserved (1) | data page (1) | PDU format (8) |
    /// PDU specific (8) | source address (8). For PDU1 messages (PDU format < 240) the
    /// PDU specific byte is the destination address and is not part of the PGN.
    pub fn from_arbitration_id(id: u32) -> Result<Self, N2kError> {
        if id > MAX_EXTENDED_ID {
            return Err(N2kError::InvalidIdentifier(id));
        }

        let priority = ((id >> 26) & 0x07) as u8;
        let data_pages = (id >> 24) & 0x03;
        let pdu_format = ((id >> 16) & 0xFF) as u8;
        let pdu_specific = ((id >> 8) & 0xFF) as u8;
        let source_address = (id & 0xFF) as u8;

        let (pgn, destination) = if pdu_format < PDU2_THRESHOLD {
            let destination = if pdu_specific == BROADCAST_ADDRESS {
                Destination::Broadcast
            } else {
                Destination::Address(pdu_specific)
            };
            ((data_pages << 16) | ((pdu_format as u32) << 8), destination)
        } else {
            (
                (data_pages << 16) | ((pdu_format as u32) << 8) | pdu_specific as u32,
                Destination::Broadcast,
            )
        };

        Ok(Header {
            priority,
            pgn,
            source_address,
            destination,
        })
    }

    /// Build the arbitration identifier for this header
    pub fn to_arbitration_id(&self) -> u32 {
        let pdu_format = ((self.pgn >> 8) & 0xFF) as u8;
        let pgn_field = if pdu_format < PDU2_THRESHOLD {
            (self.pgn & 0x3FF00) | self.destination.as_u8() as u32
        } else {
            self.pgn & 0x3FFFF
        };
        ((self.priority as u32 & 0x07) << 26) | (pgn_field << 8) | self.source_address as u32
    }

    pub fn is_pdu1(&self) -> bool {
        (((self.pgn >> 8) & 0xFF) as u8) < PDU2_THRESHOLD
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PGN {} prio {} src {} ", self.pgn, self.priority, self.source_address)?;
        match self.destination {
            Destination::Address(address) => write!(f, "dst {}", address),
            Destination::Broadcast => write!(f, "dst *"),
        }
    }
}
