use thiserror::Error;

/// Decode-path failures. Each one drops the offending frame or payload; none of them is
/// fatal to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum N2kError {
    #[error("invalid identifier 0x{0:X}: exceeds 29 bits")]
    InvalidIdentifier(u32),

    #[error("malformed fast packet for PGN {pgn} from source {source_address}: {reason}")]
    MalformedFastPacket {
        pgn: u32,
        source_address: u8,
        reason: &'static str,
    },

    #[error("dangling continuation for PGN {pgn} from source {source_address} (sequence {sequence_id}, frame {frame_counter})")]
    DanglingContinuation {
        pgn: u32,
        source_address: u8,
        sequence_id: u8,
        frame_counter: u8,
    },

    #[error("reassembly timeout for PGN {pgn} from source {source_address} (sequence {sequence_id})")]
    ReassemblyTimeout {
        pgn: u32,
        source_address: u8,
        sequence_id: u8,
    },

    #[error("truncated payload for PGN {pgn}: {actual} bytes, at least {required} required")]
    TruncatedPayload {
        pgn: u32,
        actual: usize,
        required: usize,
    },
}

impl N2kError {
    /// Short stable name, used as the counter key in status reports
    pub fn kind(&self) -> &'static str {
        match self {
            N2kError::InvalidIdentifier(_) => "InvalidIdentifier",
            N2kError::MalformedFastPacket { .. } => "MalformedFastPacket",
            N2kError::DanglingContinuation { .. } => "DanglingContinuation",
            N2kError::ReassemblyTimeout { .. } => "ReassemblyTimeout",
            N2kError::TruncatedPayload { .. } => "TruncatedPayload",
        }
    }
}
