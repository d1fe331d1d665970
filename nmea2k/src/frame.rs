use std::fmt;
use std::time::Instant;

use serde::Serialize;

/// Where a frame entered the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Live,
    Playback,
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SourceTag::Live => write!(f, "live"),
            SourceTag::Playback => write!(f, "playback"),
        }
    }
}

/// A single CAN frame as read from the bus or a recorded log
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub arbitration_id: u32,
    pub data: Vec<u8>,
    pub timestamp: Instant,
    pub source_tag: SourceTag,
}

impl RawFrame {
    /// Maximum data length of a classic CAN frame
    pub const MAX_DATA_LEN: usize = 8;

    pub fn new(arbitration_id: u32, data: &[u8], timestamp: Instant, source_tag: SourceTag) -> Self {
        let len = data.len().min(Self::MAX_DATA_LEN);
        Self {
            arbitration_id,
            data: data[..len].to_vec(),
            timestamp,
            source_tag,
        }
    }
}

pub fn format_data_bytes(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {:08X} [{}] {}", self.source_tag, self.arbitration_id, self.data.len(), format_data_bytes(&self.data))
    }
}
