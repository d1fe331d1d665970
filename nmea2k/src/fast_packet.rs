use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::N2kError;
use crate::frame::{RawFrame, SourceTag};
use crate::identifier::Header;
use crate::pgns::is_fast_packet_pgn;

/// Largest payload a fast packet sequence can carry: 6 bytes in the first frame plus
/// 7 bytes in each of 31 continuation frames
pub const MAX_FAST_PACKET_LEN: usize = 223;

const FIRST_FRAME_DATA: usize = 6;
const CONTINUATION_FRAME_DATA: usize = 7;

/// Identifies one in-progress fast packet message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReassemblyKey {
    pub source_address: u8,
    pub pgn: u32,
    pub sequence_id: u8,
}

struct ReassemblyBuffer {
    expected_total_length: usize,
    // Payload bytes, each chunk written at the offset its frame counter implies
    data: Vec<u8>,
    // Bytes written per frame counter; None until that frame arrives. Duplicates overwrite.
    received: Vec<Option<usize>>,
    first_seen: Instant,
    last_frame_counter: u8,
}

/// Payload offset and byte count carried by `frame_counter` in a payload of `total_len`
fn chunk_span(frame_counter: u8, total_len: usize) -> (usize, usize) {
    let (offset, capacity) = match frame_counter {
        0 => (0, FIRST_FRAME_DATA),
        n => (FIRST_FRAME_DATA + CONTINUATION_FRAME_DATA * (n as usize - 1), CONTINUATION_FRAME_DATA),
    };
    (offset, capacity.min(total_len.saturating_sub(offset)))
}

impl ReassemblyBuffer {
    fn new(total_len: usize, first_chunk: &[u8], first_seen: Instant) -> Self {
        let expected_frames = 1 + (total_len - FIRST_FRAME_DATA).div_ceil(CONTINUATION_FRAME_DATA);
        let mut buffer = Self {
            expected_total_length: total_len,
            data: vec![0; total_len],
            received: vec![None; expected_frames],
            first_seen,
            last_frame_counter: 0,
        };
        buffer.insert(0, first_chunk);
        buffer
    }

    /// Store a chunk at its counter offset. Returns false when the counter lies past the
    /// declared length, in which case the bytes are discarded.
    fn insert(&mut self, frame_counter: u8, chunk: &[u8]) -> bool {
        self.last_frame_counter = frame_counter;
        let Some(slot) = self.received.get_mut(frame_counter as usize) else {
            return false;
        };
        let (offset, span) = chunk_span(frame_counter, self.expected_total_length);
        let written = chunk.len().min(span);
        self.data[offset..offset + written].copy_from_slice(&chunk[..written]);
        *slot = Some(written);
        true
    }

    fn is_complete(&self) -> bool {
        self.received.iter().all(Option::is_some)
    }

    /// True when some arrived frame was too short to fill its span
    fn has_gaps(&self) -> bool {
        self.received.iter().enumerate().any(|(counter, written)| {
            let (_, span) = chunk_span(counter as u8, self.expected_total_length);
            written.is_some_and(|written| written < span)
        })
    }

    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.first_seen) > timeout
    }
}

/// A complete PGN payload, either a single frame or a reassembled fast packet
#[derive(Debug, Clone)]
pub struct Payload {
    pub header: Header,
    pub data: Vec<u8>,
    pub source_tag: SourceTag,
    pub received_at: Instant,
    pub is_fast_packet: bool,
}

/// Stateful reassembler turning CAN frames into complete payloads
///
/// Single-frame PGNs pass straight through. Fast packet PGNs are collected per
/// {source, PGN, sequence id} until every frame counter the declared length needs has
/// arrived. Buffers older than the reassembly timeout are dropped, never delivered.
pub struct FastPacketReassembler {
    buffers: HashMap<ReassemblyKey, ReassemblyBuffer>,
    timeout: Duration,
}

impl FastPacketReassembler {
    pub fn new(timeout: Duration) -> Self {
        Self {
            buffers: HashMap::new(),
            timeout,
        }
    }

    /// Number of fast packet messages currently waiting for frames
    pub fn pending(&self) -> usize {
        self.buffers.len()
    }

    /// Drop all partial state
    pub fn clear(&mut self) {
        if !self.buffers.is_empty() {
            debug!("Discarding {} partial fast packet buffers", self.buffers.len());
        }
        self.buffers.clear();
    }

    /// Remove buffers older than the timeout, returning one `ReassemblyTimeout` per buffer
    pub fn evict_stale(&mut self, now: Instant) -> Vec<N2kError> {
        let timeout = self.timeout;
        let mut evicted = Vec::new();
        self.buffers.retain(|key, buffer| {
            if buffer.is_expired(now, timeout) {
                evicted.push(N2kError::ReassemblyTimeout {
                    pgn: key.pgn,
                    source_address: key.source_address,
                    sequence_id: key.sequence_id,
                });
                false
            } else {
                true
            }
        });
        for error in &evicted {
            debug!("{}", error);
        }
        evicted
    }

    /// Process one frame
    ///
    /// # Returns
    /// `Ok(Some(payload))` when a message is complete, `Ok(None)` while a fast packet is
    /// still being collected, or the decode-path error for this frame.
    pub fn push(&mut self, header: Header, frame: &RawFrame) -> Result<Option<Payload>, N2kError> {
        if !is_fast_packet_pgn(header.pgn) {
            return Ok(Some(Payload {
                header,
                data: frame.data.clone(),
                source_tag: frame.source_tag,
                received_at: frame.timestamp,
                is_fast_packet: false,
            }));
        }

        let data = &frame.data;
        let Some(&control) = data.first() else {
            return Err(self.malformed(&header, "empty frame"));
        };
        let sequence_id = control >> 5;
        let frame_counter = control & 0x1F;
        let key = ReassemblyKey {
            source_address: header.source_address,
            pgn: header.pgn,
            sequence_id,
        };

        if frame_counter == 0 {
            self.process_first_frame(header, frame, key)
        } else {
            self.process_continuation(header, frame, key, frame_counter)
        }
    }

    fn process_first_frame(
        &mut self,
        header: Header,
        frame: &RawFrame,
        key: ReassemblyKey,
    ) -> Result<Option<Payload>, N2kError> {
        let data = &frame.data;
        let Some(&total_len) = data.get(1) else {
            return Err(self.malformed(&header, "first frame carries no length"));
        };
        let total_len = total_len as usize;
        if total_len == 0 {
            return Err(self.malformed(&header, "declared length is zero"));
        }
        if total_len > MAX_FAST_PACKET_LEN {
            return Err(self.malformed(&header, "declared length exceeds 223 bytes"));
        }

        let chunk = &data[2..];
        if total_len <= FIRST_FRAME_DATA {
            if chunk.len() < total_len {
                return Err(self.malformed(&header, "single frame shorter than declared length"));
            }
            return Ok(Some(Payload {
                header,
                data: chunk[..total_len].to_vec(),
                source_tag: frame.source_tag,
                received_at: frame.timestamp,
                is_fast_packet: true,
            }));
        }

        if self.buffers.remove(&key).is_some() {
            debug!(pgn = key.pgn, source = key.source_address, sequence = key.sequence_id,
                "Restarting fast packet sequence before completion");
        }
        self.buffers
            .insert(key, ReassemblyBuffer::new(total_len, chunk, frame.timestamp));
        Ok(None)
    }

    fn process_continuation(
        &mut self,
        header: Header,
        frame: &RawFrame,
        key: ReassemblyKey,
        frame_counter: u8,
    ) -> Result<Option<Payload>, N2kError> {
        let Some(buffer) = self.buffers.get_mut(&key) else {
            return Err(N2kError::DanglingContinuation {
                pgn: key.pgn,
                source_address: key.source_address,
                sequence_id: key.sequence_id,
                frame_counter,
            });
        };

        if buffer.is_expired(frame.timestamp, self.timeout) {
            self.buffers.remove(&key);
            return Err(N2kError::ReassemblyTimeout {
                pgn: key.pgn,
                source_address: key.source_address,
                sequence_id: key.sequence_id,
            });
        }

        if frame_counter != buffer.last_frame_counter.wrapping_add(1) {
            debug!(pgn = key.pgn, frame_counter, previous = buffer.last_frame_counter,
                "Fast packet frame out of order");
        }
        if !buffer.insert(frame_counter, &frame.data[1..]) {
            debug!(pgn = key.pgn, frame_counter, "Ignoring bytes past declared fast packet length");
        }

        if !buffer.is_complete() {
            return Ok(None);
        }

        let Some(buffer) = self.buffers.remove(&key) else {
            return Ok(None);
        };
        if buffer.has_gaps() {
            return Err(self.malformed(&header, "frame shorter than its share of the declared length"));
        }

        Ok(Some(Payload {
            header,
            data: buffer.data,
            source_tag: frame.source_tag,
            received_at: frame.timestamp,
            is_fast_packet: true,
        }))
    }

    fn malformed(&self, header: &Header, reason: &'static str) -> N2kError {
        let error = N2kError::MalformedFastPacket {
            pgn: header.pgn,
            source_address: header.source_address,
            reason,
        };
        warn!("{}", error);
        error
    }
}

/// Split a payload into fast packet frame data using the given sequence id
pub fn fast_packet_frames(sequence_id: u8, payload: &[u8]) -> Vec<Vec<u8>> {
    let sequence = (sequence_id & 0x07) << 5;
    let mut frames = Vec::new();

    let mut first = vec![sequence, payload.len() as u8];
    first.extend_from_slice(&payload[..payload.len().min(FIRST_FRAME_DATA)]);
    first.resize(8, 0xFF);
    frames.push(first);

    if payload.len() > FIRST_FRAME_DATA {
        for (index, chunk) in payload[FIRST_FRAME_DATA..].chunks(CONTINUATION_FRAME_DATA).enumerate() {
            let mut frame = vec![sequence | (index as u8 + 1)];
            frame.extend_from_slice(chunk);
            frame.resize(8, 0xFF);
            frames.push(frame);
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Destination;

    const TIMEOUT: Duration = Duration::from_millis(750);

    fn header(pgn: u32, source_address: u8) -> Header {
        Header {
            priority: 3,
            pgn,
            source_address,
            destination: Destination::Broadcast,
        }
    }

    fn frame(header: &Header, data: &[u8], at: Instant) -> RawFrame {
        RawFrame::new(header.to_arbitration_id(), data, at, SourceTag::Live)
    }

    fn sample_payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_single_frame_pgn_passes_through() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(127488, 1);
        let data = [0x00, 0x70, 0x17, 0xDC, 0x05, 0x0A, 0xFF, 0xFF];
        let payload = reassembler.push(h, &frame(&h, &data, Instant::now())).unwrap().unwrap();
        assert_eq!(payload.data, data);
        assert!(!payload.is_fast_packet);
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_round_trip_reproduces_payload() {
        let h = header(129029, 0x1C);
        let now = Instant::now();
        for len in [7usize, 13, 43, 100, MAX_FAST_PACKET_LEN] {
            let mut reassembler = FastPacketReassembler::new(TIMEOUT);
            let original = sample_payload(len);
            let frames = fast_packet_frames(2, &original);
            let (last, rest) = frames.split_last().unwrap();
            for data in rest {
                assert!(reassembler.push(h, &frame(&h, data, now)).unwrap().is_none());
            }
            let payload = reassembler.push(h, &frame(&h, last, now)).unwrap().unwrap();
            assert_eq!(payload.data, original, "length {}", len);
            assert!(payload.is_fast_packet);
            assert_eq!(reassembler.pending(), 0);
        }
    }

    #[test]
    fn test_short_fast_packet_completes_in_first_frame() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(127506, 4);
        let data = [0x40, 0x04, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF];
        let payload = reassembler.push(h, &frame(&h, &data, Instant::now())).unwrap().unwrap();
        assert_eq!(payload.data, vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_zero_length_is_malformed() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let data = [0x20, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let result = reassembler.push(h, &frame(&h, &data, Instant::now()));
        assert!(matches!(result, Err(N2kError::MalformedFastPacket { pgn: 129029, .. })));
    }

    #[test]
    fn test_oversized_length_is_malformed() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let data = [0x20, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            reassembler.push(h, &frame(&h, &data, Instant::now())),
            Err(N2kError::MalformedFastPacket { .. })
        ));
    }

    #[test]
    fn test_continuation_without_buffer_is_dangling() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 7);
        let data = [0x63, 1, 2, 3, 4, 5, 6, 7];
        let result = reassembler.push(h, &frame(&h, &data, Instant::now()));
        assert_eq!(
            result.unwrap_err(),
            N2kError::DanglingContinuation {
                pgn: 129029,
                source_address: 7,
                sequence_id: 3,
                frame_counter: 3,
            }
        );
    }

    #[test]
    fn test_duplicate_frame_counter_overwrites() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let original = sample_payload(20);
        let frames = fast_packet_frames(1, &original);
        let now = Instant::now();

        assert!(reassembler.push(h, &frame(&h, &frames[0], now)).unwrap().is_none());
        assert!(reassembler.push(h, &frame(&h, &frames[1], now)).unwrap().is_none());
        // Same counter again, identical content
        assert!(reassembler.push(h, &frame(&h, &frames[1], now)).unwrap().is_none());
        let payload = reassembler.push(h, &frame(&h, &frames[2], now)).unwrap().unwrap();
        assert_eq!(payload.data, original);
    }

    #[test]
    fn test_out_of_order_waits_for_gap() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let original = sample_payload(27);
        let frames = fast_packet_frames(5, &original);
        assert_eq!(frames.len(), 4);
        let now = Instant::now();

        assert!(reassembler.push(h, &frame(&h, &frames[0], now)).unwrap().is_none());
        assert!(reassembler.push(h, &frame(&h, &frames[3], now)).unwrap().is_none());
        assert!(reassembler.push(h, &frame(&h, &frames[1], now)).unwrap().is_none());
        assert_eq!(reassembler.pending(), 1);
        let payload = reassembler.push(h, &frame(&h, &frames[2], now)).unwrap().unwrap();
        assert_eq!(payload.data, original);
    }

    #[test]
    fn test_sequences_are_keyed_by_source_and_sequence_id() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let a = header(129029, 1);
        let b = header(129029, 2);
        let payload_a = sample_payload(15);
        let payload_b: Vec<u8> = sample_payload(15).iter().map(|b| !b).collect();
        let frames_a = fast_packet_frames(0, &payload_a);
        let frames_b = fast_packet_frames(0, &payload_b);
        let now = Instant::now();

        reassembler.push(a, &frame(&a, &frames_a[0], now)).unwrap();
        reassembler.push(b, &frame(&b, &frames_b[0], now)).unwrap();
        reassembler.push(a, &frame(&a, &frames_a[1], now)).unwrap();
        reassembler.push(b, &frame(&b, &frames_b[1], now)).unwrap();
        let done_b = reassembler.push(b, &frame(&b, &frames_b[2], now)).unwrap().unwrap();
        let done_a = reassembler.push(a, &frame(&a, &frames_a[2], now)).unwrap().unwrap();
        assert_eq!(done_a.data, payload_a);
        assert_eq!(done_b.data, payload_b);
    }

    #[test]
    fn test_stale_buffer_is_evicted_and_never_delivered() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 9);
        let original = sample_payload(20);
        let frames = fast_packet_frames(4, &original);
        let start = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], start)).unwrap();
        reassembler.push(h, &frame(&h, &frames[1], start)).unwrap();

        let late = start + TIMEOUT + Duration::from_millis(1);
        let evicted = reassembler.evict_stale(late);
        assert_eq!(
            evicted,
            vec![N2kError::ReassemblyTimeout { pgn: 129029, source_address: 9, sequence_id: 4 }]
        );
        assert_eq!(reassembler.pending(), 0);

        let result = reassembler.push(h, &frame(&h, &frames[2], late));
        assert!(matches!(result, Err(N2kError::DanglingContinuation { .. })));
    }

    #[test]
    fn test_expired_buffer_rejected_without_sweep() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 9);
        let frames = fast_packet_frames(4, &sample_payload(20));
        let start = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], start)).unwrap();
        reassembler.push(h, &frame(&h, &frames[1], start)).unwrap();
        let late = start + TIMEOUT * 2;
        let result = reassembler.push(h, &frame(&h, &frames[2], late));
        assert!(matches!(result, Err(N2kError::ReassemblyTimeout { sequence_id: 4, .. })));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_fresh_buffer_survives_sweep() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 9);
        let frames = fast_packet_frames(0, &sample_payload(20));
        let start = Instant::now();
        reassembler.push(h, &frame(&h, &frames[0], start)).unwrap();
        assert!(reassembler.evict_stale(start + TIMEOUT / 2).is_empty());
        assert_eq!(reassembler.pending(), 1);
    }

    #[test]
    fn test_counter_past_declared_length_is_truncated() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let original = sample_payload(10);
        let frames = fast_packet_frames(0, &original);
        assert_eq!(frames.len(), 2);
        let now = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], now)).unwrap();
        // Counter 3 lies beyond the two frames a 10 byte payload needs
        assert!(reassembler.push(h, &frame(&h, &[0x03, 9, 9, 9, 9, 9, 9, 9], now)).unwrap().is_none());
        let payload = reassembler.push(h, &frame(&h, &frames[1], now)).unwrap().unwrap();
        assert_eq!(payload.data, original);
    }

    #[test]
    fn test_short_continuation_frame_is_malformed() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(127506, 4);
        let frames = fast_packet_frames(1, &sample_payload(15));
        assert_eq!(frames.len(), 3);
        let now = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], now)).unwrap();
        // DLC 6: five data bytes where counter 1 owes seven
        assert!(reassembler.push(h, &frame(&h, &frames[1][..6], now)).unwrap().is_none());
        let result = reassembler.push(h, &frame(&h, &frames[2], now));
        assert!(matches!(result, Err(N2kError::MalformedFastPacket { pgn: 127506, source_address: 4, .. })));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_unpadded_final_frame_completes() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(127506, 4);
        let original = sample_payload(15);
        let frames = fast_packet_frames(1, &original);
        let now = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], now)).unwrap();
        reassembler.push(h, &frame(&h, &frames[1], now)).unwrap();
        // Counter 2 carries only the last two payload bytes
        let payload = reassembler.push(h, &frame(&h, &frames[2][..3], now)).unwrap().unwrap();
        assert_eq!(payload.data, original);
    }

    #[test]
    fn test_last_frame_first_lands_at_its_offset() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 2);
        let original = sample_payload(27);
        let frames = fast_packet_frames(5, &original);
        assert_eq!(frames.len(), 4);
        let now = Instant::now();

        reassembler.push(h, &frame(&h, &frames[0], now)).unwrap();
        reassembler.push(h, &frame(&h, &frames[3], now)).unwrap();
        reassembler.push(h, &frame(&h, &frames[2], now)).unwrap();
        let payload = reassembler.push(h, &frame(&h, &frames[1], now)).unwrap().unwrap();
        assert_eq!(payload.data, original);
    }

    #[test]
    fn test_new_first_frame_restarts_sequence() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let stale = fast_packet_frames(2, &sample_payload(20));
        let fresh_payload: Vec<u8> = (0..20).collect();
        let fresh = fast_packet_frames(2, &fresh_payload);
        let now = Instant::now();

        reassembler.push(h, &frame(&h, &stale[0], now)).unwrap();
        reassembler.push(h, &frame(&h, &stale[1], now)).unwrap();
        reassembler.push(h, &frame(&h, &fresh[0], now)).unwrap();
        reassembler.push(h, &frame(&h, &fresh[1], now)).unwrap();
        let payload = reassembler.push(h, &frame(&h, &fresh[2], now)).unwrap().unwrap();
        assert_eq!(payload.data, fresh_payload);
    }

    #[test]
    fn test_clear_drops_partial_state() {
        let mut reassembler = FastPacketReassembler::new(TIMEOUT);
        let h = header(129029, 1);
        let frames = fast_packet_frames(0, &sample_payload(20));
        let now = Instant::now();
        reassembler.push(h, &frame(&h, &frames[0], now)).unwrap();
        reassembler.clear();
        assert_eq!(reassembler.pending(), 0);
        assert!(reassembler.push(h, &frame(&h, &frames[1], now)).is_err());
    }
}
