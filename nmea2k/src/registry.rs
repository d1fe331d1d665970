use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::N2kError;
use crate::fast_packet::Payload;
use crate::pgns::{N2kMessage, PgnKind};
use crate::record::{Category, DecodedRecord};

/// How long published records stay fresh. Resolved once per PGN when the registry is built.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    default_ttl: Duration,
    by_category: HashMap<Category, Duration>,
    by_pgn: HashMap<u32, Duration>,
}

impl TtlPolicy {
    /// `default_ttl` applies to unregistered PGNs and to any category without its own value
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            by_category: HashMap::new(),
            by_pgn: HashMap::new(),
        }
    }

    pub fn with_category(mut self, category: Category, ttl: Duration) -> Self {
        self.by_category.insert(category, ttl);
        self
    }

    pub fn with_pgn(mut self, pgn: u32, ttl: Duration) -> Self {
        self.by_pgn.insert(pgn, ttl);
        self
    }

    fn resolve(&self, pgn: u32, category: Category) -> Duration {
        self.by_pgn
            .get(&pgn)
            .or_else(|| self.by_category.get(&category))
            .copied()
            .unwrap_or(self.default_ttl)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub kind: PgnKind,
    pub category: Category,
    pub ttl: Duration,
}

/// Read-only PGN → {category, decoder, TTL} mapping
///
/// Built once at startup; share it behind an `Arc`.
#[derive(Debug)]
pub struct PgnRegistry {
    entries: HashMap<u32, RegistryEntry>,
    unknown_ttl: Duration,
}

impl PgnRegistry {
    pub fn new(policy: &TtlPolicy) -> Self {
        let entries = PgnKind::ALL
            .into_iter()
            .map(|kind| {
                let category = kind.category();
                let entry = RegistryEntry {
                    kind,
                    category,
                    ttl: policy.resolve(kind.pgn(), category),
                };
                (kind.pgn(), entry)
            })
            .collect();

        Self {
            entries,
            unknown_ttl: policy.resolve(0, Category::Unknown),
        }
    }

    pub fn lookup(&self, pgn: u32) -> Option<&RegistryEntry> {
        self.entries.get(&pgn)
    }

    pub fn category(&self, pgn: u32) -> Category {
        self.lookup(pgn).map(|entry| entry.category).unwrap_or(Category::Unknown)
    }

    pub fn ttl(&self, pgn: u32) -> Duration {
        self.lookup(pgn).map(|entry| entry.ttl).unwrap_or(self.unknown_ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a payload into a TTL-tagged record
    ///
    /// Unregistered PGNs yield an `UNKNOWN` record carrying the raw bytes.
    pub fn decode(&self, payload: &Payload, decoded_at: DateTime<Utc>) -> Result<DecodedRecord, N2kError> {
        let pgn = payload.header.pgn;
        let (name, category, message, ttl) = match self.lookup(pgn) {
            Some(entry) => {
                let message = entry.kind.decode(&payload.data).ok_or(N2kError::TruncatedPayload {
                    pgn,
                    actual: payload.data.len(),
                    required: entry.kind.min_len(),
                })?;
                (entry.kind.name(), entry.category, message, entry.ttl)
            }
            None => (
                "Unknown",
                Category::Unknown,
                N2kMessage::Unknown(pgn, payload.data.clone()),
                self.unknown_ttl,
            ),
        };

        Ok(DecodedRecord {
            pgn,
            name,
            source_address: payload.header.source_address,
            category,
            fields: message.fields(),
            decoded_at,
            expires_at: decoded_at + chrono::Duration::milliseconds(ttl.as_millis() as i64),
        })
    }
}
