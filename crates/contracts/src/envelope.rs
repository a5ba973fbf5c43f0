//! Envelope - the payload unit travelling through the dispatch queue

use std::collections::BTreeMap;

use bytes::Bytes;

/// Inbound header mapping, snapshotted at ingestion time.
///
/// Keys are canonical header names (`X-Test`), values keep arrival order.
pub type HeaderSnapshot = BTreeMap<String, Vec<String>>;

/// Encoding mode, chosen once per running instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Request body forwarded as opaque bytes
    Raw,
    /// Request wrapped into a [`StructuredRecord`] and schema-encoded
    Structured,
}

impl std::fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Structured => f.write_str("structured"),
        }
    }
}

/// Request enriched with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredRecord {
    /// Remote address reported for the request (`ip:port`)
    pub source: String,
    /// Full inbound header mapping
    pub headers: HeaderSnapshot,
    /// Raw request body
    pub body: Bytes,
}

/// Value handed from an ingestion handler to the publish loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Opaque request body
    Raw(Bytes),
    /// Request body plus source address and headers
    Structured(StructuredRecord),
}

impl Envelope {
    /// Encoding mode this envelope belongs to
    pub fn mode(&self) -> EncodingMode {
        match self {
            Self::Raw(_) => EncodingMode::Raw,
            Self::Structured(_) => EncodingMode::Structured,
        }
    }

    /// Size of the carried request body in bytes
    pub fn body_len(&self) -> usize {
        match self {
            Self::Raw(body) => body.len(),
            Self::Structured(record) => record.body.len(),
        }
    }
}

impl From<StructuredRecord> for Envelope {
    fn from(record: StructuredRecord) -> Self {
        Self::Structured(record)
    }
}
