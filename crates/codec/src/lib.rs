//! # Codec
//!
//! Byte encoders handed to the producer.
//!
//! - [`RawEncoder`]: pass-through, forwards the request body untouched
//! - [`SchemaRegistryEncoder`]: Avro datum in Confluent wire format, schema id
//!   resolved against a schema registry
//!
//! [`select_encoders`] picks the pair (key + value) once per service start.

mod avro;
mod raw;
mod registry;
mod schema_registry;
mod selection;

pub use avro::EnvelopeSchema;
pub use raw::RawEncoder;
pub use registry::SchemaRegistryClient;
pub use schema_registry::{SchemaRegistryEncoder, MAGIC_BYTE};
pub use selection::{select_encoders, EncoderPair, SelectedEncoder};
