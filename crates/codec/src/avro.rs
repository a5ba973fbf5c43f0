//! Avro schema for structured envelopes

use std::collections::HashMap;

use apache_avro::types::{Record, Value};
use apache_avro::{to_avro_datum, Schema};
use contracts::{ContractError, StructuredRecord};

/// Field names every envelope schema must declare
pub const REQUIRED_FIELDS: [&str; 3] = ["source", "headers", "body"];

/// Parsed and checked Avro schema for [`StructuredRecord`]
#[derive(Debug, Clone)]
pub struct EnvelopeSchema {
    schema: Schema,
    canonical: String,
}

impl EnvelopeSchema {
    /// Parse `text` and check it is a record carrying `source`, `headers` and `body`
    ///
    /// # Errors
    /// Returns a schema error for invalid JSON/Avro or a non-conforming record
    pub fn parse(text: &str) -> Result<Self, ContractError> {
        let schema = Schema::parse_str(text)
            .map_err(|e| ContractError::schema(format!("invalid Avro schema: {e}")))?;

        let record = Record::new(&schema)
            .ok_or_else(|| ContractError::schema("envelope schema must be an Avro record"))?;

        for required in REQUIRED_FIELDS {
            if !record.fields.iter().any(|(name, _)| name == required) {
                return Err(ContractError::schema(format!(
                    "envelope schema is missing field '{required}'"
                )));
            }
        }

        let canonical = schema.canonical_form();
        Ok(Self { schema, canonical })
    }

    /// Underlying Avro schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Canonical form, as submitted to the registry
    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }

    /// Encode `record` as a bare Avro datum
    ///
    /// # Errors
    /// Returns an encode error when the record does not satisfy the schema
    pub fn encode_record(&self, record: &StructuredRecord) -> Result<Vec<u8>, ContractError> {
        let mut avro = Record::new(&self.schema)
            .ok_or_else(|| ContractError::schema("envelope schema must be an Avro record"))?;

        avro.put("source", Value::String(record.source.clone()));
        avro.put("headers", headers_value(record));
        avro.put("body", Value::Bytes(record.body.to_vec()));

        let value = Value::from(avro)
            .resolve(&self.schema)
            .map_err(|e| ContractError::encode("avro", format!("record does not match schema: {e}")))?;

        to_avro_datum(&self.schema, value)
            .map_err(|e| ContractError::encode("avro", e.to_string()))
    }
}

fn headers_value(record: &StructuredRecord) -> Value {
    let map: HashMap<String, Value> = record
        .headers
        .iter()
        .map(|(name, values)| {
            let items = values.iter().cloned().map(Value::String).collect();
            (name.clone(), Value::Array(items))
        })
        .collect();
    Value::Map(map)
}
