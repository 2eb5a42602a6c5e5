//! Parameter grammar used by the PT 2.x parameter-block method.
//!
//! The handshake never interprets the payload itself; it hands the raw
//! string to a [`ParameterParser`] and keeps whatever map comes back.

use std::collections::HashMap;

/// Transport configuration decoded from the parameter block.
pub type AuthParameters = HashMap<String, String>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub trait ParameterParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<AuthParameters, BoxError>;
}

impl<F> ParameterParser for F
where
    F: Fn(&str) -> Result<AuthParameters, BoxError> + Send + Sync,
{
    fn parse(&self, raw: &str) -> Result<AuthParameters, BoxError> {
        self(raw)
    }
}

/// PT 2.x client parameters: a single JSON object.
///
/// String values are kept verbatim; any other value is stored as its
/// compact JSON text so nested transport options survive the trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParameters;

impl ParameterParser for JsonParameters {
    fn parse(&self, raw: &str) -> Result<AuthParameters, BoxError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;

        Ok(object
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect())
    }
}
