//! Pluggable serialization trait

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Trait for pluggable serialization formats
///
/// The manager serializes values before they reach a store and deserializes
/// them on the way back out; backends only ever see bytes.
pub trait Serializer: Send + Sync + Clone + 'static {
    /// Name of the serializer (for debugging/logging)
    fn name(&self) -> &str;

    /// Serialize a value to bytes
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError>;

    /// Deserialize bytes to a value
    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError>;
}

/// JSON serializer (default)
///
/// Human-readable and matches what the remote store sends over the wire.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

#[cfg(feature = "json")]
impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}

/// MessagePack serializer (optional)
///
/// More compact than JSON, but not human-readable. Enable with the
/// `msgpack` feature.
#[cfg(feature = "msgpack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSerializer;

#[cfg(feature = "msgpack")]
impl Serializer for MsgPackSerializer {
    fn name(&self) -> &str {
        "msgpack"
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CacheError> {
        rmp_serde::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CacheError> {
        rmp_serde::from_slice(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let serializer = JsonSerializer;
        let value = vec![1, 2, 3, 4, 5];

        let bytes = serializer.serialize(&value).unwrap();
        let decoded: Vec<i32> = serializer.deserialize(&bytes).unwrap();

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_json_struct() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct TestStruct {
            name: String,
            value: i32,
        }

        let serializer = JsonSerializer;
        let value = TestStruct {
            name: "test".to_string(),
            value: 42,
        };

        let bytes = serializer.serialize(&value).unwrap();
        let decoded: TestStruct = serializer.deserialize(&bytes).unwrap();

        assert_eq!(value, decoded);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let serializer = JsonSerializer;
        let result = serializer.deserialize::<i64>(b"not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_json_serializer_name() {
        assert_eq!(JsonSerializer.name(), "json");
    }
}
