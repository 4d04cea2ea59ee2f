//! Value codecs.
//!
//! A codec turns an entity into the bytes the backend stores and back. The
//! read path and write path of a cache client always share one codec type,
//! so entries written by a client are readable by the same client.
//!
//! - [`JsonCodec`] (default): field-named JSON, inspectable with `redis-cli`
//! - [`BincodeCodec`]: compact binary, smaller entries, not self-describing

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors from encoding or decoding a cached value.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON encoding or decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode encoding or decoding failed.
    #[error("bincode codec error: {0}")]
    Bincode(#[from] bincode::Error),
}

/// Converts entities of type `T` to and from their stored byte form.
pub trait Codec<T>: Send + Sync {
    /// Encode an entity for storage.
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Decode stored bytes into an entity.
    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// JSON codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<T> Codec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Binary codec backed by `bincode`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl<T> Codec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
