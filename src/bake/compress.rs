//! Payload compression
//!
//! Baked tile, frame-offset and map payloads are stored compressed inside
//! the actor document. The stock compressor serializes to JSON, brotli
//! encodes (quality 6, window 22 - the balance the document formats use) and
//! base64-wraps the result so it embeds in text documents.

use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Compression failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    /// Payload could not be serialized
    Serialize(String),
    /// Brotli encode/decode failed
    Encode(String),
    /// Stored payload is not valid base64/brotli/JSON
    Decode(String),
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::Serialize(msg) => write!(f, "serialize error: {}", msg),
            CompressError::Encode(msg) => write!(f, "encode error: {}", msg),
            CompressError::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for CompressError {}

/// JSON-compression collaborator
pub trait PayloadCompressor: Send + Sync {
    /// Compress a serializable payload into an embeddable string
    fn compress(&self, value: &serde_json::Value) -> Result<String, CompressError>;
}

/// Stock compressor: JSON -> brotli -> base64
#[derive(Debug, Default)]
pub struct BrotliCompressor;

impl PayloadCompressor for BrotliCompressor {
    fn compress(&self, value: &serde_json::Value) -> Result<String, CompressError> {
        let json = serde_json::to_vec(value).map_err(|e| CompressError::Serialize(e.to_string()))?;

        let mut compressed = Vec::new();
        brotli::BrotliCompress(
            &mut Cursor::new(&json),
            &mut compressed,
            &brotli::enc::BrotliEncoderParams {
                quality: 6,
                lgwin: 22,
                ..Default::default()
            },
        )
        .map_err(|e| CompressError::Encode(format!("brotli compression failed: {}", e)))?;

        Ok(STANDARD.encode(compressed))
    }
}

/// Decode a payload produced by [`BrotliCompressor`]
///
/// The preview renderer and tests use this to get at stored tile data.
pub fn decompress(payload: &str) -> Result<serde_json::Value, CompressError> {
    let compressed = STANDARD
        .decode(payload)
        .map_err(|e| CompressError::Decode(format!("base64: {}", e)))?;

    let mut json = Vec::new();
    brotli::BrotliDecompress(&mut Cursor::new(&compressed), &mut json)
        .map_err(|e| CompressError::Decode(format!("brotli decompression failed: {}", e)))?;

    serde_json::from_slice(&json).map_err(|e| CompressError::Decode(format!("json: {}", e)))
}
