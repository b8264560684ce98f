//! Structured document codec seam.
//!
//! The engine never touches JSON text directly; it hands byte buffers to a
//! [`DocumentCodec`] and works on the parsed document tree. The production
//! codec is [`JsonCodec`]; tests may substitute failing codecs.

use kestrel_common::error::ErrorCode;

/// The structured document model: null, bool, number, string, list, object.
pub type Document = serde_json::Value;

/// Native errors of a codec, mapped into the [`ErrorCode`] taxonomy at this
/// boundary and nowhere else.
#[derive(Debug)]
pub enum CodecError {
    Parse(String),
    Serialize(String),
}

impl From<CodecError> for ErrorCode {
    fn from(cause: CodecError) -> Self {
        match cause {
            CodecError::Parse(msg) => {
                tracing::error!("document parse failed: {msg}");
                ErrorCode::JsonParserError
            }
            CodecError::Serialize(msg) => {
                tracing::error!("document serialize failed: {msg}");
                ErrorCode::JsonGeneratorError
            }
        }
    }
}

/// Parser and writer for the on-disk document representation.
pub trait DocumentCodec: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError>;
    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError>;
}

/// JSON codec. Serializes pretty-printed so generation files stay readable
/// for operators inspecting a store directory.
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn parse(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Parse(e.to_string()))
    }

    fn serialize(&self, doc: &Document) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec_pretty(doc).map_err(|e| CodecError::Serialize(e.to_string()))
    }
}
