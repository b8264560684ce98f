//! Tagged-value envelope between [`KvsValue`] and the document model.
//!
//! Every stored value is wrapped as `{"t": TAG, "v": PAYLOAD}` so the
//! sum-type tag survives (de)serialization; plain JSON numbers could not
//! distinguish the four integer widths from `f64`. A top-level store file
//! is a document object mapping keys to such envelopes.
//!
//! Decoding is strict: the envelope must be an object with exactly the
//! keys `t` and `v`, the tag must be a known string, the payload must
//! match the tag's shape, and integers must round-trip to the declared
//! width. Any violation is `InvalidValueType`, and the first failing
//! child fails the whole decode.

use std::collections::HashMap;

use kestrel_common::error::{ErrorCode, KvsResult};
use kestrel_common::value::KvsValue;

use crate::codec::Document;

/// Encode one value into its tagged document form.
///
/// The only unrepresentable value is a non-finite `F64`: JSON numbers
/// cannot carry NaN or infinities.
pub fn encode_value(value: &KvsValue) -> KvsResult<Document> {
    let payload = match value {
        KvsValue::Null => Document::Null,
        KvsValue::Boolean(b) => Document::Bool(*b),
        KvsValue::I32(n) => Document::from(*n),
        KvsValue::U32(n) => Document::from(*n),
        KvsValue::I64(n) => Document::from(*n),
        KvsValue::U64(n) => Document::from(*n),
        KvsValue::F64(f) => {
            let number =
                serde_json::Number::from_f64(*f).ok_or(ErrorCode::InvalidValueType)?;
            Document::Number(number)
        }
        KvsValue::String(s) => Document::String(s.clone()),
        KvsValue::Array(items) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                list.push(encode_value(item)?);
            }
            Document::Array(list)
        }
        KvsValue::Object(map) => {
            let mut obj = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                obj.insert(key.clone(), encode_value(item)?);
            }
            Document::Object(obj)
        }
    };

    let mut envelope = serde_json::Map::with_capacity(2);
    envelope.insert("t".to_string(), Document::String(value.type_tag().to_string()));
    envelope.insert("v".to_string(), payload);
    Ok(Document::Object(envelope))
}

/// Decode one tagged document back into a value.
pub fn decode_value(doc: &Document) -> KvsResult<KvsValue> {
    let envelope = match doc {
        Document::Object(map) if map.len() == 2 => map,
        _ => return Err(ErrorCode::InvalidValueType),
    };
    let tag = match envelope.get("t") {
        Some(Document::String(tag)) => tag.as_str(),
        _ => return Err(ErrorCode::InvalidValueType),
    };
    let payload = envelope.get("v").ok_or(ErrorCode::InvalidValueType)?;

    match tag {
        "null" => match payload {
            Document::Null => Ok(KvsValue::Null),
            _ => Err(ErrorCode::InvalidValueType),
        },
        "bool" => payload
            .as_bool()
            .map(KvsValue::Boolean)
            .ok_or(ErrorCode::InvalidValueType),
        "i32" => payload
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(KvsValue::I32)
            .ok_or(ErrorCode::InvalidValueType),
        "u32" => payload
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(KvsValue::U32)
            .ok_or(ErrorCode::InvalidValueType),
        "i64" => payload
            .as_i64()
            .map(KvsValue::I64)
            .ok_or(ErrorCode::InvalidValueType),
        "u64" => payload
            .as_u64()
            .map(KvsValue::U64)
            .ok_or(ErrorCode::InvalidValueType),
        "f64" => payload
            .as_f64()
            .map(KvsValue::F64)
            .ok_or(ErrorCode::InvalidValueType),
        "str" => payload
            .as_str()
            .map(|s| KvsValue::String(s.to_owned()))
            .ok_or(ErrorCode::InvalidValueType),
        "arr" => match payload {
            Document::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(decode_value(item)?);
                }
                Ok(KvsValue::Array(out))
            }
            _ => Err(ErrorCode::InvalidValueType),
        },
        "obj" => match payload {
            Document::Object(map) => {
                let mut out = HashMap::with_capacity(map.len());
                for (key, item) in map {
                    out.insert(key.clone(), decode_value(item)?);
                }
                Ok(KvsValue::Object(out))
            }
            _ => Err(ErrorCode::InvalidValueType),
        },
        _ => Err(ErrorCode::InvalidValueType),
    }
}

/// Encode a whole store map into the top-level document object.
pub fn encode_root(map: &HashMap<String, KvsValue>) -> KvsResult<Document> {
    let mut root = serde_json::Map::with_capacity(map.len());
    for (key, value) in map {
        root.insert(key.clone(), encode_value(value)?);
    }
    Ok(Document::Object(root))
}

/// Decode a top-level document object into a store map. A non-object root
/// is a malformed store file, not a malformed value.
pub fn decode_root(doc: &Document) -> KvsResult<HashMap<String, KvsValue>> {
    let root = match doc {
        Document::Object(map) => map,
        _ => return Err(ErrorCode::JsonParserError),
    };
    let mut out = HashMap::with_capacity(root.len());
    for (key, value) in root {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(out)
}
