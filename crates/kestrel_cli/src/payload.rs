//! Payload parsing: the `-p` argument is a plain JSON literal, converted
//! into a typed [`KvsValue`].
//!
//! Unlike the on-disk format there is no `{t, v}` envelope here, so the
//! value type is inferred: integers land on the narrowest of `I32`, `I64`
//! or `U64` that holds them, any other number becomes `F64`. Containers
//! convert recursively.

use std::collections::HashMap;

use kestrel_common::error::{ErrorCode, KvsResult};
use kestrel_common::value::KvsValue;

pub fn parse_payload(raw: &str) -> KvsResult<KvsValue> {
    let doc: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        tracing::debug!("payload is not a JSON literal: {e}");
        ErrorCode::ConversionFailed
    })?;
    from_document(&doc)
}

fn from_document(doc: &serde_json::Value) -> KvsResult<KvsValue> {
    let value = match doc {
        serde_json::Value::Null => KvsValue::Null,
        serde_json::Value::Bool(b) => KvsValue::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(narrow) => KvsValue::I32(narrow),
                    Err(_) => KvsValue::I64(i),
                }
            } else if let Some(u) = n.as_u64() {
                KvsValue::U64(u)
            } else {
                KvsValue::F64(n.as_f64().ok_or(ErrorCode::ConversionFailed)?)
            }
        }
        serde_json::Value::String(s) => KvsValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(from_document(item)?);
            }
            KvsValue::Array(out)
        }
        serde_json::Value::Object(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), from_document(item)?);
            }
            KvsValue::Object(out)
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_payload("null").unwrap(), KvsValue::Null);
        assert_eq!(parse_payload("true").unwrap(), KvsValue::Boolean(true));
        assert_eq!(parse_payload("false").unwrap(), KvsValue::Boolean(false));
        assert_eq!(
            parse_payload("\"hello\"").unwrap(),
            KvsValue::String("hello".into())
        );
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(parse_payload("7").unwrap(), KvsValue::I32(7));
        assert_eq!(parse_payload("-7").unwrap(), KvsValue::I32(-7));
        assert_eq!(
            parse_payload("2147483647").unwrap(),
            KvsValue::I32(i32::MAX)
        );
        assert_eq!(
            parse_payload("2147483648").unwrap(),
            KvsValue::I64(2_147_483_648)
        );
        assert_eq!(
            parse_payload("-2147483649").unwrap(),
            KvsValue::I64(-2_147_483_649)
        );
        assert_eq!(
            parse_payload("18446744073709551615").unwrap(),
            KvsValue::U64(u64::MAX)
        );
        assert_eq!(parse_payload("1.5").unwrap(), KvsValue::F64(1.5));
        assert_eq!(parse_payload("1.0").unwrap(), KvsValue::F64(1.0));
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            parse_payload(r#"[1, "two", true]"#).unwrap(),
            KvsValue::Array(vec![
                KvsValue::I32(1),
                KvsValue::String("two".into()),
                KvsValue::Boolean(true),
            ])
        );
        assert_eq!(
            parse_payload(r#"{"a": 1, "b": [false]}"#).unwrap(),
            KvsValue::Object(HashMap::from([
                ("a".to_string(), KvsValue::I32(1)),
                (
                    "b".to_string(),
                    KvsValue::Array(vec![KvsValue::Boolean(false)])
                ),
            ]))
        );
    }

    #[test]
    fn test_bare_words_are_rejected() {
        assert_eq!(
            parse_payload("hello").unwrap_err(),
            ErrorCode::ConversionFailed
        );
        assert_eq!(parse_payload("").unwrap_err(), ErrorCode::ConversionFailed);
        assert_eq!(
            parse_payload("{broken").unwrap_err(),
            ErrorCode::ConversionFailed
        );
    }
}
