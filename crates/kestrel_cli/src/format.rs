//! Rendering of stored values for terminal output.

use kestrel_common::value::KvsValue;

/// Render a value as plain JSON text (without the on-disk type envelope).
/// Non-finite floats cannot appear in stored values but are rendered
/// faithfully anyway since this is display-only.
pub fn render(value: &KvsValue) -> String {
    match value {
        KvsValue::Null => "null".to_string(),
        KvsValue::Boolean(b) => b.to_string(),
        KvsValue::I32(n) => n.to_string(),
        KvsValue::U32(n) => n.to_string(),
        KvsValue::I64(n) => n.to_string(),
        KvsValue::U64(n) => n.to_string(),
        KvsValue::F64(f) => f.to_string(),
        KvsValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
        KvsValue::Array(items) => {
            let rendered: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", rendered.join(", "))
        }
        KvsValue::Object(map) => {
            // Sorted for stable output.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let rendered: Vec<String> = keys
                .iter()
                .map(|key| {
                    format!(
                        "{}: {}",
                        serde_json::Value::String((*key).clone()),
                        render(&map[*key])
                    )
                })
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_scalars() {
        assert_eq!(render(&KvsValue::Null), "null");
        assert_eq!(render(&KvsValue::Boolean(true)), "true");
        assert_eq!(render(&KvsValue::I32(-7)), "-7");
        assert_eq!(render(&KvsValue::F64(1.5)), "1.5");
        assert_eq!(render(&KvsValue::String("a \"b\"".into())), r#""a \"b\"""#);
    }

    #[test]
    fn test_containers_render_sorted_and_nested() {
        let value = KvsValue::Object(HashMap::from([
            ("b".to_string(), KvsValue::I32(2)),
            (
                "a".to_string(),
                KvsValue::Array(vec![KvsValue::Null, KvsValue::U64(9)]),
            ),
        ]));
        assert_eq!(render(&value), r#"{"a": [null, 9], "b": 2}"#);
    }
}
