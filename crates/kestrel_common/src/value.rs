use std::collections::HashMap;

/// A single stored value. This is the fundamental unit of data in Kestrel.
///
/// The variants are disjoint and fully typed: there is no implicit numeric
/// promotion between the integer widths or between integers and `F64`. The
/// two container variants nest arbitrarily.
#[derive(Debug, Clone, PartialEq)]
pub enum KvsValue {
    Null,
    Boolean(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
    /// Ordered sequence; elements may be of mixed variants.
    Array(Vec<KvsValue>),
    /// Mapping from key to value; entry order is not externally significant.
    Object(HashMap<String, KvsValue>),
}

impl KvsValue {
    /// The wire tag of this variant, as used in the on-disk `{t, v}` envelope.
    pub fn type_tag(&self) -> &'static str {
        match self {
            KvsValue::Null => "null",
            KvsValue::Boolean(_) => "bool",
            KvsValue::I32(_) => "i32",
            KvsValue::U32(_) => "u32",
            KvsValue::I64(_) => "i64",
            KvsValue::U64(_) => "u64",
            KvsValue::F64(_) => "f64",
            KvsValue::String(_) => "str",
            KvsValue::Array(_) => "arr",
            KvsValue::Object(_) => "obj",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, KvsValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            KvsValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            KvsValue::I32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            KvsValue::U32(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KvsValue::I64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            KvsValue::U64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            KvsValue::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvsValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[KvsValue]> {
        match self {
            KvsValue::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, KvsValue>> {
        match self {
            KvsValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<()> for KvsValue {
    fn from(_: ()) -> Self {
        KvsValue::Null
    }
}

impl From<bool> for KvsValue {
    fn from(b: bool) -> Self {
        KvsValue::Boolean(b)
    }
}

impl From<i32> for KvsValue {
    fn from(n: i32) -> Self {
        KvsValue::I32(n)
    }
}

impl From<u32> for KvsValue {
    fn from(n: u32) -> Self {
        KvsValue::U32(n)
    }
}

impl From<i64> for KvsValue {
    fn from(n: i64) -> Self {
        KvsValue::I64(n)
    }
}

impl From<u64> for KvsValue {
    fn from(n: u64) -> Self {
        KvsValue::U64(n)
    }
}

impl From<f64> for KvsValue {
    fn from(f: f64) -> Self {
        KvsValue::F64(f)
    }
}

impl From<&str> for KvsValue {
    fn from(s: &str) -> Self {
        KvsValue::String(s.to_owned())
    }
}

impl From<String> for KvsValue {
    fn from(s: String) -> Self {
        KvsValue::String(s)
    }
}

impl From<Vec<KvsValue>> for KvsValue {
    fn from(items: Vec<KvsValue>) -> Self {
        KvsValue::Array(items)
    }
}

impl From<HashMap<String, KvsValue>> for KvsValue {
    fn from(map: HashMap<String, KvsValue>) -> Self {
        KvsValue::Object(map)
    }
}
