//! value — типизированное значение, хранимое под ключом.
//!
//! Ключи у кэша всегда строки, а значения — tagged variant вместо "любого объекта":
//!   Null | Bool | Int(i64) | Float(f64) | Str | Bytes | List | Map
//!
//! JSON-представление (внутри payload снапшота):
//!   {"type":"str","value":"hello"}
//!   {"type":"bytes","value":"3q2+7w=="}     (base64, STANDARD)
//!   {"type":"float","value":"NaN"}          (не-конечные float — строкой: NaN, inf, -inf)
//!   {"type":"null"}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Предел вложенности List/Map (скаляр — 0, контейнер — 1 + глубина детей).
/// В JSON снапшота каждый уровень стоит два уровня разбора (объект-тег + массив/объект),
/// а serde_json при чтении режет всё глубже 127: 60 уровней укладываются с запасом.
pub const MAX_DEPTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "float_repr")] f64),
    Str(String),
    Bytes(#[serde(with = "bytes_b64")] Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Короткое имя варианта (как в поле "type").
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Вложенность глубже `limit`. Спуск обрывается на limit+1 уровне.
    pub fn depth_exceeds(&self, limit: usize) -> bool {
        match self {
            Value::List(items) => limit == 0 || items.iter().any(|v| v.depth_exceeds(limit - 1)),
            Value::Map(m) => limit == 0 || m.values().any(|v| v.depth_exceeds(limit - 1)),
            _ => false,
        }
    }
}

/// Значение, которое не прочитается обратно из снапшота, не пускаем ни в память, ни в файл.
pub(crate) fn check_depth(key: &str, value: &Value) -> Result<()> {
    if value.depth_exceeds(MAX_DEPTH) {
        return Err(CacheError::Encode {
            reason: format!(
                "value for key '{}' is nested deeper than {} levels",
                key, MAX_DEPTH
            ),
        });
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "(bytes {} B)", b.len()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

// ---------------- From ----------------

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// JSON → Value: числа без дробной части, влезающие в i64, становятся Int, остальные — Float.
impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        match j {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(m) => {
                Value::Map(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

// ---------------- serde helpers ----------------

mod bytes_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD
            .decode(text.as_bytes())
            .map_err(|e| D::Error::custom(format!("invalid base64: {}", e)))
    }
}

mod float_repr {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
        if x.is_finite() {
            s.serialize_f64(*x)
        } else if x.is_nan() {
            s.serialize_str("NaN")
        } else if x.is_sign_positive() {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Num(x) => Ok(x),
            Repr::Text(t) => match t.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float literal '{}'", other))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_tagged() {
        let v = Value::from("hello");
        let s = serde_json::to_string(&v).unwrap();
        assert_eq!(s, r#"{"type":"str","value":"hello"}"#);

        let s = serde_json::to_string(&Value::Null).unwrap();
        assert_eq!(s, r#"{"type":"null"}"#);

        let s = serde_json::to_string(&Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef])).unwrap();
        assert_eq!(s, r#"{"type":"bytes","value":"3q2+7w=="}"#);
    }

    #[test]
    fn non_finite_floats_survive_json() {
        for x in [f64::INFINITY, f64::NEG_INFINITY] {
            let s = serde_json::to_string(&Value::Float(x)).unwrap();
            let back: Value = serde_json::from_str(&s).unwrap();
            assert_eq!(back, Value::Float(x));
        }
        let s = serde_json::to_string(&Value::Float(f64::NAN)).unwrap();
        assert_eq!(s, r#"{"type":"float","value":"NaN"}"#);
        let back: Value = serde_json::from_str(&s).unwrap();
        assert!(back.as_f64().unwrap().is_nan());

        // целое число в поле float тоже принимаем
        let back: Value = serde_json::from_str(r#"{"type":"float","value":3}"#).unwrap();
        assert_eq!(back, Value::Float(3.0));
    }

    #[test]
    fn nested_values_and_bad_input() {
        let mut m = BTreeMap::new();
        m.insert("n".to_string(), Value::Int(-7));
        m.insert(
            "l".to_string(),
            Value::List(vec![Value::Bool(true), Value::Null, Value::Float(0.5)]),
        );
        let v = Value::Map(m);
        let s = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(back, v);

        assert!(serde_json::from_str::<Value>(r#"{"type":"bytes","value":"***"}"#).is_err());
        assert!(serde_json::from_str::<Value>(r#"{"type":"float","value":"lots"}"#).is_err());
        assert!(serde_json::from_str::<Value>(r#"{"type":"widget","value":1}"#).is_err());
    }

    #[test]
    fn from_plain_json() {
        let j: serde_json::Value =
            serde_json::from_str(r#"{"a":1,"b":[true,null,2.5],"c":"x","d":18446744073709551615}"#)
                .unwrap();
        let v = Value::from(j);
        let Value::Map(m) = v else {
            panic!("expected map");
        };
        assert_eq!(m["a"], Value::Int(1));
        assert_eq!(
            m["b"],
            Value::List(vec![Value::Bool(true), Value::Null, Value::Float(2.5)])
        );
        assert_eq!(m["c"], Value::from("x"));
        assert_eq!(m["d"], Value::Float(u64::MAX as f64));
    }

    #[test]
    fn depth_limit_counts_containers_only() {
        assert!(!Value::Int(1).depth_exceeds(0));
        assert!(Value::List(vec![]).depth_exceeds(0));
        assert!(!Value::List(vec![]).depth_exceeds(1));

        let mut v = Value::from("leaf");
        for _ in 0..MAX_DEPTH {
            v = Value::List(vec![v]);
        }
        assert!(check_depth("ok", &v).is_ok());

        let mut m = BTreeMap::new();
        m.insert("x".to_string(), v);
        let err = check_depth("deep", &Value::Map(m)).unwrap_err();
        assert!(matches!(err, CacheError::Encode { .. }), "{}", err);
    }

    #[test]
    fn display_and_accessors() {
        assert_eq!(Value::from("x").to_string(), "\"x\"");
        assert_eq!(Value::from(vec![Value::from(1), Value::Null]).to_string(), "[1, null]");
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from(42).type_name(), "int");
        assert_eq!(Value::from(&b"ab"[..]).as_bytes(), Some(&b"ab"[..]));
        assert!(Value::Null.is_null());
    }
}
