//! Index key values
//!
//! `IndexKey` is the scalar domain shared by primary keys and derived
//! index values. Ordering is deterministic: Bool < Int < Float < String.

use std::fmt;

/// A scalar key: either a primary key or a value derived by an index getter.
///
/// Floats are stored as order-preserving bits so the type can derive `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as bits for total ordering)
    Float(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering. `-0.0` and `0.0` map to
    /// the same key, as do all NaNs.
    pub fn from_float(v: f64) -> Self {
        let v = if v == 0.0 {
            0.0
        } else if v.is_nan() {
            f64::NAN
        } else {
            v
        };
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    /// Recover the float value of a `Float` key
    pub fn as_float(&self) -> Option<f64> {
        match self {
            IndexKey::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    /// Borrow the string value of a `String` key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IndexKey::String(s) => Some(s),
            _ => None,
        }
    }

    /// Create a key from a JSON scalar.
    ///
    /// Null, arrays and objects have no key form and yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(IndexKey::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::Int(i))
                } else {
                    n.as_f64().map(IndexKey::from_float)
                }
            }
            serde_json::Value::String(s) => Some(IndexKey::String(s.clone())),
            _ => None,
        }
    }

    /// Convert back into a JSON scalar
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            IndexKey::Bool(b) => serde_json::Value::Bool(*b),
            IndexKey::Int(i) => serde_json::Value::from(*i),
            IndexKey::Float(_) => self
                .as_float()
                .map(serde_json::Value::from)
                .unwrap_or(serde_json::Value::Null),
            IndexKey::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            IndexKey::Bool(_) => "bool",
            IndexKey::Int(_) => "int",
            IndexKey::Float(_) => "float",
            IndexKey::String(_) => "string",
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(_) => write!(f, "{}", self.as_float().unwrap_or(f64::NAN)),
            IndexKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::Bool(v)
    }
}

impl From<i64> for IndexKey {
    fn from(v: i64) -> Self {
        IndexKey::Int(v)
    }
}

impl From<i32> for IndexKey {
    fn from(v: i32) -> Self {
        IndexKey::Int(i64::from(v))
    }
}

impl From<u32> for IndexKey {
    fn from(v: u32) -> Self {
        IndexKey::Int(i64::from(v))
    }
}

impl From<f64> for IndexKey {
    fn from(v: f64) -> Self {
        IndexKey::from_float(v)
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::String(v.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(v: String) -> Self {
        IndexKey::String(v)
    }
}

impl From<&String> for IndexKey {
    fn from(v: &String) -> Self {
        IndexKey::String(v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ordering() {
        let keys = vec![
            IndexKey::from(false),
            IndexKey::from(true),
            IndexKey::from(-100i64),
            IndexKey::from(0i64),
            IndexKey::from(100i64),
            IndexKey::from(-1.5f64),
            IndexKey::from(2.25f64),
            IndexKey::from("aaa"),
            IndexKey::from("zzz"),
        ];

        for i in 1..keys.len() {
            assert!(keys[i - 1] < keys[i], "{} should sort before {}", keys[i - 1], keys[i]);
        }
    }

    #[test]
    fn test_float_canonical_forms() {
        assert_eq!(IndexKey::from_float(-0.0), IndexKey::from_float(0.0));
        assert_eq!(IndexKey::from_float(-0.0).as_float().map(f64::to_bits), Some(0.0f64.to_bits()));

        let quiet = f64::NAN;
        let negative = -f64::NAN;
        let payload = f64::from_bits(0x7ff8_0000_0000_0001);
        assert_eq!(IndexKey::from_float(quiet), IndexKey::from_float(negative));
        assert_eq!(IndexKey::from_float(quiet), IndexKey::from_float(payload));
        assert!(IndexKey::from_float(f64::INFINITY) < IndexKey::from_float(quiet));
    }

    #[test]
    fn test_float_round_trip() {
        for v in [-1e9, -0.5, 0.0, 0.5, 3.75, 1e300] {
            assert_eq!(IndexKey::from_float(v).as_float(), Some(v));
        }
    }

    #[test]
    fn test_from_json() {
        assert_eq!(IndexKey::from_json(&json!(true)), Some(IndexKey::Bool(true)));
        assert_eq!(IndexKey::from_json(&json!(42)), Some(IndexKey::Int(42)));
        assert_eq!(
            IndexKey::from_json(&json!("hello")),
            Some(IndexKey::String("hello".to_string()))
        );
        assert_eq!(IndexKey::from_json(&json!(1.5)), Some(IndexKey::from_float(1.5)));
        assert_eq!(IndexKey::from_json(&json!([1, 2, 3])), None);
        assert_eq!(IndexKey::from_json(&json!(null)), None);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(IndexKey::from(7i64).to_json(), json!(7));
        assert_eq!(IndexKey::from("u1").to_json(), json!("u1"));
        assert_eq!(IndexKey::from(0.25f64).to_json(), json!(0.25));
    }
}
