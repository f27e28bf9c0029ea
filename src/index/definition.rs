//! Index definitions
//!
//! A definition is either a bare getter or a spec naming a getter or a
//! record field plus an optional ordering. `parse_definition` resolves
//! either form to a `(getter, ordering)` pair once, at registration.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::errors::{GetterError, IndexError, IndexResult};
use crate::encoding::{default_encoding, IndexKey, KeyEncoding};

type GetterFn<V> = dyn Fn(&V) -> Result<Option<IndexKey>, GetterError> + Send + Sync;

/// Derives an index value from a record. `None` means "not indexed".
pub struct Getter<V>(Arc<GetterFn<V>>);

impl<V> Getter<V> {
    /// Wrap an infallible getter
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&V) -> Option<IndexKey> + Send + Sync + 'static,
    {
        Self(Arc::new(move |record: &V| Ok(f(record))))
    }

    /// Wrap a getter that can fail
    pub fn fallible<F>(f: F) -> Self
    where
        F: Fn(&V) -> Result<Option<IndexKey>, GetterError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn derive(&self, record: &V) -> Result<Option<IndexKey>, GetterError> {
        (self.0)(record)
    }
}

impl<V> Clone for Getter<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V> fmt::Debug for Getter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Getter(..)")
    }
}

/// Object form of a definition
pub struct IndexSpec<V> {
    /// Takes precedence over `field`
    pub getter: Option<Getter<V>>,
    /// Top-level field of the record's serde representation
    pub field: Option<String>,
    /// Ordering of the index namespace; defaults to `SortableEncoding`
    pub key_encoding: Option<Arc<dyn KeyEncoding>>,
}

impl<V> Default for IndexSpec<V> {
    fn default() -> Self {
        Self {
            getter: None,
            field: None,
            key_encoding: None,
        }
    }
}

impl<V> fmt::Debug for IndexSpec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSpec")
            .field("getter", &self.getter)
            .field("field", &self.field)
            .field("key_encoding", &self.key_encoding.as_ref().map(|e| e.name()))
            .finish()
    }
}

/// A user-supplied index definition
#[derive(Debug)]
pub enum IndexDefinition<V> {
    Getter(Getter<V>),
    Spec(IndexSpec<V>),
}

impl<V> IndexDefinition<V> {
    /// Index by an infallible getter
    pub fn getter<F>(f: F) -> Self
    where
        F: Fn(&V) -> Option<IndexKey> + Send + Sync + 'static,
    {
        IndexDefinition::Getter(Getter::new(f))
    }

    /// Index by a getter that can fail
    pub fn try_getter<F>(f: F) -> Self
    where
        F: Fn(&V) -> Result<Option<IndexKey>, GetterError> + Send + Sync + 'static,
    {
        IndexDefinition::Getter(Getter::fallible(f))
    }

    /// Index by a top-level record field
    pub fn field(name: impl Into<String>) -> Self {
        IndexDefinition::Spec(IndexSpec {
            field: Some(name.into()),
            ..IndexSpec::default()
        })
    }

    /// Override the ordering of the index namespace
    pub fn with_encoding(self, encoding: Arc<dyn KeyEncoding>) -> Self {
        let mut spec = match self {
            IndexDefinition::Getter(getter) => IndexSpec {
                getter: Some(getter),
                ..IndexSpec::default()
            },
            IndexDefinition::Spec(spec) => spec,
        };
        spec.key_encoding = Some(encoding);
        IndexDefinition::Spec(spec)
    }
}

/// Canonical form of a definition
pub(crate) struct ParsedIndex<V> {
    pub getter: Getter<V>,
    pub encoding: Arc<dyn KeyEncoding>,
}

/// Normalize a definition to `(getter, ordering)`.
pub(crate) fn parse_definition<V>(
    name: &str,
    definition: IndexDefinition<V>,
) -> IndexResult<ParsedIndex<V>>
where
    V: Serialize + 'static,
{
    if name.is_empty() {
        return Err(IndexError::invalid_definition(name, "index name must not be empty"));
    }

    match definition {
        IndexDefinition::Getter(getter) => Ok(ParsedIndex {
            getter,
            encoding: default_encoding(),
        }),
        IndexDefinition::Spec(spec) => {
            let getter = match (spec.getter, spec.field) {
                (Some(getter), _) => getter,
                (None, Some(field)) if field.is_empty() => {
                    return Err(IndexError::invalid_definition(
                        name,
                        "field name must not be empty",
                    ));
                }
                (None, Some(field)) => field_getter(field),
                (None, None) => {
                    return Err(IndexError::invalid_definition(
                        name,
                        "expected a getter or a field",
                    ));
                }
            };
            Ok(ParsedIndex {
                getter,
                encoding: spec.key_encoding.unwrap_or_else(default_encoding),
            })
        }
    }
}

/// Getter reading `field` off the record's JSON form.
///
/// Missing, null and non-scalar fields are not indexed.
fn field_getter<V: Serialize + 'static>(field: String) -> Getter<V> {
    Getter::fallible(move |record: &V| {
        let value = serde_json::to_value(record)
            .map_err(|e| GetterError::new(format!("cannot read field {:?}: {}", field, e)))?;
        Ok(value.get(field.as_str()).and_then(IndexKey::from_json))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Utf8Encoding;
    use serde_json::{json, Value};

    #[derive(Serialize)]
    struct User {
        name: String,
        age: i64,
    }

    fn alice() -> User {
        User {
            name: "alice".to_string(),
            age: 30,
        }
    }

    #[test]
    fn test_bare_getter_uses_default_ordering() {
        let def = IndexDefinition::getter(|u: &User| Some(u.age.into()));
        let parsed = parse_definition("byAge", def).unwrap();
        assert_eq!(parsed.encoding.name(), "sortable");
        assert_eq!(parsed.getter.derive(&alice()).unwrap(), Some(IndexKey::Int(30)));
    }

    #[test]
    fn test_field_getter_reads_serde_form() {
        let parsed = parse_definition::<User>("byName", IndexDefinition::field("name")).unwrap();
        assert_eq!(parsed.getter.derive(&alice()).unwrap(), Some(IndexKey::from("alice")));

        let missing = parse_definition::<User>("byEmail", IndexDefinition::field("email")).unwrap();
        assert_eq!(missing.getter.derive(&alice()).unwrap(), None);
    }

    #[test]
    fn test_field_getter_skips_null_and_nested() {
        let parsed = parse_definition::<Value>("byTag", IndexDefinition::field("tag")).unwrap();
        assert_eq!(parsed.getter.derive(&json!({"tag": null})).unwrap(), None);
        assert_eq!(parsed.getter.derive(&json!({"tag": ["a"]})).unwrap(), None);
        assert_eq!(parsed.getter.derive(&json!({"tag": "a"})).unwrap(), Some(IndexKey::from("a")));
    }

    #[test]
    fn test_spec_getter_wins_over_field() {
        let spec = IndexSpec {
            getter: Some(Getter::new(|u: &User| Some(u.name.len().to_string().into()))),
            field: Some("name".to_string()),
            key_encoding: Some(Arc::new(Utf8Encoding)),
        };
        let parsed = parse_definition("byLen", IndexDefinition::Spec(spec)).unwrap();
        assert_eq!(parsed.encoding.name(), "utf8");
        assert_eq!(parsed.getter.derive(&alice()).unwrap(), Some(IndexKey::from("5")));
    }

    #[test]
    fn test_with_encoding_keeps_getter() {
        let def = IndexDefinition::getter(|u: &User| Some(u.name.clone().into()))
            .with_encoding(Arc::new(Utf8Encoding));
        let parsed = parse_definition("byName", def).unwrap();
        assert_eq!(parsed.encoding.name(), "utf8");
        assert_eq!(parsed.getter.derive(&alice()).unwrap(), Some(IndexKey::from("alice")));
    }

    #[test]
    fn test_empty_spec_is_invalid() {
        let err = parse_definition::<User>("broken", IndexDefinition::Spec(IndexSpec::default()))
            .err()
            .unwrap();
        assert_eq!(err.code(), "INDEXKV_INVALID_INDEX_DEFINITION");
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_empty_names_are_invalid() {
        assert!(parse_definition::<User>("", IndexDefinition::field("age")).is_err());
        assert!(parse_definition::<User>("byNothing", IndexDefinition::field("")).is_err());
    }

    #[test]
    fn test_fallible_getter_error() {
        let def = IndexDefinition::try_getter(|u: &User| {
            if u.age < 0 {
                Err(GetterError::new("negative age"))
            } else {
                Ok(Some(u.age.into()))
            }
        });
        let parsed = parse_definition("byAge", def).unwrap();
        let bad = User {
            name: "x".into(),
            age: -1,
        };
        assert_eq!(parsed.getter.derive(&bad), Err(GetterError::new("negative age")));
    }
}
