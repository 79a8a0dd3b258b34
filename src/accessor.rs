use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
};

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

pub use derived_table_derive::Row;

/// A row object whose attributes can be looked up by name at render time
pub trait Row {
    /// returns the value of the attribute `name` or [`None`] if the row has no such attribute
    fn attr(&self, name: &str) -> Option<Value>;
}

/// Deferred lookup of a (possibly nested) attribute of a [`Row`].
///
/// Segments are separated by `.`. The first segment is looked up with [`Row::attr`], every
/// following segment indexes into the value found so far: by key for objects, by position for
/// arrays.
///
/// ```
/// use derived_table::Accessor;
/// use serde_json::json;
///
/// let row = json!({"author": {"name": "Ada"}, "tags": ["rust", "web"]});
/// assert_eq!(Accessor::from("author.name").resolve_text(&row).unwrap(), "Ada");
/// assert_eq!(Accessor::from("tags.1").resolve_text(&row).unwrap(), "web");
/// ```
#[derive(
    Clone, Debug, Display, From, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
#[serde(transparent)]
pub struct Accessor(String);

impl Accessor {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self, obj: &dyn Row) -> Result<Value, Error> {
        let mut segments = self.0.split('.');
        let first = segments.next().unwrap_or_default();
        let mut value = obj.attr(first).ok_or_else(|| self.missing(first))?;
        for segment in segments {
            value = match value {
                Value::Object(mut map) => map.remove(segment),
                Value::Array(mut items) => segment
                    .parse::<usize>()
                    .ok()
                    .filter(|i| *i < items.len())
                    .map(|i| items.swap_remove(i)),
                _ => None,
            }
            .ok_or_else(|| self.missing(segment))?;
        }
        Ok(value)
    }

    /// resolve the attribute and convert it with [`value_to_text`]
    pub fn resolve_text(&self, obj: &dyn Row) -> Result<String, Error> {
        self.resolve(obj).map(|v| value_to_text(&v))
    }

    fn missing(&self, attr: &str) -> Error {
        Error::MissingAttribute {
            accessor: self.0.clone(),
            attr: attr.to_string(),
        }
    }
}

impl From<&str> for Accessor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Text form of an attribute value as used in URLs and cells.
///
/// Strings are used as is, `null` becomes the empty string, everything else is rendered as
/// compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

/*************
 * Row impls *
 *************/

impl<T: Row + ?Sized> Row for &T {
    fn attr(&self, name: &str) -> Option<Value> {
        (**self).attr(name)
    }
}

impl Row for Value {
    fn attr(&self, name: &str) -> Option<Value> {
        self.as_object().and_then(|map| map.get(name)).cloned()
    }
}

impl Row for Map<String, Value> {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<V: Serialize, S: BuildHasher> Row for HashMap<String, V, S> {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(|v| serde_json::to_value(v).ok())
    }
}

impl<V: Serialize> Row for BTreeMap<String, V> {
    fn attr(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(|v| serde_json::to_value(v).ok())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolves_nested_paths() {
        let row = json!({"id": 7, "author": {"name": "Ada", "tags": ["a", "b"]}});
        assert_eq!(Accessor::from("id").resolve(&row).unwrap(), json!(7));
        assert_eq!(
            Accessor::from("author.tags.0").resolve_text(&row).unwrap(),
            "a"
        );
    }

    #[test]
    fn missing_segment_names_the_segment() {
        let row = json!({"author": {"name": "Ada"}});
        let err = Accessor::from("author.email").resolve(&row).unwrap_err();
        assert_eq!(
            err,
            Error::MissingAttribute {
                accessor: "author.email".into(),
                attr: "email".into(),
            }
        );
        assert!(Accessor::from("tags.3").resolve(&json!({"tags": []})).is_err());
        assert!(Accessor::from("").resolve(&row).is_err());
    }

    #[test]
    fn text_form_of_values() {
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!(false)), "false");
        assert_eq!(value_to_text(&json!(1.5)), "1.5");
        assert_eq!(value_to_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn maps_are_rows() {
        let mut map = HashMap::new();
        map.insert("slug".to_string(), "hello-world");
        assert_eq!(
            Accessor::from("slug").resolve_text(&map).unwrap(),
            "hello-world"
        );
        let map: BTreeMap<String, u32> = [("n".to_string(), 3)].into();
        assert_eq!(map.attr("n"), Some(json!(3)));
        assert_eq!(map.attr("m"), None);
    }
}
