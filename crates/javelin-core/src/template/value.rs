//! Template parameter values.

use std::fmt;

use rustc_hash::FxHashMap;

/// A value bindable to a template parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<Value>),
    Map(FxHashMap<String, Value>),
}

impl Value {
    /// Truthiness used by `{% if %}` blocks: empty strings, empty lists,
    /// zero and `false` are falsy.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::List(items) => !items.is_empty(),
            Self::Map(entries) => !entries.is_empty(),
        }
    }

    /// Resolve one path segment into a nested value.
    pub fn member(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Build a map value from key/value pairs.
    pub fn map(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            // Maps have no flat text form; interpolate their members instead.
            Self::Map(_) => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Value::Str).collect())
    }
}

/// Parameter set threaded through every render call.
///
/// Append-only by discipline: build phases may add keys (entry-point info
/// only becomes known after source generation) but should never remove or
/// overwrite finalized ones. Overwrites are permitted and logged, not
/// rejected.
#[derive(Debug, Default, Clone)]
pub struct Params {
    values: FxHashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter. Rebinding an existing key is logged at debug level.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if self.values.contains_key(&key) {
            tracing::debug!(key = %key, "rebinding template parameter");
        }
        self.values.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Resolve a dotted path (`subtarget.cmd_switch`) through nested maps.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.member(segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(Value::from("x").truthy());
        assert!(!Value::from("").truthy());
        assert!(!Value::from(false).truthy());
        assert!(!Value::List(vec![]).truthy());
        assert!(Value::from(1i64).truthy());
        assert!(!Value::from(0i64).truthy());
    }

    #[test]
    fn nested_lookup() {
        let mut params = Params::new();
        params.set(
            "subtarget",
            Value::map([("cmd_switch", Value::from("-js"))]),
        );
        assert_eq!(
            params.lookup("subtarget.cmd_switch"),
            Some(&Value::from("-js"))
        );
        assert_eq!(params.lookup("subtarget.missing"), None);
        assert_eq!(params.lookup("missing.key"), None);
    }

    #[test]
    fn list_display_joins_items() {
        let list = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(list.to_string(), "a,b");
    }
}
