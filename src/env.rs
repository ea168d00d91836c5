use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Environment variable lookup used by every part of the bootstrap.
///
/// `Env::real()` reads the process environment; `Env::from_slice` pins a fixed set of
/// variables so the pipeline can be driven without touching the real environment.
#[derive(Clone, Default)]
pub struct Env {
    fixed: Option<Arc<HashMap<String, String>>>,
}

impl Env {
    pub fn real() -> Self {
        Self { fixed: None }
    }

    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            fixed: Some(Arc::new(map)),
        }
    }

    /// Returns the variable's value, treating empty values as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match &self.fixed {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.get(key))
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fixed {
            None => f.write_str("Env::real"),
            Some(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Env::fixed").field(&keys).finish()
            }
        }
    }
}
