//! Container filter query building

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

/// Key the runtime matches container ids against
pub const CONTAINER_ID_KEY: &str = "id";

/// Repeated `key=value` selectors, grouped by key
///
/// Values of one key are OR-ed and keys are AND-ed when rendered:
/// `(env=prod|staging)&(region=us)`. Values keep their insertion order and
/// keys render in the order they were first set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainersFilters {
    filters: IndexMap<String, Vec<String>>,
}

impl ContainersFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `key=value` selector; without `=` the value is empty
    pub fn set(&mut self, raw: &str) {
        let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
        self.filters
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Copy of these filters scoped to a single container
    pub fn with_container_id(&self, container_id: &str) -> Self {
        let mut scoped = self.clone();
        scoped
            .filters
            .insert(CONTAINER_ID_KEY.to_string(), vec![container_id.to_string()]);
        scoped
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.filters.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Render the AND-of-ORs query string
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Filters in the shape runtime clients take for list queries
    pub fn to_map(&self) -> HashMap<String, Vec<String>> {
        self.filters
            .iter()
            .map(|(key, values)| (key.clone(), values.clone()))
            .collect()
    }
}

impl fmt::Display for ContainersFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, values)) in self.filters.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "({}={})", key, values.join("|"))?;
        }
        Ok(())
    }
}

impl<S: AsRef<str>> Extend<S> for ContainersFilters {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for raw in iter {
            self.set(raw.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for ContainersFilters {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut filters = Self::new();
        filters.extend(iter);
        filters
    }
}
