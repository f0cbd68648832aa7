use crate::model::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Scanned declarations of one node family for one snapshot side,
/// partitioned by context and keyed by a family-specific unique key.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    data: BTreeMap<Context, BTreeMap<String, T>>,
    mapping: BTreeMap<Context, BTreeMap<String, PathBuf>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            mapping: BTreeMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value. Re-registering a key replaces both value and location.
    pub fn insert(
        &mut self,
        context: Context,
        key: impl Into<String>,
        value: T,
        location: impl Into<PathBuf>,
    ) {
        let key = key.into();
        self.mapping
            .entry(context.clone())
            .or_default()
            .insert(key.clone(), location.into());
        self.data.entry(context).or_default().insert(key, value);
    }

    pub fn get(&self, context: &Context, key: &str) -> Option<&T> {
        self.data.get(context)?.get(key)
    }

    pub fn location(&self, context: &Context, key: &str) -> Option<&Path> {
        self.mapping
            .get(context)?
            .get(key)
            .map(PathBuf::as_path)
    }

    /// Entries of one context in key order.
    pub fn entries(&self, context: &Context) -> BTreeMap<&str, &T> {
        self.data
            .get(context)
            .map(|values| values.iter().map(|(k, v)| (k.as_str(), v)).collect())
            .unwrap_or_default()
    }

    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Context, &str, &T)> {
        self.data.iter().flat_map(|(context, values)| {
            values
                .iter()
                .map(move |(key, value)| (context, key.as_str(), value))
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.values().flat_map(|values| values.values())
    }

    pub fn len(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A new registry holding the (possibly projected) entries `project` keeps.
    pub fn filter_map<U>(&self, mut project: impl FnMut(&T) -> Option<U>) -> Registry<U> {
        let mut filtered = Registry::new();
        for (context, key, value) in self.iter() {
            if let Some(projected) = project(value) {
                let location = self
                    .location(context, key)
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
                filtered.insert(context.clone(), key, projected, location);
            }
        }
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = Registry::new();
        registry.insert(Context::Class, "Vendor\\B", 2, "b.php");
        registry.insert(Context::Class, "Vendor\\A", 1, "a.php");
        registry.insert(Context::Interface, "Vendor\\I", 3, "i.php");

        assert_eq!(registry.get(&Context::Class, "Vendor\\A"), Some(&1));
        assert_eq!(
            registry.location(&Context::Interface, "Vendor\\I"),
            Some(Path::new("i.php"))
        );
        assert_eq!(registry.get(&Context::Trait, "Vendor\\A"), None);
        assert_eq!(registry.len(), 3);

        let keys: Vec<_> = registry.entries(&Context::Class).into_keys().collect();
        assert_eq!(keys, vec!["Vendor\\A", "Vendor\\B"]);
    }

    #[test]
    fn test_reregistering_replaces_value() {
        let mut registry = Registry::new();
        registry.insert(Context::Database, "Magento_Sales", 1, "old/db_schema.json");
        registry.insert(Context::Database, "Magento_Sales", 2, "new/db_schema.json");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&Context::Database, "Magento_Sales"), Some(&2));
        assert_eq!(
            registry.location(&Context::Database, "Magento_Sales"),
            Some(Path::new("new/db_schema.json"))
        );
    }

    #[test]
    fn test_filter_map_keeps_locations() {
        let mut registry = Registry::new();
        registry.insert(Context::Class, "A", 1, "a.php");
        registry.insert(Context::Class, "B", 2, "b.php");

        let even = registry.filter_map(|v| (v % 2 == 0).then_some(v * 10));
        assert_eq!(even.len(), 1);
        assert_eq!(even.get(&Context::Class, "B"), Some(&20));
        assert_eq!(even.location(&Context::Class, "B"), Some(Path::new("b.php")));
    }
}
