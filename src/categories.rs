//! Host-side lookup from category names to the labels shown in presence

use std::collections::BTreeMap;

use crate::presence::ActivityCategory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    label: String,
}

impl Category {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

impl ActivityCategory for Category {
    fn name(&self) -> &str {
        &self.name
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    labels: BTreeMap<String, String>,
}

impl CategoryTable {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    /// Resolve a category by name, ignoring case. Unknown names are labelled with themselves.
    pub fn lookup(&self, name: &str) -> Category {
        let name = name.trim();
        self.labels
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map_or_else(
                || Category::new(name, name),
                |(key, label)| Category::new(key.as_str(), label.as_str()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        let mut labels = BTreeMap::new();
        labels.insert("Character".to_string(), "Characters".to_string());
        labels.insert("Mesh".to_string(), "Meshes".to_string());
        CategoryTable::new(labels)
    }

    #[test]
    fn test_lookup_known_category() {
        let category = table().lookup("mesh");
        assert_eq!(category.name(), "Mesh");
        assert_eq!(category.label(), "Meshes");
    }

    #[test]
    fn test_lookup_unknown_category() {
        let category = table().lookup(" Sound ");
        assert_eq!(category.name(), "Sound");
        assert_eq!(category.label(), "Sound");
    }
}
