use crate::model::Item;
use crate::types::ItemName;

/// Client-side snapshot of the rentable item inventory.
///
/// The backend is authoritative; every successful call that touches items
/// replaces the whole snapshot rather than patching it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot with the backend's returned state.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// All items in the snapshot.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items whose name contains the label, case-sensitively.
    ///
    /// Case sensitivity is observed behavior and kept as-is.
    pub fn filtered(&self, label: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.name.as_str().contains(label))
            .collect()
    }

    /// Looks an item up by name.
    pub fn get(&self, name: &ItemName) -> Option<&Item> {
        self.items.iter().find(|item| &item.name == name)
    }
}
