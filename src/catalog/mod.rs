// Item catalog: the ordered collection of movies and their genre tags.
//
// The catalog is immutable once loaded. Position in the catalog (not item id)
// is what the feature index and similarity matrix are keyed by, so the
// catalog owns the id -> position lookup.

pub mod loader;

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Native item identifier. Persisted maps key items by the decimal string
/// form of this; conversion happens only in the store adapter.
pub type ItemId = i64;

/// Separator between tags in the catalog's genre field.
pub const TAG_DELIMITER: char = '|';

/// A single movie in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub tags: BTreeSet<String>,
}

impl Item {
    /// Build an item from the catalog's `Genre|Genre|...` field.
    pub fn new(id: ItemId, title: impl Into<String>, genres: &str) -> Self {
        Self {
            id,
            title: title.into(),
            tags: split_tags(genres),
        }
    }

    /// The tag set joined back into the catalog's delimited form.
    pub fn genre_label(&self) -> String {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.join(&TAG_DELIMITER.to_string())
    }
}

/// Split a delimited genre field into a tag set. Empty segments are dropped,
/// so an empty field yields an empty set.
pub fn split_tags(genres: &str) -> BTreeSet<String> {
    genres
        .split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered, immutable item collection with id lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Build a catalog, preserving the given order. Item ids must be unique.
    pub fn new(items: Vec<Item>) -> EngineResult<Self> {
        let mut positions = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if positions.insert(item.id, pos).is_some() {
                return Err(EngineError::InvalidRequest(format!(
                    "duplicate item id {} in catalog",
                    item.id
                )));
            }
        }
        Ok(Self { items, positions })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Catalog position of an item id, if the catalog knows it.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.position(id).map(|pos| &self.items[pos])
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Case-insensitive title substring search, in catalog order.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.title.to_lowercase().contains(&needle))
            .collect()
    }
}
