use std::collections::HashMap;

use crate::catalog::{Artwork, ArtworkId};

/// Cross-page selection keyed by artwork id, iterated in insertion order.
#[derive(Clone, Debug, Default)]
pub struct SelectionSet {
    entries: HashMap<ArtworkId, Artwork>,
    order: Vec<ArtworkId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: ArtworkId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: ArtworkId) -> Option<&Artwork> {
        self.entries.get(&id)
    }

    /// Insert `record` unless its id is already selected. An existing entry
    /// keeps its stored value.
    pub fn insert(&mut self, record: Artwork) -> bool {
        if self.entries.contains_key(&record.id) {
            return false;
        }
        self.order.push(record.id);
        self.entries.insert(record.id, record);
        true
    }

    pub fn remove(&mut self, id: ArtworkId) -> Option<Artwork> {
        let removed = self.entries.remove(&id)?;
        self.order.retain(|selected| *selected != id);
        Some(removed)
    }

    pub fn contains_all<'a, I>(&self, records: I) -> bool
    where
        I: IntoIterator<Item = &'a Artwork>,
    {
        records.into_iter().all(|r| self.contains(r.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artwork> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}
