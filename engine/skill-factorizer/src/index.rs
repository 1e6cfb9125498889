use std::collections::HashMap;

/// Bidirectional map between string IDs and dense indices
///
/// Indices follow first-insertion order. Every matrix row/column and every
/// skill/weakness vector entry is addressed through one of these, so an
/// index built for a position group is the only source of truth for what
/// entry `i` means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from IDs, keeping the first occurrence of each
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for id in ids {
            index.insert(id.as_ref());
        }
        index
    }

    /// Index for `id`, assigning the next free index if it is new
    pub fn insert(&mut self, id: &str) -> usize {
        if let Some(&index) = self.positions.get(id) {
            return index;
        }
        let index = self.ids.len();
        self.ids.push(id.to_string());
        self.positions.insert(id.to_string(), index);
        index
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// IDs in index order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `(index, id)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.ids.iter().enumerate().map(|(i, id)| (i, id.as_str()))
    }
}
