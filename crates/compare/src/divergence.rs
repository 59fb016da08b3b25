use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::path::OpPath;

/// A single point where actual and expected differ.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub path: OpPath,
    pub message: String,
}

/// Divergences keyed by path, in the order paths were first seen.
///
/// Adding at a path that already holds a divergence replaces its message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DivergenceSet {
    items: IndexMap<OpPath, Divergence>,
}

impl DivergenceSet {
    pub fn new() -> Self {
        DivergenceSet::default()
    }

    pub fn add(&mut self, path: OpPath, message: impl Into<String>) {
        let message = message.into();
        match self.items.entry(path) {
            Entry::Occupied(mut existing) => existing.get_mut().message = message,
            Entry::Vacant(slot) => {
                let path = slot.key().clone();
                slot.insert(Divergence { path, message });
            }
        }
    }

    pub fn get(&self, path: &OpPath) -> Option<&Divergence> {
        self.items.get(path)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Divergence> {
        self.items.values()
    }
}

impl<'a> IntoIterator for &'a DivergenceSet {
    type Item = &'a Divergence;
    type IntoIter = indexmap::map::Values<'a, OpPath, Divergence>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.values()
    }
}
