//! Table selection for multi-element operations.
//!
//! Selection order is insertion order; the join algorithm anchors its `y` on
//! the first selected table.

use crate::element::{Element, ElementId};

/// Ordered set of selected table ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of a table. Non-table elements are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, element: &Element) -> bool {
        if !element.is_table() {
            return false;
        }
        if self.remove(&element.id) {
            return true;
        }
        self.ids.push(element.id);
        true
    }

    /// Remove an id. Returns whether it was selected.
    pub fn remove(&mut self, id: &ElementId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|sid| sid != id);
        self.ids.len() != before
    }

    /// Replace the selection with exactly one id.
    pub(crate) fn set_only(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Keep only ids matching the predicate.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&ElementId) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether an id is selected.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    /// Number of selected tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
