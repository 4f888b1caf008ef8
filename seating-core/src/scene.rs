//! Element store: the ordered collection of placed elements plus the table
//! selection that refers into it.
//!
//! Insertion order is preserved for deterministic rendering. The selection
//! lives here so that removing an element and dropping it from the selection
//! happen in one call.

use std::collections::HashMap;

use crate::element::{Element, ElementId, ElementKind, ElementType};
use crate::error::{CanvasError, CanvasResult};
use crate::selection::Selection;
use crate::viewport::{Point, ViewTransform};

/// All elements of one layout, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// All elements, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// Element IDs in insertion order.
    order: Vec<ElementId>,
    /// Currently selected table IDs.
    selection: Selection,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element of `element_type` centred on a screen point.
    ///
    /// The screen point is mapped through `view` and the element is offset
    /// by half its default size so that its centre lands there. Returns
    /// `None` without touching the store if no point is given or the
    /// resulting geometry is not finite.
    pub fn create(
        &mut self,
        element_type: ElementType,
        center_screen: Option<Point>,
        view: &ViewTransform,
    ) -> Option<&Element> {
        let center = view.screen_to_model(center_screen?);
        let (width, height) = element_type.default_size();
        let element = Element::new(element_type).at(center.x - width / 2.0, center.y - height / 2.0);
        if !element.transform.is_valid() {
            tracing::warn!("Refusing to create {element_type} at non-finite position");
            return None;
        }
        let id = element.id;
        tracing::debug!("Created {element_type} {id}");
        self.push(element);
        self.elements.get(&id)
    }

    /// Insert a fully built element at the end of the order.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if the id is already present or
    /// the geometry is not finite and positive.
    pub fn add(&mut self, element: Element) -> CanvasResult<ElementId> {
        Self::validate(&element)?;
        if self.elements.contains_key(&element.id) {
            return Err(CanvasError::InvalidElement(format!(
                "duplicate id {}",
                element.id
            )));
        }
        let id = element.id;
        self.push(element);
        Ok(id)
    }

    fn push(&mut self, element: Element) {
        self.order.push(element.id);
        self.elements.insert(element.id, element);
    }

    fn validate(element: &Element) -> CanvasResult<()> {
        if !element.transform.is_valid() {
            return Err(CanvasError::InvalidElement(format!(
                "element {} has invalid geometry",
                element.id
            )));
        }
        if element.joined_from().contains(&element.id) {
            return Err(CanvasError::InvalidElement(format!(
                "element {} lists itself as a join source",
                element.id
            )));
        }
        Ok(())
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Replace an element's position. No-op if the id is unknown or the
    /// position is not finite.
    pub fn move_to(&mut self, id: &ElementId, x: f64, y: f64) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        element.transform.x = x;
        element.transform.y = y;
        true
    }

    /// Add 45° to an element's rotation, wrapping at 360.
    ///
    /// For a merged table the step is also applied to any of its join
    /// sources still present in the store; merged sources are normally
    /// removed at join time, so usually only the table itself turns.
    pub fn rotate(&mut self, id: &ElementId) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        element.rotate_step();
        let sources = element.joined_from().to_vec();
        for source in &sources {
            if let Some(part) = self.elements.get_mut(source) {
                part.rotate_step();
            }
        }
        true
    }

    /// Change an element's display label.
    pub fn rename(&mut self, id: &ElementId, name: impl Into<String>) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        element.name = name.into();
        true
    }

    /// Seat a guest on a chair, or clear the seat when `guest` is `None` or
    /// blank.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ElementNotFound`] for unknown ids and
    /// [`CanvasError::NotASeat`] for anything but a chair.
    pub fn assign_guest(&mut self, id: &ElementId, guest: Option<&str>) -> CanvasResult<()> {
        let element = self
            .elements
            .get_mut(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?;
        let ElementKind::Chair { guest: seat } = &mut element.kind else {
            return Err(CanvasError::NotASeat(id.to_string()));
        };
        *seat = guest
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        Ok(())
    }

    /// Remove an element, dropping it from the selection as well.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.elements.remove(id)?;
        self.order.retain(|eid| eid != id);
        self.selection.remove(id);
        tracing::debug!("Removed {} {id}", removed.element_type());
        Some(removed)
    }

    /// Elements in insertion order.
    pub fn list(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Owned copy of all elements in insertion order, for persistence.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Element> {
        self.list().cloned().collect()
    }

    /// Replace every element at once and clear the selection.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if any element is invalid or
    /// ids repeat; the scene is left unchanged in that case.
    pub fn replace_all(&mut self, elements: Vec<Element>) -> CanvasResult<()> {
        let mut next = Self::new();
        for element in elements {
            next.add(element)?;
        }
        *self = next;
        Ok(())
    }

    /// Topmost (most recently inserted) element containing a model point.
    #[must_use]
    pub fn element_at(&self, model: Point) -> Option<ElementId> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.elements.get(id))
            .find(|e| e.contains_point(model))
            .map(|e| e.id)
    }

    /// Chairs with a guest, as `(seat, guest)` pairs in insertion order.
    pub fn guests(&self) -> impl Iterator<Item = (&Element, &str)> {
        self.list().filter_map(|e| e.guest().map(|g| (e, g)))
    }

    /// Toggle a table in the selection. Unknown ids and non-tables are
    /// ignored. Returns whether the selection changed.
    pub fn toggle_selection(&mut self, id: &ElementId) -> bool {
        match self.elements.get(id) {
            Some(element) => self.selection.toggle(element),
            None => false,
        }
    }

    /// Deselect all tables.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected tables in selection order.
    pub fn selected_tables(&self) -> impl Iterator<Item = &Element> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    /// Swap a set of elements for one replacement, which becomes the only
    /// selected element.
    pub(crate) fn replace_with(&mut self, remove: &[ElementId], replacement: Element) {
        for id in remove {
            self.elements.remove(id);
        }
        self.order.retain(|id| !remove.contains(id));
        let new_id = replacement.id;
        self.push(replacement);
        self.selection.retain(|id| !remove.contains(id));
        self.selection.set_only(new_id);
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_at(x: f64, y: f64) -> Element {
        Element::new(ElementType::Table).at(x, y)
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());
        let id = scene.add(table_at(0.0, 0.0)).expect("add");
        assert_eq!(scene.len(), 1);
        assert!(scene.remove(&id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(&id).is_none());
    }

    #[test]
    fn create_centres_on_screen_point() {
        let mut scene = Scene::new();
        let view = ViewTransform::default();
        let created = scene
            .create(ElementType::Table, Some(Point::new(400.0, 300.0)), &view)
            .expect("created");
        assert_eq!(created.transform.x, 370.0);
        assert_eq!(created.transform.y, 270.0);
        assert_eq!(created.transform.rotation, 0.0);
        assert!(created.name.is_empty());
    }

    #[test]
    fn create_maps_through_zoom_and_pan() {
        let mut scene = Scene::new();
        let view = ViewTransform {
            zoom: 2.0,
            pan_x: 100.0,
            pan_y: 0.0,
        };
        let chair = scene
            .create(ElementType::Chair, Some(Point::new(300.0, 200.0)), &view)
            .expect("created");
        // centre model = (100, 100); minus half of 30
        assert_eq!(chair.transform.x, 85.0);
        assert_eq!(chair.transform.y, 85.0);
    }

    #[test]
    fn create_without_point_is_none() {
        let mut scene = Scene::new();
        assert!(scene
            .create(ElementType::Other, None, &ViewTransform::default())
            .is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut scene = Scene::new();
        let table = table_at(0.0, 0.0);
        scene.add(table.clone()).expect("first");
        assert!(matches!(
            scene.add(table),
            Err(CanvasError::InvalidElement(_))
        ));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let mut scene = Scene::new();
        let a = scene.add(table_at(0.0, 0.0)).expect("a");
        let b = scene.add(Element::new(ElementType::Chair)).expect("b");
        let c = scene.add(Element::new(ElementType::Other)).expect("c");
        scene.remove(&b);
        let d = scene.add(Element::new(ElementType::Chair)).expect("d");
        let ids: Vec<_> = scene.list().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, c, d]);
    }

    #[test]
    fn move_to_unknown_is_noop() {
        let mut scene = Scene::new();
        assert!(!scene.move_to(&ElementId::new(), 1.0, 2.0));
        let id = scene.add(table_at(0.0, 0.0)).expect("add");
        assert!(!scene.move_to(&id, f64::NAN, 2.0));
        assert!(scene.move_to(&id, 5.0, 6.0));
        let t = scene.get(&id).expect("exists").transform;
        assert_eq!((t.x, t.y), (5.0, 6.0));
    }

    #[test]
    fn rename_updates_label() {
        let mut scene = Scene::new();
        let id = scene.add(table_at(0.0, 0.0)).expect("add");
        assert!(scene.rename(&id, "Head table"));
        assert_eq!(scene.get(&id).expect("exists").name, "Head table");
    }

    #[test]
    fn removing_selected_table_clears_it_from_selection() {
        let mut scene = Scene::new();
        let id = scene.add(table_at(0.0, 0.0)).expect("add");
        assert!(scene.toggle_selection(&id));
        scene.remove(&id);
        assert!(!scene.selection().contains(&id));
        assert!(!scene.toggle_selection(&id));
    }

    #[test]
    fn assign_guest_only_on_chairs() {
        let mut scene = Scene::new();
        let chair = scene.add(Element::new(ElementType::Chair)).expect("chair");
        let table = scene.add(table_at(0.0, 0.0)).expect("table");

        scene.assign_guest(&chair, Some("  Grace Hopper ")).expect("assign");
        assert_eq!(scene.get(&chair).and_then(Element::guest), Some("Grace Hopper"));

        assert!(matches!(
            scene.assign_guest(&table, Some("Alan")),
            Err(CanvasError::NotASeat(_))
        ));
        assert!(matches!(
            scene.assign_guest(&ElementId::new(), Some("Alan")),
            Err(CanvasError::ElementNotFound(_))
        ));

        scene.assign_guest(&chair, Some("   ")).expect("clear");
        assert_eq!(scene.get(&chair).and_then(Element::guest), None);
    }

    #[test]
    fn element_at_prefers_topmost() {
        let mut scene = Scene::new();
        let below = scene.add(table_at(0.0, 0.0)).expect("below");
        let above = scene.add(table_at(30.0, 30.0)).expect("above");
        assert_eq!(scene.element_at(Point::new(40.0, 40.0)), Some(above));
        assert_eq!(scene.element_at(Point::new(5.0, 5.0)), Some(below));
        assert_eq!(scene.element_at(Point::new(500.0, 5.0)), None);
    }

    #[test]
    fn replace_all_is_atomic() {
        let mut scene = Scene::new();
        let keep = scene.add(table_at(0.0, 0.0)).expect("add");
        scene.toggle_selection(&keep);

        let dup = table_at(1.0, 1.0);
        let result = scene.replace_all(vec![dup.clone(), dup]);
        assert!(result.is_err());
        assert!(scene.get(&keep).is_some());
        assert!(scene.selection().contains(&keep));

        scene
            .replace_all(vec![Element::new(ElementType::Chair)])
            .expect("replace");
        assert_eq!(scene.len(), 1);
        assert!(scene.selection().is_empty());
    }

    #[test]
    fn rotate_unknown_is_noop() {
        let mut scene = Scene::new();
        assert!(!scene.rotate(&ElementId::new()));
    }
}
