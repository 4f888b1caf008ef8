//! Wire format for layouts shared by the file adapter, the HTTP API and the
//! browser bindings.
//!
//! Field names follow the layout JSON already stored by existing deployments
//! (`type`, `joinedFrom`, optional `guest`). Those deployments wrote numeric
//! ids; they are read as text and resolved through [`ElementId::from_stored`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::element::{normalize_degrees, Element, ElementId, ElementKind, ElementType, Transform};
use crate::error::{CanvasError, CanvasResult};

/// Document-friendly element description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDocument {
    /// Element identifier.
    #[serde(deserialize_with = "stored_id")]
    pub id: String,
    /// Element type.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Display label.
    #[serde(default)]
    pub name: String,
    /// Left edge in model units.
    pub x: f64,
    /// Top edge in model units.
    pub y: f64,
    /// Width in model units.
    pub width: f64,
    /// Height in model units.
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Seated guest (chairs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
    /// Join provenance (tables only).
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "stored_ids"
    )]
    pub joined_from: Vec<String>,
}

/// An id as found on disk: a string, or a number from older layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Text(String),
    Number(serde_json::Number),
}

impl From<StoredId> for String {
    fn from(id: StoredId) -> Self {
        match id {
            StoredId::Text(text) => text,
            StoredId::Number(number) => number.to_string(),
        }
    }
}

fn stored_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StoredId::deserialize(deserializer).map(String::from)
}

fn stored_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<StoredId>::deserialize(deserializer).map(|ids| ids.into_iter().map(String::from).collect())
}

impl From<&Element> for ElementDocument {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.to_string(),
            element_type: element.element_type(),
            name: element.name.clone(),
            x: element.transform.x,
            y: element.transform.y,
            width: element.transform.width,
            height: element.transform.height,
            rotation: element.transform.rotation,
            guest: element.guest().map(str::to_string),
            joined_from: element
                .joined_from()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ElementDocument {
    /// Convert document to runtime element.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if the id is blank, the
    /// geometry is not finite and positive, a guest is set on anything but a
    /// chair, or provenance is set on anything but a table (or names the
    /// element itself).
    pub fn into_element(self) -> CanvasResult<Element> {
        let invalid = |reason: String| CanvasError::InvalidElement(format!("{}: {reason}", self.id));

        let id = ElementId::from_stored(&self.id).ok_or_else(|| invalid("blank id".into()))?;
        let transform = Transform {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: normalize_degrees(self.rotation),
        };
        if !transform.is_valid() {
            return Err(invalid("geometry must be finite with positive size".into()));
        }

        let guest = self
            .guest
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        if guest.is_some() && self.element_type != ElementType::Chair {
            return Err(invalid(format!("a {} cannot seat a guest", self.element_type)));
        }
        if !self.joined_from.is_empty() && self.element_type != ElementType::Table {
            return Err(invalid(format!("a {} cannot have join sources", self.element_type)));
        }

        let mut joined_from = Vec::with_capacity(self.joined_from.len());
        for raw in &self.joined_from {
            let source = ElementId::from_stored(raw)
                .ok_or_else(|| invalid("blank join source".into()))?;
            if source == id {
                return Err(invalid("element lists itself as a join source".into()));
            }
            if !joined_from.contains(&source) {
                joined_from.push(source);
            }
        }

        let kind = match self.element_type {
            ElementType::Table => ElementKind::Table { joined_from },
            ElementType::Chair => ElementKind::Chair { guest },
            ElementType::Other => ElementKind::Other,
        };
        Ok(Element {
            id,
            kind,
            name: self.name,
            transform,
        })
    }
}

/// A named layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Layout name.
    pub name: String,
    /// Elements in insertion order.
    #[serde(default)]
    pub elements: Vec<ElementDocument>,
}

impl LayoutDocument {
    /// Build a document from runtime elements.
    pub fn from_elements(name: impl Into<String>, elements: &[Element]) -> Self {
        Self {
            name: name.into(),
            elements: elements.iter().map(ElementDocument::from).collect(),
        }
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] if `json` is not a layout
    /// document.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact JSON text of this document.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Materialize every element, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidElement`] if any element is invalid or
    /// two elements share an id.
    pub fn into_elements(self) -> CanvasResult<Vec<Element>> {
        let mut elements: Vec<Element> = Vec::with_capacity(self.elements.len());
        for doc in self.elements {
            let element = doc.into_element()?;
            if elements.iter().any(|e| e.id == element.id) {
                return Err(CanvasError::InvalidElement(format!(
                    "duplicate id {}",
                    element.id
                )));
            }
            elements.push(element);
        }
        Ok(elements)
    }

    /// Find a chair by id and seat (or unseat) a guest on it.
    ///
    /// Returns `false` if no chair with that id exists.
    pub fn seat_guest(&mut self, seat: &ElementId, guest: Option<&str>) -> bool {
        let Some(doc) = self.elements.iter_mut().find(|d| {
            d.element_type == ElementType::Chair && ElementId::from_stored(&d.id) == Some(*seat)
        })
        else {
            return false;
        };
        doc.guest = guest
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        true
    }
}
