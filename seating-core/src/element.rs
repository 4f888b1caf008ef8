//! Layout elements - the tables, chairs and other objects placed on the floor plan.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::viewport::Point;

/// Default table edge length in model units.
pub const TABLE_SIZE: f64 = 60.0;
/// Default chair edge length in model units.
pub const CHAIR_SIZE: f64 = 30.0;
/// Default width of a free-form object in model units.
pub const OTHER_WIDTH: f64 = 100.0;
/// Default height of a free-form object in model units.
pub const OTHER_HEIGHT: f64 = 60.0;
/// Angle added by a single rotate operation, in degrees.
pub const ROTATION_STEP_DEGREES: f64 = 45.0;

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Resolve an id as stored in a layout document.
    ///
    /// UUIDs are taken as-is. Any other non-blank key (older layouts used
    /// millisecond timestamps) maps to a name-based UUID, so the same key
    /// always yields the same id. Returns `None` for a blank key.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(
            Self::parse(raw)
                .unwrap_or_else(|_| Self(Uuid::new_v5(&LEGACY_ID_NAMESPACE, raw.as_bytes()))),
        )
    }
}

/// Namespace for ids derived from non-UUID keys.
const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5ea7_1a90_7c1e_4b2e_9d0c_6a11_0f3e_2b71);

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant of an element, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// A table; the only type that can be selected and joined.
    Table,
    /// A single seat; the only type that can hold a guest.
    Chair,
    /// Any other floor-plan object (dance floor, stage, bar...).
    Other,
}

impl ElementType {
    /// Width and height an element of this type is created with.
    #[must_use]
    pub const fn default_size(self) -> (f64, f64) {
        match self {
            Self::Table => (TABLE_SIZE, TABLE_SIZE),
            Self::Chair => (CHAIR_SIZE, CHAIR_SIZE),
            Self::Other => (OTHER_WIDTH, OTHER_HEIGHT),
        }
    }

    /// Lowercase name as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Chair => "chair",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// A table, possibly the result of joining other tables.
    Table {
        /// Flat provenance: every original table id absorbed by joins.
        /// Empty for a table that was never merged.
        joined_from: Vec<ElementId>,
    },
    /// A chair with an optional seated guest.
    Chair {
        /// Name of the guest assigned to this seat.
        guest: Option<String>,
    },
    /// A free-form object.
    Other,
}

impl ElementKind {
    /// A fresh payload for the given type.
    #[must_use]
    pub fn empty(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Table => Self::Table {
                joined_from: Vec::new(),
            },
            ElementType::Chair => Self::Chair { guest: None },
            ElementType::Other => Self::Other,
        }
    }

    /// The discriminant of this payload.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Table { .. } => ElementType::Table,
            Self::Chair { .. } => ElementType::Chair,
            Self::Other => ElementType::Other,
        }
    }
}

/// Position, size and rotation in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Left edge in model units.
    pub x: f64,
    /// Top edge in model units.
    pub y: f64,
    /// Width in model units.
    pub width: f64,
    /// Height in model units.
    pub height: f64,
    /// Rotation in degrees, always within `[0, 360)`.
    pub rotation: f64,
}

impl Transform {
    /// Whether every component is finite and the size is positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.rotation.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Check if a model-space point lies within the unrotated bounds.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Wrap an angle into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// A placed layout element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Unique identifier, immutable once created.
    pub id: ElementId,
    /// Type-specific payload.
    pub kind: ElementKind,
    /// Display label.
    pub name: String,
    /// Geometry in model coordinates.
    pub transform: Transform,
}

impl Element {
    /// Create an element of the given type at the model origin with the
    /// type's default size.
    #[must_use]
    pub fn new(element_type: ElementType) -> Self {
        let (width, height) = element_type.default_size();
        Self {
            id: ElementId::new(),
            kind: ElementKind::empty(element_type),
            name: String::new(),
            transform: Transform {
                x: 0.0,
                y: 0.0,
                width,
                height,
                rotation: 0.0,
            },
        }
    }

    /// Set the top-left position.
    #[must_use]
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    /// Set the display label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The element's type.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Whether this element is a table.
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self.kind, ElementKind::Table { .. })
    }

    /// The seated guest, for chairs that have one.
    #[must_use]
    pub fn guest(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Chair { guest } => guest.as_deref(),
            _ => None,
        }
    }

    /// Join provenance, empty for anything but a merged table.
    #[must_use]
    pub fn joined_from(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Table { joined_from } => joined_from,
            _ => &[],
        }
    }

    /// Advance rotation by one step, wrapping at 360.
    pub fn rotate_step(&mut self) {
        self.transform.rotation =
            normalize_degrees(self.transform.rotation + ROTATION_STEP_DEGREES);
    }

    /// Check if a model-space point is within this element.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        self.transform.contains(p)
    }
}
