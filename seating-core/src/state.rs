//! Editor mode and save status.

use serde::{Deserialize, Serialize};

/// What the user is currently doing with the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Arrange tables, chairs and fixtures.
    #[default]
    Build,
    /// Seat guests on chairs. Elements stay where they are.
    Assign,
    /// Read-only presentation.
    View,
}

impl EditorMode {
    /// Whether elements may be created, moved, joined, rotated or removed.
    #[must_use]
    pub const fn can_arrange(self) -> bool {
        matches!(self, Self::Build)
    }

    /// Whether guests may be seated or unseated.
    #[must_use]
    pub const fn can_assign(self) -> bool {
        matches!(self, Self::Assign)
    }

    /// Lowercase name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Assign => "assign",
            Self::View => "view",
        }
    }
}

impl std::fmt::Display for EditorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EditorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "build" => Ok(Self::Build),
            "assign" | "edit" => Ok(Self::Assign),
            "view" => Ok(Self::View),
            other => Err(format!("unknown editor mode: {other}")),
        }
    }
}

/// Whether the in-memory layout matches what was last persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    /// Nothing changed since the last load or save.
    #[default]
    Clean,
    /// Local edits not yet saved.
    Dirty,
    /// A save is in flight.
    Saving,
}
