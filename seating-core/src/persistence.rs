//! Layout persistence: the adapter trait and the local adapters.
//!
//! The editor never talks to storage directly. It goes through a
//! [`LayoutRepository`], which may be in-memory ([`MemoryLayouts`]), a data
//! directory of JSON files ([`FileLayouts`]) or a remote service.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::element::{Element, ElementId};
use crate::schema::LayoutDocument;

/// Maximum layout name length, in characters, after trimming.
pub const MAX_LAYOUT_NAME_LEN: usize = 128;

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors that can occur while loading or storing layouts.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// No layout is stored under this name.
    #[error("Layout not found: {0}")]
    LayoutNotFound(String),
    /// The layout name is empty, too long or contains control characters.
    #[error("Invalid layout name: {0:?}")]
    InvalidName(String),
    /// Another save for the same layout has not finished yet.
    #[error("A save for layout {0:?} is already in progress")]
    SaveInProgress(String),
    /// The layout has no chair with this id.
    #[error("Seat not found: {0}")]
    SeatNotFound(String),
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored or received document could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The storage backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Trim a layout name and check it is usable.
///
/// # Errors
///
/// Returns [`PersistenceError::InvalidName`] if the trimmed name is empty,
/// longer than [`MAX_LAYOUT_NAME_LEN`] characters, or contains control
/// characters.
pub fn normalize_layout_name(name: &str) -> PersistenceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_LAYOUT_NAME_LEN
        || trimmed.chars().any(char::is_control)
    {
        return Err(PersistenceError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Asynchronous storage of named layouts.
///
/// Every operation may fail with a [`PersistenceError`]; callers leave their
/// in-memory state untouched when it does.
#[async_trait]
pub trait LayoutRepository: Send + Sync {
    /// Names of all stored layouts, sorted.
    async fn list_layout_names(&self) -> PersistenceResult<Vec<String>>;

    /// Elements of a stored layout, in insertion order.
    async fn get_layout(&self, name: &str) -> PersistenceResult<Vec<Element>>;

    /// Insert or replace a layout.
    async fn save_layout(&self, name: &str, elements: &[Element]) -> PersistenceResult<()>;

    /// Delete a layout.
    async fn delete_layout(&self, name: &str) -> PersistenceResult<()>;

    /// Seat a guest on a chair of a stored layout. An empty guest name
    /// clears the seat.
    async fn assign_guest_to_seat(
        &self,
        layout: &str,
        seat: ElementId,
        guest: &str,
    ) -> PersistenceResult<()>;
}

fn materialize(doc: LayoutDocument) -> PersistenceResult<Vec<Element>> {
    doc.into_elements()
        .map_err(|e| PersistenceError::Serialization(e.to_string()))
}

fn seat_in(doc: &mut LayoutDocument, seat: ElementId, guest: &str) -> PersistenceResult<()> {
    if doc.seat_guest(&seat, Some(guest)) {
        Ok(())
    } else {
        Err(PersistenceError::SeatNotFound(seat.to_string()))
    }
}

/// In-process layout storage.
#[derive(Debug, Default)]
pub struct MemoryLayouts {
    layouts: RwLock<BTreeMap<String, LayoutDocument>>,
}

impl MemoryLayouts {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutRepository for MemoryLayouts {
    async fn list_layout_names(&self) -> PersistenceResult<Vec<String>> {
        let layouts = self
            .layouts
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(layouts.keys().cloned().collect())
    }

    async fn get_layout(&self, name: &str) -> PersistenceResult<Vec<Element>> {
        let name = normalize_layout_name(name)?;
        let doc = {
            let layouts = self
                .layouts
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            layouts
                .get(&name)
                .cloned()
                .ok_or(PersistenceError::LayoutNotFound(name))?
        };
        materialize(doc)
    }

    async fn save_layout(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        let doc = LayoutDocument::from_elements(name.clone(), elements);
        let mut layouts = self
            .layouts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        layouts.insert(name, doc);
        Ok(())
    }

    async fn delete_layout(&self, name: &str) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        let mut layouts = self
            .layouts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        layouts
            .remove(&name)
            .map(|_| ())
            .ok_or(PersistenceError::LayoutNotFound(name))
    }

    async fn assign_guest_to_seat(
        &self,
        layout: &str,
        seat: ElementId,
        guest: &str,
    ) -> PersistenceResult<()> {
        let name = normalize_layout_name(layout)?;
        let mut layouts = self
            .layouts
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let doc = layouts
            .get_mut(&name)
            .ok_or(PersistenceError::LayoutNotFound(name))?;
        seat_in(doc, seat, guest)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::{layout_file_stem, FileLayouts};

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::HashMap;
    use std::fmt::Write as _;
    use std::io::ErrorKind;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex, PoisonError};

    use async_trait::async_trait;
    use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
    use uuid::Uuid;

    use super::{
        materialize, normalize_layout_name, seat_in, LayoutRepository, PersistenceError,
        PersistenceResult,
    };
    use crate::element::{Element, ElementId};
    use crate::schema::LayoutDocument;

    /// Map a layout name to a file stem.
    ///
    /// ASCII letters, digits and `-` pass through; every other byte becomes
    /// `_` followed by two hex digits, so distinct names never share a file.
    #[must_use]
    pub fn layout_file_stem(name: &str) -> String {
        let mut stem = String::with_capacity(name.len());
        for byte in name.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                stem.push(char::from(byte));
            } else {
                let _ = write!(stem, "_{byte:02X}");
            }
        }
        stem
    }

    /// One pretty-printed JSON document per layout in a data directory.
    ///
    /// Writes to the same layout are serialized, so concurrent seat
    /// assignments never overwrite each other. Clones share those locks;
    /// separately opened stores on one directory do not.
    #[derive(Debug, Clone)]
    pub struct FileLayouts {
        data_dir: PathBuf,
        locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
    }

    impl FileLayouts {
        /// Use `data_dir`, creating it if needed.
        ///
        /// # Errors
        ///
        /// Returns [`PersistenceError::Io`] if the directory cannot be
        /// created.
        pub async fn open(data_dir: impl Into<PathBuf>) -> PersistenceResult<Self> {
            let data_dir = data_dir.into();
            tokio::fs::create_dir_all(&data_dir).await?;
            tracing::info!("Layout data directory: {}", data_dir.display());
            Ok(Self {
                data_dir,
                locks: Arc::default(),
            })
        }

        /// The data directory.
        #[must_use]
        pub fn data_dir(&self) -> &Path {
            &self.data_dir
        }

        fn path_for(&self, name: &str) -> PathBuf {
            self.data_dir.join(format!("{}.json", layout_file_stem(name)))
        }

        /// Exclusive access to one layout's file until the guard drops.
        async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
            let lock = {
                let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
                Arc::clone(locks.entry(name.to_string()).or_default())
            };
            lock.lock_owned().await
        }

        async fn read(&self, name: &str) -> PersistenceResult<LayoutDocument> {
            let path = self.path_for(name);
            let contents = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(PersistenceError::LayoutNotFound(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            };
            Ok(serde_json::from_str(&contents)?)
        }

        async fn write(&self, doc: &LayoutDocument) -> PersistenceResult<()> {
            let json = serde_json::to_string_pretty(doc)?;
            let path = self.path_for(&doc.name);
            let staging = self.data_dir.join(format!(
                ".{}.{}.tmp",
                layout_file_stem(&doc.name),
                Uuid::new_v4().simple()
            ));
            let staged = match tokio::fs::write(&staging, json).await {
                Ok(()) => tokio::fs::rename(&staging, &path).await,
                Err(e) => Err(e),
            };
            if let Err(e) = staged {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(e.into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LayoutRepository for FileLayouts {
        #[tracing::instrument(skip(self))]
        async fn list_layout_names(&self) -> PersistenceResult<Vec<String>> {
            let mut names = Vec::new();
            let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if !path.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                let parsed = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(PersistenceError::from)
                    .and_then(|s| {
                        serde_json::from_str::<LayoutDocument>(&s).map_err(PersistenceError::from)
                    });
                match parsed {
                    Ok(doc) => names.push(doc.name),
                    Err(e) => {
                        tracing::warn!("Skipping unreadable layout {}: {e}", path.display());
                    }
                }
            }
            names.sort();
            Ok(names)
        }

        #[tracing::instrument(skip(self))]
        async fn get_layout(&self, name: &str) -> PersistenceResult<Vec<Element>> {
            let name = normalize_layout_name(name)?;
            let doc = self.read(&name).await?;
            tracing::debug!("Loaded {} elements", doc.elements.len());
            materialize(doc)
        }

        #[tracing::instrument(skip(self, elements), fields(count = elements.len()))]
        async fn save_layout(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
            let name = normalize_layout_name(name)?;
            let _guard = self.lock(&name).await;
            self.write(&LayoutDocument::from_elements(name, elements))
                .await
        }

        #[tracing::instrument(skip(self))]
        async fn delete_layout(&self, name: &str) -> PersistenceResult<()> {
            let name = normalize_layout_name(name)?;
            let _guard = self.lock(&name).await;
            match tokio::fs::remove_file(self.path_for(&name)).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(PersistenceError::LayoutNotFound(name))
                }
                Err(e) => Err(e.into()),
            }
        }

        #[tracing::instrument(skip(self))]
        async fn assign_guest_to_seat(
            &self,
            layout: &str,
            seat: ElementId,
            guest: &str,
        ) -> PersistenceResult<()> {
            let name = normalize_layout_name(layout)?;
            let _guard = self.lock(&name).await;
            let mut doc = self.read(&name).await?;
            seat_in(&mut doc, seat, guest)?;
            self.write(&doc).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementType};

    fn sample() -> Vec<Element> {
        vec![
            Element::new(ElementType::Table).at(0.0, 0.0),
            Element::new(ElementType::Chair).at(70.0, 0.0),
        ]
    }

    #[test]
    fn names_are_trimmed_and_validated() {
        assert_eq!(normalize_layout_name("  Gala ").expect("valid"), "Gala");
        assert!(matches!(
            normalize_layout_name("   "),
            Err(PersistenceError::InvalidName(_))
        ));
        assert!(normalize_layout_name("a\nb").is_err());
        assert!(normalize_layout_name(&"x".repeat(MAX_LAYOUT_NAME_LEN + 1)).is_err());
    }

    #[tokio::test]
    async fn memory_round_trip() {
        let repo = MemoryLayouts::new();
        let elements = sample();
        repo.save_layout("Gala", &elements).await.expect("save");
        repo.save_layout("Brunch", &[]).await.expect("save");

        assert_eq!(
            repo.list_layout_names().await.expect("list"),
            vec!["Brunch".to_string(), "Gala".to_string()]
        );
        assert_eq!(repo.get_layout(" Gala ").await.expect("get"), elements);

        repo.delete_layout("Gala").await.expect("delete");
        assert!(matches!(
            repo.get_layout("Gala").await,
            Err(PersistenceError::LayoutNotFound(_))
        ));
        assert!(matches!(
            repo.delete_layout("Gala").await,
            Err(PersistenceError::LayoutNotFound(_))
        ));
    }

    #[tokio::test]
    async fn memory_assign_and_unassign_seat() {
        let repo = MemoryLayouts::new();
        let elements = sample();
        let chair = elements[1].id;
        let table = elements[0].id;
        repo.save_layout("Gala", &elements).await.expect("save");

        repo.assign_guest_to_seat("Gala", chair, "Ada").await.expect("assign");
        let loaded = repo.get_layout("Gala").await.expect("get");
        assert_eq!(loaded[1].guest(), Some("Ada"));

        repo.assign_guest_to_seat("Gala", chair, "").await.expect("unassign");
        let loaded = repo.get_layout("Gala").await.expect("get");
        assert_eq!(loaded[1].kind, ElementKind::Chair { guest: None });

        assert!(matches!(
            repo.assign_guest_to_seat("Gala", table, "Ada").await,
            Err(PersistenceError::SeatNotFound(_))
        ));
        assert!(matches!(
            repo.assign_guest_to_seat("Nope", chair, "Ada").await,
            Err(PersistenceError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn file_stems_are_injective() {
        assert_eq!(layout_file_stem("Gala-2024"), "Gala-2024");
        assert_eq!(layout_file_stem("a b"), "a_20b");
        assert_ne!(layout_file_stem("a_b"), layout_file_stem("a b"));
        assert_eq!(layout_file_stem("../x"), "_2E_2E_2Fx");
    }
}
