//! Operator-facing save/load on top of a [`LayoutRepository`].
//!
//! Adds name normalisation and at-most-one in-flight save per layout name.
//! Nothing here touches an editor; loaded elements are handed back and the
//! caller applies them only on success.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::element::{Element, ElementId};
use crate::persistence::{
    normalize_layout_name, LayoutRepository, PersistenceError, PersistenceResult,
};

/// Names with a save in flight.
#[derive(Debug, Clone, Default)]
struct SaveGate {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SaveGate {
    fn try_enter(&self, name: &str) -> Option<SaveTicket> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !in_flight.insert(name.to_string()) {
            return None;
        }
        Some(SaveTicket {
            gate: self.clone(),
            name: name.to_string(),
        })
    }

    fn is_saving(&self, name: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(name)
    }
}

/// Exclusive right to save one layout name. Released on drop, including
/// when the save future is cancelled.
#[derive(Debug)]
pub struct SaveTicket {
    gate: SaveGate,
    name: String,
}

impl SaveTicket {
    /// The layout name this ticket covers.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SaveTicket {
    fn drop(&mut self) {
        self.gate
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.name);
    }
}

/// Named layouts backed by a repository.
#[derive(Debug)]
pub struct LayoutLibrary<R: ?Sized> {
    repository: Arc<R>,
    gate: SaveGate,
}

impl<R: ?Sized> Clone for LayoutLibrary<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            gate: self.gate.clone(),
        }
    }
}

impl<R: LayoutRepository + ?Sized> LayoutLibrary<R> {
    /// Wrap a repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            gate: SaveGate::default(),
        }
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Whether a save for `name` is currently running.
    #[must_use]
    pub fn is_saving(&self, name: &str) -> bool {
        normalize_layout_name(name).is_ok_and(|n| self.gate.is_saving(&n))
    }

    /// Names of all stored layouts.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    #[tracing::instrument(skip(self))]
    pub async fn names(&self) -> PersistenceResult<Vec<String>> {
        self.repository.list_layout_names().await
    }

    /// Load a layout's elements.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidName`] for blank names and
    /// propagates repository failures.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, name: &str) -> PersistenceResult<Vec<Element>> {
        let name = normalize_layout_name(name)?;
        let elements = self.repository.get_layout(&name).await?;
        tracing::info!("Loaded layout {name:?} ({} elements)", elements.len());
        Ok(elements)
    }

    /// Save elements under a name, refusing to start a second save for the
    /// same name while one is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidName`] for blank names,
    /// [`PersistenceError::SaveInProgress`] if a save for the name is
    /// already running, and propagates repository failures.
    #[tracing::instrument(skip(self, elements), fields(count = elements.len()))]
    pub async fn save(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        let Some(ticket) = self.gate.try_enter(&name) else {
            tracing::warn!("Save for {name:?} already in progress");
            return Err(PersistenceError::SaveInProgress(name));
        };
        let result = self.repository.save_layout(ticket.name(), elements).await;
        match &result {
            Ok(()) => tracing::info!("Saved layout {name:?}"),
            Err(e) => tracing::warn!("Saving layout {name:?} failed: {e}"),
        }
        result
    }

    /// Delete a stored layout.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidName`] for blank names and
    /// propagates repository failures.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, name: &str) -> PersistenceResult<()> {
        let name = normalize_layout_name(name)?;
        self.repository.delete_layout(&name).await?;
        tracing::info!("Deleted layout {name:?}");
        Ok(())
    }

    /// Seat (or with an empty name, unseat) a guest in a stored layout.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::InvalidName`] for blank layout names and
    /// propagates repository failures.
    #[tracing::instrument(skip(self))]
    pub async fn assign_guest(
        &self,
        layout: &str,
        seat: ElementId,
        guest: &str,
    ) -> PersistenceResult<()> {
        let layout = normalize_layout_name(layout)?;
        self.repository
            .assign_guest_to_seat(&layout, seat, guest.trim())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::element::ElementType;
    use crate::persistence::MemoryLayouts;

    /// Blocks every save until released.
    struct SlowLayouts {
        inner: MemoryLayouts,
        release: Notify,
    }

    #[async_trait]
    impl LayoutRepository for SlowLayouts {
        async fn list_layout_names(&self) -> PersistenceResult<Vec<String>> {
            self.inner.list_layout_names().await
        }

        async fn get_layout(&self, name: &str) -> PersistenceResult<Vec<Element>> {
            self.inner.get_layout(name).await
        }

        async fn save_layout(&self, name: &str, elements: &[Element]) -> PersistenceResult<()> {
            self.release.notified().await;
            self.inner.save_layout(name, elements).await
        }

        async fn delete_layout(&self, name: &str) -> PersistenceResult<()> {
            self.inner.delete_layout(name).await
        }

        async fn assign_guest_to_seat(
            &self,
            layout: &str,
            seat: ElementId,
            guest: &str,
        ) -> PersistenceResult<()> {
            self.inner.assign_guest_to_seat(layout, seat, guest).await
        }
    }

    #[tokio::test]
    async fn blank_names_fail_before_io() {
        let library = LayoutLibrary::new(Arc::new(MemoryLayouts::new()));
        assert!(matches!(
            library.save("  ", &[]).await,
            Err(PersistenceError::InvalidName(_))
        ));
        assert!(library.names().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn save_then_load_trims_name() {
        let library = LayoutLibrary::new(Arc::new(MemoryLayouts::new()));
        let elements = vec![Element::new(ElementType::Table)];
        library.save(" Gala ", &elements).await.expect("save");
        assert_eq!(library.names().await.expect("list"), vec!["Gala".to_string()]);
        assert_eq!(library.load("Gala").await.expect("load"), elements);
    }

    #[tokio::test]
    async fn second_concurrent_save_is_refused() {
        let repo = Arc::new(SlowLayouts {
            inner: MemoryLayouts::new(),
            release: Notify::new(),
        });
        let library = LayoutLibrary::new(Arc::clone(&repo));

        let first = tokio::spawn({
            let library = library.clone();
            async move { library.save("Gala", &[]).await }
        });
        while !library.is_saving("Gala") {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(matches!(
            library.save("Gala", &[]).await,
            Err(PersistenceError::SaveInProgress(_))
        ));

        repo.release.notify_one();
        first.await.expect("join").expect("first save");
        assert!(!library.is_saving("Gala"));
    }

    #[tokio::test]
    async fn cancelled_save_releases_ticket() {
        let repo = Arc::new(SlowLayouts {
            inner: MemoryLayouts::new(),
            release: Notify::new(),
        });
        let library = LayoutLibrary::new(Arc::clone(&repo));

        let attempt =
            tokio::time::timeout(Duration::from_millis(10), library.save("Gala", &[])).await;
        assert!(attempt.is_err(), "save should still be blocked");
        assert!(!library.is_saving("Gala"));
    }

    #[tokio::test]
    async fn failed_load_reports_not_found() {
        let library = LayoutLibrary::new(Arc::new(MemoryLayouts::new()));
        assert!(matches!(
            library.load("Missing").await,
            Err(PersistenceError::LayoutNotFound(_))
        ));
    }
}
