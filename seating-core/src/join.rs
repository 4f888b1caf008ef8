//! Joining selected tables into one larger table.
//!
//! The merged table is a linear concatenation of the sources: widths add up,
//! `x` is the leftmost source, `y` comes from the first table in selection
//! order, and the height resets to the standard table height. Provenance is
//! kept flat so repeated joins never nest.

use crate::element::{Element, ElementId, ElementKind, ElementType, TABLE_SIZE};
use crate::scene::Scene;

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Id of the new merged table, now the only selected element.
    pub table: ElementId,
    /// Ids of the tables removed from the store, in selection order.
    pub absorbed: Vec<ElementId>,
}

/// Build the merged table for `tables` without touching any store.
///
/// Returns `None` for fewer than two tables or if any input is not a table.
#[must_use]
pub fn merge_tables(tables: &[&Element]) -> Option<Element> {
    let first = tables.first()?;
    if tables.len() < 2 || tables.iter().any(|t| !t.is_table()) {
        return None;
    }

    let total_width: f64 = tables.iter().map(|t| t.transform.width).sum();
    let anchor_x = tables
        .iter()
        .map(|t| t.transform.x)
        .fold(f64::INFINITY, f64::min);
    let anchor_y = first.transform.y;

    let mut joined_from: Vec<ElementId> = Vec::new();
    for table in tables {
        let origins = table.joined_from();
        if origins.is_empty() {
            push_unique(&mut joined_from, table.id);
        } else {
            for origin in origins {
                push_unique(&mut joined_from, *origin);
            }
        }
    }

    let mut merged = Element::new(ElementType::Table).at(anchor_x, anchor_y);
    merged.transform.width = total_width;
    merged.transform.height = TABLE_SIZE;
    merged.kind = ElementKind::Table { joined_from };
    Some(merged)
}

fn push_unique(ids: &mut Vec<ElementId>, id: ElementId) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

/// Join the scene's selected tables.
///
/// With fewer than two selected tables the scene is left untouched and
/// `None` is returned. Otherwise the sources are removed, the merged table
/// is appended, and the selection becomes just the merged table.
pub fn join_selected(scene: &mut Scene) -> Option<JoinOutcome> {
    let tables: Vec<&Element> = scene.selected_tables().collect();
    let merged = merge_tables(&tables)?;
    let absorbed: Vec<ElementId> = tables.iter().map(|t| t.id).collect();
    let table = merged.id;

    tracing::info!(
        "Joined {} tables into {table} (width {})",
        absorbed.len(),
        merged.transform.width
    );
    scene.replace_with(&absorbed, merged);
    Some(JoinOutcome { table, absorbed })
}
