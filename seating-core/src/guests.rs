//! Guest lookups against a layout.
//!
//! Guest names are compared case-insensitively everywhere.

use crate::element::Element;
use crate::scene::Scene;

/// Minimum query length, in characters, before suggestions are offered.
pub const MIN_SUGGESTION_QUERY: usize = 3;

/// Guests from `all` who match `query` and are not yet seated in `scene`.
///
/// The query is trimmed; shorter than [`MIN_SUGGESTION_QUERY`] characters
/// yields nothing. Matching is a case-insensitive substring test and the
/// input order of `all` is preserved.
pub fn suggest_guests<'a, S: AsRef<str>>(
    all: &'a [S],
    scene: &Scene,
    query: &str,
) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Vec::new();
    }
    let seated: Vec<String> = scene.guests().map(|(_, g)| g.to_lowercase()).collect();
    all.iter()
        .map(<S as AsRef<str>>::as_ref)
        .filter(|guest| {
            let lower = guest.to_lowercase();
            !seated.contains(&lower) && lower.contains(&query)
        })
        .collect()
}

/// The chair a guest is seated on, if any.
#[must_use]
pub fn seat_for_guest<'a>(scene: &'a Scene, guest: &str) -> Option<&'a Element> {
    let guest = guest.trim();
    if guest.is_empty() {
        return None;
    }
    let wanted = guest.to_lowercase();
    scene
        .guests()
        .find(|(_, seated)| seated.to_lowercase() == wanted)
        .map(|(seat, _)| seat)
}
