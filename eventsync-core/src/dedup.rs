//! Collapsing duplicate events by identifier.

use std::collections::HashSet;

use crate::event::Event;

/// Keep the first occurrence of each identifier, in order.
///
/// Events without an identifier are dropped since they cannot be synced.
pub fn dedupe<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<&'a Event> {
    let mut seen: HashSet<&'a str> = HashSet::new();

    events
        .into_iter()
        .filter(|&event| !event.id().is_empty() && seen.insert(event.id()))
        .collect()
}
