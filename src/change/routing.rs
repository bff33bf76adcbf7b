//! Routing table comparison.

use std::collections::HashSet;

use crate::observation::{Payload, RouteRecord};

use super::Change;

pub(super) fn compare(device_id: &str, previous: &Payload, current: &Payload) -> Vec<Change> {
    match (previous.as_routing_table(), current.as_routing_table()) {
        (Some(before), Some(after)) => diff_routes(device_id, before, after),
        _ => Vec::new(),
    }
}

/// Compares two routing tables as sets of canonical route strings.
///
/// Emits one `added` change per route only in `current` (in the order routes
/// first appear there), then one `removed` change per route only in
/// `previous`. Duplicate routes within one table count once; position in the
/// table is irrelevant.
#[must_use]
pub fn diff_routes(device_id: &str, previous: &[RouteRecord], current: &[RouteRecord]) -> Vec<Change> {
    let before = canonical_routes(previous);
    let after = canonical_routes(current);

    let before_set: HashSet<&str> = before.iter().map(String::as_str).collect();
    let after_set: HashSet<&str> = after.iter().map(String::as_str).collect();

    let added = after
        .iter()
        .filter(|route| !before_set.contains(route.as_str()))
        .map(|route| Change::route_added(device_id, route));

    let removed = before
        .iter()
        .filter(|route| !after_set.contains(route.as_str()))
        .map(|route| Change::route_removed(device_id, route));

    added.chain(removed).collect()
}

/// Canonical strings of a table, deduplicated, in first-seen order.
fn canonical_routes(routes: &[RouteRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    routes
        .iter()
        .map(|route| route.canonical().into_owned())
        .filter(|canonical| seen.insert(canonical.clone()))
        .collect()
}
