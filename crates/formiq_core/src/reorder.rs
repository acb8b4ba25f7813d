//! Drag-and-drop reordering.
//!
//! # Responsibility
//! - Move one element to a new position (extract and reinsert, not swap).
//! - Resolve drag gestures from ids at drop time.
//!
//! # Invariants
//! - The multiset of elements is preserved.
//! - Relative order of all non-moved elements is preserved.

/// Moves the element at `from` to `to`.
///
/// `to` is clamped to the last index. Returns `false` and leaves `items`
/// untouched when `from` is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() {
        return false;
    }
    let to = to.min(items.len() - 1);
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

/// Resolves a drag gesture into `(from, to)` indices against `ids`.
///
/// Indices are computed from the ids as they are now, so a list that changed
/// mid-drag is handled correctly. Returns `None` when `source == target` or
/// when either id is no longer present.
pub fn reorder_by_id<T: PartialEq>(ids: &[T], source: &T, target: &T) -> Option<(usize, usize)> {
    if source == target {
        return None;
    }
    let from = ids.iter().position(|id| id == source)?;
    let to = ids.iter().position(|id| id == target)?;
    Some((from, to))
}

/// Returns the order produced by dropping `source` onto `target`.
pub fn reordered<T: PartialEq + Clone>(ids: &[T], source: &T, target: &T) -> Vec<T> {
    let mut result = ids.to_vec();
    if let Some((from, to)) = reorder_by_id(ids, source, target) {
        move_item(&mut result, from, to);
    }
    result
}
