//! Entity trait: identity + continuity across state changes.
//!
//! Local collections reconcile backend responses by identity only, so the
//! helpers here never look at anything but `id()`.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Replace the first element carrying `id` with `updated`.
///
/// Returns `false` (and leaves the collection untouched) when no element
/// matches.
pub fn replace_by_id<T: Entity>(items: &mut [T], id: &T::Id, updated: T) -> bool {
    match items.iter().position(|item| item.id() == id) {
        Some(index) => {
            items[index] = updated;
            true
        }
        None => false,
    }
}

/// Remove every element carrying `id`. Returns how many were removed.
pub fn remove_by_id<T: Entity>(items: &mut Vec<T>, id: &T::Id) -> usize {
    let before = items.len();
    items.retain(|item| item.id() != id);
    before - items.len()
}

/// True when `selected` is present and carries `id`.
pub fn is_selected<T: Entity>(selected: Option<&T>, id: &T::Id) -> bool {
    selected.is_some_and(|item| item.id() == id)
}
