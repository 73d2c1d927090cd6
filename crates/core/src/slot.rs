//! Order-preserving placeholders for child content.
//!
//! A container reserves a [`Slot`] when a child is created and the child
//! fills it when it closes, so the container's content comes out in
//! declared order no matter which thread finished first.

use std::sync::{Arc, OnceLock};

pub(crate) enum Slot<T> {
    Ready(T),
    Pending(Arc<OnceLock<T>>),
}

impl<T: Clone> Slot<T> {
    /// The slot's value. `None` when the child never delivered.
    pub(crate) fn resolve(self) -> Option<T> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Pending(cell) => match Arc::try_unwrap(cell) {
                Ok(lock) => lock.into_inner(),
                Err(shared) => shared.get().cloned(),
            },
        }
    }
}

pub(crate) fn resolve_all<T: Clone>(slots: Vec<Slot<T>>) -> Vec<T> {
    slots.into_iter().filter_map(Slot::resolve).collect()
}

/// Takes the value out of a single-value cell.
pub(crate) fn take_cell<T: Clone>(cell: Arc<OnceLock<T>>) -> Option<T> {
    Slot::Pending(cell).resolve()
}

/// Reserves a pending slot at the end of `slots` and returns the outlet
/// that fills it.
pub(crate) fn reserve<T, U>(
    slots: &mut Vec<Slot<U>>,
    map: impl FnOnce(T) -> U + Send + 'static,
) -> Outlet<T>
where
    T: 'static,
    U: Send + Sync + 'static,
{
    let cell = Arc::new(OnceLock::new());
    slots.push(Slot::Pending(Arc::clone(&cell)));
    Outlet::new(cell, map)
}

/// The child's end of a slot.
pub(crate) struct Outlet<T> {
    deliver: Option<Box<dyn FnOnce(T) + Send>>,
}

impl<T: 'static> Outlet<T> {
    pub(crate) fn new<U>(cell: Arc<OnceLock<U>>, map: impl FnOnce(T) -> U + Send + 'static) -> Self
    where
        U: Send + Sync + 'static,
    {
        Self {
            deliver: Some(Box::new(move |value| {
                // Only the first delivery counts.
                let _ = cell.set(map(value));
            })),
        }
    }

    /// Fills the slot. Later calls are ignored.
    pub(crate) fn deliver(&mut self, value: T) {
        if let Some(deliver) = self.deliver.take() {
            deliver(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_keep_declared_order() {
        let mut slots: Vec<Slot<String>> = vec![Slot::Ready("a".into())];
        let mut first = reserve(&mut slots, |n: u32| format!("b{n}"));
        let mut second = reserve(&mut slots, |n: u32| format!("c{n}"));
        second.deliver(2);
        first.deliver(1);
        drop(first);
        assert_eq!(resolve_all(slots), vec!["a", "b1", "c2"]);
    }

    #[test]
    fn test_undelivered_slot_is_skipped() {
        let mut slots: Vec<Slot<u8>> = Vec::new();
        let outlet = reserve(&mut slots, |n: u8| n);
        slots.push(Slot::Ready(7));
        assert_eq!(resolve_all(slots), vec![7]);
        drop(outlet);
    }

    #[test]
    fn test_second_delivery_is_ignored() {
        let mut slots: Vec<Slot<u8>> = Vec::new();
        let mut outlet = reserve(&mut slots, |n: u8| n);
        outlet.deliver(1);
        outlet.deliver(2);
        assert_eq!(resolve_all(slots), vec![1]);
    }
}
