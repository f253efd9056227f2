// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Death detection for elements that may be destroyed while a handler runs.
//!
//! Before calling into code that may remove elements, the dispatcher registers the element it
//! is about to use afterwards with [`DeathDetector::watch`].
//! When the view destroys an element it calls [`DeathDetector::notify_destroyed`], which marks
//! every live registration for that element.
//! [`DeathDetector::release`] then reports whether the element survived.
//!
//! Registrations nest strictly (last in, first out), mirroring the call stack of a recursive
//! dispatch.

use crate::types::ElementId;

/// A registration returned by [`DeathDetector::watch`].
///
/// Must be handed back to [`DeathDetector::release`].
#[derive(Debug)]
#[must_use = "a watch must be released to learn whether the element survived"]
pub struct Watch {
    depth: usize,
    id: ElementId,
}

impl Watch {
    /// The watched element.
    pub fn id(&self) -> ElementId {
        self.id
    }
}

/// LIFO registry of elements watched across re-entrant calls.
#[derive(Debug, Default)]
pub struct DeathDetector {
    watched: Vec<(ElementId, bool)>,
}

impl DeathDetector {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `id`.
    pub fn watch(&mut self, id: ElementId) -> Watch {
        let depth = self.watched.len();
        self.watched.push((id, true));
        Watch { depth, id }
    }

    /// Mark every registration of `id` as dead.
    pub fn notify_destroyed(&mut self, id: ElementId) {
        for entry in &mut self.watched {
            if entry.0 == id {
                entry.1 = false;
            }
        }
    }

    /// Stop watching and return whether the element is still alive.
    ///
    /// Releasing also drops any registration made after `watch` that was not released,
    /// so the registry stays balanced even if an inner scope exited early.
    pub fn release(&mut self, watch: Watch) -> bool {
        let alive = self
            .watched
            .get(watch.depth)
            .is_some_and(|&(id, alive)| id == watch.id && alive);
        self.watched.truncate(watch.depth);
        alive
    }

    /// True if `id` has a live registration.
    pub fn is_watching(&self, id: ElementId) -> bool {
        self.watched.iter().any(|&(w, alive)| w == id && alive)
    }

    /// Number of outstanding registrations.
    pub fn depth(&self) -> usize {
        self.watched.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survivor_reports_alive() {
        let mut d = DeathDetector::new();
        let a = ElementId::new(0, 1);
        let w = d.watch(a);
        assert!(d.is_watching(a));
        assert!(d.release(w));
        assert_eq!(d.depth(), 0);
    }

    #[test]
    fn nested_watches_see_destruction() {
        let mut d = DeathDetector::new();
        let parent = ElementId::new(0, 1);
        let child = ElementId::new(1, 1);
        let outer = d.watch(parent);
        let inner = d.watch(child);
        let again = d.watch(child);
        d.notify_destroyed(child);
        assert!(!d.is_watching(child));
        assert!(!d.release(again));
        assert!(!d.release(inner));
        assert!(d.release(outer));
    }

    #[test]
    fn other_generation_is_not_affected() {
        let mut d = DeathDetector::new();
        let old = ElementId::new(3, 1);
        let new = ElementId::new(3, 2);
        let w = d.watch(new);
        d.notify_destroyed(old);
        assert!(d.release(w));
    }

    #[test]
    fn release_truncates_leaked_inner_watches() {
        let mut d = DeathDetector::new();
        let outer = d.watch(ElementId::new(0, 1));
        let _leaked = d.watch(ElementId::new(1, 1));
        assert_eq!(d.depth(), 2);
        assert!(d.release(outer));
        assert_eq!(d.depth(), 0);
    }
}
