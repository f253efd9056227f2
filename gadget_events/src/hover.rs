// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Over/out state helper: compute out/over transitions when the target under the pointer changes.
//!
//! ## Usage
//!
//! 1) Dispatch a pointer move (or a drag motion) through the element tree.
//! 2) Take the element the pointer ended up "in" (or `None` when it is over nothing).
//! 3) Call [`HoverState::update`] with it to get the `Out(..)` / `Over(..)` notifications to send.
//!
//! Only the single innermost target is tracked.
//! Ancestors of the target are not notified when the pointer moves between their children.
//!
//! ## Minimal example
//!
//! ```
//! use gadget_events::hover::{HoverState, HoverEvent};
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(7)), vec![HoverEvent::Over(7)]);
//! assert_eq!(h.update(None), vec![HoverEvent::Out(7)]);
//! ```

use alloc::vec::Vec;

/// A simple over/out state machine over a single optional target.
///
/// Ordering semantics: when the target changes, the old target receives `Out`
/// before the new target receives `Over`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoverState<K: Copy + Eq> {
    current: Option<K>,
}

/// An over/out transition.
///
/// Returned by [`HoverState::update`] and [`HoverState::clear`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// Pointer moved over the given target.
    Over(K),
    /// Pointer moved out of the given target.
    Out(K),
}

impl<K: Copy + Eq> HoverState<K> {
    /// Create an empty state.
    pub fn new() -> Self {
        Self { current: None }
    }

    /// The current target, if any.
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Clear the current target, returning the corresponding `Out` event.
    pub fn clear(&mut self) -> Option<HoverEvent<K>> {
        self.current.take().map(HoverEvent::Out)
    }

    /// Drop the current target without producing an `Out` event.
    ///
    /// Used when the target was destroyed and must not be notified.
    /// Returns true if `target` was the current one.
    pub fn forget(&mut self, target: K) -> bool {
        if self.current == Some(target) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Update the target and return the transitions needed to move from the old one.
    pub fn update(&mut self, next: Option<K>) -> Vec<HoverEvent<K>> {
        let mut out = Vec::new();
        if self.current == next {
            return out;
        }
        if let Some(old) = self.current {
            out.push(HoverEvent::Out(old));
        }
        if let Some(new) = next {
            out.push(HoverEvent::Over(new));
        }
        self.current = next;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn over_on_first_target() {
        let mut h: HoverState<u32> = HoverState::new();
        assert_eq!(h.update(Some(1)), vec![HoverEvent::Over(1)]);
        assert_eq!(h.current(), Some(1));
    }

    // Switching targets: out of the old one first, then over the new one.
    #[test]
    fn out_precedes_over() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(1));
        assert_eq!(
            h.update(Some(2)),
            vec![HoverEvent::Out(1), HoverEvent::Over(2)]
        );
    }

    #[test]
    fn same_target_no_events() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(4));
        assert!(h.update(Some(4)).is_empty());
        assert!(h.update(Some(4)).is_empty());
    }

    #[test]
    fn clear_emits_out_once() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(3));
        assert_eq!(h.clear(), Some(HoverEvent::Out(3)));
        assert_eq!(h.clear(), None);
        assert_eq!(h.current(), None);
    }

    // A destroyed target is dropped silently; the next target only gets `Over`.
    #[test]
    fn forget_skips_out() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(5));
        assert!(!h.forget(6));
        assert!(h.forget(5));
        assert_eq!(h.update(Some(6)), vec![HoverEvent::Over(6)]);
    }
}
