// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tag name to element constructor registry.

use std::collections::BTreeMap;

use crate::element::Element;
use crate::error::FactoryError;
use crate::kinds::{ButtonElement, DivElement, ImgElement, LabelElement};

type Creator = Box<dyn Fn() -> Box<dyn Element>>;

/// Creates element kinds by tag name.
///
/// Tag names match case-sensitively, whatever the name comparison policy.
///
/// ```
/// use gadget_elements::ElementFactory;
///
/// let factory = ElementFactory::with_builtin_elements();
/// assert!(factory.create("img").is_some());
/// assert!(factory.create("IMG").is_none());
/// assert!(factory.create("marquee").is_none());
/// ```
#[derive(Default)]
pub struct ElementFactory {
    creators: BTreeMap<String, Creator>,
}

impl core::fmt::Debug for ElementFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementFactory")
            .field("tags", &self.creators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ElementFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with `div`, `img`, `button` and `label` registered.
    pub fn with_builtin_elements() -> Self {
        let mut factory = Self::new();
        factory.insert("div", || Box::new(DivElement::default()));
        factory.insert("img", || Box::new(ImgElement::default()));
        factory.insert("button", || Box::new(ButtonElement::default()));
        factory.insert("label", || Box::new(LabelElement::default()));
        factory
    }

    fn insert(&mut self, tag: &str, creator: impl Fn() -> Box<dyn Element> + 'static) {
        self.creators.insert(tag.to_owned(), Box::new(creator));
    }

    /// Register a constructor for `tag`.
    ///
    /// Fails without replacing anything if `tag` is already registered.
    pub fn register(
        &mut self,
        tag: &str,
        creator: impl Fn() -> Box<dyn Element> + 'static,
    ) -> Result<(), FactoryError> {
        if self.creators.contains_key(tag) {
            return Err(FactoryError::DuplicateTag(tag.to_owned()));
        }
        self.insert(tag, creator);
        Ok(())
    }

    /// True if `tag` has a constructor.
    pub fn is_registered(&self, tag: &str) -> bool {
        self.creators.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.creators.keys().map(String::as_str)
    }

    /// Construct the kind registered for `tag`, or `None` if there is none.
    pub fn create(&self, tag: &str) -> Option<Box<dyn Element>> {
        self.creators.get(tag).map(|creator| creator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dummy;
    impl Element for Dummy {}

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut f = ElementFactory::new();
        assert_eq!(f.register("dummy", || Box::new(Dummy)), Ok(()));
        assert_eq!(
            f.register("dummy", || Box::new(Dummy)),
            Err(FactoryError::DuplicateTag("dummy".into()))
        );
        assert!(f.is_registered("dummy"));
        assert!(!f.is_registered("Dummy"));
    }

    #[test]
    fn builtin_tags() {
        let f = ElementFactory::with_builtin_elements();
        assert_eq!(
            f.tags().collect::<Vec<_>>(),
            vec!["button", "div", "img", "label"]
        );
        assert!(f.create("div").is_some_and(|k| k.has_children()));
        assert!(f.create("label").is_some_and(|k| !k.has_children()));
    }
}
