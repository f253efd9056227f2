// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the element tree: identifiers, flags, lengths, owners and colors.

/// Identifier for an element owned by a [`View`](crate::View).
///
/// This is a small, copyable handle that stays stable for the element's lifetime
/// and becomes stale when the element is destroyed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On destruction, the slot is freed; any existing `ElementId` that pointed to it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ElementId`.
///
/// Stale ids never alias a different live element because the generation must match.
/// Use [`View::is_alive`](crate::View::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(pub(crate) u32, pub(crate) u32);

impl ElementId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this id refers to.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Element flags controlling visibility, input and drop handling.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element is drawn and can be hit.
        const VISIBLE     = 0b0000_0001;
        /// Element runs its own handlers (children still receive events when disabled).
        const ENABLED     = 0b0000_0010;
        /// Element handles drag events.
        const DROP_TARGET = 0b0000_0100;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

/// A coordinate or extent, either absolute or relative to a reference size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Pixels(f64),
    /// Percentage of the reference size (`50.0` is half).
    Percent(f64),
}

impl Default for Length {
    fn default() -> Self {
        Self::Pixels(0.0)
    }
}

impl Length {
    /// Resolve to pixels against `reference`.
    pub fn resolve(self, reference: f64) -> f64 {
        match self {
            Self::Pixels(v) => v,
            Self::Percent(p) => reference * p / 100.0,
        }
    }

    /// Parse `"12"`, `"12.5"` or `"50%"`.
    ///
    /// Returns `None` for anything else, including non-finite numbers.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (number, percent) = match text.strip_suffix('%') {
            Some(n) => (n.trim_end(), true),
            None => (text, false),
        };
        let v: f64 = number.parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        Some(if percent {
            Self::Percent(v)
        } else {
            Self::Pixels(v)
        })
    }

    /// True if the value is negative.
    pub fn is_negative(self) -> bool {
        match self {
            Self::Pixels(v) | Self::Percent(v) => v < 0.0,
        }
    }
}

/// The owner of an [`Elements`](crate::Elements) collection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Owner {
    /// The view's top-level collection.
    Root,
    /// The child collection of a container element.
    Element(ElementId),
}

impl From<ElementId> for Owner {
    fn from(id: ElementId) -> Self {
        Self::Element(id)
    }
}

/// RGBA color with components in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Opaque color from components.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    pub fn parse(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| -> Option<f64> {
            let byte = u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?;
            Some(f64::from(byte) / 255.0)
        };
        match hex.len() {
            6 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 1.0,
            }),
            8 => Some(Self {
                a: channel(0)?,
                r: channel(2)?,
                g: channel(4)?,
                b: channel(6)?,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_parse_and_resolve() {
        assert_eq!(Length::parse("12"), Some(Length::Pixels(12.0)));
        assert_eq!(Length::parse(" 50% "), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("abc"), None);
        assert_eq!(Length::parse("inf"), None);
        assert_eq!(Length::parse("NaN%"), None);
        assert_eq!(Length::Percent(25.0).resolve(200.0), 50.0);
        assert_eq!(Length::Pixels(7.0).resolve(200.0), 7.0);
        assert!(Length::Pixels(-1.0).is_negative());
    }

    #[test]
    fn color_parse() {
        assert_eq!(Color::parse("#000000"), Some(Color::BLACK));
        assert_eq!(Color::parse("#FFFFFF"), Some(Color::WHITE));
        let c = Color::parse("#80FF0000").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-12);
        assert_eq!(c.r, 1.0);
        assert_eq!(Color::parse("FF0000"), None);
        assert_eq!(Color::parse("#FF00"), None);
        assert_eq!(Color::parse("#GG0000"), None);
    }

    #[test]
    fn default_flags_visible_and_enabled() {
        let f = ElementFlags::default();
        assert!(f.contains(ElementFlags::VISIBLE | ElementFlags::ENABLED));
        assert!(!f.contains(ElementFlags::DROP_TARGET));
    }
}
