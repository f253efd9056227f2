// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in element kinds, registered by
//! [`ElementFactory::with_builtin_elements`](crate::ElementFactory::with_builtin_elements).
//!
//! | tag      | kind                | children |
//! |----------|---------------------|----------|
//! | `div`    | [`DivElement`]      | yes      |
//! | `img`    | [`ImgElement`]      | no       |
//! | `button` | [`ButtonElement`]   | no       |
//! | `label`  | [`LabelElement`]    | no       |

mod button;
mod div;
mod img;
mod label;

pub use button::{ButtonElement, ButtonState};
pub use div::DivElement;
pub use img::{CropMaintainAspect, ImgElement, MaskImage};
pub use label::LabelElement;
