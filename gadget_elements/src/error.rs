// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for element properties and the element factory.

use crate::types::ElementId;

/// Failure to apply a string property to an element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// Neither the element nor its kind knows the property.
    #[error("unknown property `{0}`")]
    Unknown(String),
    /// The value could not be parsed, or was rejected by validation.
    #[error("invalid value `{value}` for property `{name}`")]
    InvalidValue {
        /// Property name.
        name: String,
        /// Rejected value.
        value: String,
    },
    /// The target element has been destroyed.
    #[error("element {0:?} does not exist")]
    NoSuchElement(ElementId),
}

impl PropertyError {
    pub(crate) fn invalid(name: &str, value: &str) -> Self {
        Self::InvalidValue {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// Failure to register an element kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    /// A constructor is already registered under this tag name.
    #[error("element tag `{0}` is already registered")]
    DuplicateTag(String),
}
